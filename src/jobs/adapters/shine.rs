use super::{Candidate, SourceAdapter, absolutize, first, first_text, href_of, parse_cards, text_of};
use crate::jobs::relevance::RelevanceFilter;
use crate::jobs::types::{JobPosting, Source};

const ORIGIN: &str = "https://www.shine.com";

pub struct Shine;

impl SourceAdapter for Shine {
    fn source(&self) -> Source { Source::Shine }

    fn parse(&self, document: Option<&str>, filter: &RelevanceFilter) -> Vec<JobPosting> {
        parse_cards(Source::Shine, document, "div.jobCard", filter, |card| {
            let a = first(card, "h2 a")?;
            Some(Candidate {
                title: text_of(a),
                company: first_text(card, "div.jobCard_cName"),
                location: first_text(card, "div.jobCard_location"),
                url: href_of(a).and_then(|h| absolutize(ORIGIN, h)),
            })
        })
    }
}
