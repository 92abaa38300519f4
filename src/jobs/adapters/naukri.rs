use super::{Candidate, SourceAdapter, absolutize, first, first_text, href_of, parse_cards, text_of};
use crate::jobs::relevance::RelevanceFilter;
use crate::jobs::types::{JobPosting, Source};

const ORIGIN: &str = "https://www.naukri.com";

/// Naukri result rows. Links are usually absolute already; relative ones are
/// joined against the site origin.
pub struct Naukri;

impl SourceAdapter for Naukri {
    fn source(&self) -> Source { Source::Naukri }

    fn parse(&self, document: Option<&str>, filter: &RelevanceFilter) -> Vec<JobPosting> {
        parse_cards(Source::Naukri, document, "div.row", filter, |row| {
            let a = first(row, "a.title.fw500")?;
            Some(Candidate {
                title: text_of(a),
                company: first_text(row, "li.company"),
                location: first_text(row, "li.loc"),
                url: href_of(a).and_then(|h| absolutize(ORIGIN, h)),
            })
        })
    }
}
