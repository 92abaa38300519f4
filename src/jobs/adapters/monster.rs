use super::{Candidate, SourceAdapter, absolutize_clean, first, first_text, href_of, parse_cards, text_of};
use crate::jobs::relevance::RelevanceFilter;
use crate::jobs::types::{JobPosting, Source};

const ORIGIN: &str = "https://www.foundit.in";

/// Monster (foundit) search cards. Paths are relative and carry tracking
/// query strings, both normalized away.
pub struct Monster;

impl SourceAdapter for Monster {
    fn source(&self) -> Source { Source::Monster }

    fn parse(&self, document: Option<&str>, filter: &RelevanceFilter) -> Vec<JobPosting> {
        parse_cards(Source::Monster, document, "div.card-apply-content", filter, |card| {
            let a = first(card, "div.job-tittle h3 a").or_else(|| first(card, "h3.medium a"))?;
            Some(Candidate {
                title: text_of(a),
                company: first_text(card, "span.company-name"),
                location: first_text(card, "span.loc"),
                url: href_of(a).and_then(|h| absolutize_clean(ORIGIN, h)),
            })
        })
    }
}
