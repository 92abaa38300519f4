use scraper::ElementRef;
use url::Url;

use super::{Candidate, SourceAdapter, absolutize, collapse_whitespace, first, first_text, href_of, parse_cards, text_of};
use crate::jobs::relevance::RelevanceFilter;
use crate::jobs::types::{JobPosting, Source};

const ORIGIN: &str = "https://in.indeed.com";

/// Indeed result cards. Links are relative click-through redirects carrying a
/// `jk` job key; the export uses the stable `viewjob?jk=` form instead.
pub struct Indeed;

impl SourceAdapter for Indeed {
    fn source(&self) -> Source { Source::Indeed }

    fn parse(&self, document: Option<&str>, filter: &RelevanceFilter) -> Vec<JobPosting> {
        parse_cards(Source::Indeed, document, "div.job_seen_beacon", filter, |card| {
            let a = first(card, "h2.jobTitle a")?;
            let mut company = first_text(card, "[data-testid=company-name]");
            if company.is_empty() { company = first_text(card, "span.companyName"); }
            let mut location = first_text(card, "[data-testid=text-location]");
            if location.is_empty() { location = first_text(card, "div.companyLocation"); }
            Some(Candidate { title: title_of(a), company, location, url: job_url(a) })
        })
    }
}

// The visible anchor text sometimes carries a "new" badge; the span's title
// attribute holds the clean title when present.
fn title_of(a: ElementRef<'_>) -> String {
    first(a, "span[title]")
        .and_then(|s| s.value().attr("title"))
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| text_of(a))
}

fn job_url(a: ElementRef<'_>) -> Option<String> {
    let href = href_of(a);
    let key = a
        .value()
        .attr("data-jk")
        .map(str::to_string)
        .or_else(|| href.and_then(job_key));
    match key {
        Some(jk) if !jk.is_empty() => Some(format!("{}/viewjob?jk={}", ORIGIN, jk)),
        _ => href.and_then(|h| absolutize(ORIGIN, h)),
    }
}

fn job_key(href: &str) -> Option<String> {
    let url = Url::parse(ORIGIN).ok()?.join(href).ok()?;
    url.query_pairs().find(|(k, _)| k == "jk").map(|(_, v)| v.into_owned())
}
