use std::sync::OnceLock;

use regex::Regex;

use super::{Candidate, SourceAdapter, href_of, parse_cards, text_of};
use crate::jobs::relevance::RelevanceFilter;
use crate::jobs::types::{JobPosting, Source};

const VIEW_BASE: &str = "https://www.linkedin.com/jobs/view/";

/// Public LinkedIn search pages: every anchor is a candidate, and only links
/// carrying a numeric job id survive. The url is rebuilt from that id so
/// tracking parameters never reach the export.
pub struct LinkedIn;

impl SourceAdapter for LinkedIn {
    fn source(&self) -> Source { Source::LinkedIn }

    fn parse(&self, document: Option<&str>, filter: &RelevanceFilter) -> Vec<JobPosting> {
        parse_cards(Source::LinkedIn, document, "a[href]", filter, |a| {
            Some(Candidate {
                title: text_of(a),
                company: String::new(),
                location: String::new(),
                url: href_of(a).and_then(canonical_url),
            })
        })
    }
}

fn job_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "/jobs/view/3812345678" and "/jobs/view/sharepoint-admin-at-acme-3812345678"
    RE.get_or_init(|| Regex::new(r"/jobs/view/(?:[^/?#]*-)?(\d+)").expect("static regex"))
}

fn canonical_url(href: &str) -> Option<String> {
    let caps = job_id_re().captures(href)?;
    Some(format!("{}{}", VIEW_BASE, &caps[1]))
}
