use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::relevance::RelevanceFilter;
use super::types::{JobPosting, Source};

mod indeed;
mod linkedin;
mod monster;
mod naukri;
mod shine;

/// Turns one site's listing markup into normalized postings.
///
/// Implementations never fail: a missing document, missing containers or
/// missing fields all degrade to fewer records. The relevance filter is
/// applied per candidate so that each adapter can be exercised on its own
/// against a fixture page.
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;
    fn parse(&self, document: Option<&str>, filter: &RelevanceFilter) -> Vec<JobPosting>;
}

pub fn adapter_for(source: Source) -> &'static dyn SourceAdapter {
    match source {
        Source::LinkedIn => &linkedin::LinkedIn,
        Source::Naukri => &naukri::Naukri,
        Source::Indeed => &indeed::Indeed,
        Source::Monster => &monster::Monster,
        Source::Shine => &shine::Shine,
    }
}

/// Fields pulled out of one listing container before validation.
struct Candidate {
    title: String,
    company: String,
    location: String,
    url: Option<String>,
}

impl Candidate {
    fn into_posting(self, source: Source) -> Option<JobPosting> {
        JobPosting::new(source, self.title, self.company, self.location, self.url?)
    }
}

/// Shared driver for card-style listings: select containers, build a candidate
/// from each, then apply the title gate, relevance filter and url requirement.
fn parse_cards<F>(source: Source, document: Option<&str>, container: &str, filter: &RelevanceFilter, extract: F) -> Vec<JobPosting>
where
    F: Fn(ElementRef<'_>) -> Option<Candidate>,
{
    let Some(html) = document else { return Vec::new() };
    let Some(sel) = selector(container) else { return Vec::new() };
    let doc = Html::parse_document(html);
    doc.select(&sel)
        .filter_map(extract)
        .filter(|c| !c.title.is_empty() && filter.matches(&c.title))
        .filter_map(|c| c.into_posting(source))
        .collect()
}

fn selector(s: &str) -> Option<Selector> { Selector::parse(s).ok() }

fn first<'a>(el: ElementRef<'a>, sel: &str) -> Option<ElementRef<'a>> {
    let sel = selector(sel)?;
    el.select(&sel).next()
}

/// Trimmed, whitespace-collapsed text of the first match, or empty.
fn first_text(el: ElementRef<'_>, sel: &str) -> String {
    first(el, sel).map(text_of).unwrap_or_default()
}

fn text_of(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn href_of(el: ElementRef<'_>) -> Option<&str> {
    el.value().attr("href").map(str::trim).filter(|h| !h.is_empty())
}

/// Resolve `href` against `origin`; absolute links pass through unchanged.
fn absolutize(origin: &str, href: &str) -> Option<String> {
    let base = Url::parse(origin).ok()?;
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Like `absolutize` but drops the query string and fragment.
fn absolutize_clean(origin: &str, href: &str) -> Option<String> {
    let base = Url::parse(origin).ok()?;
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") { return None; }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                if !buf.is_empty() { buf.push(' '); }
                in_ws = true;
            }
        } else {
            buf.push(ch);
            in_ws = false;
        }
    }
    buf.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_CONTAINERS: &str = r#"<html><body><div class="nothing"><p>No jobs here</p></div></body></html>"#;

    fn filter() -> RelevanceFilter { RelevanceFilter::new(["sharepoint", "office 365"]) }

    #[test]
    fn every_adapter_yields_nothing_without_a_document() {
        for src in Source::ALL {
            assert!(adapter_for(src).parse(None, &filter()).is_empty(), "{src}");
        }
    }

    #[test]
    fn every_adapter_yields_nothing_without_containers() {
        for src in Source::ALL {
            assert!(adapter_for(src).parse(Some(NO_CONTAINERS), &filter()).is_empty(), "{src}");
            assert!(adapter_for(src).parse(Some(""), &filter()).is_empty(), "{src}");
            assert!(adapter_for(src).parse(Some("<<<not html"), &filter()).is_empty(), "{src}");
        }
    }

    #[test]
    fn adapter_for_reports_its_source() {
        for src in Source::ALL {
            assert_eq!(adapter_for(src).source(), src);
        }
    }

    #[test]
    fn absolutize_joins_relative_and_keeps_absolute() {
        assert_eq!(absolutize("https://www.shine.com", "/jobs/a/b/1").as_deref(), Some("https://www.shine.com/jobs/a/b/1"));
        assert_eq!(absolutize("https://www.shine.com", "https://other.test/x").as_deref(), Some("https://other.test/x"));
        assert!(absolutize("https://www.shine.com", "javascript:void(0)").is_none());
    }

    #[test]
    fn absolutize_clean_strips_tracking() {
        assert_eq!(
            absolutize_clean("https://www.foundit.in", "/job/sharepoint-dev-123?utm_source=x#top").as_deref(),
            Some("https://www.foundit.in/job/sharepoint-dev-123")
        );
    }

    #[test]
    fn collapse_whitespace_trims_and_squeezes() {
        assert_eq!(collapse_whitespace("  SharePoint \n\t Developer  "), "SharePoint Developer");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
