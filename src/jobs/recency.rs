use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use regex::Regex;
use scraper::Html;

use super::fetch::Fetcher;

/// Labels searched, in order, when no relative age phrase is present.
const LABELS: [&str; 2] = ["Posted on", "Posted"];
/// Characters of text (label included) handed to the fuzzy date parser.
const WINDOW_CHARS: usize = 50;

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Fetch a posting's detail page and derive when it was published.
/// `None` means the date could not be established.
pub async fn posted_at<F: Fetcher + ?Sized>(fetcher: &F, url: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let html = fetcher.fetch(url).await.into_body()?;
    extract_posted_at(&visible_text(&html), now)
}

/// Relative age ("3 days ago") first, then a labeled calendar date.
pub fn extract_posted_at(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(days) = relative_days(text) {
        if let Some(dt) = Duration::try_days(days).and_then(|d| now.checked_sub_signed(d)) {
            return Some(dt);
        }
    }
    for label in LABELS {
        let Some(idx) = text.find(label) else { continue };
        let window = char_window(&text[idx..], WINDOW_CHARS);
        if let Some(date) = fuzzy_date(window, now.date_naive()) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Some(midnight.and_utc());
            }
        }
    }
    None
}

/// Text nodes of the document joined by single spaces, skipping scripts and styles.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else { continue };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| matches!(e.name(), "script" | "style" | "noscript")))
            .unwrap_or(false);
        if hidden { continue; }
        let t = text.trim();
        if !t.is_empty() { parts.push(t); }
    }
    parts.join(" ")
}

fn relative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s+days?\s+ago").expect("static regex"))
}

fn relative_days(text: &str) -> Option<i64> {
    relative_re().captures(text)?.get(1)?.as_str().parse().ok()
}

fn char_window(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

struct DatePatterns {
    iso: Regex,
    numeric: Regex,
    day_month: Regex,
    month_day: Regex,
}

fn patterns() -> &'static DatePatterns {
    static P: OnceLock<DatePatterns> = OnceLock::new();
    P.get_or_init(|| DatePatterns {
        iso: Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("static regex"),
        numeric: Regex::new(r"\b(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})\b").expect("static regex"),
        day_month: Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]{3,9})\b\.?,?(?:\s+(\d{4})\b)?").expect("static regex"),
        month_day: Regex::new(r"\b([A-Za-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b,?(?:\s+(\d{4})\b)?").expect("static regex"),
    })
}

/// Find the earliest date-like phrase in `window`. Numeric dates are read
/// day-first, falling back to month-first when that is the only valid reading.
/// Phrases without a year take the most recent year that keeps them on or
/// before `today`.
fn fuzzy_date(window: &str, today: NaiveDate) -> Option<NaiveDate> {
    let p = patterns();
    let mut found: Vec<(usize, NaiveDate)> = Vec::new();

    for c in p.iso.captures_iter(window) {
        if let Some(d) = ymd(num(&c, 1), num(&c, 2), num(&c, 3)) { found.push((pos(&c), d)); break; }
    }
    for c in p.numeric.captures_iter(window) {
        let (a, b, y) = (num(&c, 1), num(&c, 2), num(&c, 3));
        if let Some(d) = ymd(y, b, a).or_else(|| ymd(y, a, b)) { found.push((pos(&c), d)); break; }
    }
    for c in p.day_month.captures_iter(window) {
        let Some(month) = c.get(2).and_then(|m| month_number(m.as_str())) else { continue };
        let explicit = c.get(3).and_then(|m| m.as_str().parse().ok());
        if let Some(d) = dated(explicit, month, num(&c, 1), today) { found.push((pos(&c), d)); break; }
    }
    for c in p.month_day.captures_iter(window) {
        let Some(month) = c.get(1).and_then(|m| month_number(m.as_str())) else { continue };
        let explicit = c.get(3).and_then(|m| m.as_str().parse().ok());
        if let Some(d) = dated(explicit, month, num(&c, 2), today) { found.push((pos(&c), d)); break; }
    }

    found.into_iter().min_by_key(|(at, _)| *at).map(|(_, d)| d)
}

fn pos(c: &regex::Captures<'_>) -> usize { c.get(0).map(|m| m.start()).unwrap_or(usize::MAX) }

fn num<T: std::str::FromStr>(c: &regex::Captures<'_>, i: usize) -> Option<T> {
    c.get(i)?.as_str().parse().ok()
}

fn ymd(y: Option<i32>, m: Option<u32>, d: Option<u32>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y?, m?, d?)
}

// A year-less "28 Dec" read in early January belongs to last December.
fn dated(year: Option<i32>, month: u32, day: Option<u32>, today: NaiveDate) -> Option<NaiveDate> {
    if year.is_some() { return ymd(year, Some(month), day); }
    match ymd(Some(today.year()), Some(month), day) {
        Some(d) if d <= today => Some(d),
        _ => ymd(Some(today.year() - 1), Some(month), day),
    }
}

/// "Oct", "oct.", "October" and "Sept" all map to 10/9; other words do not.
fn month_number(word: &str) -> Option<u32> {
    let w = word.trim_end_matches('.').to_lowercase();
    if w.len() < 3 { return None; }
    MONTHS.iter().position(|m| m.starts_with(w.as_str())).map(|i| i as u32 + 1)
}
