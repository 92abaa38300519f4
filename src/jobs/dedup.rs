use std::collections::HashSet;

use super::adapters::collapse_whitespace;
use super::types::JobPosting;

/// Drop later postings whose normalized title and company were already seen.
/// Returns the survivors in their original order and the number dropped.
pub fn dedup_postings(postings: Vec<JobPosting>) -> (Vec<JobPosting>, usize) {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let before = postings.len();
    let kept: Vec<JobPosting> = postings
        .into_iter()
        .filter(|p| seen.insert(dedup_key(p)))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

fn dedup_key(p: &JobPosting) -> (String, String) {
    (collapse_whitespace(&p.title).to_lowercase(), collapse_whitespace(&p.company).to_lowercase())
}
