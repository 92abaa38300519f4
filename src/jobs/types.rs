use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    LinkedIn,
    Naukri,
    Indeed,
    Monster,
    Shine,
}

impl Source {
    pub const ALL: [Source; 5] = [Source::LinkedIn, Source::Naukri, Source::Indeed, Source::Monster, Source::Shine];

    pub fn name(&self) -> &'static str {
        match self {
            Source::LinkedIn => "LinkedIn",
            Source::Naukri => "Naukri",
            Source::Indeed => "Indeed",
            Source::Monster => "Monster",
            Source::Shine => "Shine",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|src| src.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown source: {} (expected one of linkedin, naukri, indeed, monster, shine)", s))
    }
}

/// One normalized listing. Only adapters construct these, and only with a
/// non-empty title and url.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    source: Source,
    pub posted_date: Option<NaiveDate>,
}

impl JobPosting {
    pub fn new(source: Source, title: String, company: String, location: String, url: String) -> Option<Self> {
        if title.is_empty() || url.is_empty() { return None; }
        Some(JobPosting { title, company, location, url, source, posted_date: None })
    }

    pub fn source(&self) -> Source { self.source }
}

// Plan envelope types
#[derive(Serialize)]
pub struct TargetSample { pub source: Source, pub urls: Vec<String> }

#[derive(Serialize)]
pub struct ScanPlan {
    pub sources: usize,
    pub urls: usize,
    pub keywords: Vec<String>,
    pub recency_window_days: Option<u32>,
    pub dedup: bool,
    pub concurrency: usize,
    pub output: String,
    pub sample_targets: Vec<TargetSample>,
}

// Apply/result envelope types
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SourceSummary { pub source: Source, pub urls: usize, pub fetched: usize, pub missed: usize, pub kept: usize }

#[derive(Serialize)]
pub struct ScanTotals { pub exported: usize, pub dropped_by_dedup: usize, pub dropped_by_recency: usize }

#[derive(Serialize)]
pub struct ScanApply { pub output: String, pub totals: ScanTotals, pub per_source: Vec<SourceSummary> }
