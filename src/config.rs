use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::jobs::types::Source;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_WINDOW_DAYS: u32 = 7;
const DEFAULT_OUTPUT: &str = "weekly_jobs.xlsx";
const MAX_WINDOW_DAYS: u32 = 3650;

const DEFAULT_KEYWORDS: [&str; 7] = [
    "office 365", "o365", "microsoft 365", "sharepoint", "power apps", "power platform", "exchange",
];

const LINKEDIN_URLS: [&str; 1] = ["https://www.linkedin.com/jobs/search/?keywords=Office%20365&location=India"];
const NAUKRI_URLS: [&str; 4] = [
    "https://www.naukri.com/office-365-jobs",
    "https://www.naukri.com/sharepoint-jobs",
    "https://www.naukri.com/exchange-jobs",
    "https://www.naukri.com/powerapps-jobs",
];
const INDEED_URLS: [&str; 1] = ["https://in.indeed.com/jobs?q=sharepoint+office+365&l=India"];
const MONSTER_URLS: [&str; 1] = ["https://www.foundit.in/srp/results?query=sharepoint&locations=India"];
const SHINE_URLS: [&str; 1] = ["https://www.shine.com/job-search/sharepoint-jobs"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceTarget {
    pub source: Source,
    pub urls: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecencyConfig {
    pub enabled: bool,
    pub window_days: u32,
}

/// Everything a scan needs, fixed before the first request goes out.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanConfig {
    pub keywords: Vec<String>,
    pub targets: Vec<SourceTarget>,
    pub recency: RecencyConfig,
    pub user_agent: String,
    pub timeout: Duration,
    pub concurrency: usize,
    pub dedup: bool,
    pub output_path: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let target = |source, urls: &[&str]| SourceTarget { source, urls: urls.iter().map(|u| u.to_string()).collect() };
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            targets: vec![
                target(Source::Naukri, &NAUKRI_URLS[..]),
                target(Source::LinkedIn, &LINKEDIN_URLS[..]),
                target(Source::Indeed, &INDEED_URLS[..]),
                target(Source::Monster, &MONSTER_URLS[..]),
                target(Source::Shine, &SHINE_URLS[..]),
            ],
            recency: RecencyConfig { enabled: true, window_days: DEFAULT_WINDOW_DAYS },
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: 1,
            dedup: false,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

/// On-disk overlay; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub keywords: Option<Vec<String>>,
    pub targets: Option<Vec<TargetFile>>,
    pub recency: Option<bool>,
    pub window_days: Option<u32>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub dedup: Option<bool>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetFile {
    pub source: String,
    pub urls: Vec<String>,
}

/// Command-line overrides, applied last.
#[derive(Clone, Debug, Default)]
pub struct ScanOverrides {
    pub keywords: Vec<String>,
    pub sources: Vec<Source>,
    pub no_recency: bool,
    pub window_days: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub concurrency: Option<usize>,
    pub dedup: bool,
    pub output: Option<PathBuf>,
}

impl ScanConfig {
    /// Defaults, then the config file (explicit path or `JOBFEED_CONFIG`),
    /// then environment, then CLI overrides. The result is validated.
    pub fn load(path: Option<&Path>, overrides: &ScanOverrides) -> Result<Self> {
        let mut cfg = Self::default();
        let env_path = std::env::var("JOBFEED_CONFIG").ok().map(PathBuf::from);
        if let Some(p) = path.map(Path::to_path_buf).or(env_path) {
            let raw = std::fs::read_to_string(&p).with_context(|| format!("read config {}", p.display()))?;
            let file: ConfigFile = serde_json::from_str(&raw).with_context(|| format!("parse config {}", p.display()))?;
            cfg.apply_file(file)?;
        }
        cfg.apply_env();
        cfg.apply_overrides(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_file(&mut self, file: ConfigFile) -> Result<()> {
        if let Some(k) = file.keywords { self.keywords = k; }
        if let Some(targets) = file.targets {
            self.targets = targets
                .into_iter()
                .map(|t| {
                    let source = t.source.parse::<Source>().map_err(anyhow::Error::msg)?;
                    Ok(SourceTarget { source, urls: t.urls })
                })
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(r) = file.recency { self.recency.enabled = r; }
        if let Some(d) = file.window_days { self.recency.window_days = d; }
        if let Some(ua) = file.user_agent { self.user_agent = ua; }
        if let Some(t) = file.timeout_secs { self.timeout = Duration::from_secs(t); }
        if let Some(c) = file.concurrency { self.concurrency = c; }
        if let Some(d) = file.dedup { self.dedup = d; }
        if let Some(o) = file.output { self.output_path = o; }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(ua) = std::env::var("JOBFEED_USER_AGENT") {
            if !ua.trim().is_empty() { self.user_agent = ua; }
        }
        if let Ok(timeout) = std::env::var("JOBFEED_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                self.timeout = Duration::from_secs(parsed);
            }
        }
    }

    pub fn apply_overrides(&mut self, o: &ScanOverrides) {
        if !o.keywords.is_empty() { self.keywords = o.keywords.clone(); }
        if !o.sources.is_empty() { self.targets.retain(|t| o.sources.contains(&t.source)); }
        if o.no_recency { self.recency.enabled = false; }
        if let Some(d) = o.window_days { self.recency.window_days = d; }
        if let Some(t) = o.timeout_secs { self.timeout = Duration::from_secs(t); }
        if let Some(ua) = &o.user_agent { self.user_agent = ua.clone(); }
        if let Some(c) = o.concurrency { self.concurrency = c; }
        if o.dedup { self.dedup = true; }
        if let Some(out) = &o.output { self.output_path = out.clone(); }
    }

    pub fn validate(&self) -> Result<()> {
        for t in &self.targets {
            for u in &t.urls {
                match Url::parse(u) {
                    Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                    _ => bail!("Invalid URL for {}: {}", t.source, u),
                }
            }
        }
        if self.keywords.iter().all(|k| k.trim().is_empty()) { bail!("at least one non-blank keyword is required"); }
        if self.recency.window_days == 0 { bail!("window_days must be at least 1"); }
        if self.recency.window_days > MAX_WINDOW_DAYS { bail!("window_days must be at most {}", MAX_WINDOW_DAYS); }
        if self.concurrency == 0 { bail!("concurrency must be at least 1"); }
        if self.timeout.is_zero() { bail!("timeout must be positive"); }
        if self.user_agent.trim().is_empty() { bail!("user agent must not be empty"); }
        Ok(())
    }

    pub fn window_days(&self) -> Option<u32> {
        self.recency.enabled.then_some(self.recency.window_days)
    }

    pub fn url_count(&self) -> usize { self.targets.iter().map(|t| t.urls.len()).sum() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_and_cover_every_source() {
        let cfg = ScanConfig::default();
        cfg.validate().unwrap();
        let sources: Vec<Source> = cfg.targets.iter().map(|t| t.source).collect();
        assert_eq!(sources, vec![Source::Naukri, Source::LinkedIn, Source::Indeed, Source::Monster, Source::Shine]);
        assert_eq!(cfg.url_count(), 8);
        assert_eq!(cfg.output_path, PathBuf::from("weekly_jobs.xlsx"));
        assert_eq!(cfg.timeout, Duration::from_secs(20));
        assert_eq!(cfg.window_days(), Some(7));
        assert!(!cfg.dedup);
    }

    #[test]
    fn file_overlay_replaces_only_given_fields() {
        let raw = r#"{
            "keywords": ["teams"],
            "targets": [{ "source": "naukri", "urls": ["https://www.naukri.com/teams-jobs"] }],
            "window_days": 3
        }"#;
        let mut cfg = ScanConfig::default();
        cfg.apply_file(serde_json::from_str(raw).unwrap()).unwrap();
        assert_eq!(cfg.keywords, vec!["teams".to_string()]);
        assert_eq!(cfg.targets.len(), 1);
        assert_eq!(cfg.targets[0].source, Source::Naukri);
        assert_eq!(cfg.recency, RecencyConfig { enabled: true, window_days: 3 });
        assert_eq!(cfg.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn unknown_source_or_field_is_rejected() {
        let mut cfg = ScanConfig::default();
        let bad_source: ConfigFile = serde_json::from_str(r#"{"targets":[{"source":"dice","urls":[]}]}"#).unwrap();
        assert!(cfg.apply_file(bad_source).is_err());
        assert!(serde_json::from_str::<ConfigFile>(r#"{"keyword": ["x"]}"#).is_err());
    }

    #[test]
    fn overrides_restrict_sources_and_disable_recency() {
        let mut cfg = ScanConfig::default();
        cfg.apply_overrides(&ScanOverrides {
            sources: vec![Source::Shine, Source::LinkedIn],
            no_recency: true,
            dedup: true,
            concurrency: Some(4),
            ..Default::default()
        });
        let sources: Vec<Source> = cfg.targets.iter().map(|t| t.source).collect();
        assert_eq!(sources, vec![Source::LinkedIn, Source::Shine]);
        assert_eq!(cfg.window_days(), None);
        assert!(cfg.dedup);
        assert_eq!(cfg.concurrency, 4);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut cfg = ScanConfig::default();
        cfg.targets[0].urls.push("not a url".into());
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::default();
        cfg.recency.window_days = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScanConfig::default();
        cfg.concurrency = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let mut cfg = ScanConfig::default();
        cfg.recency.window_days = 100_000_000;
        assert!(cfg.validate().is_err());
        cfg.recency.window_days = MAX_WINDOW_DAYS;
        cfg.validate().unwrap();
    }

    #[test]
    fn blank_keyword_sets_are_rejected() {
        let mut cfg = ScanConfig::default();
        cfg.keywords.clear();
        assert!(cfg.validate().is_err());
        cfg.keywords = vec!["".into(), "   ".into()];
        assert!(cfg.validate().is_err());
        cfg.keywords = vec!["  ".into(), "teams".into()];
        cfg.validate().unwrap();
    }
}
