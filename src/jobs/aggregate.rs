use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::Instrument;

use crate::config::{ScanConfig, SourceTarget};
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::scan::{Phase as ScanPhase, Scan};
use crate::util::time::{window_cutoff, within_window};

use super::adapters::adapter_for;
use super::dedup::dedup_postings;
use super::fetch::{Fetched, Fetcher};
use super::recency;
use super::relevance::RelevanceFilter;
use super::types::{JobPosting, SourceSummary};

pub struct ScanOutcome {
    pub postings: Vec<JobPosting>,
    pub per_source: Vec<SourceSummary>,
    pub collected: usize,
    pub dropped_by_dedup: usize,
    pub dropped_by_recency: usize,
}

/// Drives every configured source through fetch → adapter, then the optional
/// dedup and recency stages. Output order is config order, then URL order,
/// then document order, regardless of `concurrency`.
pub struct Aggregator<'a, F: Fetcher + ?Sized> {
    cfg: &'a ScanConfig,
    fetcher: &'a F,
    filter: RelevanceFilter,
}

impl<'a, F: Fetcher + ?Sized> Aggregator<'a, F> {
    pub fn new(cfg: &'a ScanConfig, fetcher: &'a F) -> Self {
        Aggregator { cfg, fetcher, filter: RelevanceFilter::new(&cfg.keywords) }
    }

    pub async fn run(&self, now: DateTime<Utc>, log: Option<&LogCtx<Scan>>) -> ScanOutcome {
        let mut postings: Vec<JobPosting> = Vec::new();
        let mut per_source: Vec<SourceSummary> = Vec::new();

        for target in &self.cfg.targets {
            let (found, summary) = self.collect_target(target, log).await;
            if let Some(ctx) = log { ctx.source_summary(&summary); }
            postings.extend(found);
            per_source.push(summary);
        }
        let collected = postings.len();

        let mut dropped_by_dedup = 0;
        if self.cfg.dedup {
            let _s = log.map(|ctx| ctx.span(&ScanPhase::Dedup).entered());
            let (kept, dropped) = dedup_postings(postings);
            postings = kept;
            dropped_by_dedup = dropped;
        }

        let mut dropped_by_recency = 0;
        if let Some(days) = self.cfg.window_days() {
            let before = postings.len();
            postings = self.apply_recency(postings, now, days, log).await;
            dropped_by_recency = before - postings.len();
        }

        ScanOutcome { postings, per_source, collected, dropped_by_dedup, dropped_by_recency }
    }

    async fn collect_target(&self, target: &SourceTarget, log: Option<&LogCtx<Scan>>) -> (Vec<JobPosting>, SourceSummary) {
        let adapter = adapter_for(target.source);
        let source_span = log
            .map(|ctx| ctx.span_kv(&ScanPhase::Source, [("source", target.source.to_string()), ("urls", target.urls.len().to_string())]))
            .unwrap_or_else(tracing::Span::none);
        let fetch_span = match log {
            Some(ctx) => source_span.in_scope(|| ctx.span(&ScanPhase::Fetch)),
            None => tracing::Span::none(),
        };

        let docs: Vec<Fetched> = stream::iter(target.urls.iter())
            .map(|url| self.fetcher.fetch(url))
            .buffered(self.cfg.concurrency.max(1))
            .collect()
            .instrument(fetch_span)
            .await;

        let _src = source_span.enter();

        let mut summary = SourceSummary { source: target.source, urls: target.urls.len(), fetched: 0, missed: 0, kept: 0 };
        let mut found: Vec<JobPosting> = Vec::new();
        for (url, doc) in target.urls.iter().zip(docs) {
            if doc.is_body() { summary.fetched += 1; } else { summary.missed += 1; }
            let _p = log.map(|ctx| ctx.span(&ScanPhase::Parse).entered());
            let body = doc.into_body();
            let parsed = adapter.parse(body.as_deref(), &self.filter);
            if let Some(ctx) = log {
                ctx.info_kv(&format!("  {} → {} posting(s)", url, parsed.len()), [("url", url.clone()), ("kept", parsed.len().to_string())]);
            }
            found.extend(parsed);
        }
        summary.kept = found.len();
        (found, summary)
    }

    async fn apply_recency(&self, postings: Vec<JobPosting>, now: DateTime<Utc>, days: u32, log: Option<&LogCtx<Scan>>) -> Vec<JobPosting> {
        let cutoff = window_cutoff(now, days);
        let span = log.map(|ctx| ctx.span_kv(&ScanPhase::Recency, [("candidates", postings.len().to_string()), ("window_days", days.to_string())]));

        let dates: Vec<Option<DateTime<Utc>>> = stream::iter(postings.iter())
            .map(|p| recency::posted_at(self.fetcher, &p.url, now))
            .buffered(self.cfg.concurrency.max(1))
            .collect()
            .instrument(span.unwrap_or_else(tracing::Span::none))
            .await;

        postings
            .into_iter()
            .zip(dates)
            .filter_map(|(mut p, date)| match date {
                Some(ts) if within_window(ts, cutoff, now) => {
                    p.posted_date = Some(ts.date_naive());
                    Some(p)
                }
                Some(_) => {
                    if let Some(ctx) = log { ctx.info_kv("↩️ too old", [("url", p.url.clone())]); }
                    None
                }
                None => {
                    if let Some(ctx) = log { ctx.warn_kv("↩️ no posted date", [("url", p.url.clone())]); }
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecencyConfig;
    use crate::jobs::export::table_rows;
    use crate::jobs::fetch::mock::MockFetcher;
    use crate::jobs::types::Source;
    use chrono::{NaiveDate, TimeZone};

    const NAUKRI_PAGE: &str = r#"
    <html><body>
      <div class="row"><a class="title fw500" href="https://www.naukri.com/job-1">SharePoint Developer</a><li class="company">Acme</li></div>
      <div class="row"><a class="title fw500">Office 365 Admin</a><li class="company">Globex</li></div>
      <div class="row"><a class="title fw500" href="https://www.naukri.com/job-3">Exchange Engineer</a><li class="loc">Pune</li></div>
    </body></html>
    "#;

    const SHINE_PAGE: &str = r#"
    <div class="jobCard"><h2><a href="/jobs/sharepoint-developer/acme/77">SharePoint Developer</a></h2><div class="jobCard_cName">ACME</div></div>
    "#;

    fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap() }

    fn scan_cfg(targets: Vec<SourceTarget>, recency: bool) -> ScanConfig {
        ScanConfig {
            targets,
            recency: RecencyConfig { enabled: recency, window_days: 7 },
            ..ScanConfig::default()
        }
    }

    fn target(source: Source, urls: &[&str]) -> SourceTarget {
        SourceTarget { source, urls: urls.iter().map(|u| u.to_string()).collect() }
    }

    #[tokio::test]
    async fn single_source_three_containers_yields_two_rows_in_order() {
        let fetcher = MockFetcher::new().with_page("https://www.naukri.com/sharepoint-jobs", NAUKRI_PAGE);
        let cfg = scan_cfg(vec![target(Source::Naukri, &["https://www.naukri.com/sharepoint-jobs"])], false);
        let out = Aggregator::new(&cfg, &fetcher).run(now(), None).await;

        assert_eq!(out.postings.len(), 2);
        assert_eq!(out.postings[0].title, "SharePoint Developer");
        assert_eq!(out.postings[1].title, "Exchange Engineer");

        assert_eq!(table_rows(&out.postings, false).len(), 3);
    }

    #[tokio::test]
    async fn merges_sources_and_urls_in_config_order_and_tolerates_misses() {
        let fetcher = MockFetcher::new()
            .with_page("https://www.naukri.com/a", NAUKRI_PAGE)
            .with_page("https://www.shine.com/s", SHINE_PAGE);
        let cfg = scan_cfg(vec![
            target(Source::Shine, &["https://www.shine.com/s"]),
            target(Source::Naukri, &["https://www.naukri.com/down", "https://www.naukri.com/a"]),
        ], false);
        let out = Aggregator::new(&cfg, &fetcher).run(now(), None).await;

        let titles: Vec<(&str, Source)> = out.postings.iter().map(|p| (p.title.as_str(), p.source())).collect();
        assert_eq!(titles, vec![
            ("SharePoint Developer", Source::Shine),
            ("SharePoint Developer", Source::Naukri),
            ("Exchange Engineer", Source::Naukri),
        ]);
        assert_eq!(out.per_source[1], SourceSummary { source: Source::Naukri, urls: 2, fetched: 1, missed: 1, kept: 2 });
        assert_eq!(out.collected, 3);
    }

    #[tokio::test]
    async fn every_fetch_failing_is_an_empty_result_not_an_error() {
        let fetcher = MockFetcher::new();
        let cfg = ScanConfig::default();
        let out = Aggregator::new(&cfg, &fetcher).run(now(), None).await;
        assert!(out.postings.is_empty());
        assert_eq!(fetcher.calls().len(), cfg.url_count());
    }

    #[tokio::test]
    async fn recency_keeps_only_recent_dated_postings() {
        let fetcher = MockFetcher::new()
            .with_page("https://www.naukri.com/a", NAUKRI_PAGE)
            .with_page("https://www.naukri.com/job-1", "<p>Posted 2 days ago</p>")
            .with_page("https://www.naukri.com/job-3", "<p>Posted 30 days ago</p>");
        let cfg = scan_cfg(vec![target(Source::Naukri, &["https://www.naukri.com/a"])], true);
        let out = Aggregator::new(&cfg, &fetcher).run(now(), None).await;

        assert_eq!(out.postings.len(), 1);
        assert_eq!(out.postings[0].url, "https://www.naukri.com/job-1");
        assert_eq!(out.postings[0].posted_date, NaiveDate::from_ymd_opt(2026, 10, 17));
        assert_eq!(out.dropped_by_recency, 1);
    }

    #[tokio::test]
    async fn recency_window_ends_at_run_time() {
        let fetcher = MockFetcher::new()
            .with_page("https://www.naukri.com/a", NAUKRI_PAGE)
            .with_page("https://www.naukri.com/job-1", "<p>Posted on 28 Dec</p>")
            .with_page("https://www.naukri.com/job-3", "<p>Posted on 2 Jan 2028</p>");
        let cfg = scan_cfg(vec![target(Source::Naukri, &["https://www.naukri.com/a"])], true);
        let new_year = Utc.with_ymd_and_hms(2027, 1, 5, 8, 0, 0).unwrap();
        let out = Aggregator::new(&cfg, &fetcher).run(new_year, None).await;

        let dates: Vec<Option<NaiveDate>> = out.postings.iter().map(|p| p.posted_date).collect();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2026, 12, 28)]);
        assert_eq!(out.dropped_by_recency, 1);
    }

    #[tokio::test]
    async fn recency_drops_unknown_dates() {
        let fetcher = MockFetcher::new()
            .with_page("https://www.naukri.com/a", NAUKRI_PAGE)
            .with_page("https://www.naukri.com/job-1", "<p>Apply today</p>");
        let cfg = scan_cfg(vec![target(Source::Naukri, &["https://www.naukri.com/a"])], true);
        let out = Aggregator::new(&cfg, &fetcher).run(now(), None).await;
        assert!(out.postings.is_empty());
        assert_eq!(out.dropped_by_recency, 2);
    }

    #[tokio::test]
    async fn dedup_is_opt_in() {
        let fetcher = MockFetcher::new()
            .with_page("https://www.naukri.com/a", NAUKRI_PAGE)
            .with_page("https://www.shine.com/s", SHINE_PAGE);
        let targets = vec![
            target(Source::Naukri, &["https://www.naukri.com/a"]),
            target(Source::Shine, &["https://www.shine.com/s"]),
        ];

        let plain = scan_cfg(targets.clone(), false);
        assert_eq!(Aggregator::new(&plain, &fetcher).run(now(), None).await.postings.len(), 3);

        let deduped = ScanConfig { dedup: true, ..scan_cfg(targets, false) };
        let out = Aggregator::new(&deduped, &fetcher).run(now(), None).await;
        assert_eq!(out.postings.len(), 2);
        assert_eq!(out.dropped_by_dedup, 1);
        assert_eq!(out.postings[0].source(), Source::Naukri);
    }

    #[tokio::test]
    async fn concurrent_fetches_keep_deterministic_order() {
        let fetcher = MockFetcher::new()
            .with_page("https://www.naukri.com/a", NAUKRI_PAGE)
            .with_page("https://www.naukri.com/b", NAUKRI_PAGE.replace("job-1", "job-9"));
        let urls = ["https://www.naukri.com/a", "https://www.naukri.com/b"];
        let sequential = scan_cfg(vec![target(Source::Naukri, &urls)], false);
        let concurrent = ScanConfig { concurrency: 4, ..sequential.clone() };

        let a = Aggregator::new(&sequential, &fetcher).run(now(), None).await.postings;
        let b = Aggregator::new(&concurrent, &fetcher).run(now(), None).await.postings;
        assert_eq!(a, b);
        assert_eq!(a[2].url, "https://www.naukri.com/job-9");
    }

    #[tokio::test]
    async fn identical_documents_export_identical_rows() {
        let fetcher = MockFetcher::new()
            .with_page("https://www.naukri.com/a", NAUKRI_PAGE)
            .with_page("https://www.shine.com/s", SHINE_PAGE);
        let cfg = scan_cfg(vec![
            target(Source::Naukri, &["https://www.naukri.com/a"]),
            target(Source::Shine, &["https://www.shine.com/s"]),
        ], false);

        let first = table_rows(&Aggregator::new(&cfg, &fetcher).run(now(), None).await.postings, false);
        let second = table_rows(&Aggregator::new(&cfg, &fetcher).run(now(), None).await.postings, false);
        assert_eq!(first, second);
    }
}
