use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use clap::Args;

use crate::config::{ScanConfig, ScanOverrides};
use crate::output::types::Meta;
use crate::telemetry::{self};
use crate::telemetry::ops::scan::Phase as ScanPhase;
use crate::telemetry::ops::sources::Phase as SourcesPhase;

pub mod adapters;
pub mod aggregate;
pub mod dedup;
pub mod export;
pub mod fetch;
pub mod recency;
pub mod relevance;
pub mod types;

use self::aggregate::Aggregator;
use self::fetch::HttpFetcher;
use self::types::{ScanApply, ScanPlan, ScanTotals, Source, TargetSample};

#[derive(Args)]
pub struct ScanCmd {
    /// JSON config file layered over the built-in defaults
    #[arg(long)] pub config: Option<PathBuf>,
    #[arg(long)] pub output: Option<PathBuf>,
    /// Keyword fragment (repeatable); replaces the configured set
    #[arg(long = "keyword")] pub keywords: Vec<String>,
    /// Restrict the run to these sources (repeatable)
    #[arg(long = "source")] pub sources: Vec<Source>,
    /// Skip detail-page date extraction and the trailing-window gate
    #[arg(long, default_value_t = false)] pub no_recency: bool,
    #[arg(long)] pub window_days: Option<u32>,
    #[arg(long)] pub timeout_secs: Option<u64>,
    #[arg(long)] pub user_agent: Option<String>,
    #[arg(long)] pub concurrency: Option<usize>,
    /// Drop repeats keyed by title + company, first occurrence wins
    #[arg(long, default_value_t = false)] pub dedup: bool,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

impl ScanCmd {
    fn overrides(&self) -> ScanOverrides {
        ScanOverrides {
            keywords: self.keywords.clone(),
            sources: self.sources.clone(),
            no_recency: self.no_recency,
            window_days: self.window_days,
            timeout_secs: self.timeout_secs,
            user_agent: self.user_agent.clone(),
            concurrency: self.concurrency,
            dedup: self.dedup,
            output: self.output.clone(),
        }
    }
}

pub async fn run(args: ScanCmd) -> Result<()> {
    let log = telemetry::scan();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("config", format!("{:?}", args.config)),
        ("sources", format!("{:?}", args.sources)),
        ("no_recency", args.no_recency.to_string()),
        ("dedup", args.dedup.to_string()),
        ("plan_limit", args.plan_limit.to_string()),
    ]).entered();

    let cfg = ScanConfig::load(args.config.as_deref(), &args.overrides())?;

    if !args.apply {
        let _s = log.span(&ScanPhase::Plan).entered();
        log.info(format!(
            "📝 Scan plan — sources={} urls={} keywords={} recency={} dedup={} output={}",
            cfg.targets.len(),
            cfg.url_count(),
            cfg.keywords.len(),
            cfg.window_days().map(|d| format!("{}d", d)).unwrap_or_else(|| "off".to_string()),
            cfg.dedup,
            cfg.output_path.display(),
        ));
        let urls = cfg.targets.iter().flat_map(|t| t.urls.iter().map(move |u| (t.source, u)));
        for (source, url) in urls.take(args.plan_limit) { log.info(format!("  {} {}", source, url)); }
        if cfg.url_count() > args.plan_limit { log.info(format!("  ... ({} more)", cfg.url_count() - args.plan_limit)); }
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            let plan = ScanPlan {
                sources: cfg.targets.len(),
                urls: cfg.url_count(),
                keywords: cfg.keywords.clone(),
                recency_window_days: cfg.window_days(),
                dedup: cfg.dedup,
                concurrency: cfg.concurrency,
                output: cfg.output_path.display().to_string(),
                sample_targets: cfg.targets.iter().take(args.plan_limit)
                    .map(|t| TargetSample { source: t.source, urls: t.urls.clone() })
                    .collect(),
            };
            log.plan(&plan, None)?;
        }
        return Ok(());
    }

    let t0 = Instant::now();
    let fetcher = HttpFetcher::new(&cfg.user_agent, cfg.timeout)?;
    let outcome = Aggregator::new(&cfg, &fetcher).run(Utc::now(), Some(&log)).await;

    {
        let _s = log.span_kv(&ScanPhase::Export, [("path", cfg.output_path.display().to_string())]).entered();
        export::export_to_path(&cfg.output_path, &outcome.postings, cfg.window_days().is_some())?;
    }

    let exported = outcome.postings.len();
    log.totals(outcome.collected, outcome.dropped_by_dedup, outcome.dropped_by_recency, exported);
    if exported == 0 { log.warn("⚠️  No postings survived; the export holds only the header row"); }

    let output = cfg.output_path.display().to_string();
    let summary = format!("Exported {} jobs to {}", exported, output);
    let result = ScanApply {
        output,
        totals: ScanTotals { exported, dropped_by_dedup: outcome.dropped_by_dedup, dropped_by_recency: outcome.dropped_by_recency },
        per_source: outcome.per_source,
    };
    log.result(&result, Some(summary), Some(Meta { duration_ms: Some(t0.elapsed().as_millis()) }))?;
    Ok(())
}

/// jobfeed sources: list configured targets without touching the network
#[derive(Args)]
pub struct SourcesCmd {
    #[arg(long)] pub config: Option<PathBuf>,
}

pub async fn sources(args: SourcesCmd) -> Result<()> {
    let log = telemetry::sources();
    let _g = log.root_span().entered();
    let _s = log.span(&SourcesPhase::List).entered();

    let cfg = ScanConfig::load(args.config.as_deref(), &ScanOverrides::default())?;
    log.info("📡 Sources:");
    for t in &cfg.targets {
        log.info(format!("[{}] {} url(s)", t.source, t.urls.len()));
        for u in &t.urls { log.info(format!("  {}", u)); }
    }
    log.result(&cfg.targets, Some(format!("{} source(s), {} url(s)", cfg.targets.len(), cfg.url_count())), None)?;
    Ok(())
}
