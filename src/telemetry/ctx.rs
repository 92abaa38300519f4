use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{info, warn, Span};

use crate::jobs::types::SourceSummary;
use crate::output::config::OutputConfig;
use crate::output::types::{Envelope, Meta};
use crate::output::Emitter;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            info!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn warn(&self, msg: impl AsRef<str>) { if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); } }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); info!(op = %self.op_name(), details = %details, "{}", msg); }
        else { info!("{}", msg); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{}", msg); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T, summary: Option<String>) -> Result<()> {
        let env = Envelope::plan(self.op_name(), plan, None)?.with_summary(summary);
        Emitter::from_env(OutputConfig::from_env()).emit(&env)?;
        Ok(())
    }

    pub fn result<T: Serialize>(&self, result: &T, summary: Option<String>, meta: Option<Meta>) -> Result<()> {
        let env = Envelope::result(self.op_name(), result, meta)?.with_summary(summary);
        Emitter::from_env(OutputConfig::from_env()).emit(&env)?;
        Ok(())
    }
}

// Scan-specific helpers remain available on the typed context
impl LogCtx<crate::telemetry::ops::scan::Scan> {
    pub fn source_summary(&self, s: &SourceSummary) {
        let source = s.source.name();
        if self.json { info!(op = %self.op_name(), source, urls = s.urls, fetched = s.fetched, missed = s.missed, kept = s.kept, "source_summary"); }
        else { info!("✅ {} — urls={} fetched={} missed={} kept={}", source, s.urls, s.fetched, s.missed, s.kept); }
    }

    pub fn totals(&self, collected: usize, dropped_by_dedup: usize, dropped_by_recency: usize, exported: usize) {
        if self.json { info!(op = %self.op_name(), collected, dropped_by_dedup, dropped_by_recency, exported, "scan_totals"); }
        else { info!("📊 Scan totals — collected={} dedup_dropped={} recency_dropped={} exported={}", collected, dropped_by_dedup, dropped_by_recency, exported); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
