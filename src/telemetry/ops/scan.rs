use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Scan;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Source, Fetch, Parse, Dedup, Recency, Export }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Source => "source",
        Phase::Fetch => "fetch",
        Phase::Parse => "parse",
        Phase::Dedup => "dedup",
        Phase::Recency => "recency",
        Phase::Export => "export",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Source => info_span!("source"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Parse => info_span!("parse"),
        Phase::Dedup => info_span!("dedup"),
        Phase::Recency => info_span!("recency"),
        Phase::Export => info_span!("export"),
    }}
}

impl OpMarker for Scan {
    const NAME: &'static str = "scan";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("scan") }
}
