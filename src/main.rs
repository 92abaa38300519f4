use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod config;
mod jobs;
mod output;
mod telemetry;
mod util;

#[derive(Parser)]
#[command(name = "jobfeed", about = "Job posting aggregation CLI")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Scan(jobs::ScanCmd),
    Sources(jobs::SourcesCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and JOBFEED_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Scan(args) => jobs::run(args).await?,
        Commands::Sources(args) => jobs::sources(args).await?,
    }

    Ok(())
}
