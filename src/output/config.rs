use std::env;

use crate::telemetry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    /// `--json` wins; otherwise JOBFEED_OUTPUT_FORMAT decides.
    pub fn from_env() -> Self {
        let env_format = env::var("JOBFEED_OUTPUT_FORMAT").ok();
        let pretty_env = env::var("JOBFEED_OUTPUT_PRETTY").ok();
        Self::resolve(telemetry::config::json_mode(), env_format.as_deref(), pretty_env.as_deref())
    }

    fn resolve(json_flag: bool, format: Option<&str>, pretty: Option<&str>) -> Self {
        let format = match format {
            _ if json_flag => OutputFormat::Json,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = match pretty {
            Some(v) if v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") => true,
            _ => false,
        };
        OutputConfig { format, pretty }
    }
}
