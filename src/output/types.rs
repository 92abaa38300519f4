use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "jobfeed.v1";

#[derive(Debug, Clone, Serialize, Default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Envelope {
    pub fn plan<T: Serialize>(op: &'static str, plan: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        let plan_val = serde_json::to_value(plan)?;
        Ok(Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            apply: false,
            summary: None,
            plan: Some(plan_val),
            result: None,
            meta,
        })
    }

    pub fn result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        let res_val = serde_json::to_value(result)?;
        Ok(Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            apply: true,
            summary: None,
            plan: None,
            result: Some(res_val),
            meta,
        })
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }
}
