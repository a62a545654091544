//! Wire types for job status snapshots and analysis results
//!
//! The server owns these shapes. Decoding is deliberately forgiving: scalars
//! are optional, string lists accept anything, and each result section stays
//! raw JSON until a renderer asks for it, so one malformed section cannot
//! poison the whole snapshot.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Identifier of one server-side analysis run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Validate and wrap a raw job id
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientError::InvalidJobId(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Overall state of a job as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
    /// Anything the client does not recognise; treated as still running
    #[serde(other)]
    Unknown,
}

impl JobState {
    /// `completed` and `failed` end polling
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One status snapshot from `GET /api/status/{job_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub job_id: String,
    pub status: JobState,
    #[serde(default, deserialize_with = "lenient_number")]
    pub progress: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_step: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_result")]
    pub result: Option<AnalysisResult>,
}

impl JobStatus {
    /// Snapshot of a job that is still working on `step`
    pub fn running(progress: f64, step: impl Into<String>) -> Self {
        Self {
            job_id: String::new(),
            status: JobState::Running,
            progress,
            current_step: Some(step.into()),
            error: None,
            result: None,
        }
    }

    /// Snapshot of a finished job carrying its result
    pub fn completed(result: AnalysisResult) -> Self {
        Self {
            job_id: String::new(),
            status: JobState::Completed,
            progress: 100.0,
            current_step: Some("done".to_string()),
            error: None,
            result: Some(result),
        }
    }

    /// Snapshot of a job the server gave up on
    pub fn failed(error: Option<String>) -> Self {
        Self {
            job_id: String::new(),
            status: JobState::Failed,
            progress: 0.0,
            current_step: None,
            error,
            result: None,
        }
    }
}

/// Completed analysis payload
///
/// Sections are kept as raw JSON; use the typed accessors to decode them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub analysis_date: Option<String>,
    #[serde(default)]
    pub news: Option<Value>,
    #[serde(default)]
    pub fundamentals: Option<Value>,
    #[serde(default)]
    pub peers: Option<Value>,
    #[serde(default)]
    pub signal: Option<Value>,
}

impl AnalysisResult {
    pub fn news(&self) -> Result<NewsMetrics> {
        decode_section("news", self.news.as_ref())
    }

    pub fn fundamentals(&self) -> Result<FundamentalsMetrics> {
        decode_section("fundamentals", self.fundamentals.as_ref())
    }

    pub fn peers(&self) -> Result<PeerMetrics> {
        decode_section("peers", self.peers.as_ref())
    }

    pub fn signal(&self) -> Result<SignalAssessment> {
        decode_section("signal", self.signal.as_ref())
    }
}

fn decode_section<T>(section: &'static str, raw: Option<&Value>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    match raw {
        None | Some(Value::Null) => Err(ClientError::MissingSection(section)),
        Some(value) => T::deserialize(value)
            .map_err(|source| ClientError::MalformedSection { section, source }),
    }
}

/// News sentiment section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsMetrics {
    /// Sentiment score, nominally -10..=10
    pub score: Option<f64>,
    pub positive_count: Option<u64>,
    pub negative_count: Option<u64>,
    pub neutral_count: Option<u64>,
    #[serde(deserialize_with = "lenient_strings")]
    pub headlines: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub key_themes: Vec<String>,
    pub panic_level: Option<String>,
}

/// Growth, margin and return triple shared by fundamentals and peer rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthMetrics {
    pub revenue_growth: Option<f64>,
    pub profit_margin: Option<f64>,
    pub roe: Option<f64>,
}

/// Fundamentals section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalsMetrics {
    /// Health score, nominally 0..=10
    pub health_score: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub profit_margin: Option<f64>,
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    #[serde(deserialize_with = "lenient_strings")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub concerns: Vec<String>,
}

impl FundamentalsMetrics {
    pub fn growth(&self) -> GrowthMetrics {
        GrowthMetrics {
            revenue_growth: self.revenue_growth,
            profit_margin: self.profit_margin,
            roe: self.roe,
        }
    }
}

/// Peer comparison section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerMetrics {
    pub competitive_position: Option<String>,
    pub relative_strength: Option<f64>,
    #[serde(deserialize_with = "lenient_object")]
    pub peer_metrics: Map<String, Value>,
}

impl PeerMetrics {
    /// Peer rows in the order the payload listed them
    ///
    /// A row that is not an object, or whose fields have the wrong type,
    /// degrades to empty metrics rather than failing the table.
    pub fn rows(&self) -> Vec<(String, GrowthMetrics)> {
        self.peer_metrics
            .iter()
            .map(|(name, raw)| {
                let metrics = GrowthMetrics::deserialize(raw).unwrap_or_default();
                (name.clone(), metrics)
            })
            .collect()
    }
}

/// Trading signal and thesis section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalAssessment {
    pub signal_type: Option<String>,
    pub summary: Option<String>,
    /// Strength, nominally 1..=10
    pub signal_strength: Option<f64>,
    pub confidence: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub opportunity_reasons: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub risk_factors: Vec<String>,
    pub management_outlook: Option<String>,
    pub future_development: Option<String>,
    pub timeframe: Option<String>,
    pub entry_strategy: Option<String>,
}

/// Accept any JSON for a list of strings; non-arrays become empty
fn lenient_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Strings as-is, numbers and booleans as text, anything else missing
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Numbers, or numeric strings; anything else is zero
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64().unwrap_or_default(),
        Value::String(text) => text.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

/// A result that is not an object is dropped instead of failing the snapshot
fn lenient_result<'de, D>(deserializer: D) -> std::result::Result<Option<AnalysisResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match AnalysisResult::deserialize(value) {
        Ok(result) => Ok(Some(result)),
        Err(e) => {
            warn!("Discarding undecodable analysis result: {e}");
            Ok(None)
        }
    }
}

/// Accept any JSON for a mapping; non-objects become empty
fn lenient_object<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_id_rejects_blank() {
        assert!(JobId::parse("").is_err());
        assert!(JobId::parse("   ").is_err());
        assert_eq!(JobId::parse(" abc-123 ").unwrap().as_str(), "abc-123");
    }

    #[test]
    fn test_status_decodes_unknown_state() {
        let status: JobStatus =
            serde_json::from_value(json!({"job_id": "j1", "status": "paused", "progress": 5}))
                .unwrap();
        assert_eq!(status.status, JobState::Unknown);
        assert!(!status.status.is_terminal());
        assert!(status.current_step.is_none());
    }

    #[test]
    fn test_status_with_result() {
        let status: JobStatus = serde_json::from_value(json!({
            "job_id": "j1",
            "status": "completed",
            "progress": 100,
            "current_step": "done",
            "result": {"company_name": "Initech", "news": {"score": 3}}
        }))
        .unwrap();

        assert!(status.status.is_terminal());
        let result = status.result.unwrap();
        assert_eq!(result.company_name.as_deref(), Some("Initech"));
        assert_eq!(result.news().unwrap().score, Some(3.0));
    }

    #[test]
    fn test_mistyped_header_scalars_do_not_fail_snapshot() {
        let status: JobStatus = serde_json::from_value(json!({
            "job_id": "j1",
            "status": "completed",
            "progress": "100",
            "current_step": 4,
            "result": {
                "company_name": 42,
                "analysis_date": {"day": 1},
                "signal": {"signal_type": "Buy"}
            }
        }))
        .unwrap();

        assert_eq!(status.progress, 100.0);
        assert_eq!(status.current_step.as_deref(), Some("4"));
        let result = status.result.unwrap();
        assert_eq!(result.company_name.as_deref(), Some("42"));
        assert!(result.analysis_date.is_none());
        assert_eq!(result.signal().unwrap().signal_type.as_deref(), Some("Buy"));
    }

    #[test]
    fn test_non_object_result_is_dropped() {
        let status: JobStatus = serde_json::from_value(json!({
            "status": "completed",
            "result": "see attachment"
        }))
        .unwrap();

        assert_eq!(status.status, JobState::Completed);
        assert!(status.result.is_none());
    }

    #[test]
    fn test_missing_and_malformed_sections() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "news": {"score": "very good"},
            "fundamentals": null
        }))
        .unwrap();

        assert!(matches!(
            result.news(),
            Err(ClientError::MalformedSection { section: "news", .. })
        ));
        assert!(matches!(
            result.fundamentals(),
            Err(ClientError::MissingSection("fundamentals"))
        ));
        assert!(matches!(result.signal(), Err(ClientError::MissingSection("signal"))));
    }

    #[test]
    fn test_lenient_lists() {
        let signal: SignalAssessment = serde_json::from_value(json!({
            "opportunity_reasons": "cheap",
            "risk_factors": ["debt", 42, null]
        }))
        .unwrap();

        assert!(signal.opportunity_reasons.is_empty());
        assert_eq!(signal.risk_factors, vec!["debt", "42", "null"]);
    }

    #[test]
    fn test_peer_rows_keep_payload_order() {
        let peers: PeerMetrics = serde_json::from_str(
            r#"{"peer_metrics": {"Globex": {"roe": 9.5}, "Acme": "n/a", "Hooli": {"revenue_growth": 4}}}"#,
        )
        .unwrap();

        let rows = peers.rows();
        let names: Vec<&str> = rows.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Acme", "Hooli"]);
        assert_eq!(rows[0].1.roe, Some(9.5));
        assert_eq!(rows[1].1, GrowthMetrics::default());
    }
}
