//! Server API seams and the HTTP client implementing them

pub mod http;

use crate::error::{ClientError, Result};
use crate::model::{JobId, JobStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use http::HttpClient;

/// Maximum number of peer companies accepted with a submission
pub const MAX_PEERS: usize = 3;

/// Single status lookup, no retained state
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current status snapshot for a job
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus>;
}

/// Follow-up question endpoint scoped to one job
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Ask one free-text question about a completed job
    async fn ask(&self, job_id: &JobId, question: &str) -> Result<Answer>;
}

/// Body of `POST /api/ask/{job_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

/// Reply from `POST /api/ask/{job_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

/// Kind of report uploaded with a submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Annual,
    Quarterly,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }
}

/// A new analysis request for `POST /api/analyze`
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub company_name: String,
    pub report_type: ReportType,
    pub report_path: PathBuf,
    pub peers: Vec<String>,
}

impl SubmitRequest {
    pub fn new(company_name: impl Into<String>, report_path: impl Into<PathBuf>) -> Self {
        Self {
            company_name: company_name.into(),
            report_type: ReportType::default(),
            report_path: report_path.into(),
            peers: Vec::new(),
        }
    }

    pub fn with_report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    pub fn add_peer(mut self, peer: impl Into<String>) -> Self {
        self.peers.push(peer.into());
        self
    }

    /// Peer names with blanks dropped
    pub fn peer_names(&self) -> Vec<&str> {
        self.peers
            .iter()
            .map(|peer| peer.trim())
            .filter(|peer| !peer.is_empty())
            .collect()
    }

    /// Check the request before anything is uploaded
    pub fn validate(&self) -> Result<()> {
        if self.company_name.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "company name is required".to_string(),
            ));
        }

        if self.peer_names().len() > MAX_PEERS {
            return Err(ClientError::InvalidRequest(format!(
                "at most {MAX_PEERS} peers can be compared"
            )));
        }

        if !self.report_path.is_file() {
            return Err(ClientError::InvalidRequest(format!(
                "report file not found: {}",
                self.report_path.display()
            )));
        }

        Ok(())
    }
}

/// Body of a successful `POST /api/analyze`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmitResponse {
    pub job_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_submit_request_validation() {
        let mut report = tempfile::NamedTempFile::new().unwrap();
        writeln!(report, "%PDF-1.4").unwrap();

        let request = SubmitRequest::new("Initech", report.path())
            .add_peer("Acme")
            .add_peer("  ")
            .add_peer("Globex");
        assert!(request.validate().is_ok());
        assert_eq!(request.peer_names(), vec!["Acme", "Globex"]);

        let blank = SubmitRequest::new("  ", report.path());
        assert!(matches!(blank.validate(), Err(ClientError::InvalidRequest(_))));

        let crowded = ["A", "B", "C", "D"]
            .into_iter()
            .fold(SubmitRequest::new("Initech", report.path()), |request, peer| {
                request.add_peer(peer)
            });
        assert!(crowded.validate().is_err());
    }

    #[test]
    fn test_submit_request_missing_file() {
        let request = SubmitRequest::new("Initech", "/definitely/not/here.pdf");
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("report file not found"));
    }

    #[test]
    fn test_answer_decoding() {
        let answer: Answer = serde_json::from_str(r#"{"answer": "Margins are thin."}"#).unwrap();
        assert_eq!(answer.answer, "Margins are thin.");
        assert!(answer.sources.is_none());

        assert!(serde_json::from_str::<Answer>(r#"{"detail": "Job not found"}"#).is_err());
    }
}
