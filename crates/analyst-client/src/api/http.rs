//! HTTP implementation of the analysis server API

use super::{Answer, QuestionRequest, QuestionSource, StatusSource, SubmitRequest, SubmitResponse};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::model::{JobId, JobStatus};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Client for the analysis server's JSON API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base: Url,
}

impl HttpClient {
    /// Create a client from a validated configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base: config.base_url()?,
        })
    }

    /// Server base URL
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build `{base}/seg/seg/...`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Config(format!("cannot use '{}' as a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Upload a report and start a new analysis job
    #[instrument(skip_all, fields(company = %request.company_name))]
    pub async fn submit(&self, request: &SubmitRequest) -> Result<JobId> {
        request.validate()?;

        let form = build_form(request).await?;
        let url = self.endpoint(&["api", "analyze"])?;
        debug!("Submitting analysis to {url}");

        let response = self.client.post(url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: SubmitResponse = decode_json(response).await?;
        JobId::parse(&body.job_id)
    }
}

#[async_trait]
impl StatusSource for HttpClient {
    #[instrument(skip_all, fields(job_id = %job_id))]
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus> {
        let url = self.endpoint(&["api", "status", job_id.as_str()])?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let status: JobStatus = decode_json(response).await?;
        debug!(
            "Status: {:?}, progress: {}%, step: {:?}",
            status.status, status.progress, status.current_step
        );
        Ok(status)
    }
}

#[async_trait]
impl QuestionSource for HttpClient {
    #[instrument(skip_all, fields(job_id = %job_id))]
    async fn ask(&self, job_id: &JobId, question: &str) -> Result<Answer> {
        let url = self.endpoint(&["api", "ask", job_id.as_str()])?;
        let body = QuestionRequest {
            question: question.to_string(),
        };

        let response = self.client.post(url).json(&body).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        decode_json(response).await
    }
}

async fn build_form(request: &SubmitRequest) -> Result<Form> {
    let bytes = tokio::fs::read(&request.report_path).await?;
    let file_name = request
        .report_path
        .file_name()
        .map_or_else(|| "report".to_string(), |name| name.to_string_lossy().into_owned());
    let mime = mime_for(&file_name);

    let report = Part::bytes(bytes).file_name(file_name).mime_str(mime)?;

    let mut form = Form::new()
        .text("company_name", request.company_name.trim().to_string())
        .text("report_type", request.report_type.as_str())
        .part("main_report", report);

    for peer in request.peer_names() {
        form = form.text("peers", peer.to_string());
    }

    Ok(form)
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".txt") {
        "text/plain"
    } else if lower.ends_with(".html") || lower.ends_with(".htm") {
        "text/html"
    } else {
        "application/octet-stream"
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| ClientError::UnexpectedResponse(format!("Failed to parse response: {e}")))
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ClientError::Api {
        status,
        detail: extract_detail(&body),
    }
}

/// Server error bodies look like `{"detail": ...}`; surface it verbatim
fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => detail.clone(),
            Some(Value::String(_) | Value::Null) | None => UNKNOWN_ERROR.to_string(),
            Some(other) => other.to_string(),
        },
        _ => UNKNOWN_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> HttpClient {
        let config = ClientConfig::builder().api_base(api_base).build().unwrap();
        HttpClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_building() {
        let client = client("http://localhost:8000");
        let job = JobId::parse("abc-123").unwrap();

        let url = client.endpoint(&["api", "status", job.as_str()]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/status/abc-123");
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes() {
        let client = client("https://example.com/analysis");

        let url = client.endpoint(&["api", "ask", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/analysis/api/ask/a%20b%2Fc");
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(extract_detail(r#"{"detail": "Job not found"}"#), "Job not found");
        assert_eq!(extract_detail(r#"{"detail": null}"#), "Unknown error");
        assert_eq!(extract_detail("<html>502</html>"), "Unknown error");
        assert_eq!(
            extract_detail(r#"{"detail": [{"msg": "field required"}]}"#),
            r#"[{"msg":"field required"}]"#
        );
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("Q3-Report.PDF"), "application/pdf");
        assert_eq!(mime_for("notes.txt"), "text/plain");
        assert_eq!(mime_for("blob"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_build_form_reads_report() {
        let report = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(report.path(), b"%PDF-1.4").unwrap();

        let request = SubmitRequest::new("Initech", report.path()).add_peer("Acme");
        tokio_test::assert_ok!(build_form(&request).await);

        let missing = SubmitRequest::new("Initech", "/definitely/not/here.pdf");
        assert!(matches!(build_form(&missing).await, Err(ClientError::Io(_))));
    }
}
