//! Error types for analysis client operations

use thiserror::Error;

/// Analysis client specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Job id was empty or missing
    #[error("Invalid job id: {0:?}")]
    InvalidJobId(String),

    /// Server does not know the job
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Server answered with a non-success status
    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Results were requested for a job that has not completed
    #[error("Analysis not ready or failed for job {0}")]
    ResultsNotReady(String),

    /// A result section is absent from the payload
    #[error("Section '{0}' is missing from the result")]
    MissingSection(&'static str),

    /// A result section is present but cannot be decoded
    #[error("Section '{section}' is malformed: {source}")]
    MalformedSection {
        section: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Submission request failed local checks
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Base URL could not be parsed or joined
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Local file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
