//! Client for long-running company analysis jobs
//!
//! A company report is submitted to the analysis server, which works
//! through its steps in the background. This crate covers the client side
//! of that lifecycle:
//!
//! - Submitting a report together with up to three peer companies
//! - Polling job status and deriving per-step progress from each snapshot
//! - Rendering a completed result section by section, where one broken
//!   section never takes down the others
//! - Asking follow-up questions about a completed job, kept in a transcript
//!
//! # Architecture
//!
//! Server access sits behind two small traits, [`StatusSource`] and
//! [`QuestionSource`], implemented by [`HttpClient`]. Everything above them
//! works on plain values:
//! - `JobPoller`: timer-driven status checks ending in a [`Navigation`]
//! - `StepProgressTracker`: step states derived from one snapshot
//! - `ResultRenderer`: [`AnalysisResult`] to render instructions
//! - `QueryChannel`: question/answer transcript
//! - `Formatter`: render instructions to terminal text or markdown
//!
//! # Example
//!
//! ```rust,ignore
//! use analyst_client::{ClientConfig, HttpClient, JobPoller, Navigation, SubmitRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::builder().with_env_api_base().build()?;
//!     let client = Arc::new(HttpClient::new(&config)?);
//!
//!     let job_id = client
//!         .submit(&SubmitRequest::new("Initech", "initech-10k.pdf").add_peer("Acme"))
//!         .await?;
//!
//!     let poller = JobPoller::new(client.clone(), job_id, config.poll_policy.clone());
//!     if let Navigation::Results(job_id) = poller.run(&mut my_sink).await {
//!         // load, render and ask questions
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod navigation;
pub mod poller;
pub mod progress;
pub mod query;
pub mod render;

// Re-export main types for convenience
pub use api::{
    Answer, HttpClient, MAX_PEERS, QuestionSource, ReportType, StatusSource, SubmitRequest,
};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use format::{Formatter, FormatterFactory, OutputFormat};
pub use model::{AnalysisResult, JobId, JobState, JobStatus};
pub use navigation::Navigation;
pub use poller::{JobPoller, PollPolicy, ProgressSink, TickOutcome};
pub use progress::{ProgressView, Step, StepProgressTracker, StepState};
pub use query::{AskOutcome, QueryChannel, Role, Transcript, TranscriptEntry};
pub use render::{ResultRenderer, ResultsView, SectionKind, load_results};
