//! Job status polling
//!
//! [`JobPoller`] drives repeated status checks for one job until the server
//! reports a terminal state, then tells the caller where to go next.

pub mod policy;

use crate::api::StatusSource;
use crate::model::{JobId, JobState};
use crate::navigation::Navigation;
use crate::progress::{ProgressView, StepProgressTracker, random_tip};
use std::sync::Arc;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

pub use policy::PollPolicy;

const GENERIC_FAILURE: &str = "Unknown error";
const LOST_CONTACT: &str = "Lost contact with the analysis server. Please try again.";
const TIMED_OUT: &str = "The analysis is taking longer than expected. Please try again.";

/// Receives the visible effects of polling
pub trait ProgressSink: Send {
    /// A fresh progress view is available
    fn show_progress(&mut self, view: &ProgressView);

    /// A blocking notice the user must see before navigation
    fn alert(&mut self, message: &str);
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Job still running; a new view was shown
    Progress,
    /// Status request failed; nothing was changed
    Retry { consecutive_failures: u32 },
    /// Job completed; polling has stopped
    Completed,
    /// Job failed on the server; polling has stopped
    Failed { message: String },
    /// Poller already reached a terminal state; no request was made
    Stopped,
}

/// Polls one job until it completes or fails
pub struct JobPoller {
    source: Arc<dyn StatusSource>,
    job_id: JobId,
    company_hint: Option<String>,
    policy: PollPolicy,
    tracker: StepProgressTracker,
    tip: &'static str,
    consecutive_failures: u32,
    ticks: u32,
    last_view: Option<ProgressView>,
    stopped: bool,
}

impl JobPoller {
    /// Create a poller for a job
    ///
    /// A valid [`JobId`] is the precondition; callers without one redirect to
    /// the submission view instead of constructing a poller.
    pub fn new(source: Arc<dyn StatusSource>, job_id: JobId, policy: PollPolicy) -> Self {
        Self {
            source,
            job_id,
            company_hint: None,
            policy,
            tracker: StepProgressTracker::new(),
            tip: random_tip(),
            consecutive_failures: 0,
            ticks: 0,
            last_view: None,
            stopped: false,
        }
    }

    /// Company name entered at submission, used for the greeting
    pub fn with_company_hint(mut self, company: impl Into<String>) -> Self {
        self.company_hint = Some(company.into());
        self
    }

    /// Replace the step tracker
    pub fn with_tracker(mut self, tracker: StepProgressTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Most recent successfully derived view
    pub fn last_view(&self) -> Option<&ProgressView> {
        self.last_view.as_ref()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Number of status requests issued so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Perform one status check
    ///
    /// Takes `&mut self`, so a tick can never start while another is still
    /// awaiting its response.
    pub async fn tick(&mut self, sink: &mut dyn ProgressSink) -> TickOutcome {
        if self.stopped {
            return TickOutcome::Stopped;
        }

        self.ticks += 1;
        let status = match self.source.fetch_status(&self.job_id).await {
            Ok(status) => status,
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    job_id = %self.job_id,
                    failures = self.consecutive_failures,
                    "Polling error: {e}"
                );
                return TickOutcome::Retry {
                    consecutive_failures: self.consecutive_failures,
                };
            }
        };

        self.consecutive_failures = 0;
        debug!(
            job_id = %self.job_id,
            "Status: {:?}, progress: {}%",
            status.status, status.progress
        );

        let view = ProgressView::from_status(
            &status,
            &self.tracker,
            self.company_hint.as_deref(),
            self.tip,
        );
        sink.show_progress(&view);
        self.last_view = Some(view);

        match status.status {
            JobState::Completed => {
                self.stopped = true;
                info!(job_id = %self.job_id, "Analysis completed");
                TickOutcome::Completed
            }
            JobState::Failed => {
                self.stopped = true;
                let message = status
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                warn!(job_id = %self.job_id, "Analysis failed: {message}");
                TickOutcome::Failed { message }
            }
            JobState::Queued | JobState::Running | JobState::Unknown => TickOutcome::Progress,
        }
    }

    /// Poll until a terminal state and return the next view
    ///
    /// Consumes the poller, so the terminal transition fires exactly once.
    pub async fn run(mut self, sink: &mut dyn ProgressSink) -> Navigation {
        let started = Instant::now();
        debug!(
            job_id = %self.job_id,
            bounded = self.policy.is_bounded(),
            "Polling every {:?}",
            self.policy.interval
        );

        if !self.policy.fire_immediately {
            sleep(self.policy.interval).await;
        }

        loop {
            match self.tick(sink).await {
                TickOutcome::Progress => {
                    if self.policy.is_expired(started.elapsed()) {
                        self.stopped = true;
                        warn!(
                            job_id = %self.job_id,
                            "Giving up after {:?} without a terminal status",
                            started.elapsed()
                        );
                        sink.alert(TIMED_OUT);
                        return Navigation::Submission;
                    }
                    sleep(self.policy.interval).await;
                }
                TickOutcome::Retry {
                    consecutive_failures,
                } => {
                    if self.policy.is_exhausted(consecutive_failures, started.elapsed()) {
                        self.stopped = true;
                        warn!(
                            job_id = %self.job_id,
                            "Giving up after {consecutive_failures} failed status checks"
                        );
                        sink.alert(LOST_CONTACT);
                        return Navigation::Submission;
                    }
                    sleep(self.policy.next_delay(consecutive_failures)).await;
                }
                TickOutcome::Completed => {
                    sleep(self.policy.completion_grace).await;
                    return Navigation::Results(self.job_id);
                }
                TickOutcome::Failed { message } => {
                    sink.alert(&format!("Analysis failed: {message}"));
                    return Navigation::Submission;
                }
                TickOutcome::Stopped => return Navigation::Submission,
            }
        }
    }
}
