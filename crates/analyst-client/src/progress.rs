//! Step progress derived from a single status snapshot
//!
//! The server only reports the step it is currently working on. The tracker
//! rebuilds a left-to-right fill from the step order, which is only correct
//! while the server runs its steps strictly one after another. A reordered
//! pipeline needs a new order passed to [`StepProgressTracker::with_order`];
//! a parallel pipeline cannot be represented by this derivation at all.

use crate::model::{JobState, JobStatus};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// One named phase of the server-side analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    News,
    Fundamentals,
    Peers,
    Signal,
}

impl Step {
    /// Server execution order
    pub const ALL: [Step; 4] = [Step::News, Step::Fundamentals, Step::Peers, Step::Signal];

    /// Identifier the server uses in `current_step`
    pub fn id(self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Fundamentals => "fundamentals",
            Self::Peers => "peers",
            Self::Signal => "signal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::News => "Scanning news sentiment",
            Self::Fundamentals => "Analyzing fundamentals",
            Self::Peers => "Comparing with peers",
            Self::Signal => "Generating signal",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Display state of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Pending,
    Active,
    Completed,
    Error,
}

impl StepState {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Pending => "○",
            Self::Active => "⏳",
            Self::Completed => "✓",
            Self::Error => "✗",
        }
    }
}

/// Per-step states in step order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepStates(Vec<(Step, StepState)>);

impl StepStates {
    pub fn get(&self, step: Step) -> Option<StepState> {
        self.0
            .iter()
            .find(|(candidate, _)| *candidate == step)
            .map(|(_, state)| *state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, StepState)> + '_ {
        self.0.iter().copied()
    }

    pub fn states(&self) -> Vec<StepState> {
        self.0.iter().map(|(_, state)| *state).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Derives step states from status snapshots
#[derive(Debug, Clone)]
pub struct StepProgressTracker {
    order: Vec<Step>,
}

impl Default for StepProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StepProgressTracker {
    /// Tracker over the standard server order
    pub fn new() -> Self {
        Self {
            order: Step::ALL.to_vec(),
        }
    }

    /// Tracker over a custom step order
    pub fn with_order(order: Vec<Step>) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &[Step] {
        &self.order
    }

    /// Recompute every step's state from one snapshot
    pub fn derive(&self, status: &JobStatus) -> StepStates {
        let states = match status.status {
            JobState::Completed => self.uniform(StepState::Completed),
            JobState::Failed => self.uniform(StepState::Error),
            JobState::Queued | JobState::Running | JobState::Unknown => {
                self.fill(status.current_step.as_deref())
            }
        };
        StepStates(states)
    }

    fn uniform(&self, state: StepState) -> Vec<(Step, StepState)> {
        self.order.iter().map(|step| (*step, state)).collect()
    }

    fn fill(&self, current: Option<&str>) -> Vec<(Step, StepState)> {
        let Some(active) = current.and_then(|id| self.order.iter().position(|s| s.id() == id))
        else {
            return self.uniform(StepState::Pending);
        };

        self.order
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let state = match index.cmp(&active) {
                    std::cmp::Ordering::Less => StepState::Completed,
                    std::cmp::Ordering::Equal => StepState::Active,
                    std::cmp::Ordering::Greater => StepState::Pending,
                };
                (*step, state)
            })
            .collect()
    }
}

const GENERIC_COMPANY: &str = "Company";

/// Investing tips shown while a job runs
pub const TIPS: [&str; 4] = [
    "Warren Buffett loves to buy quality companies when they are on the operating table.",
    "The best opportunities come when panic selling hits strong businesses.",
    "Price is what you pay. Value is what you get.",
    "Be fearful when others are greedy, and greedy when others are fearful.",
];

/// Pick one tip at random
pub fn random_tip() -> &'static str {
    TIPS[rand::rng().random_range(0..TIPS.len())]
}

/// Render instructions for the progress screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub title: String,
    /// Progress bar width, clamped to 0..=100
    pub percent: f64,
    pub steps: StepStates,
    pub tip: &'static str,
}

impl ProgressView {
    /// Build the view for one snapshot
    ///
    /// `company_hint` is the name entered at submission time, when known.
    pub fn from_status(
        status: &JobStatus,
        tracker: &StepProgressTracker,
        company_hint: Option<&str>,
        tip: &'static str,
    ) -> Self {
        Self {
            title: progress_title(company_hint),
            percent: clamp_percent(status.progress),
            steps: tracker.derive(status),
            tip,
        }
    }
}

/// `Analyzing {company}...`, falling back to a generic label
pub fn progress_title(company_hint: Option<&str>) -> String {
    let company = company_hint
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(GENERIC_COMPANY);
    format!("Analyzing {company}...")
}

fn clamp_percent(progress: f64) -> f64 {
    if progress.is_nan() {
        warn!("Progress is not a number; showing 0%");
        return 0.0;
    }
    if !(0.0..=100.0).contains(&progress) {
        warn!("Progress {progress} outside 0..=100; clamping");
    }
    progress.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: JobState, step: Option<&str>) -> JobStatus {
        JobStatus {
            job_id: "job".to_string(),
            status: state,
            progress: 40.0,
            current_step: step.map(str::to_string),
            error: None,
            result: None,
        }
    }

    #[test]
    fn test_completed_marks_everything_completed() {
        let tracker = StepProgressTracker::new();
        for step in [None, Some("news"), Some("done"), Some("bogus")] {
            let states = tracker.derive(&status(JobState::Completed, step));
            assert!(states.iter().all(|(_, s)| s == StepState::Completed));
        }
    }

    #[test]
    fn test_failed_marks_everything_error() {
        let tracker = StepProgressTracker::new();
        let states = tracker.derive(&status(JobState::Failed, Some("peers")));
        assert_eq!(states.states(), vec![StepState::Error; 4]);
    }

    #[test]
    fn test_running_fills_left_to_right() {
        use StepState::{Active, Completed, Pending};
        let tracker = StepProgressTracker::new();

        let expected = [
            vec![Active, Pending, Pending, Pending],
            vec![Completed, Active, Pending, Pending],
            vec![Completed, Completed, Active, Pending],
            vec![Completed, Completed, Completed, Active],
        ];

        for (step, want) in Step::ALL.iter().zip(expected) {
            let states = tracker.derive(&status(JobState::Running, Some(step.id())));
            assert_eq!(states.states(), want, "current step {step}");
        }
    }

    #[test]
    fn test_unknown_step_is_all_pending() {
        let tracker = StepProgressTracker::new();

        for step in [None, Some("queued"), Some("NEWS"), Some("")] {
            let states = tracker.derive(&status(JobState::Queued, step));
            assert_eq!(states.states(), vec![StepState::Pending; 4]);
        }
    }

    #[test]
    fn test_unrecognised_state_walks_like_running() {
        let tracker = StepProgressTracker::new();
        let states = tracker.derive(&status(JobState::Unknown, Some("fundamentals")));
        assert_eq!(states.get(Step::News), Some(StepState::Completed));
        assert_eq!(states.get(Step::Fundamentals), Some(StepState::Active));
    }

    #[test]
    fn test_custom_order() {
        let tracker = StepProgressTracker::with_order(vec![Step::Fundamentals, Step::News]);
        let states = tracker.derive(&status(JobState::Running, Some("news")));

        assert_eq!(states.len(), 2);
        assert_eq!(states.get(Step::Fundamentals), Some(StepState::Completed));
        assert_eq!(states.get(Step::News), Some(StepState::Active));
        assert_eq!(states.get(Step::Signal), None);
    }

    #[test]
    fn test_progress_view() {
        let tracker = StepProgressTracker::new();
        let mut snapshot = status(JobState::Running, Some("peers"));
        snapshot.progress = 140.0;

        let view = ProgressView::from_status(&snapshot, &tracker, Some("Initech"), TIPS[0]);
        assert_eq!(view.title, "Analyzing Initech...");
        assert_eq!(view.percent, 100.0);
        assert_eq!(view.steps.get(Step::Peers), Some(StepState::Active));

        let view = ProgressView::from_status(&snapshot, &tracker, None, TIPS[0]);
        assert_eq!(view.title, "Analyzing Company...");
    }

    #[test]
    fn test_random_tip_is_from_list() {
        assert!(TIPS.contains(&random_tip()));
    }
}
