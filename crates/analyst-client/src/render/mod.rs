//! Result rendering
//!
//! A completed [`AnalysisResult`] is turned into a [`ResultsView`]: an
//! ordered list of sections, each holding plain render instructions
//! ([`Element`]). Sections are isolated from one another, so a malformed or
//! missing part of the payload only affects its own section.
//! Output adapters in [`crate::format`] decide how the instructions look.

pub mod element;
mod sections;
pub mod values;

pub use element::{Element, SignalCategory, TableRow, Tone};

use crate::api::StatusSource;
use crate::error::{ClientError, Result};
use crate::model::{AnalysisResult, JobId, JobState};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, instrument};

/// The sections of a results page, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    Signal,
    News,
    Fundamentals,
    Peers,
    Thesis,
}

impl SectionKind {
    pub const ALL: [Self; 6] = [
        Self::Header,
        Self::Signal,
        Self::News,
        Self::Fundamentals,
        Self::Peers,
        Self::Thesis,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Header => "Overview",
            Self::Signal => "Trading Signal",
            Self::News => "News Sentiment",
            Self::Fundamentals => "Fundamentals",
            Self::Peers => "Peer Comparison",
            Self::Thesis => "Investment Thesis",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How rendering a section went
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SectionOutcome {
    Rendered,
    /// The section stopped early; elements produced before the failure are kept
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub elements: Vec<Element>,
    pub outcome: SectionOutcome,
}

impl Section {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SectionOutcome::Failed { .. })
    }
}

/// Everything needed to display one analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub sections: Vec<Section>,
}

impl ResultsView {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    pub fn failed_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|section| section.is_failed())
    }
}

/// Derives a [`ResultsView`] from an analysis result
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRenderer;

impl ResultRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render every section; never fails as a whole
    #[instrument(skip_all, fields(company = result.company_name.as_deref().unwrap_or_default()))]
    pub fn render(&self, result: &AnalysisResult) -> ResultsView {
        let sections: Vec<Section> = SectionKind::ALL
            .into_iter()
            .map(|kind| render_section(kind, |out| Self::build(kind, result, out)))
            .collect();

        let failed = sections.iter().filter(|section| section.is_failed()).count();
        debug!(sections = sections.len(), failed, "Rendered analysis result");
        ResultsView { sections }
    }

    fn build(kind: SectionKind, result: &AnalysisResult, out: &mut Vec<Element>) -> Result<()> {
        match kind {
            SectionKind::Header => sections::header(result, out),
            SectionKind::Signal => sections::signal(result, out),
            SectionKind::News => sections::news(result, out),
            SectionKind::Fundamentals => sections::fundamentals(result, out),
            SectionKind::Peers => sections::peers(result, out),
            SectionKind::Thesis => sections::thesis(result, out),
        }
    }
}

/// Run one section builder, turning its error into a failed outcome
fn render_section<F>(kind: SectionKind, build: F) -> Section
where
    F: FnOnce(&mut Vec<Element>) -> Result<()>,
{
    let mut elements = Vec::new();
    let outcome = match build(&mut elements) {
        Ok(()) => SectionOutcome::Rendered,
        Err(e) => {
            error!(section = %kind, "Error rendering section: {e}");
            SectionOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    Section {
        kind,
        elements,
        outcome,
    }
}

/// Fetch the final result of a job for the results view
///
/// Anything other than a completed job carrying a result is
/// [`ClientError::ResultsNotReady`].
#[instrument(skip(source))]
pub async fn load_results(source: &dyn StatusSource, job_id: &JobId) -> Result<AnalysisResult> {
    let status = source.fetch_status(job_id).await?;

    match (status.status, status.result) {
        (JobState::Completed, Some(result)) => Ok(result),
        _ => Err(ClientError::ResultsNotReady(job_id.to_string())),
    }
}
