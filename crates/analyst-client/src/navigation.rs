//! Views of the analysis flow and their URL paths
//!
//! `/analyze` → `/progress/{job_id}` → `/results/{job_id}`, with failures
//! returning to `/analyze`.

use crate::model::JobId;
use std::fmt;

/// Where the user goes next
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Submission form
    Submission,
    /// Live progress for a job
    Progress(JobId),
    /// Rendered results and follow-up questions for a job
    Results(JobId),
}

impl Navigation {
    /// URL path of this view; the job id is percent-encoded
    pub fn path(&self) -> String {
        match self {
            Self::Submission => "/analyze".to_string(),
            Self::Progress(job_id) => format!("/progress/{}", encode_segment(job_id.as_str())),
            Self::Results(job_id) => format!("/results/{}", encode_segment(job_id.as_str())),
        }
    }

    /// Resolve a path back to a view
    ///
    /// Job-scoped paths without a usable job id resolve to the submission
    /// view, as does anything unrecognised.
    pub fn from_path(path: &str) -> Self {
        let mut segments = path.trim_matches('/').split('/');
        let kind = segments.next().unwrap_or_default();
        let job_id = segments
            .next()
            .map(decode_segment)
            .and_then(|raw| JobId::parse(&raw).ok());

        match (kind, job_id) {
            ("progress", Some(job_id)) => Self::Progress(job_id),
            ("results", Some(job_id)) => Self::Results(job_id),
            _ => Self::Submission,
        }
    }

    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::Submission => None,
            Self::Progress(job_id) | Self::Results(job_id) => Some(job_id),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn decode_segment(raw: &str) -> String {
    url::form_urlencoded::parse(format!("v={}", raw.replace('+', "%2B")).as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let job = JobId::parse("3f2a-77").unwrap();
        assert_eq!(Navigation::Submission.path(), "/analyze");
        assert_eq!(Navigation::Progress(job.clone()).path(), "/progress/3f2a-77");
        assert_eq!(Navigation::Results(job).to_string(), "/results/3f2a-77");
    }

    #[test]
    fn test_from_path_round_trip() {
        let job = JobId::parse("a b+c").unwrap();
        let view = Navigation::Results(job.clone());
        assert_eq!(Navigation::from_path(&view.path()), view);
        assert_eq!(view.job_id(), Some(&job));
    }

    #[test]
    fn test_missing_job_id_redirects_to_submission() {
        assert_eq!(Navigation::from_path("/progress/"), Navigation::Submission);
        assert_eq!(Navigation::from_path("/progress"), Navigation::Submission);
        assert_eq!(Navigation::from_path("/results/%20"), Navigation::Submission);
        assert_eq!(Navigation::from_path("/elsewhere/abc"), Navigation::Submission);
    }
}
