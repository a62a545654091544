//! Follow-up questions about a completed analysis
//!
//! Every question and every reply is appended to a [`Transcript`] in the
//! order the questions were asked. A failed request still produces a bot
//! entry, so the transcript never ends on an unanswered question.

use crate::api::QuestionSource;
use crate::model::JobId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shown in place of an answer when the request fails
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error answering that.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// A single message in the transcript
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    /// Supporting passages returned with an answer
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    fn bot(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            sources,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only list of transcript entries
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }
}

/// Result of a single [`QueryChannel::ask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    /// Blank question; nothing was sent or recorded
    Ignored,
    /// The server answered
    Answered,
    /// The request failed and the fallback answer was recorded
    Fallback,
}

/// Question/answer channel bound to one job
///
/// `ask` takes `&mut self`, so a second question cannot start until the
/// previous one has been answered and recorded.
pub struct QueryChannel {
    source: Arc<dyn QuestionSource>,
    job_id: JobId,
    transcript: Transcript,
}

impl QueryChannel {
    pub fn new(source: Arc<dyn QuestionSource>, job_id: JobId) -> Self {
        Self {
            source,
            job_id,
            transcript: Transcript::new(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Ask a question and record both sides of the exchange
    ///
    /// The question is trimmed; a blank question is ignored without a request.
    #[instrument(skip_all, fields(job_id = %self.job_id))]
    pub async fn ask(&mut self, question: &str) -> AskOutcome {
        let question = question.trim();
        if question.is_empty() {
            return AskOutcome::Ignored;
        }

        self.transcript.push(TranscriptEntry::user(question));

        match self.source.ask(&self.job_id, question).await {
            Ok(answer) => {
                info!("Question answered");
                self.transcript.push(TranscriptEntry::bot(
                    answer.answer,
                    answer.sources.unwrap_or_default(),
                ));
                AskOutcome::Answered
            }
            Err(e) => {
                error!("Question failed: {e}");
                self.transcript
                    .push(TranscriptEntry::bot(FALLBACK_ANSWER, Vec::new()));
                AskOutcome::Fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Answer, MockQuestionSource};
    use crate::error::ClientError;
    use mockall::Sequence;

    fn job() -> JobId {
        JobId::parse("job-42").unwrap()
    }

    fn answer(text: &str) -> Answer {
        Answer {
            answer: text.to_string(),
            sources: None,
        }
    }

    #[tokio::test]
    async fn test_blank_question_sends_nothing() {
        let mut source = MockQuestionSource::new();
        source.expect_ask().times(0);
        let mut channel = QueryChannel::new(Arc::new(source), job());

        assert_eq!(channel.ask("").await, AskOutcome::Ignored);
        assert_eq!(channel.ask("   \n").await, AskOutcome::Ignored);
        assert!(channel.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_answer_is_recorded_after_question() {
        let mut source = MockQuestionSource::new();
        source
            .expect_ask()
            .withf(|job_id, question| job_id.as_str() == "job-42" && question == "Why hold?")
            .times(1)
            .returning(|_, _| {
                Ok(Answer {
                    answer: "Margins are flat.".to_string(),
                    sources: Some(vec!["10-K p.12".to_string()]),
                })
            });
        let mut channel = QueryChannel::new(Arc::new(source), job());

        assert_eq!(channel.ask("  Why hold? ").await, AskOutcome::Answered);

        let entries = channel.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].text, "Why hold?");
        assert_eq!(entries[1].role, Role::Bot);
        assert_eq!(entries[1].text, "Margins are flat.");
        assert_eq!(entries[1].sources, vec!["10-K p.12"]);
    }

    #[tokio::test]
    async fn test_failure_records_fallback() {
        let mut source = MockQuestionSource::new();
        source.expect_ask().times(1).returning(|_, _| {
            Err(ClientError::Api {
                status: 500,
                detail: "boom".to_string(),
            })
        });
        let mut channel = QueryChannel::new(Arc::new(source), job());

        assert_eq!(channel.ask("What about debt?").await, AskOutcome::Fallback);

        let entries = channel.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "What about debt?");
        assert_eq!(entries[1].role, Role::Bot);
        assert_eq!(entries[1].text, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_questions_keep_their_order() {
        let mut seq = Sequence::new();
        let mut source = MockQuestionSource::new();
        source
            .expect_ask()
            .withf(|_, question| question == "first")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(answer("one")));
        source
            .expect_ask()
            .withf(|_, question| question == "second")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(answer("two")));
        let mut channel = QueryChannel::new(Arc::new(source), job());

        channel.ask("first").await;
        channel.ask("second").await;

        let texts: Vec<&str> = channel
            .transcript()
            .entries()
            .iter()
            .map(|entry| entry.text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "one", "second", "two"]);
    }
}
