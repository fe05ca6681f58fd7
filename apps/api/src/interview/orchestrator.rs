//! Interview orchestration — sequences question delivery and answer scoring.
//!
//! Flow per identity: UNINITIALIZED → (fetch_next generates questions) →
//! IN_PROGRESS → (submit_answer × N) → COMPLETE. `reset` returns to
//! UNINITIALIZED from any state.
//!
//! Holds no interview state of its own; everything lives in `SessionStore`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::extraction::{extract_evaluation, extract_question_list};
use crate::interview::session::{SessionError, SessionStore};
use crate::llm_client::prompts::{evaluation_prompt, question_set_prompt};
use crate::llm_client::Generator;
use crate::models::evaluation::EvaluationResult;
use crate::models::interview::InterviewSummary;

/// Result of asking for the next question.
#[derive(Debug, Clone, PartialEq)]
pub enum NextQuestion {
    Question(String),
    Done,
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub evaluation: EvaluationResult,
    pub next_question: Option<String>,
}

pub struct Interviewer {
    store: Arc<SessionStore>,
    generator: Arc<dyn Generator>,
    question_count: usize,
}

impl Interviewer {
    pub fn new(
        store: Arc<SessionStore>,
        generator: Arc<dyn Generator>,
        question_count: usize,
    ) -> Self {
        Self {
            store,
            generator,
            question_count,
        }
    }

    /// Returns the current question, generating the question set on first use.
    /// Never advances the cursor.
    pub async fn fetch_next(&self, id: &str) -> Result<NextQuestion, AppError> {
        let mut entry = self.store.lock(id).await;

        if entry.session().is_none() {
            let questions = self.generate_questions().await?;
            info!("Started interview for {id} with {} questions", questions.len());
            entry.create(questions);
            debug!("{} caller(s) with an open session slot", self.store.len());
        }

        Ok(match entry.session().and_then(|s| s.current_question()) {
            Some(question) => NextQuestion::Question(question.to_string()),
            None => NextQuestion::Done,
        })
    }

    /// Scores `answer` against the current question and advances the cursor.
    pub async fn submit_answer(&self, id: &str, answer: &str) -> Result<AnswerOutcome, AppError> {
        let mut entry = self.store.lock(id).await;

        let question = entry
            .session()
            .and_then(|s| s.current_question())
            .map(str::to_string)
            .ok_or(SessionError::NoActiveSession)?;

        let answer = answer.trim().to_string();
        let evaluation = self.evaluate(&question, &answer).await;

        let session = entry.session_mut().ok_or(SessionError::NoActiveSession)?;
        session
            .record_answer(answer, evaluation.clone())
            .ok_or(SessionError::NoActiveSession)?;

        if session.is_complete() {
            info!("Interview complete for {id}");
        } else {
            debug!("{id} advanced to question {}", session.index() + 1);
        }

        Ok(AnswerOutcome {
            evaluation,
            next_question: session.current_question().map(str::to_string),
        })
    }

    /// Discards the session for `id`. Always succeeds.
    pub async fn reset(&self, id: &str) {
        self.store.delete(id).await;
        info!("Session reset for {id}");
    }

    pub async fn summary(&self, id: &str) -> InterviewSummary {
        self.store
            .get(id)
            .await
            .map(|session| InterviewSummary::from(&session))
            .unwrap_or_else(InterviewSummary::uninitialized)
    }

    async fn generate_questions(&self) -> Result<Vec<String>, AppError> {
        let prompt = question_set_prompt(self.question_count);

        let raw = self.generator.generate(&prompt).await.map_err(|e| {
            error!("Question generation request failed: {e}");
            AppError::QuestionGeneration(e.to_string())
        })?;
        debug!("Generator question output: {raw}");

        extract_question_list(&raw).map_err(|e| {
            error!("Failed to parse generated questions: {e}");
            AppError::QuestionGeneration(e.to_string())
        })
    }

    /// Never fails: every failure mode maps to a zero-score fallback.
    async fn evaluate(&self, question: &str, answer: &str) -> EvaluationResult {
        let prompt = evaluation_prompt(question, answer);

        let raw = match self.generator.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Evaluation request failed: {e}");
                return EvaluationResult::request_failed();
            }
        };
        debug!("Generator evaluation output: {raw}");

        let value = extract_evaluation(&raw);
        EvaluationResult::from_value(&value).unwrap_or_else(|| {
            warn!("Evaluation missing expected fields: {value}");
            EvaluationResult::missing_fields()
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::llm_client::GeneratorError;
    use crate::models::interview::SessionState;

    /// Generator double that replays scripted responses in order.
    pub(crate) struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, GeneratorError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(responses: Vec<Result<String, GeneratorError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        pub(crate) fn with_texts(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().clone()
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(GeneratorError::Unknown("script exhausted".into())))
        }
    }

    const TWO_QUESTIONS: &str = r#"["Q1","Q2"]"#;
    const GOOD_EVAL: &str = r#"{"score":8,"feedback":"ok","improvement":"none"}"#;

    fn interviewer(generator: Arc<ScriptedGenerator>) -> (Interviewer, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(None));
        (Interviewer::new(store.clone(), generator, 2), store)
    }

    #[tokio::test]
    async fn test_fetch_next_generates_once_and_is_idempotent() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&[TWO_QUESTIONS]));
        let (interviewer, store) = interviewer(generator.clone());

        assert_eq!(
            interviewer.fetch_next("a").await.unwrap(),
            NextQuestion::Question("Q1".into())
        );
        assert_eq!(
            interviewer.fetch_next("a").await.unwrap(),
            NextQuestion::Question("Q1".into())
        );
        assert_eq!(generator.calls(), 1);
        assert_eq!(store.get("a").await.unwrap().index(), 0);
        assert!(generator.prompts()[0].contains("Generate a set of 2"));
    }

    #[tokio::test]
    async fn test_fetch_next_generation_failure_creates_no_session() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&["I refuse to answer."]));
        let (interviewer, store) = interviewer(generator);

        let err = interviewer.fetch_next("a").await.unwrap_err();
        assert!(matches!(err, AppError::QuestionGeneration(ref d) if d.contains("no list located")));
        assert!(store.get("a").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_next_generator_error_is_surfaced_and_retryable() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Err(GeneratorError::Quota("429".into())),
            Ok(TWO_QUESTIONS.into()),
        ]));
        let (interviewer, _store) = interviewer(generator);

        assert!(matches!(
            interviewer.fetch_next("a").await,
            Err(AppError::QuestionGeneration(_))
        ));
        assert_eq!(
            interviewer.fetch_next("a").await.unwrap(),
            NextQuestion::Question("Q1".into())
        );
    }

    #[tokio::test]
    async fn test_two_question_scenario() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&[
            TWO_QUESTIONS,
            GOOD_EVAL,
            r#"{"score":3,"feedback":"meh","improvement":"more"}"#,
        ]));
        let (interviewer, store) = interviewer(generator.clone());

        interviewer.fetch_next("a").await.unwrap();

        let first = interviewer.submit_answer("a", "  ans1 ").await.unwrap();
        assert_eq!(
            first.evaluation,
            EvaluationResult {
                score: 8,
                feedback: "ok".into(),
                improvement: "none".into(),
            }
        );
        assert_eq!(first.next_question.as_deref(), Some("Q2"));
        let session = store.get("a").await.unwrap();
        assert_eq!(session.index(), 1);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].answer, "ans1");
        assert!(generator.prompts()[1].contains("Question: \"Q1\""));

        let second = interviewer.submit_answer("a", "ans2").await.unwrap();
        assert_eq!(second.next_question, None);
        let session = store.get("a").await.unwrap();
        assert_eq!(session.index(), 2);
        assert_eq!(session.state(), SessionState::Complete);

        assert_eq!(interviewer.fetch_next("a").await.unwrap(), NextQuestion::Done);
        assert_eq!(interviewer.fetch_next("a").await.unwrap(), NextQuestion::Done);
    }

    #[tokio::test]
    async fn test_submit_without_session_fails() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&[]));
        let (interviewer, _store) = interviewer(generator.clone());

        assert!(matches!(
            interviewer.submit_answer("a", "hello").await,
            Err(AppError::Session(SessionError::NoActiveSession))
        ));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_after_complete_fails() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&[r#"["Only"]"#, GOOD_EVAL]));
        let (interviewer, store) = interviewer(generator);

        interviewer.fetch_next("a").await.unwrap();
        interviewer.submit_answer("a", "x").await.unwrap();

        assert!(matches!(
            interviewer.submit_answer("a", "y").await,
            Err(AppError::Session(SessionError::NoActiveSession))
        ));
        assert_eq!(store.get("a").await.unwrap().history().len(), 1);
    }

    #[tokio::test]
    async fn test_generator_failure_during_evaluation_falls_back() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(TWO_QUESTIONS.into()),
            Err(GeneratorError::Transient("timeout".into())),
        ]));
        let (interviewer, store) = interviewer(generator);

        interviewer.fetch_next("a").await.unwrap();
        let outcome = interviewer.submit_answer("a", "x").await.unwrap();

        assert_eq!(outcome.evaluation, EvaluationResult::request_failed());
        assert_eq!(outcome.next_question.as_deref(), Some("Q2"));
        assert_eq!(store.get("a").await.unwrap().index(), 1);
    }

    #[tokio::test]
    async fn test_evaluation_fallbacks_by_output_shape() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&[
            r#"["Q1","Q2","Q3"]"#,
            "no json at all",
            "{not: valid}",
            r#"{"score": 9}"#,
        ]));
        let (interviewer, _store) = interviewer(generator);
        interviewer.fetch_next("a").await.unwrap();

        let outcomes = [
            interviewer.submit_answer("a", "1").await.unwrap(),
            interviewer.submit_answer("a", "2").await.unwrap(),
            interviewer.submit_answer("a", "3").await.unwrap(),
        ];

        assert_eq!(outcomes[0].evaluation, EvaluationResult::invalid_output());
        assert_eq!(outcomes[1].evaluation, EvaluationResult::unparseable());
        assert_eq!(outcomes[2].evaluation, EvaluationResult::missing_fields());
        assert_eq!(outcomes[2].next_question, None);
    }

    #[tokio::test]
    async fn test_string_score_is_normalized_not_discarded() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&[
            TWO_QUESTIONS,
            r#"Sure! {"score":"8","feedback":"good","improvement":"none"}"#,
        ]));
        let (interviewer, _store) = interviewer(generator);

        interviewer.fetch_next("a").await.unwrap();
        let outcome = interviewer.submit_answer("a", "ans").await.unwrap();
        assert_eq!(outcome.evaluation.score, 8);
        assert_eq!(outcome.evaluation.feedback, "good");
    }

    #[tokio::test]
    async fn test_reset_then_fetch_regenerates() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&[
            TWO_QUESTIONS,
            GOOD_EVAL,
            r#"["N1","N2"]"#,
        ]));
        let (interviewer, store) = interviewer(generator.clone());

        interviewer.fetch_next("a").await.unwrap();
        interviewer.submit_answer("a", "x").await.unwrap();
        interviewer.reset("a").await;
        interviewer.reset("a").await;

        assert_eq!(
            interviewer.fetch_next("a").await.unwrap(),
            NextQuestion::Question("N1".into())
        );
        assert_eq!(store.get("a").await.unwrap().index(), 0);
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_first_fetch_generates_once() {
        let generator = Arc::new(
            ScriptedGenerator::with_texts(&[TWO_QUESTIONS]).with_delay(Duration::from_millis(50)),
        );
        let (interviewer, _store) = interviewer(generator.clone());
        let interviewer = Arc::new(interviewer);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let interviewer = interviewer.clone();
                tokio::spawn(async move { interviewer.fetch_next("a").await })
            })
            .collect();

        for handle in handles {
            assert_eq!(
                handle.await.unwrap().unwrap(),
                NextQuestion::Question("Q1".into())
            );
        }
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_summary_reports_progress() {
        let generator = Arc::new(ScriptedGenerator::with_texts(&[TWO_QUESTIONS, GOOD_EVAL]));
        let (interviewer, _store) = interviewer(generator);

        let empty = interviewer.summary("a").await;
        assert_eq!(empty.state, SessionState::Uninitialized);
        assert!(empty.history.is_empty());

        interviewer.fetch_next("a").await.unwrap();
        interviewer.submit_answer("a", "x").await.unwrap();

        let summary = interviewer.summary("a").await;
        assert_eq!(summary.state, SessionState::InProgress);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.answered, 1);
        assert_eq!(summary.average_score, Some(8.0));
    }
}
