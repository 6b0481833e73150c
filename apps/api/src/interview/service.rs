//! Interview service: the operations of the session state machine.
//!
//! Every mutation of a session record happens under its [`SessionLocks`] guard; audio for
//! upcoming questions is emitted through the [`AudioHook`] only after the record is saved.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::audio::{question_audio, stored_audio, AudioHook};
use super::completion::{build_report, AnswerSubmission, FinalReport};
use super::locks::SessionLocks;
use super::questions::{prepare_questions, QuestionProvider};
use super::session::{PerformanceTrend, Session, Turn};
use super::InterviewError;
use crate::analysis::{AnswerAnalyzer, TurnAnalysis};
use crate::models::document::ExtractedDocument;
use crate::models::{DifficultyLevel, Question, QuestionKind};
use crate::speech::SpeechSynthesizer;
use crate::storage::{load_as, save_as, DataKind, SessionStore};

pub const WELCOME_INSTRUCTIONS: &str = "Welcome to your AI interview! I'll ask you questions and \
    provide detailed feedback. Speak clearly and take your time.";

/// Questions whose audio is requested as soon as a session starts.
const PREFETCH_ON_START: usize = 2;

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StartedInterview {
    pub session_id: String,
    pub first_question: Option<Question>,
    pub total_questions: usize,
    pub difficulty_level: DifficultyLevel,
    pub question_source: &'static str,
    pub instructions: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionProgress {
    pub completed: usize,
    pub total: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdaptiveFeedback {
    pub next_difficulty: DifficultyLevel,
    pub performance_trend: PerformanceTrend,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub analysis: TurnAnalysis,
    /// Carries audio when the worker has already produced it.
    pub next_question: Option<Question>,
    pub is_complete: bool,
    pub session_progress: SessionProgress,
    pub adaptive_feedback: AdaptiveFeedback,
}

/// Per-question analysis record (kind `analysis_<id>`), read back by the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub question_id: u32,
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    pub answer: String,
    #[serde(default)]
    pub response_time: f64,
    pub analysis: TurnAnalysis,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewSummary {
    pub session_id: String,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub questions_by_type: BTreeMap<QuestionKind, usize>,
    /// Mean over scored analyses; 0 when there are none.
    pub average_score: f64,
    pub questions: Vec<Question>,
    pub analyses: Vec<AnalysisRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

pub struct InterviewService {
    store: Arc<dyn SessionStore>,
    questions: Arc<dyn QuestionProvider>,
    analyzer: Arc<AnswerAnalyzer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    locks: SessionLocks,
    audio: AudioHook,
}

impl InterviewService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        questions: Arc<dyn QuestionProvider>,
        analyzer: Arc<AnswerAnalyzer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        audio: AudioHook,
    ) -> Self {
        Self {
            store,
            questions,
            analyzer,
            synthesizer,
            locks: SessionLocks::new(),
            audio,
        }
    }

    pub fn question_source(&self) -> &'static str {
        self.questions.name()
    }

    /// Start(resume, jd, difficulty) with the documents uploaded for `session_id`.
    pub async fn start(
        &self,
        session_id: &str,
        difficulty: DifficultyLevel,
    ) -> Result<StartedInterview, InterviewError> {
        let (resume, jd) = self.load_documents(session_id).await?;
        self.start_with_documents(session_id, &resume, &jd, difficulty)
            .await
    }

    pub async fn start_with_documents(
        &self,
        session_id: &str,
        resume: &str,
        jd: &str,
        difficulty: DifficultyLevel,
    ) -> Result<StartedInterview, InterviewError> {
        if resume.trim().is_empty() {
            return Err(InterviewError::MissingResume);
        }

        let questions = prepare_questions(self.questions.generate(resume, jd).await);
        let mut session = Session::new(session_id, questions, difficulty);
        session.begin();

        {
            let _guard = self.locks.acquire(session_id).await;
            self.clear_analyses(session_id).await?;
            save_as(self.store.as_ref(), session_id, &DataKind::Session, &session).await?;
            save_as(
                self.store.as_ref(),
                session_id,
                &DataKind::Questions,
                &session.questions,
            )
            .await?;
        }
        info!(
            "Started interview {session_id} with {} questions ({})",
            session.questions.len(),
            self.questions.name()
        );

        for question in session.questions.iter().take(PREFETCH_ON_START) {
            self.audio.emit(session_id, question);
        }

        Ok(StartedInterview {
            session_id: session_id.to_string(),
            first_question: session.current_question().cloned(),
            total_questions: session.questions.len(),
            difficulty_level: session.difficulty_level,
            question_source: self.questions.name(),
            instructions: WELCOME_INSTRUCTIONS,
        })
    }

    /// SubmitAnswer(session, question, answer, response time). A rejected submission
    /// leaves the stored session untouched.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        question_id: u32,
        answer: &str,
        response_time: f64,
    ) -> Result<SubmitOutcome, InterviewError> {
        let guard = self.locks.acquire(session_id).await;

        let mut session = self.load_session(session_id).await?;
        let question = session.check_submission(question_id)?.clone();

        let analysis = self.analyzer.analyze_turn(&question, answer).await;
        let turn = Turn {
            question_id,
            question: question.question.clone(),
            answer: answer.to_string(),
            response_time: response_time.max(0.0),
            scored: question.is_scored,
            analysis: analysis.clone(),
            recorded_at: Utc::now(),
        };
        let record = AnalysisRecord {
            question_id,
            question: turn.question.clone(),
            kind: question.kind,
            answer: turn.answer.clone(),
            response_time: turn.response_time,
            analysis: analysis.clone(),
            recorded_at: turn.recorded_at,
        };

        let advance = session.record_turn(turn);
        // the session record is the commit point; a failed analysis write leaves it unadvanced
        save_as(
            self.store.as_ref(),
            session_id,
            &DataKind::Analysis(question_id),
            &record,
        )
        .await?;
        save_as(self.store.as_ref(), session_id, &DataKind::Session, &session).await?;
        drop(guard);
        self.locks.prune();

        // post-commit: ask for the question after next so it is ready one turn ahead
        if let Some(upcoming) = session.questions.get(session.current_question_index + 1) {
            self.audio.emit(session_id, upcoming);
        }

        let next_question = match advance.next_question {
            Some(mut next) => {
                if let Some(stored) = stored_audio(self.store.as_ref(), session_id, &next).await {
                    next.attach_audio(stored.audio, stored.voice_id);
                }
                Some(next)
            }
            None => None,
        };

        if advance.is_complete {
            info!(
                "Interview {session_id} complete, average score {:.1}",
                session.session_stats.average_score
            );
        }

        Ok(SubmitOutcome {
            analysis,
            next_question,
            is_complete: advance.is_complete,
            session_progress: SessionProgress {
                completed: session.session_stats.completed,
                total: session.session_stats.total_questions,
                average_score: session.session_stats.average_score,
            },
            adaptive_feedback: AdaptiveFeedback {
                next_difficulty: session.next_difficulty(),
                performance_trend: session.performance_trend(),
            },
        })
    }

    /// Analyses an answer to any stored question without advancing a session.
    pub async fn analyze_answer(
        &self,
        session_id: &str,
        question_id: u32,
        answer: &str,
    ) -> Result<AnalysisRecord, InterviewError> {
        let question = self.find_question(session_id, question_id).await?;
        let analysis = self.analyzer.analyze_turn(&question, answer).await;
        let record = AnalysisRecord {
            question_id,
            question: question.question,
            kind: question.kind,
            answer: answer.to_string(),
            response_time: 0.0,
            analysis,
            recorded_at: Utc::now(),
        };
        save_as(
            self.store.as_ref(),
            session_id,
            &DataKind::Analysis(question_id),
            &record,
        )
        .await?;
        Ok(record)
    }

    pub async fn summary(&self, session_id: &str) -> Result<InterviewSummary, InterviewError> {
        let questions = self.load_questions(session_id).await?;

        let mut analyses = Vec::new();
        for question in &questions {
            match load_as::<AnalysisRecord>(
                self.store.as_ref(),
                session_id,
                &DataKind::Analysis(question.id),
            )
            .await
            {
                Ok(Some(record)) => analyses.push(record),
                Ok(None) => {}
                Err(e) => warn!(
                    "Skipping unreadable analysis {} for session {session_id}: {e}",
                    question.id
                ),
            }
        }

        let mut questions_by_type = BTreeMap::new();
        for question in &questions {
            *questions_by_type.entry(question.kind).or_insert(0) += 1;
        }

        let scored: Vec<f64> = analyses
            .iter()
            .filter(|a| a.kind.is_scored())
            .map(|a| f64::from(a.analysis.overall_score))
            .collect();
        let average_score = if scored.is_empty() {
            0.0
        } else {
            scored.iter().sum::<f64>() / scored.len() as f64
        };

        Ok(InterviewSummary {
            session_id: session_id.to_string(),
            total_questions: questions.len(),
            answered_questions: analyses.len(),
            questions_by_type,
            average_score,
            questions,
            analyses,
        })
    }

    /// One-shot completion over an externally tracked answer batch. Independent of the
    /// turn-by-turn session; persisting the report is best-effort.
    pub async fn complete_interview(
        &self,
        session_id: &str,
        answers: &[AnswerSubmission],
        duration_seconds: f64,
    ) -> FinalReport {
        let report = build_report(session_id, answers, duration_seconds);

        if let Err(e) = save_as(self.store.as_ref(), session_id, &DataKind::FinalReport, &report).await
        {
            warn!("Failed to persist final report for {session_id}: {e}");
        }
        if let Err(e) = save_as(self.store.as_ref(), session_id, &DataKind::RawAnswers, answers).await
        {
            warn!("Failed to persist raw answers for {session_id}: {e}");
        }
        info!(
            "Completed interview {session_id}: {} answers, overall {:.1}",
            answers.len(),
            report.overall_score
        );
        report
    }

    /// Regenerates the question list for `session_id` with audio attached. Does not
    /// create or reset a turn-by-turn session, but analyses of the replaced list are dropped.
    pub async fn generate_questions(&self, session_id: &str) -> Result<Vec<Question>, InterviewError> {
        let (resume, jd) = self.load_documents(session_id).await?;
        let mut questions = prepare_questions(self.questions.generate(&resume, &jd).await);

        {
            let _guard = self.locks.acquire(session_id).await;
            self.clear_analyses(session_id).await?;
            save_as(
                self.store.as_ref(),
                session_id,
                &DataKind::Questions,
                &questions,
            )
            .await?;
        }
        self.locks.prune();

        for question in questions.iter_mut() {
            if let Some(stored) = question_audio(
                self.store.as_ref(),
                self.synthesizer.as_ref(),
                session_id,
                question,
            )
            .await
            {
                question.attach_audio(stored.audio, stored.voice_id);
            }
        }
        Ok(questions)
    }

    /// A stored question with its audio attached, synthesised on first request. The
    /// question comes back without audio when speech is unavailable.
    pub async fn question_audio(
        &self,
        session_id: &str,
        question_id: u32,
    ) -> Result<Question, InterviewError> {
        let mut question = self.find_question(session_id, question_id).await?;
        if let Some(stored) = question_audio(
            self.store.as_ref(),
            self.synthesizer.as_ref(),
            session_id,
            &question,
        )
        .await
        {
            question.attach_audio(stored.audio, stored.voice_id);
        }
        Ok(question)
    }

    // ── internals ───────────────────────────────────────────────────────────

    async fn load_documents(&self, session_id: &str) -> Result<(String, String), InterviewError> {
        let resume = load_as::<ExtractedDocument>(self.store.as_ref(), session_id, &DataKind::Resume)
            .await?
            .map(|d| d.text)
            .unwrap_or_default();
        if resume.trim().is_empty() {
            return Err(InterviewError::MissingResume);
        }
        let jd = load_as::<ExtractedDocument>(
            self.store.as_ref(),
            session_id,
            &DataKind::JobDescription,
        )
        .await?
        .map(|d| d.text)
        .unwrap_or_default();
        Ok((resume, jd))
    }

    async fn load_session(&self, session_id: &str) -> Result<Session, InterviewError> {
        load_as::<Session>(self.store.as_ref(), session_id, &DataKind::Session)
            .await?
            .ok_or_else(|| InterviewError::SessionNotFound(session_id.to_string()))
    }

    async fn load_questions(&self, session_id: &str) -> Result<Vec<Question>, InterviewError> {
        let questions =
            load_as::<Vec<Question>>(self.store.as_ref(), session_id, &DataKind::Questions)
                .await?
                .unwrap_or_default();
        if questions.is_empty() {
            return Err(InterviewError::NoData(session_id.to_string()));
        }
        Ok(questions)
    }

    async fn find_question(
        &self,
        session_id: &str,
        question_id: u32,
    ) -> Result<Question, InterviewError> {
        self.load_questions(session_id)
            .await?
            .into_iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| InterviewError::QuestionNotFound {
                session_id: session_id.to_string(),
                question_id,
            })
    }

    /// Deletes the analyses recorded against the currently stored question list. Callers
    /// hold the session lock and are about to replace that list.
    async fn clear_analyses(&self, session_id: &str) -> Result<(), InterviewError> {
        let previous =
            match load_as::<Vec<Question>>(self.store.as_ref(), session_id, &DataKind::Questions)
                .await
            {
                Ok(previous) => previous.unwrap_or_default(),
                Err(e) => {
                    warn!("Previous questions for {session_id} unreadable: {e}");
                    Vec::new()
                }
            };
        for question in &previous {
            self.store
                .delete(session_id, &DataKind::Analysis(question.id))
                .await?;
        }
        if !previous.is_empty() {
            debug!(
                "Cleared analyses of {} previous questions for {session_id}",
                previous.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::audio::tests::EchoSynthesizer;
    use crate::interview::audio::spawn_audio_worker;
    use crate::interview::questions::KeywordQuestionProvider;
    use crate::storage::{LocalStore, StoreError, TieredStore};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    const SID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
    const RESUME: &str = "5 years Python, AWS, led a team of 4";

    struct Fixture {
        _dir: TempDir,
        store: Arc<dyn SessionStore>,
        service: Arc<InterviewService>,
    }

    /// Provider whose questions change on every call, as an LLM's would.
    #[derive(Default)]
    struct RoundProvider {
        round: AtomicUsize,
    }

    #[async_trait]
    impl QuestionProvider for RoundProvider {
        fn name(&self) -> &'static str {
            "rounds"
        }

        async fn generate(&self, _resume: &str, _jd: &str) -> Vec<Question> {
            let round = self.round.fetch_add(1, Ordering::SeqCst);
            vec![
                Question::new(1, "Tell me about yourself.", QuestionKind::Introduction),
                Question::new(2, format!("Technical round {round}"), QuestionKind::Technical),
            ]
        }
    }

    /// Local store whose analysis writes can be switched to fail.
    struct FlakyStore {
        inner: TieredStore,
        fail_analysis: AtomicBool,
    }

    #[async_trait]
    impl SessionStore for FlakyStore {
        async fn save(
            &self,
            session_id: &str,
            kind: &DataKind,
            value: &Value,
        ) -> Result<String, StoreError> {
            if matches!(kind, DataKind::Analysis(_)) && self.fail_analysis.load(Ordering::SeqCst) {
                return Err(StoreError::S3("bucket unavailable".to_string()));
            }
            self.inner.save(session_id, kind, value).await
        }

        async fn load(&self, session_id: &str, kind: &DataKind) -> Value {
            self.inner.load(session_id, kind).await
        }

        async fn delete(&self, session_id: &str, kind: &DataKind) -> Result<(), StoreError> {
            self.inner.delete(session_id, kind).await
        }

        async fn save_blob(
            &self,
            session_id: &str,
            name: &str,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> Result<String, StoreError> {
            self.inner.save_blob(session_id, name, bytes, content_type).await
        }

        async fn load_blob(&self, session_id: &str, name: &str) -> Option<Vec<u8>> {
            self.inner.load_blob(session_id, name).await
        }
    }

    fn build(
        dir: TempDir,
        store: Arc<dyn SessionStore>,
        questions: Arc<dyn QuestionProvider>,
        audio: AudioHook,
    ) -> Fixture {
        let service = InterviewService::new(
            store.clone(),
            questions,
            Arc::new(AnswerAnalyzer::new(None, 100, Duration::from_secs(1))),
            Arc::new(EchoSynthesizer::default()),
            audio,
        );
        Fixture {
            _dir: dir,
            store,
            service: Arc::new(service),
        }
    }

    fn fixture_with_hook(hook: impl FnOnce(Arc<dyn SessionStore>) -> AudioHook) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn SessionStore> =
            Arc::new(TieredStore::local_only(LocalStore::new(dir.path())));
        let audio = hook(store.clone());
        build(dir, store, Arc::new(KeywordQuestionProvider), audio)
    }

    fn fixture() -> Fixture {
        fixture_with_hook(|_| AudioHook::disabled())
    }

    async fn upload_resume(f: &Fixture, text: &str) {
        f.store
            .save(SID, &DataKind::Resume, &json!({ "text": text }))
            .await
            .unwrap();
    }

    async fn stored_session(f: &Fixture) -> Session {
        load_as::<Session>(f.store.as_ref(), SID, &DataKind::Session)
            .await
            .unwrap()
            .unwrap()
    }

    const ANSWER: &str = "I am a software engineer with 5 years experience building backend \
                          systems in Python on AWS for a payments team.";

    #[tokio::test]
    async fn test_start_requires_resume() {
        let f = fixture();
        let err = f.service.start(SID, DifficultyLevel::Baseline).await.unwrap_err();
        assert!(matches!(err, InterviewError::MissingResume));

        upload_resume(&f, "   ").await;
        let err = f.service.start(SID, DifficultyLevel::Baseline).await.unwrap_err();
        assert!(matches!(err, InterviewError::MissingResume));
    }

    #[tokio::test]
    async fn test_start_opens_with_unscored_introduction() {
        let f = fixture();
        upload_resume(&f, RESUME).await;

        let started = f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();
        let first = started.first_question.unwrap();
        assert_eq!(first.kind, QuestionKind::Introduction);
        assert!(!first.is_scored);
        assert_eq!(first.id, 1);
        assert_eq!(started.question_source, "keyword");

        let session = stored_session(&f).await;
        for (i, q) in session.questions.iter().enumerate() {
            assert_eq!(q.id, i as u32 + 1);
        }
        assert_eq!(started.total_questions, session.questions.len());
    }

    #[tokio::test]
    async fn test_introduction_answer_is_accepted() {
        let f = fixture();
        upload_resume(&f, RESUME).await;
        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();

        let outcome = f.service.submit_answer(SID, 1, ANSWER, 12.5).await.unwrap();
        assert!(outcome.analysis.is_relevant);
        assert_eq!(outcome.next_question.unwrap().id, 2);
        assert!(!outcome.is_complete);
        assert_eq!(outcome.session_progress.completed, 1);
        assert_eq!(outcome.session_progress.average_score, 0.0);
    }

    #[tokio::test]
    async fn test_mismatch_leaves_session_unchanged() {
        let f = fixture();
        upload_resume(&f, RESUME).await;
        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();
        let before = stored_session(&f).await;

        let err = f.service.submit_answer(SID, 3, ANSWER, 1.0).await.unwrap_err();
        assert!(matches!(
            err,
            InterviewError::QuestionMismatch {
                expected: 1,
                received: 3
            }
        ));
        assert_eq!(stored_session(&f).await, before);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let f = fixture();
        let err = f.service.submit_answer(SID, 1, ANSWER, 1.0).await.unwrap_err();
        assert!(matches!(err, InterviewError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_advance_once() {
        let f = fixture();
        upload_resume(&f, RESUME).await;
        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();

        let a = {
            let service = f.service.clone();
            tokio::spawn(async move { service.submit_answer(SID, 1, ANSWER, 1.0).await })
        };
        let b = {
            let service = f.service.clone();
            tokio::spawn(async move { service.submit_answer(SID, 1, ANSWER, 1.0).await })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(InterviewError::QuestionMismatch { .. }))));
        let session = stored_session(&f).await;
        assert_eq!(session.current_question_index, 1);
        assert_eq!(session.question_history.len(), 1);
    }

    #[tokio::test]
    async fn test_full_interview_completes_and_rejects_more_answers() {
        let f = fixture();
        f.service
            .start_with_documents(SID, RESUME, "", DifficultyLevel::Baseline)
            .await
            .unwrap();
        let total = stored_session(&f).await.questions.len() as u32;

        let mut last = None;
        for id in 1..=total {
            last = Some(f.service.submit_answer(SID, id, ANSWER, 5.0).await.unwrap());
        }
        let last = last.unwrap();
        assert!(last.is_complete);
        assert!(last.next_question.is_none());
        assert_eq!(last.session_progress.completed, total as usize);

        let err = f.service.submit_answer(SID, total, ANSWER, 1.0).await.unwrap_err();
        assert!(matches!(err, InterviewError::SessionComplete(_)));
    }

    #[tokio::test]
    async fn test_summary_aggregates_persisted_analyses() {
        let f = fixture();
        let err = f.service.summary(SID).await.unwrap_err();
        assert!(matches!(err, InterviewError::NoData(_)));

        upload_resume(&f, RESUME).await;
        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();
        let empty = f.service.summary(SID).await.unwrap();
        assert_eq!(empty.answered_questions, 0);
        assert_eq!(empty.average_score, 0.0);
        assert_eq!(empty.questions_by_type[&QuestionKind::Introduction], 1);

        f.service.submit_answer(SID, 1, ANSWER, 1.0).await.unwrap();
        let second = f.service.submit_answer(SID, 2, ANSWER, 1.0).await.unwrap();
        let summary = f.service.summary(SID).await.unwrap();
        assert_eq!(summary.answered_questions, 2);
        assert_eq!(
            summary.average_score,
            f64::from(second.analysis.overall_score)
        );
    }

    #[tokio::test]
    async fn test_complete_interview_persists_report() {
        let f = fixture();
        let report = f.service.complete_interview(SID, &[], 0.0).await;
        assert_eq!(report.overall_score, 5.0);

        let stored = load_as::<FinalReport>(f.store.as_ref(), SID, &DataKind::FinalReport)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.overall_score, 5.0);
    }

    #[tokio::test]
    async fn test_question_audio_lookup() {
        let f = fixture();
        upload_resume(&f, RESUME).await;
        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();

        let question = f.service.question_audio(SID, 1).await.unwrap();
        assert!(question.has_audio);
        assert!(question.audio.unwrap().starts_with("audio:"));

        let err = f.service.question_audio(SID, 99).await.unwrap_err();
        assert!(matches!(err, InterviewError::QuestionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_next_question_carries_prefetched_audio() {
        let f = fixture_with_hook(|store| {
            spawn_audio_worker(store, Arc::new(EchoSynthesizer::default())).0
        });
        upload_resume(&f, RESUME).await;
        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();

        let second = stored_session(&f).await.questions[1].clone();
        for _ in 0..50 {
            if stored_audio(f.store.as_ref(), SID, &second).await.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let outcome = f.service.submit_answer(SID, 1, ANSWER, 1.0).await.unwrap();
        let next = outcome.next_question.unwrap();
        assert!(next.has_audio);
        assert_eq!(next.voice_id.as_deref(), Some("Joanna"));
    }

    #[tokio::test]
    async fn test_analyze_answer_feeds_summary() {
        let f = fixture();
        upload_resume(&f, RESUME).await;
        f.service.generate_questions(SID).await.unwrap();

        let record = f.service.analyze_answer(SID, 2, ANSWER).await.unwrap();
        assert_eq!(record.question_id, 2);
        let summary = f.service.summary(SID).await.unwrap();
        assert_eq!(summary.answered_questions, 1);
    }

    #[tokio::test]
    async fn test_regenerated_questions_get_matching_audio() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn SessionStore> =
            Arc::new(TieredStore::local_only(LocalStore::new(dir.path())));
        let f = build(
            dir,
            store,
            Arc::new(RoundProvider::default()),
            AudioHook::disabled(),
        );
        upload_resume(&f, RESUME).await;

        let first = f.service.generate_questions(SID).await.unwrap();
        assert_eq!(first[1].audio.as_deref(), Some("audio:Technical round 0"));

        let second = f.service.generate_questions(SID).await.unwrap();
        assert_eq!(second[1].question, "Technical round 1");
        assert_eq!(second[1].audio.as_deref(), Some("audio:Technical round 1"));

        let lazy = f.service.question_audio(SID, 2).await.unwrap();
        assert_eq!(lazy.audio.as_deref(), Some("audio:Technical round 1"));
    }

    #[tokio::test]
    async fn test_failed_analysis_write_leaves_session_unadvanced() {
        let dir = tempfile::tempdir().unwrap();
        let flaky = Arc::new(FlakyStore {
            inner: TieredStore::local_only(LocalStore::new(dir.path())),
            fail_analysis: AtomicBool::new(false),
        });
        let f = build(
            dir,
            flaky.clone(),
            Arc::new(KeywordQuestionProvider),
            AudioHook::disabled(),
        );
        upload_resume(&f, RESUME).await;
        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();

        flaky.fail_analysis.store(true, Ordering::SeqCst);
        let err = f.service.submit_answer(SID, 1, ANSWER, 1.0).await.unwrap_err();
        assert!(matches!(err, InterviewError::Store(_)));
        let session = stored_session(&f).await;
        assert_eq!(session.current_question_index, 0);
        assert!(session.question_history.is_empty());

        flaky.fail_analysis.store(false, Ordering::SeqCst);
        let outcome = f.service.submit_answer(SID, 1, ANSWER, 1.0).await.unwrap();
        assert_eq!(outcome.next_question.unwrap().id, 2);
        assert_eq!(f.service.summary(SID).await.unwrap().answered_questions, 1);
    }

    #[tokio::test]
    async fn test_restart_clears_previous_answers() {
        let f = fixture();
        upload_resume(&f, RESUME).await;
        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();
        f.service.submit_answer(SID, 1, ANSWER, 1.0).await.unwrap();
        f.service.submit_answer(SID, 2, ANSWER, 1.0).await.unwrap();
        assert_eq!(f.service.summary(SID).await.unwrap().answered_questions, 2);

        f.service.start(SID, DifficultyLevel::Baseline).await.unwrap();
        let summary = f.service.summary(SID).await.unwrap();
        assert_eq!(summary.answered_questions, 0);
        assert_eq!(summary.average_score, 0.0);
        assert!(stored_session(&f).await.question_history.is_empty());
    }
}
