//! Question audio as a post-commit side effect.
//!
//! State transitions emit an [`AudioJob`] after the session is saved; a single worker task
//! synthesises and persists the audio. Nothing here can fail the transition that emitted it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::Question;
use crate::speech::SpeechSynthesizer;
use crate::storage::{load_as, save_as, DataKind, SessionStore};

const QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct AudioJob {
    pub session_id: String,
    pub question: Question,
}

/// Persisted audio for one question (kind `audio_<id>`). `question` is the text that was
/// voiced; ids are reused when a session's questions are regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAudio {
    pub question_id: u32,
    #[serde(default)]
    pub question: String,
    pub audio: String,
    pub voice_id: String,
}

impl StoredAudio {
    pub fn voices(&self, question: &Question) -> bool {
        self.question_id == question.id && self.question == question.question
    }
}

/// Sending half handed to the interview service.
#[derive(Clone)]
pub struct AudioHook {
    tx: Option<mpsc::Sender<AudioJob>>,
}

impl AudioHook {
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, session_id: &str, question: &Question) {
        let Some(tx) = &self.tx else {
            return;
        };
        let job = AudioJob {
            session_id: session_id.to_string(),
            question: question.clone(),
        };
        if let Err(e) = tx.try_send(job) {
            warn!(
                "Dropping audio job for session {session_id} question {}: {e}",
                question.id
            );
        }
    }
}

pub fn spawn_audio_worker(
    store: Arc<dyn SessionStore>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
) -> (AudioHook, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<AudioJob>(QUEUE_CAPACITY);
    let handle = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let produced = question_audio(
                store.as_ref(),
                synthesizer.as_ref(),
                &job.session_id,
                &job.question,
            )
            .await;
            if produced.is_none() {
                debug!(
                    "No audio produced for session {} question {}",
                    job.session_id, job.question.id
                );
            }
        }
        debug!("Audio worker stopped");
    });
    (AudioHook { tx: Some(tx) }, handle)
}

/// Stored audio for `question`, only if it voices the question's current text.
pub async fn stored_audio(
    store: &dyn SessionStore,
    session_id: &str,
    question: &Question,
) -> Option<StoredAudio> {
    match load_as::<StoredAudio>(store, session_id, &DataKind::QuestionAudio(question.id)).await {
        Ok(Some(existing)) if existing.voices(question) => Some(existing),
        Ok(Some(_)) => {
            debug!(
                "Stored audio for session {session_id} question {} is for older text",
                question.id
            );
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Ignoring unreadable audio record for question {}: {e}", question.id);
            None
        }
    }
}

/// Returns the stored audio for `question`, synthesising and persisting it when missing or
/// recorded for different text.
pub async fn question_audio(
    store: &dyn SessionStore,
    synthesizer: &dyn SpeechSynthesizer,
    session_id: &str,
    question: &Question,
) -> Option<StoredAudio> {
    if let Some(existing) = stored_audio(store, session_id, question).await {
        return Some(existing);
    }
    let kind = DataKind::QuestionAudio(question.id);

    let voice_id = synthesizer.interview_voice().await;
    let audio = synthesizer.speak(&question.question, &voice_id).await?;
    let stored = StoredAudio {
        question_id: question.id,
        question: question.question.clone(),
        audio,
        voice_id,
    };
    if let Err(e) = save_as(store, session_id, &kind, &stored).await {
        warn!("Failed to persist audio for question {}: {e}", question.id);
    }
    Some(stored)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::QuestionKind;
    use crate::speech::VoiceInfo;
    use crate::storage::{LocalStore, TieredStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Synthesizer that returns the text itself as "audio".
    #[derive(Default)]
    pub struct EchoSynthesizer {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechSynthesizer for EchoSynthesizer {
        async fn speak(&self, text: &str, _voice_id: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(format!("audio:{text}"))
        }

        async fn voices(&self) -> Vec<VoiceInfo> {
            Vec::new()
        }

        async fn interview_voice(&self) -> String {
            "Joanna".to_string()
        }
    }

    const SID: &str = "11111111-2222-3333-4444-555555555555";

    #[tokio::test]
    async fn test_question_audio_is_generated_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = TieredStore::local_only(LocalStore::new(dir.path()));
        let synth = EchoSynthesizer::default();
        let q = Question::new(1, "Hello", QuestionKind::Introduction);

        let first = question_audio(&store, &synth, SID, &q).await.unwrap();
        let second = question_audio(&store, &synth, SID, &q).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.audio, "audio:Hello");
        assert_eq!(synth.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reused_id_with_new_text_is_resynthesised() {
        let dir = tempfile::tempdir().unwrap();
        let store = TieredStore::local_only(LocalStore::new(dir.path()));
        let synth = EchoSynthesizer::default();

        let old = Question::new(2, "Technical round 0", QuestionKind::Technical);
        question_audio(&store, &synth, SID, &old).await.unwrap();

        let new = Question::new(2, "Technical round 1", QuestionKind::Technical);
        assert!(stored_audio(&store, SID, &new).await.is_none());
        let fresh = question_audio(&store, &synth, SID, &new).await.unwrap();
        assert_eq!(fresh.audio, "audio:Technical round 1");
        assert_eq!(synth.calls.load(Ordering::SeqCst), 2);

        let kept = stored_audio(&store, SID, &new).await.unwrap();
        assert_eq!(kept.question, "Technical round 1");
        assert!(stored_audio(&store, SID, &old).await.is_none());
    }

    #[tokio::test]
    async fn test_worker_persists_emitted_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn SessionStore> =
            Arc::new(TieredStore::local_only(LocalStore::new(dir.path())));
        let (hook, _handle) = spawn_audio_worker(store.clone(), Arc::new(EchoSynthesizer::default()));

        let q = Question::new(2, "Why Rust?", QuestionKind::Custom);
        hook.emit(SID, &q);

        let mut stored = None;
        for _ in 0..50 {
            stored = load_as::<StoredAudio>(store.as_ref(), SID, &DataKind::QuestionAudio(2))
                .await
                .unwrap();
            if stored.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(stored.unwrap().audio, "audio:Why Rust?");
    }

    #[test]
    fn test_disabled_hook_is_silent() {
        let q = Question::new(1, "Hi", QuestionKind::Introduction);
        AudioHook::disabled().emit(SID, &q);
    }
}
