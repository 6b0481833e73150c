use std::sync::Arc;

use crate::analysis::AnswerAnalyzer;
use crate::config::Config;
use crate::interview::followup::FollowupGenerator;
use crate::interview::InterviewService;
use crate::posture::PostureAnalyzer;
use crate::speech::{SpeechRecognizer, SpeechSynthesizer};
use crate::storage::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Tiered session store: local data directory, optionally backed by S3.
    pub store: Arc<dyn SessionStore>,
    pub interview: Arc<InterviewService>,
    /// Shared with `interview`; transcript analysis uses it directly.
    pub analyzer: Arc<AnswerAnalyzer>,
    pub followups: Arc<FollowupGenerator>,
    /// Polly when speech is enabled, otherwise a synthesizer that produces no audio.
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Transcribe when speech is enabled and an S3 bucket is configured.
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub posture: Arc<dyn PostureAnalyzer>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::interview::audio::AudioHook;
    use crate::interview::questions::KeywordQuestionProvider;
    use crate::posture::CannedPostureAnalyzer;
    use crate::speech::{DisabledRecognizer, DisabledSynthesizer};
    use crate::storage::{LocalStore, TieredStore};

    pub fn test_config(data_dir: &Path) -> Config {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            data_dir: data_dir.to_path_buf(),
            s3_bucket: None,
            s3_endpoint: None,
            aws_region: "us-west-2".to_string(),
            anthropic_api_key: None,
            analysis_timeout: Duration::from_secs(1),
            analysis_cache_capacity: 100,
            session_retention: Duration::from_secs(3600),
            default_voice: "Joanna".to_string(),
            enable_speech: false,
        }
    }

    /// Fully offline state over a local store rooted at `data_dir`.
    pub fn test_state(data_dir: &Path) -> AppState {
        let config = test_config(data_dir);
        let store: Arc<dyn SessionStore> =
            Arc::new(TieredStore::local_only(LocalStore::new(data_dir)));
        let synthesizer: Arc<dyn SpeechSynthesizer> =
            Arc::new(DisabledSynthesizer::new(config.default_voice.clone()));
        let analyzer = Arc::new(AnswerAnalyzer::new(
            None,
            config.analysis_cache_capacity,
            config.analysis_timeout,
        ));
        let interview = Arc::new(InterviewService::new(
            store.clone(),
            Arc::new(KeywordQuestionProvider),
            analyzer.clone(),
            synthesizer.clone(),
            AudioHook::disabled(),
        ));

        AppState {
            followups: Arc::new(FollowupGenerator::new(None, config.analysis_timeout)),
            config,
            store,
            interview,
            analyzer,
            synthesizer,
            recognizer: Arc::new(DisabledRecognizer),
            posture: Arc::new(CannedPostureAnalyzer),
        }
    }
}
