mod analysis;
mod config;
mod documents;
mod errors;
mod interview;
mod llm_client;
mod models;
mod posture;
mod routes;
mod speech;
mod state;
mod storage;

use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::scorer::{AnswerScorer, LlmAnswerScorer};
use crate::analysis::AnswerAnalyzer;
use crate::config::Config;
use crate::interview::audio::{spawn_audio_worker, AudioHook};
use crate::interview::followup::FollowupGenerator;
use crate::interview::questions::{KeywordQuestionProvider, LlmQuestionProvider, QuestionProvider};
use crate::interview::InterviewService;
use crate::llm_client::LlmClient;
use crate::posture::{CannedPostureAnalyzer, LlmPostureAnalyzer, PostureAnalyzer};
use crate::routes::build_router;
use crate::speech::{
    DisabledRecognizer, DisabledSynthesizer, PollySynthesizer, SpeechRecognizer,
    SpeechSynthesizer, TranscribeRecognizer,
};
use crate::state::AppState;
use crate::storage::retention::spawn_retention_sweep;
use crate::storage::{LocalStore, ObjectStore, S3Store, SessionStore, TieredStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interviewer API v{}", env!("CARGO_PKG_VERSION"));

    let aws = load_aws_config(&config).await;

    // Session store: local data directory, S3 when a bucket is configured
    let local = LocalStore::new(config.data_dir.clone());
    let remote = config.s3_bucket.as_ref().map(|bucket| {
        info!("S3 session store enabled (bucket: {bucket})");
        S3Store::new(build_s3_client(&aws, &config), bucket.clone())
    });
    if remote.is_none() {
        warn!(
            "S3_BUCKET not set; sessions live only in {}",
            config.data_dir.display()
        );
    }
    let backup = remote
        .clone()
        .map(|s3| Arc::new(s3) as Arc<dyn ObjectStore>);
    let store: Arc<dyn SessionStore> = Arc::new(TieredStore::new(local.clone(), backup));
    let _retention = spawn_retention_sweep(local, config.session_retention);

    // LLM-backed collaborators, with local fallbacks when no key is configured
    let llm = config.anthropic_api_key.clone().map(LlmClient::new);
    let (scorer, questions, posture): (
        Option<Arc<dyn AnswerScorer>>,
        Arc<dyn QuestionProvider>,
        Arc<dyn PostureAnalyzer>,
    ) = match &llm {
        Some(llm) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            (
                Some(Arc::new(LlmAnswerScorer::new(llm.clone()))),
                Arc::new(LlmQuestionProvider::new(llm.clone())),
                Arc::new(LlmPostureAnalyzer::new(llm.clone(), config.analysis_timeout)),
            )
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; using local question bank and heuristic scoring");
            (
                None,
                Arc::new(KeywordQuestionProvider),
                Arc::new(CannedPostureAnalyzer),
            )
        }
    };
    let analyzer = Arc::new(AnswerAnalyzer::new(
        scorer,
        config.analysis_cache_capacity,
        config.analysis_timeout,
    ));
    let followups = Arc::new(FollowupGenerator::new(llm, config.analysis_timeout));

    // Speech
    let (synthesizer, recognizer): (Arc<dyn SpeechSynthesizer>, Arc<dyn SpeechRecognizer>) =
        if config.enable_speech {
            let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(PollySynthesizer::new(
                aws_sdk_polly::Client::new(&aws),
                config.default_voice.clone(),
            ));
            let recognizer: Arc<dyn SpeechRecognizer> = match remote {
                Some(staging) => Arc::new(TranscribeRecognizer::new(
                    aws_sdk_transcribe::Client::new(&aws),
                    staging,
                )),
                None => {
                    warn!("Speech-to-text needs S3_BUCKET for staging; transcription disabled");
                    Arc::new(DisabledRecognizer)
                }
            };
            info!("Speech enabled (default voice: {})", config.default_voice);
            (synthesizer, recognizer)
        } else {
            info!("Speech disabled");
            (
                Arc::new(DisabledSynthesizer::new(config.default_voice.clone())),
                Arc::new(DisabledRecognizer),
            )
        };

    let audio = if config.enable_speech {
        let (hook, _worker) = spawn_audio_worker(store.clone(), synthesizer.clone());
        hook
    } else {
        AudioHook::disabled()
    };

    let interview = Arc::new(InterviewService::new(
        store.clone(),
        questions,
        analyzer.clone(),
        synthesizer.clone(),
        audio,
    ));
    info!("Question source: {}", interview.question_source());

    let state = AppState {
        config: config.clone(),
        store,
        interview,
        analyzer,
        followups,
        synthesizer,
        recognizer,
        posture,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared AWS configuration: default credential chain, configured region, optional
/// endpoint override (MinIO or LocalStack in development).
async fn load_aws_config(config: &Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    loader.load().await
}

/// S3 client; path-style addressing when an endpoint override is set.
fn build_s3_client(aws: &SdkConfig, config: &Config) -> aws_sdk_s3::Client {
    let s3_config = aws_sdk_s3::config::Builder::from(aws)
        .force_path_style(config.s3_endpoint.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
