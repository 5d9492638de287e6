//! Deterministic in-memory source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use super::CatalogSource;
use crate::error::SourceError;
use crate::registry::MOCK;
use crate::types::RawModel;

/// Bounds of the default simulated latency, in milliseconds.
const DEFAULT_DELAY_MS: (u64, u64) = (500, 800);

/// Serves a fixed list after an artificial delay.
///
/// Never fails unless built with [`failing`](MockSource::failing).
#[derive(Debug)]
pub struct MockSource {
    id: String,
    provider_id: String,
    models: Vec<RawModel>,
    delay: Option<Duration>,
    fail: bool,
    fetches: AtomicUsize,
}

impl MockSource {
    /// Mock source serving [`fixture_models`] with 500–800 ms of latency.
    pub fn new() -> Self {
        Self {
            id: MOCK.id.to_string(),
            provider_id: MOCK.id.to_string(),
            models: fixture_models(),
            delay: None,
            fail: false,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Serve these models instead of the fixtures.
    pub fn with_models(mut self, models: Vec<RawModel>) -> Self {
        self.models = models;
        self
    }

    /// Use a fixed delay instead of random jitter.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Register under a different source id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Normalize results with another provider's rules.
    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = provider_id.into();
        self
    }

    /// Fail every fetch with `SourceError::FetchFailed`.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of times `fetch` has been called.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn latency(&self) -> Duration {
        self.delay.unwrap_or_else(|| {
            let (lo, hi) = DEFAULT_DELAY_MS;
            Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
        })
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogSource for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    async fn fetch(&self) -> Result<Vec<RawModel>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency();
        debug!(source = %self.id, ?latency, "mock fetch");
        tokio::time::sleep(latency).await;

        if self.fail {
            return Err(SourceError::FetchFailed);
        }
        Ok(self.models.clone())
    }
}

/// The hand-authored fixture list served by [`MockSource::new`].
pub fn fixture_models() -> Vec<RawModel> {
    vec![
        RawModel::new("gemini-2.5-pro")
            .display_name("Gemini 2.5 Pro")
            .created(1_742_860_800)
            .owned_by("google")
            .short_description("Most capable thinking model")
            .description("Enhanced reasoning, multimodal understanding and advanced coding.")
            .input("Audio, images, videos, text, and PDF")
            .output("Text")
            .capability("thinking")
            .capability("code execution")
            .method("generateContent"),
        RawModel::new("gemini-2.5-flash")
            .display_name("Gemini 2.5 Flash")
            .created(1_745_366_400)
            .owned_by("google")
            .short_description("Best price-performance")
            .description("Adaptive thinking and cost efficiency for high-volume tasks.")
            .input("Audio, images, videos, and text")
            .output("Text")
            .capability("thinking")
            .method("generateContent"),
        RawModel::new("gemini-2.5-flash-preview-tts")
            .created(1_747_353_600)
            .owned_by("google")
            .short_description("Controllable speech generation")
            .input("Text")
            .output("Audio")
            .method("generateContent"),
        RawModel::new("gemini-2.0-flash-live-001")
            .display_name("Gemini 2.0 Flash Live")
            .created(1_744_156_800)
            .owned_by("google")
            .short_description("Low-latency bidirectional voice and video")
            .input("Audio, video, and text")
            .output("Text, audio")
            .method("bidiGenerateContent"),
        RawModel::new("gemini-2.0-flash-exp-image-generation")
            .created(1_741_737_600)
            .owned_by("google")
            .short_description("Conversational image generation")
            .input("Audio, images, videos, and text")
            .output("Text, images (experimental)")
            .method("generateContent"),
        RawModel::new("imagen-3.0-generate-002")
            .display_name("Imagen 3")
            .created(1_738_713_600)
            .owned_by("google")
            .short_description("Highest quality text-to-image model")
            .input("Text")
            .output("Images")
            .method("predict"),
        RawModel::new("veo-2.0-generate-001")
            .display_name("Veo 2")
            .created(1_744_243_200)
            .owned_by("google")
            .short_description("High quality text- and image-to-video model")
            .input("Text, images")
            .output("Video")
            .method("predictLongRunning"),
        RawModel::new("gemini-embedding-001")
            .created(1_747_094_400)
            .owned_by("google")
            .short_description("Text embeddings")
            .description("Measures the relatedness of text strings.")
            .input("Text")
            .method("embedContent"),
        RawModel::new("learnlm-2.0-flash-experimental")
            .created(1_744_848_000)
            .owned_by("google")
            .short_description("Learning-science tuned tutor model")
            .method("generateContent"),
        RawModel::new("aqa")
            .display_name("Attributed Question Answering")
            .created(1_702_339_200)
            .owned_by("google")
            .short_description("Grounded answers with attributions")
            .description("Answers questions grounded in provided sources."),
    ]
}
