//! Scripted [`GenerationApi`] implementation for session tests.

use api_client::{
    ApiError, ExtendVideoRequest, ExtendVideoResponse, GenerateRequest, GenerateResponse,
    GenerationApi, GenerationMode, ImprovePromptResponse, MediaDescriptor,
    NaturalLanguageResponse, TagsResponse, VideoRequest, VideoResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock backend: queued responses pop in order; an empty queue answers
/// with a benign default so tests only script what they assert on.
#[derive(Default)]
pub struct MockApi {
    generate: Mutex<VecDeque<Result<GenerateResponse, ApiError>>>,
    generate_delay: Mutex<Option<Duration>>,
    pub generate_calls: Mutex<Vec<GenerateRequest>>,
    video: Mutex<VecDeque<Result<VideoResponse, ApiError>>>,
    pub video_calls: Mutex<Vec<VideoRequest>>,
    extend: Mutex<VecDeque<Result<ExtendVideoResponse, ApiError>>>,
    tags: Mutex<VecDeque<Result<TagsResponse, ApiError>>>,
    pub tags_calls: Mutex<Vec<(String, Vec<String>)>>,
    improve: Mutex<VecDeque<Result<ImprovePromptResponse, ApiError>>>,
    natural: Mutex<VecDeque<Result<NaturalLanguageResponse, ApiError>>>,
    pub stop_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generate_delay(self, delay: Duration) -> Self {
        *self.generate_delay.lock() = Some(delay);
        self
    }

    pub fn push_generate(&self, result: Result<GenerateResponse, ApiError>) {
        self.generate.lock().push_back(result);
    }

    pub fn push_video(&self, result: Result<VideoResponse, ApiError>) {
        self.video.lock().push_back(result);
    }

    pub fn push_extend(&self, result: Result<ExtendVideoResponse, ApiError>) {
        self.extend.lock().push_back(result);
    }

    pub fn push_tags(&self, result: Result<TagsResponse, ApiError>) {
        self.tags.lock().push_back(result);
    }

    pub fn push_improve(&self, result: Result<ImprovePromptResponse, ApiError>) {
        self.improve.lock().push_back(result);
    }

    pub fn push_natural(&self, result: Result<NaturalLanguageResponse, ApiError>) {
        self.natural.lock().push_back(result);
    }

    pub fn stop_call_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationApi for MockApi {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        self.generate_calls.lock().push(request.clone());
        let delay = *self.generate_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self.generate.lock().pop_front();
        queued.unwrap_or_else(|| {
            Ok(GenerateResponse {
                success: true,
                images: vec![MediaDescriptor::output("gen.png", "")],
                error: None,
            })
        })
    }

    async fn stop_generation(&self, _mode: GenerationMode) -> Result<(), ApiError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn generate_video(&self, request: &VideoRequest) -> Result<VideoResponse, ApiError> {
        self.video_calls.lock().push(request.clone());
        let queued = self.video.lock().pop_front();
        queued.unwrap_or_else(|| {
            Ok(VideoResponse {
                success: true,
                videos: vec![MediaDescriptor::output("clip.mp4", "")],
                prompt_id: None,
                error: None,
            })
        })
    }

    async fn extend_video(
        &self,
        _request: &ExtendVideoRequest,
    ) -> Result<ExtendVideoResponse, ApiError> {
        let queued = self.extend.lock().pop_front();
        queued.unwrap_or_else(|| Ok(ExtendVideoResponse::default()))
    }

    async fn tags(&self, category: &str, excluded: &[String]) -> Result<TagsResponse, ApiError> {
        self.tags_calls
            .lock()
            .push((category.to_string(), excluded.to_vec()));
        let queued = self.tags.lock().pop_front();
        queued.unwrap_or_else(|| {
            Ok(TagsResponse {
                success: true,
                tags: Vec::new(),
                error: None,
            })
        })
    }

    async fn improve_prompt(
        &self,
        _prompt: &str,
        _step_name: &str,
    ) -> Result<ImprovePromptResponse, ApiError> {
        let queued = self.improve.lock().pop_front();
        queued.unwrap_or_else(|| Ok(ImprovePromptResponse::default()))
    }

    async fn to_natural_language(
        &self,
        _prompt: &str,
    ) -> Result<NaturalLanguageResponse, ApiError> {
        let queued = self.natural.lock().pop_front();
        queued.unwrap_or_else(|| Ok(NaturalLanguageResponse::default()))
    }
}
