use crate::{
    ApiError, ClientConfig, ExtendVideoRequest, ExtendVideoResponse, GenerateRequest,
    GenerateResponse, GenerationMode, ImprovePromptResponse, NaturalLanguageResponse,
    TagsResponse, VideoRequest, VideoResponse,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// The backend surface the session layer consumes. Implemented over HTTP
/// in production; tests substitute a scripted implementation.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Submit one image generation (or edit) request.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError>;

    /// Ask the backend to abort in-flight server-side work. Best-effort;
    /// callers must not treat failure as fatal.
    async fn stop_generation(&self, mode: GenerationMode) -> Result<(), ApiError>;

    /// Generate a video from a source image.
    async fn generate_video(&self, request: &VideoRequest) -> Result<VideoResponse, ApiError>;

    /// Extend an existing video with a newly generated tail segment.
    async fn extend_video(
        &self,
        request: &ExtendVideoRequest,
    ) -> Result<ExtendVideoResponse, ApiError>;

    /// Candidate tags for a wizard step category, minus `excluded`.
    async fn tags(&self, category: &str, excluded: &[String]) -> Result<TagsResponse, ApiError>;

    /// Ask the AI collaborator to improve a step fragment.
    async fn improve_prompt(
        &self,
        prompt: &str,
        step_name: &str,
    ) -> Result<ImprovePromptResponse, ApiError>;

    /// Rewrite a tag prompt as natural language.
    async fn to_natural_language(
        &self,
        prompt: &str,
    ) -> Result<NaturalLanguageResponse, ApiError>;
}

/// Production client over `reqwest`.
pub struct HttpGenerationClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpGenerationClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POST a JSON body and decode the JSON reply. The backend reports
    /// its own failures as `{success: false, error}` bodies, also on
    /// non-2xx statuses, so the payload is decoded regardless of status.
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        response
            .json::<R>()
            .await
            .map_err(|e| ApiError::InvalidPayload(e.to_string()))
    }
}

#[async_trait]
impl GenerationApi for HttpGenerationClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ApiError> {
        log::debug!(
            "generate: {}x{} mode={} prompt={:?}",
            request.width,
            request.height,
            request.mode,
            request.prompt
        );
        let mut request = request.clone();
        if request.steps.is_none() {
            request.steps = self.config.default_steps;
        }
        self.post_json("/api/generate", &request).await
    }

    async fn stop_generation(&self, mode: GenerationMode) -> Result<(), ApiError> {
        let body = serde_json::json!({ "mode": mode });
        // Fire-and-forget: the ack body carries nothing we act on.
        self.client
            .post(self.endpoint("/api/generate/stop"))
            .json(&body)
            .send()
            .await?;
        Ok(())
    }

    async fn generate_video(&self, request: &VideoRequest) -> Result<VideoResponse, ApiError> {
        self.post_json("/api/generate-video", request).await
    }

    async fn extend_video(
        &self,
        request: &ExtendVideoRequest,
    ) -> Result<ExtendVideoResponse, ApiError> {
        self.post_json("/api/video/extend", request).await
    }

    async fn tags(&self, category: &str, excluded: &[String]) -> Result<TagsResponse, ApiError> {
        let mut url = format!(
            "{}/api/tags/{}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(category)
        );
        if !excluded.is_empty() {
            url.push_str(&format!(
                "?excluded={}",
                urlencoding::encode(&excluded.join(","))
            ));
        }
        let response = self.client.get(url).send().await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidPayload(e.to_string()))
    }

    async fn improve_prompt(
        &self,
        prompt: &str,
        step_name: &str,
    ) -> Result<ImprovePromptResponse, ApiError> {
        let body = serde_json::json!({ "prompt": prompt, "step_name": step_name });
        self.post_json("/api/improve-prompt", &body).await
    }

    async fn to_natural_language(
        &self,
        prompt: &str,
    ) -> Result<NaturalLanguageResponse, ApiError> {
        let body = serde_json::json!({ "prompt": prompt });
        self.post_json("/api/convert-to-natural-language", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client =
            HttpGenerationClient::new(ClientConfig::new("http://localhost:5000/")).unwrap();
        assert_eq!(client.endpoint("/api/generate"), "http://localhost:5000/api/generate");
    }

    #[test]
    fn test_endpoint_keeps_single_slash() {
        let client =
            HttpGenerationClient::new(ClientConfig::new("http://localhost:5000")).unwrap();
        assert_eq!(
            client.endpoint("/api/generate/stop"),
            "http://localhost:5000/api/generate/stop"
        );
    }
}
