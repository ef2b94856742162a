use crate::{ChatLog, ResponseState, SessionError, TagPool};
use api_client::{GenerateRequest, GenerationApi, GenerationMode, Model};
use parking_lot::Mutex;
use prompt::{
    append_fragment, clean_ai_response, has_content, is_natural_language, join_fragment,
    normalize, step_at, step_count, Resolution, Step,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Prompt used for a final-step generation when the whole flow produced
/// no usable text.
pub const FINAL_STEP_FALLBACK_PROMPT: &str = "high quality, detailed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Step-by-step wizard.
    Interactive,
    /// Chat-style free prompt.
    Direct,
}

/// State-change notifications for a presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MessageAppended(u64),
    MessageSettled(u64),
    StepChanged(usize),
    TagsChanged,
    FlowCompleted,
    FlowReset,
}

type Observer = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Cancellation slot shared between a session and its stop handles.
/// Holds at most one in-flight request's sender; installing a new one
/// invalidates the previous handle by construction, since only one
/// request is ever in flight.
struct CancelState {
    cancel: Option<oneshot::Sender<()>>,
    stop_pending: bool,
}

/// Cloneable handle that can stop the in-flight generation while the
/// session itself is suspended inside `generate`.
#[derive(Clone)]
pub struct StopHandle {
    state: Arc<Mutex<CancelState>>,
    api: Arc<dyn GenerationApi>,
    mode: GenerationMode,
}

impl StopHandle {
    /// Signal local cancellation, then best-effort ask the backend to
    /// abort server-side work. No-op when nothing is in flight or a stop
    /// is already pending.
    pub async fn stop(&self) {
        let sender = {
            let mut state = self.state.lock();
            if state.stop_pending {
                return;
            }
            match state.cancel.take() {
                Some(sender) => {
                    state.stop_pending = true;
                    sender
                }
                None => return,
            }
        };
        let _ = sender.send(());
        // Local cancellation already unblocked the caller; a failed
        // backend notification is only worth a log line.
        if let Err(err) = self.api.stop_generation(self.mode).await {
            log::warn!("backend stop notification failed: {err}");
        }
    }
}

/// One active wizard/chat interaction.
pub struct Session {
    api: Arc<dyn GenerationApi>,
    current_step: usize,
    accumulated_prompt: String,
    input_buffer: String,
    prompt_mode: PromptMode,
    flow_completed: bool,
    improve_with_ai: bool,
    current_seed: Option<u32>,
    resolution: Resolution,
    model: Model,
    mode: GenerationMode,
    is_generating: bool,
    is_improving: bool,
    chat: ChatLog,
    tags: TagPool,
    cancel: Arc<Mutex<CancelState>>,
    rng: StdRng,
    observer: Option<Observer>,
}

impl Session {
    pub fn new(api: Arc<dyn GenerationApi>, prompt_mode: PromptMode) -> Self {
        Self::build(api, prompt_mode, StdRng::from_entropy(), TagPool::new())
    }

    /// Deterministic session for tests: seeds both the session RNG and
    /// the tag pool RNG.
    pub fn with_rng_seed(api: Arc<dyn GenerationApi>, prompt_mode: PromptMode, seed: u64) -> Self {
        Self::build(
            api,
            prompt_mode,
            StdRng::seed_from_u64(seed),
            TagPool::seeded(seed),
        )
    }

    fn build(
        api: Arc<dyn GenerationApi>,
        prompt_mode: PromptMode,
        mut rng: StdRng,
        tags: TagPool,
    ) -> Self {
        let current_seed = match prompt_mode {
            PromptMode::Interactive => Some(rng.gen()),
            PromptMode::Direct => None,
        };
        Self {
            api,
            current_step: 0,
            accumulated_prompt: String::new(),
            input_buffer: String::new(),
            prompt_mode,
            flow_completed: false,
            improve_with_ai: false,
            current_seed,
            resolution: Resolution::new(1024, 1024),
            model: Model::default(),
            mode: GenerationMode::Generate,
            is_generating: false,
            is_improving: false,
            chat: ChatLog::new(),
            tags,
            cancel: Arc::new(Mutex::new(CancelState {
                cancel: None,
                stop_pending: false,
            })),
            rng,
            observer: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn force_generating(&mut self, on: bool) {
        self.is_generating = on;
    }

    pub fn set_observer(&mut self, observer: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        self.observer = Some(Box::new(observer));
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current_step_info(&self) -> Option<&'static Step> {
        step_at(self.current_step)
    }

    pub fn accumulated_prompt(&self) -> &str {
        &self.accumulated_prompt
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn set_input_buffer(&mut self, input: impl Into<String>) {
        self.input_buffer = input.into();
    }

    pub fn prompt_mode(&self) -> PromptMode {
        self.prompt_mode
    }

    pub fn flow_completed(&self) -> bool {
        self.flow_completed
    }

    pub fn current_seed(&self) -> Option<u32> {
        self.current_seed
    }

    /// Pin the generation seed, overriding the randomly drawn one.
    pub fn set_seed(&mut self, seed: Option<u32>) {
        self.current_seed = seed;
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn is_improving(&self) -> bool {
        self.is_improving
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn tags(&self) -> &TagPool {
        &self.tags
    }

    pub fn set_improve_with_ai(&mut self, on: bool) {
        self.improve_with_ai = on;
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn set_model(&mut self, model: Model) {
        self.model = model;
    }

    pub fn set_generation_mode(&mut self, mode: GenerationMode) {
        self.mode = mode;
    }

    pub fn generation_mode(&self) -> GenerationMode {
        self.mode
    }

    /// Handle for stopping the in-flight generation from outside the
    /// suspended `generate` call.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            state: self.cancel.clone(),
            api: self.api.clone(),
            mode: self.mode,
        }
    }

    /// Flip between wizard and chat mode. The seed follows the mode: direct
    /// mode sends none and lets the backend draw one per request.
    pub fn toggle_prompt_mode(&mut self) {
        self.prompt_mode = match self.prompt_mode {
            PromptMode::Interactive => PromptMode::Direct,
            PromptMode::Direct => PromptMode::Interactive,
        };
        match self.prompt_mode {
            PromptMode::Interactive => {
                if self.current_seed.is_none() {
                    self.current_seed = Some(self.rng.gen());
                }
            }
            PromptMode::Direct => self.current_seed = None,
        }
    }

    /// Back to step zero, keeping the accumulated prompt and chat log.
    pub fn reset_step(&mut self) {
        self.current_step = 0;
        self.input_buffer.clear();
        self.emit(SessionEvent::StepChanged(0));
    }

    /// Full flow reset: prompt, chat log and completion flag cleared, a
    /// fresh seed drawn in interactive mode.
    pub fn start_new_flow(&mut self) {
        self.current_step = 0;
        self.input_buffer.clear();
        self.accumulated_prompt.clear();
        self.flow_completed = false;
        self.chat.clear();
        if self.prompt_mode == PromptMode::Interactive {
            self.current_seed = Some(self.rng.gen());
        }
        self.emit(SessionEvent::FlowReset);
    }

    /// Submit the current wizard step. No-op while a generation or
    /// improvement is in flight, and once the flow has completed.
    pub async fn submit_step(&mut self, input: &str) -> Result<(), SessionError> {
        if self.is_generating || self.is_improving || self.flow_completed {
            return Ok(());
        }
        if self.current_step >= step_count() {
            return Ok(());
        }

        let input = input.trim().to_string();
        let last = self.current_step == step_count() - 1;

        if last && is_natural_language(self.current_step) && self.improve_with_ai {
            self.enrich_with_natural_language(&input).await;
        } else {
            self.accumulated_prompt = append_fragment(&self.accumulated_prompt, &input);
        }

        if last {
            let prompt_text = if has_content(&self.accumulated_prompt) {
                self.accumulated_prompt.clone()
            } else {
                normalize(FINAL_STEP_FALLBACK_PROMPT)
            };
            self.run_generation(prompt_text).await;
        } else if has_content(&self.accumulated_prompt) {
            self.run_generation(self.accumulated_prompt.clone()).await;
        }

        self.input_buffer.clear();
        if !last {
            self.current_step += 1;
            self.emit(SessionEvent::StepChanged(self.current_step));
        }
        Ok(())
    }

    /// Direct-mode submit: merge the (optionally AI-improved) input into
    /// the running prompt and generate immediately.
    pub async fn submit_direct(&mut self, input: &str) -> Result<(), SessionError> {
        if self.is_generating || self.is_improving {
            return Ok(());
        }
        let input = input.trim().to_string();
        if input.is_empty() {
            return Ok(());
        }

        let mut fragment = input.clone();
        if self.improve_with_ai {
            self.is_improving = true;
            match self.api.clone().to_natural_language(&input).await {
                Ok(response) if response.success => {
                    let improved = response
                        .natural_language_prompt
                        .map(|text| clean_ai_response(&text))
                        .filter(|text| !text.is_empty());
                    if let Some(improved) = improved {
                        fragment = format!("{input} {improved}");
                    }
                }
                Ok(response) => {
                    log::debug!("prompt improvement rejected: {:?}", response.error);
                }
                Err(err) => {
                    log::warn!("prompt improvement failed: {err}");
                }
            }
            self.is_improving = false;
        }

        self.accumulated_prompt = append_fragment(&self.accumulated_prompt, &fragment);
        self.run_generation(self.accumulated_prompt.clone()).await;
        Ok(())
    }

    /// Best-effort improvement of the current input buffer via the AI
    /// collaborator. Returns the cleaned improved text; on any failure
    /// the buffer is left as typed.
    pub async fn improve_input(&mut self) -> Option<String> {
        if self.is_generating || self.is_improving {
            return None;
        }
        let text = self.input_buffer.trim().to_string();
        if text.is_empty() {
            return None;
        }
        let step_name = self.current_step_info().map(|s| s.name).unwrap_or_default();

        self.is_improving = true;
        let improved = match self.api.clone().improve_prompt(&text, step_name).await {
            Ok(response) if response.success => response
                .improved_prompt
                .map(|text| clean_ai_response(&text))
                .filter(|text| !text.is_empty()),
            Ok(response) => {
                log::debug!("improve-prompt rejected: {:?}", response.error);
                None
            }
            Err(err) => {
                log::warn!("improve-prompt failed: {err}");
                None
            }
        };
        self.is_improving = false;

        if let Some(improved) = &improved {
            self.input_buffer = improved.clone();
        }
        improved
    }

    /// Convert the full tag prompt (plus the final-step input) to natural
    /// language and keep both. Any failure falls back to a plain merge of
    /// the input.
    async fn enrich_with_natural_language(&mut self, input: &str) {
        let tags_prompt = append_fragment(&self.accumulated_prompt, input);
        if !has_content(&tags_prompt) {
            return;
        }

        self.is_improving = true;
        let converted = match self.api.clone().to_natural_language(&tags_prompt).await {
            Ok(response) if response.success => response
                .natural_language_prompt
                .map(|text| clean_ai_response(&text))
                .filter(|text| !text.is_empty()),
            Ok(response) => {
                log::warn!("natural language conversion rejected: {:?}", response.error);
                None
            }
            Err(err) => {
                log::warn!("natural language conversion failed: {err}");
                None
            }
        };
        self.is_improving = false;

        self.accumulated_prompt = match converted {
            Some(natural) => normalize(&format!("{tags_prompt} {natural}")),
            None => tags_prompt,
        };
    }

    /// Generate with the current accumulated prompt. Rejected (no-op,
    /// `None`) while another generation is in flight; otherwise returns
    /// the settled chat message id.
    pub async fn generate(&mut self) -> Option<u64> {
        if !has_content(&self.accumulated_prompt) {
            return None;
        }
        self.run_generation(self.accumulated_prompt.clone()).await
    }

    async fn run_generation(&mut self, prompt_text: String) -> Option<u64> {
        if self.is_generating {
            return None;
        }

        // Edit mode needs a source image from an earlier success; fail
        // locally before any network traffic.
        let source_image = if self.mode == GenerationMode::Edit {
            match self.chat.last_successful_media().cloned() {
                Some(media) => Some(media),
                None => {
                    let id = self.chat.push_loading(prompt_text);
                    self.emit(SessionEvent::MessageAppended(id));
                    self.chat.settle(
                        id,
                        ResponseState::Error("No source image available for edit mode".into()),
                    );
                    self.emit(SessionEvent::MessageSettled(id));
                    return Some(id);
                }
            }
        } else {
            None
        };

        let id = self.chat.push_loading(prompt_text.clone());
        self.emit(SessionEvent::MessageAppended(id));
        self.is_generating = true;

        let (cancel_tx, cancel_rx) = oneshot::channel();
        {
            let mut state = self.cancel.lock();
            state.cancel = Some(cancel_tx);
            state.stop_pending = false;
        }

        let request = GenerateRequest {
            prompt: prompt_text,
            width: self.resolution.width,
            height: self.resolution.height,
            steps: None,
            seed: self.current_seed,
            mode: self.mode,
            model: self.model,
            image: source_image,
        };

        let api = self.api.clone();
        let outcome = tokio::select! {
            result = api.generate(&request) => Some(result),
            _ = cancel_rx => None,
        };

        let state = match outcome {
            None => ResponseState::Cancelled,
            Some(Ok(response)) => {
                if response.success && !response.images.is_empty() {
                    ResponseState::Success(response.images)
                } else {
                    let detail = response.error.unwrap_or_else(|| "Unknown error".into());
                    ResponseState::Error(format!("Error generating images: {detail}"))
                }
            }
            Some(Err(err)) => ResponseState::Error(err.to_string()),
        };
        let succeeded = state.is_success();

        self.chat.settle(id, state);
        self.emit(SessionEvent::MessageSettled(id));
        self.is_generating = false;
        {
            let mut cancel = self.cancel.lock();
            cancel.cancel = None;
            cancel.stop_pending = false;
        }

        if succeeded && self.current_step == step_count() - 1 {
            self.flow_completed = true;
            self.emit(SessionEvent::FlowCompleted);
        }
        Some(id)
    }

    /// Fetch the candidate tag list for the current step and reset the
    /// rotation state.
    pub async fn load_tags(&mut self) -> Result<(), SessionError> {
        let Some(step) = self.current_step_info() else {
            return Ok(());
        };
        let category = step.name;
        let response = self.api.clone().tags(category, &[]).await?;
        if !response.success {
            return Err(SessionError::Backend(
                response.error.unwrap_or_else(|| "tag load failed".into()),
            ));
        }
        self.tags.reset_with(response.tags);
        self.emit(SessionEvent::TagsChanged);
        Ok(())
    }

    /// Merge a suggested tag into the input buffer (normalization waits
    /// until submit) and rotate the suggestion window.
    pub fn select_tag(&mut self, tag: &str) {
        if !self.tags.select(tag) {
            return;
        }
        self.input_buffer = join_fragment(&self.input_buffer, tag);
        self.emit(SessionEvent::TagsChanged);
    }

    /// Replace the suggestion window with tags never shown for this step.
    /// On transport failure the previous window is restored.
    pub async fn load_more_tags(&mut self) -> Result<(), SessionError> {
        let Some(step) = self.current_step_info() else {
            return Ok(());
        };
        let category = step.name;
        let previous = self.tags.take_displayed_into_seen();
        let excluded = self.tags.seen_sorted();

        match self.api.clone().tags(category, &excluded).await {
            Ok(response) if response.success => {
                self.tags.apply_fresh(response.tags);
                self.emit(SessionEvent::TagsChanged);
                Ok(())
            }
            Ok(response) => {
                self.tags.restore_displayed(previous);
                Err(SessionError::Backend(
                    response.error.unwrap_or_else(|| "tag load failed".into()),
                ))
            }
            Err(err) => {
                self.tags.restore_displayed(previous);
                Err(err.into())
            }
        }
    }
}
