use api_client::MediaDescriptor;
use serde::{Deserialize, Serialize};

/// Image/prompt/resolution triple carried across the navigation into the
/// video view. Inline images travel as a `data_url` on the descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoHandoff {
    pub image: MediaDescriptor,
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
    pub prompt: String,
    pub resolution: String,
}

/// Single-consumption slot standing in for session-scoped storage: the
/// destination view reads the handoff once and the slot clears itself.
#[derive(Debug, Default)]
pub struct HandoffSlot {
    slot: Option<VideoHandoff>,
}

impl HandoffSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a handoff, replacing any unconsumed one.
    pub fn store(&mut self, handoff: VideoHandoff) {
        self.slot = Some(handoff);
    }

    /// Consume the handoff. Subsequent calls return `None` until the
    /// next `store`.
    pub fn take(&mut self) -> Option<VideoHandoff> {
        self.slot.take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
