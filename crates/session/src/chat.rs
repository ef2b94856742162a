use api_client::MediaDescriptor;
use serde::{Deserialize, Serialize};

/// Outcome of one generation request. A message settles exactly once:
/// `Loading` transitions to one of the other variants and never changes
/// again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseState {
    Loading,
    Success(Vec<MediaDescriptor>),
    Error(String),
    /// User-initiated stop; informational, not an error.
    Cancelled,
}

impl ResponseState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub user_message: String,
    pub response: ResponseState,
}

/// Append-only log of generation exchanges.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message in loading state and return its id.
    pub fn push_loading(&mut self, user_message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(ChatMessage {
            id,
            user_message: user_message.into(),
            response: ResponseState::Loading,
        });
        id
    }

    /// Settle a loading message. Returns false when the id is unknown or
    /// the message already settled; a settled message never changes.
    pub fn settle(&mut self, id: u64, state: ResponseState) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) if message.response.is_loading() => {
                message.response = state;
                true
            }
            _ => false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Most recent successfully generated media item, used as the source
    /// image for edit-mode generation and video handoff.
    pub fn last_successful_media(&self) -> Option<&MediaDescriptor> {
        self.messages.iter().rev().find_map(|m| match &m.response {
            ResponseState::Success(media) => media.first(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut log = ChatLog::new();
        let a = log.push_loading("first");
        let b = log.push_loading("second");
        assert!(b > a);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_settle_only_once() {
        let mut log = ChatLog::new();
        let id = log.push_loading("a castle");
        assert!(log.settle(id, ResponseState::Cancelled));
        assert!(!log.settle(id, ResponseState::Error("late".into())));
        assert_eq!(log.messages()[0].response, ResponseState::Cancelled);
    }

    #[test]
    fn test_settle_unknown_id() {
        let mut log = ChatLog::new();
        assert!(!log.settle(99, ResponseState::Cancelled));
    }

    #[test]
    fn test_last_successful_media_skips_failures() {
        let mut log = ChatLog::new();
        let first = log.push_loading("one");
        log.settle(
            first,
            ResponseState::Success(vec![MediaDescriptor::output("one.png", "")]),
        );
        let second = log.push_loading("two");
        log.settle(second, ResponseState::Error("boom".into()));

        let media = log.last_successful_media().unwrap();
        assert_eq!(media.filename, "one.png");
    }

    #[test]
    fn test_clear_resets_messages_not_counter() {
        let mut log = ChatLog::new();
        let first = log.push_loading("one");
        log.clear();
        assert!(log.is_empty());
        let second = log.push_loading("two");
        assert!(second > first);
    }
}
