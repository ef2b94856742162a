//! Prompt session state machine.
//!
//! Owns the wizard step sequence, the accumulated prompt, tag suggestion
//! rotation, the chat log and the generation request lifecycle with
//! cooperative cancellation. Presentation is out of scope: the session
//! exposes state and emits [`SessionEvent`] notifications.

use api_client::ApiError;
use thiserror::Error;

mod chat;
pub use chat::*;
mod tags;
pub use tags::*;
mod wizard;
pub use wizard::*;
mod video;
pub use video::*;
mod handoff;
pub use handoff::*;

#[cfg(test)]
pub(crate) mod test_support;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("backend error: {0}")]
    Backend(String),
}
