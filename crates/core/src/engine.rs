#![forbid(unsafe_code)]

use crate::session::{StateBlob, Turn};
use serde::{Deserialize, Serialize};

/// Reply produced by the conversational engine for one turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineReply {
    pub content: String,
    /// Top-level keys merged into the branch state after the reply is recorded.
    #[serde(default)]
    pub state_patch: StateBlob,
    /// Set when the turn invoked an external action worth an automatic checkpoint.
    #[serde(default)]
    pub trigger_tag: Option<String>,
}

impl EngineReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_trigger(mut self, tag: impl Into<String>) -> Self {
        self.trigger_tag = Some(tag.into());
        self
    }

    pub fn with_state(mut self, patch: StateBlob) -> Self {
        self.state_patch = patch;
        self
    }
}

/// The model-facing collaborator. Content is opaque to the store.
pub trait ConversationEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    fn respond(&mut self, turns: &[Turn], state: &StateBlob) -> Result<EngineReply, Self::Error>;
}
