//! Wire-level input for conversation creation.

use serde::Deserialize;
use serde_json::Value;

use chatgate_types::conversation::NewConversation;

use crate::validation::{self, ValidationError};

/// Body of `POST {base}/create`, before validation.
///
/// Fields are kept as raw JSON so each one can be checked with its own
/// message; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationInput {
    pub agent_id: Option<Value>,
    pub user_id: Option<Value>,
    pub title: Option<Value>,
    pub metadata: Option<Value>,
}

impl CreateConversationInput {
    /// Validate in field order: agentId, userId, title, metadata.
    pub fn validate(&self) -> Result<NewConversation, ValidationError> {
        let agent_id = validation::positive_id("agentId", self.agent_id.as_ref())?;
        let creator_id = validation::positive_id("userId", self.user_id.as_ref())?;
        let title = validation::optional_title(self.title.as_ref())?;
        let metadata = validation::optional_metadata(self.metadata.as_ref())?;

        Ok(NewConversation {
            creator_id,
            agent_id,
            title,
            metadata,
        })
    }
}
