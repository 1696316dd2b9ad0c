use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageLogId(Uuid);

impl MessageLogId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageLogId {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit trail entry attributing an action to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLog {
    pub id: MessageLogId,
    pub client: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl MessageLog {
    pub fn new(client: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: MessageLogId::new(),
            client: client.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
