use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub content: String,
    pub user_id: String,
    pub is_bot: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(user_id: String, content: String, is_bot: bool) -> Self {
        Self {
            id: None,
            content,
            user_id,
            is_bot,
            created_at: Utc::now(),
        }
    }

    pub fn human(user_id: String, content: String) -> Self {
        Self::new(user_id, content, false)
    }

    pub fn bot(bot_id: String, content: String) -> Self {
        Self::new(bot_id, content, true)
    }

    /// Pins the timestamp so it does not sort before `earliest`.
    pub fn not_before(mut self, earliest: DateTime<Utc>) -> Self {
        if self.created_at < earliest {
            self.created_at = earliest;
        }
        self
    }
}

/// Row shape written to the store; the id is always assigned remotely.
#[derive(Debug, Serialize)]
pub struct NewMessage<'a> {
    pub content: &'a str,
    pub user_id: &'a str,
    pub is_bot: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Message> for NewMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            content: &message.content,
            user_id: &message.user_id,
            is_bot: message.is_bot,
            created_at: message.created_at,
        }
    }
}
