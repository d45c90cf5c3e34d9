//! Message model representing one entry in a conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the conversation a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user.
    User,
    /// Canned reply produced by the companion.
    Companion,
}

impl Sender {
    /// Convert sender to its wire string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Companion => "companion",
        }
    }

    /// Parse sender from its wire string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "companion" => Some(Self::Companion),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message in a conversation.
///
/// Messages are immutable once appended: the engine assigns ids in append
/// order and never mutates or removes entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Monotonic id, unique within the session.
    pub id: i64,
    /// Message text, stored exactly as submitted.
    pub text: String,
    /// Who sent the message.
    pub sender: Sender,
    /// When the message was appended.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time.
    pub fn new(id: i64, text: String, sender: Sender) -> Self {
        Self {
            id,
            text,
            sender,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_round_trip() {
        for sender in [Sender::User, Sender::Companion] {
            assert_eq!(Sender::from_str(sender.as_str()), Some(sender));
        }
        assert_eq!(Sender::from_str("assistant"), None);
    }
}
