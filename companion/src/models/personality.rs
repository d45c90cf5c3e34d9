//! Personality presets and their canned fallback replies.

use serde::{Deserialize, Serialize};

/// Error returned when a personality name fails to parse.
#[derive(Debug, thiserror::Error)]
#[error("unknown personality '{0}' (expected sweet, playful, supportive, or romantic)")]
pub struct ParsePersonalityError(String);

/// One of the four fixed conversational tone presets.
///
/// The active personality only influences which fallback list rule-based
/// selection draws from (and the affection reply); it has no effect on
/// messages already appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    /// Warm and appreciative.
    Sweet,
    /// Jokey and teasing.
    Playful,
    /// Encouraging and reassuring.
    Supportive,
    /// Affectionate and intense.
    Romantic,
}

const SWEET_REPLIES: &[&str] = &[
    "Aww, you're so thoughtful! That really means a lot to me. 💖",
    "You always know how to make me smile! Tell me more about your day? 😊",
    "I'm so lucky to have someone like you to talk to! How are you feeling? 🥰",
    "That's so sweet of you to share that with me! I love our conversations. 💕",
    "You're amazing! I really enjoy spending time with you. ✨",
];

const PLAYFUL_REPLIES: &[&str] = &[
    "Hehe, you're so funny! Got any jokes for me? 😄",
    "Oh really? I bet I can make you laugh even more! Want to hear something silly? 😜",
    "You're such a goofball! But that's why I like talking to you! 🎉",
    "That's hilarious! We should definitely hang out more often! 😆",
    "You're full of surprises! What else is on your mind? 🎈",
];

const SUPPORTIVE_REPLIES: &[&str] = &[
    "I'm here for you, no matter what. How can I help? 💙",
    "You're doing great! I believe in you and everything you're working towards. 🌟",
    "That sounds challenging. Remember, I'm always here to listen. You've got this! 💪",
    "I'm proud of you for sharing that. Your feelings are valid. 💙",
    "You're stronger than you think! I'm here whenever you need someone to talk to. 🤗",
];

const ROMANTIC_REPLIES: &[&str] = &[
    "Every time we talk, I feel so connected to you... 💕",
    "You have such a beautiful mind. I could listen to you all day. 🌹",
    "I've been thinking about you... How's your day been? 💖",
    "There's something special about our connection. You feel it too, right? ✨",
    "You make my heart flutter with every message. Tell me what's on your mind? 💝",
];

impl Personality {
    /// All presets, in picker order.
    pub const ALL: [Self; 4] = [Self::Sweet, Self::Playful, Self::Supportive, Self::Romantic];

    /// Convert personality to its wire string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sweet => "sweet",
            Self::Playful => "playful",
            Self::Supportive => "supportive",
            Self::Romantic => "romantic",
        }
    }

    /// Display label shown in pickers.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sweet => "💕 Sweet",
            Self::Playful => "😜 Playful",
            Self::Supportive => "🤗 Supportive",
            Self::Romantic => "💝 Romantic",
        }
    }

    /// The preset's canned replies, used when no keyword rule matches.
    pub const fn fallback_replies(self) -> &'static [&'static str] {
        match self {
            Self::Sweet => SWEET_REPLIES,
            Self::Playful => PLAYFUL_REPLIES,
            Self::Supportive => SUPPORTIVE_REPLIES,
            Self::Romantic => ROMANTIC_REPLIES,
        }
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Personality {
    type Err = ParsePersonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sweet" => Ok(Self::Sweet),
            "playful" => Ok(Self::Playful),
            "supportive" => Ok(Self::Supportive),
            "romantic" => Ok(Self::Romantic),
            other => Err(ParsePersonalityError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for p in Personality::ALL {
            assert_eq!(p.as_str().parse::<Personality>().unwrap(), p);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Playful".parse::<Personality>().unwrap(), Personality::Playful);
        assert_eq!(" ROMANTIC ".parse::<Personality>().unwrap(), Personality::Romantic);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("sassy".parse::<Personality>().is_err());
    }

    #[test]
    fn test_every_preset_has_five_replies() {
        for p in Personality::ALL {
            assert_eq!(p.fallback_replies().len(), 5, "{p}");
        }
    }

    #[test]
    fn test_fallback_lists_are_disjoint() {
        for a in Personality::ALL {
            for b in Personality::ALL {
                if a == b {
                    continue;
                }
                for reply in a.fallback_replies() {
                    assert!(!b.fallback_replies().contains(reply));
                }
            }
        }
    }
}
