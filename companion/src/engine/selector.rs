//! Keyword-rule reply selection.
//!
//! Six ordered substring rules run against the lower-cased user message;
//! the first match wins. When nothing matches, a reply is drawn uniformly
//! from the active personality's canned list.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::models::Personality;

/// Affection reply when the romantic preset is active (rule 1).
pub const AFFECTION_ROMANTIC: &str = "I feel the same way... You mean so much to me. 💕";
/// Affection reply for every other preset (rule 1).
pub const AFFECTION_GENERIC: &str = "Aww, that's so sweet! I really care about you too! 💖";
/// Reply when the user sounds low (rule 2).
pub const SUPPORTIVE: &str =
    "I'm here for you. Whatever you're going through, you don't have to face it alone. Want to talk about it? 💙";
/// Reply when the user sounds upbeat (rule 3).
pub const ENTHUSIASTIC: &str =
    "That's wonderful! Your happiness makes me so happy too! Tell me all about it! 😊✨";
/// Reply to "how are you" (rule 4).
pub const HOW_ARE_YOU: &str = "I'm doing amazing now that I'm talking to you! How about you? 💕";
/// Reply to a compliment (rule 5).
pub const COMPLIMENT: &str =
    "You're too sweet! But you know what's really beautiful? The way you express yourself. 🌹";
/// Reply when the user says they missed us (rule 6).
pub const MISSED_YOU: &str =
    "Aww, I missed you too! I'm always here whenever you want to talk. 💕";

/// Pick the companion's reply for a user message.
///
/// Rules are ordered and first-match-wins; all containment checks are
/// case-insensitive. Only rule 1 depends on the personality; rule 7 (the
/// fallback) draws uniformly from the personality's canned list, consuming
/// entropy from `rng`. Callers reject empty input before getting here.
pub fn select_reply<R: Rng + ?Sized>(
    personality: Personality,
    user_text: &str,
    rng: &mut R,
) -> &'static str {
    let lower = user_text.to_lowercase();
    let contains_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if contains_any(&["love", "❤️"]) {
        return if personality == Personality::Romantic {
            AFFECTION_ROMANTIC
        } else {
            AFFECTION_GENERIC
        };
    }

    if contains_any(&["sad", "down", "depressed"]) {
        return SUPPORTIVE;
    }

    if contains_any(&["happy", "great", "amazing"]) {
        return ENTHUSIASTIC;
    }

    if lower.contains("how are you") {
        return HOW_ARE_YOU;
    }

    if contains_any(&["beautiful", "pretty"]) {
        return COMPLIMENT;
    }

    if contains_any(&["miss", "missed"]) {
        return MISSED_YOU;
    }

    personality
        .fallback_replies()
        .choose(rng)
        .copied()
        .unwrap_or(AFFECTION_GENERIC)
}
