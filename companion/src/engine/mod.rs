//! Conversation engine: message history, personality state, and the
//! simulated typing delay.
//!
//! The engine owns a single conversation session. Submitting a message
//! appends it, flips the pending flag, and schedules reply production on a
//! tokio timer; while the flag is set further submissions are silent
//! no-ops, so at most one reply is ever in flight. The reply task holds a
//! weak reference to the state, so a timer that fires after the session is
//! torn down does nothing.

mod selector;

use std::sync::{Arc, Weak};
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, Mutex};
use uuid::Uuid;

use crate::models::{Message, Personality, Sender};

/// Greeting seeded into every new conversation as message id 0.
pub const GREETING: &str = "Hey there! I'm so happy to see you! How's your day going? 💕";

/// Typing delay bounds in milliseconds: min inclusive, max exclusive.
const REPLY_DELAY_MS: (u64, u64) = (1000, 2000);

/// Options for constructing a conversation engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    personality: Personality,
    seed: Option<u64>,
    delay_ms: (u64, u64),
}

impl EngineOptions {
    /// Default options: sweet personality, OS-seeded RNG, 1-2s typing delay.
    pub const fn new() -> Self {
        Self {
            personality: Personality::Sweet,
            seed: None,
            delay_ms: REPLY_DELAY_MS,
        }
    }

    /// Set the starting personality.
    pub const fn personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    /// Seed the RNG for deterministic fallback selection and delay jitter.
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the typing delay bounds (milliseconds, min inclusive,
    /// max exclusive).
    pub const fn reply_delay_ms(mut self, min: u64, max: u64) -> Self {
        self.delay_ms = (min, max);
        self
    }

    /// Produce replies immediately, with no typing delay.
    pub const fn instant(self) -> Self {
        self.reply_delay_ms(0, 0)
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Event emitted by the engine as the conversation advances.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A user message was appended.
    UserMessage { message: Message },

    /// The companion started "typing" (a reply is pending).
    Typing,

    /// The companion's reply was appended; typing has stopped.
    Reply { message: Message },

    /// The active personality changed.
    PersonalityChanged { personality: Personality },
}

/// Outcome of a submission attempt.
///
/// Rejections are ordinary outcomes, not errors: the engine has no failure
/// modes worth surfacing.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The message was appended and a reply is on its way.
    Accepted {
        /// Id assigned to the user message; the reply gets id + 1.
        message_id: i64,
        /// Resolves once the companion's reply lands.
        reply: ReplyHandle,
    },

    /// The text was empty or whitespace-only; nothing changed.
    RejectedEmpty,

    /// A reply is already pending; nothing changed.
    RejectedBusy,
}

impl SubmitOutcome {
    /// Whether the submission was accepted.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Handle to a scheduled reply.
#[derive(Debug)]
pub struct ReplyHandle {
    result_rx: oneshot::Receiver<Message>,
}

impl ReplyHandle {
    /// Wait for the companion's reply.
    ///
    /// Errors only if the session was torn down before the reply resolved.
    pub async fn wait(self) -> Result<Message> {
        self.result_rx
            .await
            .context("Session was torn down before the reply resolved")
    }
}

/// Conversation state, owned exclusively by one engine.
#[derive(Debug)]
struct ConversationState {
    messages: Vec<Message>,
    personality: Personality,
    pending_reply: bool,
    next_id: i64,
    rng: StdRng,
}

/// Snapshot of the conversation for front ends.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    /// Session id (UUIDv7, unique per engine).
    pub session_id: String,
    /// Currently active personality.
    pub personality: Personality,
    /// Whether a reply is pending (typing indicator).
    pub pending_reply: bool,
    /// Number of messages appended so far.
    pub message_count: usize,
}

/// A single scripted-companion conversation session.
///
/// # Example
///
/// ```rust,no_run
/// use companion::engine::{ConversationEngine, EngineOptions, SubmitOutcome};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let engine = ConversationEngine::new(EngineOptions::new().instant());
///
///     if let SubmitOutcome::Accepted { reply, .. } = engine.submit("how are you?").await {
///         let message = reply.wait().await?;
///         println!("{}", message.text);
///     }
///
///     Ok(())
/// }
/// ```
pub struct ConversationEngine {
    /// Session id (UUIDv7, time-ordered).
    session_id: String,

    /// Conversation state; reply tasks hold a `Weak` to this.
    state: Arc<Mutex<ConversationState>>,

    /// Typing delay bounds in milliseconds.
    delay_ms: (u64, u64),

    /// Optional channel for conversation events.
    event_tx: Option<mpsc::Sender<EngineEvent>>,
}

impl ConversationEngine {
    /// Create a new engine seeded with the greeting message (id 0).
    pub fn new(options: EngineOptions) -> Self {
        Self::build(options, None)
    }

    /// Create an engine with an event channel for monitoring the session.
    pub fn with_events(options: EngineOptions) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(1000);
        (Self::build(options, Some(tx)), rx)
    }

    fn build(options: EngineOptions, event_tx: Option<mpsc::Sender<EngineEvent>>) -> Self {
        let rng = options
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        let state = ConversationState {
            messages: vec![Message::new(0, GREETING.to_string(), Sender::Companion)],
            personality: options.personality,
            pending_reply: false,
            next_id: 1,
            rng,
        };

        Self {
            session_id: Uuid::now_v7().to_string(),
            state: Arc::new(Mutex::new(state)),
            delay_ms: options.delay_ms,
            event_tx,
        }
    }

    /// This session's id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Submit a user message.
    ///
    /// Empty or whitespace-only text is rejected, as is any submission
    /// while a reply is pending; both leave the conversation untouched.
    /// On acceptance the user message is appended immediately and the
    /// reply is scheduled after the typing delay.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::RejectedEmpty;
        }

        let (user_message, delay) = {
            let mut state = self.state.lock().await;
            if state.pending_reply {
                return SubmitOutcome::RejectedBusy;
            }

            state.pending_reply = true;
            let id = state.next_id;
            state.next_id += 1;

            let message = Message::new(id, text.to_string(), Sender::User);
            state.messages.push(message.clone());

            let (min, max) = self.delay_ms;
            let delay = if max > min {
                state.rng.random_range(min..max)
            } else {
                min
            };
            (message, Duration::from_millis(delay))
        };

        if let Some(ref tx) = self.event_tx {
            let _ = tx
                .send(EngineEvent::UserMessage {
                    message: user_message.clone(),
                })
                .await;
            let _ = tx.send(EngineEvent::Typing).await;
        }

        let (result_tx, result_rx) = oneshot::channel();
        let state_weak = Arc::downgrade(&self.state);
        let event_tx = self.event_tx.clone();
        let text = text.to_string();

        tokio::spawn(async move {
            produce_reply(state_weak, event_tx, result_tx, text, delay).await;
        });

        SubmitOutcome::Accepted {
            message_id: user_message.id,
            reply: ReplyHandle { result_rx },
        }
    }

    /// Switch the active personality, effective immediately.
    ///
    /// Past messages are untouched. A reply already scheduled reads the
    /// personality when it resolves, so a mid-delay switch changes which
    /// fallback list that reply draws from.
    pub async fn set_personality(&self, personality: Personality) {
        {
            let mut state = self.state.lock().await;
            state.personality = personality;
        }
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(EngineEvent::PersonalityChanged { personality }).await;
        }
    }

    /// The currently active personality.
    pub async fn personality(&self) -> Personality {
        self.state.lock().await.personality
    }

    /// Whether a reply is pending.
    pub async fn is_pending(&self) -> bool {
        self.state.lock().await.pending_reply
    }

    /// All messages appended so far, in chronological order.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    /// Summary of the conversation for front ends.
    pub async fn snapshot(&self) -> ConversationSnapshot {
        let state = self.state.lock().await;
        ConversationSnapshot {
            session_id: self.session_id.clone(),
            personality: state.personality,
            pending_reply: state.pending_reply,
            message_count: state.messages.len(),
        }
    }
}

/// Produce the companion's reply after the typing delay.
async fn produce_reply(
    state_weak: Weak<Mutex<ConversationState>>,
    event_tx: Option<mpsc::Sender<EngineEvent>>,
    result_tx: oneshot::Sender<Message>,
    user_text: String,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    // Session torn down while the timer ran: silent no-op.
    let Some(state) = state_weak.upgrade() else {
        return;
    };

    let reply = {
        let mut state = state.lock().await;
        // Personality is read here, at resolution time: switching presets
        // mid-delay changes which fallback list this reply draws from.
        let personality = state.personality;
        let text = selector::select_reply(personality, &user_text, &mut state.rng);

        let id = state.next_id;
        state.next_id += 1;

        let message = Message::new(id, text.to_string(), Sender::Companion);
        state.messages.push(message.clone());
        state.pending_reply = false;
        message
    };

    if let Some(ref tx) = event_tx {
        let _ = tx
            .send(EngineEvent::Reply {
                message: reply.clone(),
            })
            .await;
    }

    let _ = result_tx.send(reply);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> EngineOptions {
        EngineOptions::new().seed(7)
    }

    #[tokio::test]
    async fn test_conversation_starts_with_greeting() {
        let engine = ConversationEngine::new(seeded());
        let messages = engine.messages().await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, 0);
        assert_eq!(messages[0].sender, Sender::Companion);
        assert_eq!(messages[0].text, GREETING);
        assert!(!engine.is_pending().await);
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_submissions_are_noops() {
        let engine = ConversationEngine::new(seeded());

        for text in ["", "   ", "\t\n"] {
            let outcome = engine.submit(text).await;
            assert!(matches!(outcome, SubmitOutcome::RejectedEmpty), "{text:?}");
        }

        assert_eq!(engine.messages().await.len(), 1);
        assert!(!engine.is_pending().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_while_pending_is_a_noop() {
        let engine = ConversationEngine::new(seeded());

        let first = engine.submit("hi").await;
        assert!(first.is_accepted());
        assert!(engine.is_pending().await);

        let second = engine.submit("hi").await;
        assert!(matches!(second, SubmitOutcome::RejectedBusy));

        // Greeting plus exactly one user message.
        assert_eq!(engine.messages().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sad_scenario_appends_supportive_reply() {
        let engine = ConversationEngine::new(seeded());

        let SubmitOutcome::Accepted { message_id, reply } =
            engine.submit("I feel sad today").await
        else {
            panic!("submission rejected");
        };
        assert_eq!(message_id, 1);
        assert!(engine.is_pending().await);

        let message = reply.wait().await.unwrap();
        assert_eq!(message.id, 2);
        assert_eq!(message.sender, Sender::Companion);
        assert_eq!(message.text, selector::SUPPORTIVE);

        assert!(!engine.is_pending().await);
        assert_eq!(engine.messages().await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_delay_is_within_bounds() {
        let engine = ConversationEngine::new(seeded());

        let start = tokio::time::Instant::now();
        let SubmitOutcome::Accepted { reply, .. } = engine.submit("hello there").await else {
            panic!("submission rejected");
        };
        reply.wait().await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(2000), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_stay_monotonic_across_turns() {
        let engine = ConversationEngine::new(seeded().instant());

        for expected_user_id in [1, 3, 5] {
            let SubmitOutcome::Accepted { message_id, reply } =
                engine.submit("tell me something random").await
            else {
                panic!("submission rejected");
            };
            assert_eq!(message_id, expected_user_id);
            assert_eq!(reply.wait().await.unwrap().id, expected_user_id + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_personality_switch_mid_delay_applies_to_pending_reply() {
        let engine = ConversationEngine::new(seeded());

        let SubmitOutcome::Accepted { reply, .. } =
            engine.submit("tell me something random").await
        else {
            panic!("submission rejected");
        };

        // Switch while the typing delay is still running.
        engine.set_personality(Personality::Playful).await;

        let message = reply.wait().await.unwrap();
        assert!(
            Personality::Playful
                .fallback_replies()
                .contains(&message.text.as_str()),
            "{}",
            message.text
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_reply_belongs_to_active_personality() {
        let engine =
            ConversationEngine::new(seeded().instant().personality(Personality::Playful));

        let SubmitOutcome::Accepted { reply, .. } =
            engine.submit("tell me something random").await
        else {
            panic!("submission rejected");
        };
        let message = reply.wait().await.unwrap();

        assert!(Personality::Playful
            .fallback_replies()
            .contains(&message.text.as_str()));
    }

    #[tokio::test]
    async fn test_set_personality_leaves_messages_untouched() {
        let engine = ConversationEngine::new(seeded().instant());

        let SubmitOutcome::Accepted { reply, .. } = engine.submit("how are you").await else {
            panic!("submission rejected");
        };
        reply.wait().await.unwrap();

        let before = engine.messages().await;
        engine.set_personality(Personality::Romantic).await;
        let after = engine.messages().await;

        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.text, b.text);
        }
        assert_eq!(engine.personality().await, Personality::Romantic);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_after_teardown_is_a_noop() {
        let engine = ConversationEngine::new(seeded());

        let SubmitOutcome::Accepted { reply, .. } = engine.submit("still there?").await else {
            panic!("submission rejected");
        };
        drop(engine);

        // The timer still fires, but the session is gone.
        assert!(reply.wait().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_follow_the_turn() {
        let (engine, mut events) = ConversationEngine::with_events(seeded().instant());

        let SubmitOutcome::Accepted { reply, .. } = engine.submit("hey").await else {
            panic!("submission rejected");
        };
        let message = reply.wait().await.unwrap();

        assert!(matches!(
            events.recv().await,
            Some(EngineEvent::UserMessage { message }) if message.id == 1
        ));
        assert!(matches!(events.recv().await, Some(EngineEvent::Typing)));
        assert!(matches!(
            events.recv().await,
            Some(EngineEvent::Reply { message: m }) if m.id == message.id
        ));
    }
}
