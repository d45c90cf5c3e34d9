//! Data models for conversation entities.

mod message;
mod personality;

pub use message::{Message, Sender};
pub use personality::Personality;
