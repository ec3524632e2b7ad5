//! Conversation domain.
//!
//! - [`entities::Message`]: a single role-tagged turn
//! - [`history::ConversationHistory`]: the ordered turns of one session

pub mod entities;
pub mod history;
