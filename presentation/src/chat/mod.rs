//! Interactive chat module
//!
//! Provides a line-editor based chat interface over one Oracle session.

mod command;
mod repl;

pub use command::ReplCommand;
pub use repl::{ChatRepl, CommandOutcome};
