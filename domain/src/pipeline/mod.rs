//! Decision pipeline domain
//!
//! The pieces of an `ask` run that need no I/O: the stage and state
//! enumerations, the parsing of stage replies, and the outcome value.

pub mod outcome;
pub mod parsing;
pub mod state;
