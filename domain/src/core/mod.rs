//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: identifier of a locally served model
//! - [`prompt::Prompt`]: a validated, non-empty user prompt
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod prompt;
