//! Web search domain.
//!
//! - [`entities::SearchResult`]: a single ranked hit
//! - [`entities::format_evidence`]: results as the text block the summarizer reads

pub mod entities;
