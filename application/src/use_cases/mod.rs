//! Use cases (application services)

pub mod oracle;
