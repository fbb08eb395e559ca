//! Rule rendering and fingerprinting
//!
//! - [`action`]: Verdicts and control transfers, rendered to one fragment each
//! - [`match_criteria`]: The match rendering boundary and a clause builder
//! - [`rule`]: Append/insert/replace command rendering
//! - [`chain`]: Named rule sequences and their position-sensitive fingerprints
//! - [`error`]: Error types for the fallible edges (loading, validation, lookup)

pub mod action;
pub mod chain;
pub mod error;
pub mod match_criteria;
pub mod rule;

#[cfg(test)]
pub mod test_helpers;
