//! fwchain - packet-filter rule rendering and rule fingerprints
//!
//! Renders an abstract rule model into the exact command text used to
//! append, insert or replace rules in a named chain, and computes a short
//! fingerprint per rule that depends on the chain name, on every rule above
//! it, and on its own rendered text.
//!
//! # Architecture
//!
//! - [`core`] - Actions, rules, chains and the fingerprint chain
//! - [`validators`] - Optional checks for names, targets and comments
//! - [`config`] - JSON chain definition files
//!
//! # Example
//!
//! ```
//! use fwchain::{Action, Chain, MatchCriteria, Rule};
//!
//! let chain = Chain::new(
//!     "cali-INPUT",
//!     vec![Rule::new(MatchCriteria::new(), Action::Accept)],
//! );
//! assert_eq!(chain.render_append_all(""), vec!["-A cali-INPUT --jump ACCEPT"]);
//! assert_eq!(chain.rule_hashes(), vec!["n6vie0m1ET9iZWmO"]);
//! ```

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod core;
pub mod validators;

// Re-export commonly used types
pub use crate::core::action::Action;
pub use crate::core::chain::{Chain, HASH_LENGTH, HASH_PREFIX, HashObserver, TracingObserver};
pub use crate::core::error::{Error, Result};
pub use crate::core::match_criteria::{MatchCriteria, RenderMatch};
pub use crate::core::rule::Rule;
