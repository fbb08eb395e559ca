//! Shared test utilities for core module tests
//!
//! Provides common fixtures to avoid duplication across test suites.
//! This module is only compiled in test mode.

use crate::core::action::Action;
use crate::core::chain::Chain;
use crate::core::match_criteria::MatchCriteria;
use crate::core::rule::Rule;

/// Creates the three-rule forward chain used by the golden-value tests.
///
/// Covers a match-only rule, a rule with both comment and match, and a rule
/// with neither.
pub fn create_test_chain() -> Chain {
    Chain::new(
        "cali-FORWARD",
        vec![
            create_test_rule("-m conntrack --ctstate INVALID", Action::Drop),
            create_test_rule("-m conntrack --ctstate RELATED,ESTABLISHED", Action::Accept)
                .with_comment("allow tracked"),
            Rule::new(MatchCriteria::new(), Action::SetMark { mark: 0x10 }),
        ],
    )
}

/// Fingerprints of [`create_test_chain`], computed independently of this crate.
pub const TEST_CHAIN_HASHES: [&str; 3] = ["QiJrHDXMiz8yDDx6", "m3P8mbvV5QIxuX4Q", "LCcPlaQN7HQyrJMh"];

/// Creates a rule with a single raw match clause (empty for none).
pub fn create_test_rule(clause: &str, action: Action) -> Rule {
    Rule::new(MatchCriteria::new().raw(clause), action)
}
