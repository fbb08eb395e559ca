//! Named rule chains and their fingerprint chain
//!
//! [`Chain::rule_hashes`] returns one fingerprint per rule. The fingerprint at
//! position `i` covers the chain name and every rule up to and including `i`:
//!
//! 1. `running = SHA-224(name)`
//! 2. for each rule: `running = SHA-224(running || render_append(name, HASH_PREFIX))`
//! 3. fingerprint = first [`HASH_LENGTH`] chars of URL-safe unpadded base64 of `running`
//!
//! Editing, inserting, removing or reordering a rule changes the fingerprint
//! of that position and of every position after it, never of the ones before.
//!
//! # Example
//!
//! ```
//! use fwchain::core::action::Action;
//! use fwchain::core::chain::Chain;
//! use fwchain::core::match_criteria::MatchCriteria;
//! use fwchain::core::rule::Rule;
//!
//! let chain = Chain::new("cali-INPUT", vec![Rule::new(MatchCriteria::new(), Action::Accept)]);
//! let hashes = chain.rule_hashes();
//! assert_eq!(hashes.len(), 1);
//! assert_eq!(hashes[0].len(), 16);
//! ```

use crate::core::action::Action;
use crate::core::error::{Error, Result};
use crate::core::match_criteria::{MatchCriteria, RenderMatch};
use crate::core::rule::Rule;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224};

/// Fingerprint length in base64 characters (96 bits).
///
/// Producers and consumers comparing fingerprints must agree on this value.
pub const HASH_LENGTH: usize = 16;

/// Prefix fragment used only when rendering rules for hashing.
///
/// Installation prefixes are flags (`-w`, `-m ...`), so a bare word never
/// collides with one. Callers must not install rules with this prefix;
/// [`crate::validators::validate_prefix`] rejects it.
pub const HASH_PREFIX: &str = "HASH";

/// Per-rule details reported after each hash step
#[derive(Debug, Clone, Copy)]
pub struct HashedRule<'a> {
    pub chain: &'a str,
    /// 0-based position in the chain
    pub position: usize,
    /// Exact text that was fed into the digest
    pub rule_fragment: &'a str,
    pub action: &'a Action,
    pub hash: &'a str,
}

/// Side-channel notified once per hashed rule. Cannot affect the result.
pub trait HashObserver {
    fn rule_hashed(&self, event: &HashedRule<'_>);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl HashObserver for NoopObserver {
    fn rule_hashed(&self, _event: &HashedRule<'_>) {}
}

/// Emits a `debug` tracing event per hashed rule
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl HashObserver for TracingObserver {
    fn rule_hashed(&self, event: &HashedRule<'_>) {
        tracing::debug!(
            rule_fragment = event.rule_fragment,
            action = %event.action,
            position = event.position,
            chain = event.chain,
            hash = event.hash,
            "Hashed rule"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "M: Serialize",
    deserialize = "M: Deserialize<'de> + Default"
))]
pub struct Chain<M = MatchCriteria> {
    pub name: String,
    /// Installation order, top to bottom
    #[serde(default = "Vec::new")]
    pub rules: Vec<Rule<M>>,
}

impl<M> Chain<M> {
    pub fn new(name: impl Into<String>, rules: Vec<Rule<M>>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<M: RenderMatch> Chain<M> {
    /// Computes the fingerprint of every rule, in rule order.
    pub fn rule_hashes(&self) -> Vec<String> {
        self.rule_hashes_observed(&NoopObserver)
    }

    /// Same as [`Chain::rule_hashes`], reporting each step to `observer`.
    pub fn rule_hashes_observed(&self, observer: &dyn HashObserver) -> Vec<String> {
        // Seeding with the name keeps identical rules in different chains apart
        let seed = Sha224::digest(self.name.as_bytes());

        self.rules
            .iter()
            .enumerate()
            .scan(seed, |running, (position, rule)| {
                let rule_fragment = rule.render_append(&self.name, HASH_PREFIX);

                let mut hasher = Sha224::new();
                hasher.update(running.as_slice());
                hasher.update(rule_fragment.as_bytes());
                *running = hasher.finalize();

                let hash = encode_hash(running.as_slice());
                observer.rule_hashed(&HashedRule {
                    chain: &self.name,
                    position,
                    rule_fragment: &rule_fragment,
                    action: &rule.action,
                    hash: &hash,
                });
                Some(hash)
            })
            .collect()
    }

    /// Renders an append command for every rule, in order.
    pub fn render_append_all(&self, prefix_fragment: &str) -> Vec<String> {
        self.rules
            .iter()
            .map(|rule| rule.render_append(&self.name, prefix_fragment))
            .collect()
    }

    /// Renders an insert command for every rule, in order.
    ///
    /// Inserting each at the top reverses them; callers wanting the chain order
    /// at the top of a live chain insert this list back to front.
    pub fn render_insert_all(&self, prefix_fragment: &str) -> Vec<String> {
        self.rules
            .iter()
            .map(|rule| rule.render_insert(&self.name, prefix_fragment))
            .collect()
    }

    /// Renders a replace command for the rule at 1-based `position`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPosition`] if `position` is 0 or past the end.
    pub fn render_replace_at(&self, position: usize, prefix_fragment: &str) -> Result<String> {
        let rule = position
            .checked_sub(1)
            .and_then(|idx| self.rules.get(idx))
            .ok_or(Error::InvalidPosition {
                position,
                len: self.rules.len(),
            })?;
        Ok(rule.render_replace(&self.name, position, prefix_fragment))
    }

    /// Renders a replace command for every rule at its own position.
    pub fn render_replace_all(&self, prefix_fragment: &str) -> Vec<String> {
        self.rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| rule.render_replace(&self.name, idx + 1, prefix_fragment))
            .collect()
    }
}

fn encode_hash(digest: &[u8]) -> String {
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(HASH_LENGTH);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingObserver {
        events: RefCell<Vec<(usize, String, String, &'static str)>>,
    }

    impl HashObserver for RecordingObserver {
        fn rule_hashed(&self, event: &HashedRule<'_>) {
            self.events.borrow_mut().push((
                event.position,
                event.rule_fragment.to_string(),
                event.hash.to_string(),
                event.action.kind(),
            ));
        }
    }

    fn two_rule_chain() -> Chain {
        Chain::new(
            "cali-INPUT",
            vec![
                Rule::new(MatchCriteria::new().protocol("tcp"), Action::Accept),
                Rule::new(MatchCriteria::new(), Action::Drop).with_comment("default"),
            ],
        )
    }

    #[test]
    fn test_empty_chain_has_no_hashes() {
        let chain: Chain = Chain::new("cali-INPUT", vec![]);
        assert!(chain.rule_hashes().is_empty());
    }

    #[test]
    fn test_single_accept_golden_hash() {
        let chain = Chain::new("cali-INPUT", vec![Rule::new(MatchCriteria::new(), Action::Accept)]);
        assert_eq!(chain.rule_hashes(), vec!["n6vie0m1ET9iZWmO".to_string()]);
    }

    #[test]
    fn test_observer_sees_hash_input_and_output() {
        let chain = two_rule_chain();
        let observer = RecordingObserver::default();
        let hashes = chain.rule_hashes_observed(&observer);

        let events = observer.events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, 0);
        assert_eq!(events[0].1, "-A cali-INPUT HASH -p tcp --jump ACCEPT");
        assert_eq!(events[0].3, "accept");
        assert_eq!(events[1].1, "-A cali-INPUT HASH -m comment --comment \"default\" --jump DROP");
        assert_eq!(events[1].2, hashes[1]);
    }

    #[test]
    fn test_observer_does_not_change_result() {
        let chain = two_rule_chain();
        assert_eq!(chain.rule_hashes(), chain.rule_hashes_observed(&TracingObserver));
        assert_eq!(
            chain.rule_hashes(),
            chain.rule_hashes_observed(&RecordingObserver::default())
        );
    }

    #[test]
    fn test_tracing_observer_logs_full_action() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct SharedBuf(Arc<Mutex<Vec<u8>>>);

        impl Write for SharedBuf {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let chain = Chain::new(
            "cali-INPUT",
            vec![
                Rule::new(MatchCriteria::new(), Action::jump("cali-to-wl")),
                Rule::new(MatchCriteria::new(), Action::SetMark { mark: 0x10 }),
            ],
        );
        let hashes = tracing::subscriber::with_default(subscriber, || {
            chain.rule_hashes_observed(&TracingObserver)
        });

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Hashed rule"));
        assert!(output.contains("action=--jump cali-to-wl"));
        assert!(output.contains("action=--jump MARK --set-mark 10/10"));
        assert!(output.contains(hashes[1].as_str()));
    }

    #[test]
    fn test_render_all() {
        let chain = two_rule_chain();
        assert_eq!(
            chain.render_append_all(""),
            vec![
                "-A cali-INPUT -p tcp --jump ACCEPT".to_string(),
                "-A cali-INPUT -m comment --comment \"default\" --jump DROP".to_string(),
            ]
        );
        assert_eq!(chain.render_insert_all("")[0], "-I cali-INPUT -p tcp --jump ACCEPT");
        assert_eq!(
            chain.render_replace_all("")[1],
            "-R cali-INPUT 2 -m comment --comment \"default\" --jump DROP"
        );
    }

    #[test]
    fn test_render_replace_at_bounds() {
        let chain = two_rule_chain();
        assert_eq!(
            chain.render_replace_at(1, "").unwrap(),
            "-R cali-INPUT 1 -p tcp --jump ACCEPT"
        );
        assert!(matches!(
            chain.render_replace_at(0, ""),
            Err(Error::InvalidPosition { position: 0, len: 2 })
        ));
        assert!(matches!(
            chain.render_replace_at(3, ""),
            Err(Error::InvalidPosition { position: 3, len: 2 })
        ));
    }

    #[test]
    fn test_encode_hash_alphabet() {
        let encoded = encode_hash(&[0xfb, 0xff, 0xfe, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(encoded.len(), HASH_LENGTH);
        assert!(encoded.starts_with("-__-"));
    }
}
