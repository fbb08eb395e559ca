//! Rule rendering
//!
//! A [`Rule`] renders to one command line per verb. Fragments are always
//! assembled in the same order and joined with single spaces:
//!
//! ```text
//! <verb> <chain> [<rule number>] [<prefix>] [-m comment --comment "<comment>"] [<match>] [<action>]
//! ```
//!
//! Empty fragments are skipped. Fingerprinting in [`crate::core::chain`]
//! re-renders rules through [`Rule::render_append`], so this order is shared
//! by installation and hashing.

use crate::core::action::Action;
use crate::core::match_criteria::{MatchCriteria, RenderMatch};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound(
    serialize = "M: Serialize",
    deserialize = "M: Deserialize<'de> + Default"
))]
pub struct Rule<M = MatchCriteria> {
    #[serde(rename = "match", default)]
    pub match_criteria: M,
    pub action: Action,
    /// Quoted annotation only; the caller keeps it free of `"`
    #[serde(default)]
    pub comment: String,
}

impl<M> Rule<M> {
    pub fn new(match_criteria: M, action: Action) -> Self {
        Self {
            match_criteria,
            action,
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl<M: RenderMatch> Rule<M> {
    /// Renders `-A <chain> ...`
    pub fn render_append(&self, chain_name: &str, prefix_fragment: &str) -> String {
        self.render_inner(vec!["-A".to_string(), chain_name.to_string()], prefix_fragment)
    }

    /// Renders `-I <chain> ...`
    pub fn render_insert(&self, chain_name: &str, prefix_fragment: &str) -> String {
        self.render_inner(vec!["-I".to_string(), chain_name.to_string()], prefix_fragment)
    }

    /// Renders `-R <chain> <rule_num> ...`; `rule_num` is the 1-based position
    pub fn render_replace(&self, chain_name: &str, rule_num: usize, prefix_fragment: &str) -> String {
        self.render_inner(
            vec!["-R".to_string(), chain_name.to_string(), rule_num.to_string()],
            prefix_fragment,
        )
    }

    fn render_inner(&self, mut fragments: Vec<String>, prefix_fragment: &str) -> String {
        if !prefix_fragment.is_empty() {
            fragments.push(prefix_fragment.to_string());
        }
        if !self.comment.is_empty() {
            fragments.push(format!("-m comment --comment \"{}\"", self.comment));
        }
        let match_fragment = self.match_criteria.render();
        if !match_fragment.is_empty() {
            fragments.push(match_fragment);
        }
        let action_fragment = self.action.to_fragment();
        if !action_fragment.is_empty() {
            fragments.push(action_fragment);
        }
        fragments.join(" ")
    }
}
