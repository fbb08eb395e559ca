//! Match criteria for rules
//!
//! Rules only need a match to render itself to text. [`RenderMatch`] is that
//! boundary; [`MatchCriteria`] is an ordered clause builder implementing it.
//! Pre-rendered strings implement it too.

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

/// Renders match criteria to a command fragment.
///
/// Implementations return either an empty string (no match clause) or
/// space-separated flags without leading or trailing whitespace.
pub trait RenderMatch {
    fn render(&self) -> String;
}

impl RenderMatch for String {
    fn render(&self) -> String {
        self.clone()
    }
}

impl RenderMatch for &str {
    fn render(&self) -> String {
        (*self).to_string()
    }
}

/// Ordered list of match clauses, rendered in insertion order.
///
/// # Example
///
/// ```
/// use fwchain::core::match_criteria::{MatchCriteria, RenderMatch};
///
/// let m = MatchCriteria::new().protocol("tcp").dest_ports(&[22, 443]);
/// assert_eq!(m.render(), "-p tcp -m multiport --destination-ports 22,443");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MatchCriteria(Vec<String>);

impl MatchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clauses(&self) -> &[String] {
        &self.0
    }

    /// Appends a clause verbatim. Empty or whitespace-only clauses are ignored.
    pub fn raw(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        let trimmed = clause.trim();
        if !trimmed.is_empty() {
            self.0.push(trimmed.to_string());
        }
        self
    }

    pub fn conntrack_state(self, states: &str) -> Self {
        self.raw(format!("-m conntrack --ctstate {states}"))
    }

    pub fn not_conntrack_state(self, states: &str) -> Self {
        self.raw(format!("-m conntrack ! --ctstate {states}"))
    }

    pub fn protocol(self, protocol: &str) -> Self {
        self.raw(format!("-p {protocol}"))
    }

    pub fn not_protocol(self, protocol: &str) -> Self {
        self.raw(format!("! -p {protocol}"))
    }

    pub fn source_net(self, net: IpNetwork) -> Self {
        self.raw(format!("--source {net}"))
    }

    pub fn not_source_net(self, net: IpNetwork) -> Self {
        self.raw(format!("! --source {net}"))
    }

    pub fn dest_net(self, net: IpNetwork) -> Self {
        self.raw(format!("--destination {net}"))
    }

    pub fn not_dest_net(self, net: IpNetwork) -> Self {
        self.raw(format!("! --destination {net}"))
    }

    pub fn in_interface(self, interface: &str) -> Self {
        self.raw(format!("--in-interface {interface}"))
    }

    pub fn out_interface(self, interface: &str) -> Self {
        self.raw(format!("--out-interface {interface}"))
    }

    /// Matches packets with every bit of `mark` set
    pub fn mark_set(self, mark: u32) -> Self {
        self.raw(format!("-m mark --mark {mark:#x}/{mark:#x}"))
    }

    /// Matches packets with every bit of `mark` clear
    pub fn mark_clear(self, mark: u32) -> Self {
        self.raw(format!("-m mark --mark 0/{mark:#x}"))
    }

    pub fn source_ip_set(self, name: &str) -> Self {
        self.raw(format!("-m set --match-set {name} src"))
    }

    pub fn dest_ip_set(self, name: &str) -> Self {
        self.raw(format!("-m set --match-set {name} dst"))
    }

    pub fn source_ports(self, ports: &[u16]) -> Self {
        self.raw(format!("-m multiport --source-ports {}", join_ports(ports)))
    }

    pub fn dest_ports(self, ports: &[u16]) -> Self {
        self.raw(format!(
            "-m multiport --destination-ports {}",
            join_ports(ports)
        ))
    }
}

fn join_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl From<Vec<String>> for MatchCriteria {
    fn from(clauses: Vec<String>) -> Self {
        clauses.into_iter().fold(Self::new(), Self::raw)
    }
}

impl From<MatchCriteria> for Vec<String> {
    fn from(criteria: MatchCriteria) -> Self {
        criteria.0
    }
}

impl RenderMatch for MatchCriteria {
    fn render(&self) -> String {
        self.0.join(" ")
    }
}
