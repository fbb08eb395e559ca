//! Rule verdicts and control transfers
//!
//! An [`Action`] is the final clause of every rendered rule. Each variant
//! carries only the fields it needs and renders to exactly one fragment:
//!
//! | Variant | Fragment |
//! |---|---|
//! | `Goto { target }` | `--goto <target>` |
//! | `Jump { target }` | `--jump <target>` |
//! | `Return` | `--jump RETURN` |
//! | `Drop` | `--jump DROP` |
//! | `Accept` | `--jump ACCEPT` |
//! | `Dnat { dest_addr, dest_port }` | `--jump DNAT --to-destination <addr>:<port>` |
//! | `Masquerade` | `--jump MASQUERADE` |
//! | `ClearMark { mark }` | `--jump MARK --set-mark 0/<mark:hex>` |
//! | `SetMark { mark }` | `--jump MARK --set-mark <mark:hex>/<mark:hex>` |
//!
//! Target names and addresses are rendered verbatim; see
//! [`crate::validators`] for optional pre-flight checks.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "kind", rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    /// Continue in `target`; a return from it skips back past the calling chain
    Goto { target: String },
    /// Continue in `target`, returning here afterwards
    Jump { target: String },
    /// Return to the calling chain
    Return,
    Drop,
    Accept,
    /// Destination NAT to `dest_addr:dest_port`
    Dnat { dest_addr: String, dest_port: u16 },
    /// Source NAT to the outgoing interface address
    Masquerade,
    /// Clears exactly the bits in `mark`
    ClearMark { mark: u32 },
    /// Sets exactly the bits in `mark`
    SetMark { mark: u32 },
}

impl Action {
    pub fn goto(target: impl Into<String>) -> Self {
        Action::Goto {
            target: target.into(),
        }
    }

    pub fn jump(target: impl Into<String>) -> Self {
        Action::Jump {
            target: target.into(),
        }
    }

    pub fn dnat(dest_addr: impl Into<String>, dest_port: u16) -> Self {
        Action::Dnat {
            dest_addr: dest_addr.into(),
            dest_port,
        }
    }

    /// Short kebab-case name of the variant (e.g. `"set-mark"`), used in log fields
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Renders the action as a single command fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use fwchain::core::action::Action;
    ///
    /// assert_eq!(Action::SetMark { mark: 0x10 }.to_fragment(), "--jump MARK --set-mark 10/10");
    /// assert_eq!(Action::ClearMark { mark: 0x10 }.to_fragment(), "--jump MARK --set-mark 0/10");
    /// ```
    pub fn to_fragment(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Goto { target } => write!(f, "--goto {target}"),
            Action::Jump { target } => write!(f, "--jump {target}"),
            Action::Return => f.write_str("--jump RETURN"),
            Action::Drop => f.write_str("--jump DROP"),
            Action::Accept => f.write_str("--jump ACCEPT"),
            Action::Dnat {
                dest_addr,
                dest_port,
            } => write!(f, "--jump DNAT --to-destination {dest_addr}:{dest_port}"),
            Action::Masquerade => f.write_str("--jump MASQUERADE"),
            Action::ClearMark { mark } => write!(f, "--jump MARK --set-mark 0/{mark:x}"),
            Action::SetMark { mark } => write!(f, "--jump MARK --set-mark {mark:x}/{mark:x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_transfer_fragments() {
        assert_eq!(Action::goto("cali-from-wl").to_fragment(), "--goto cali-from-wl");
        assert_eq!(Action::jump("cali-to-wl").to_fragment(), "--jump cali-to-wl");
        assert_eq!(Action::Return.to_fragment(), "--jump RETURN");
    }

    #[test]
    fn test_verdict_fragments() {
        assert_eq!(Action::Drop.to_fragment(), "--jump DROP");
        assert_eq!(Action::Accept.to_fragment(), "--jump ACCEPT");
        assert_eq!(Action::Masquerade.to_fragment(), "--jump MASQUERADE");
    }

    #[test]
    fn test_dnat_fragment() {
        assert_eq!(
            Action::dnat("10.0.0.5", 8080).to_fragment(),
            "--jump DNAT --to-destination 10.0.0.5:8080"
        );
    }

    #[test]
    fn test_mark_fragments_use_lowercase_hex() {
        assert_eq!(
            Action::SetMark { mark: 0x10 }.to_fragment(),
            "--jump MARK --set-mark 10/10"
        );
        assert_eq!(
            Action::ClearMark { mark: 0x10 }.to_fragment(),
            "--jump MARK --set-mark 0/10"
        );
        assert_eq!(
            Action::SetMark { mark: 0xABCD_0000 }.to_fragment(),
            "--jump MARK --set-mark abcd0000/abcd0000"
        );
        assert_eq!(
            Action::ClearMark { mark: 0x1 }.to_fragment(),
            "--jump MARK --set-mark 0/1"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Action::Accept.kind(), "accept");
        assert_eq!(Action::ClearMark { mark: 1 }.kind(), "clear-mark");
        assert_eq!(Action::dnat("1.2.3.4", 53).kind(), "dnat");
    }

    #[test]
    fn test_serde_tagging() {
        let action: Action =
            serde_json::from_str(r#"{"kind": "set-mark", "mark": 4096}"#).unwrap();
        assert_eq!(action, Action::SetMark { mark: 0x1000 });

        let json = serde_json::to_value(Action::jump("cali-fw-eth0")).unwrap();
        assert_eq!(json["kind"], "jump");
        assert_eq!(json["target"], "cali-fw-eth0");

        let action: Action = serde_json::from_str(r#"{"kind": "return"}"#).unwrap();
        assert_eq!(action, Action::Return);
    }
}
