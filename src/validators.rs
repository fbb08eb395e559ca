//! Input validation and sanitization for chain definitions
//!
//! Rendering never validates its inputs. These checks are for callers that
//! build chains from untrusted sources (see [`crate::config`]) and want to
//! reject names or comments the packet filter would refuse or misparse.

use crate::core::action::Action;
use crate::core::chain::{Chain, HASH_PREFIX};
use crate::core::rule::Rule;

/// Kernel limit for chain and target names (`XT_EXTENSION_MAXNAMELEN - 1`)
pub const MAX_CHAIN_NAME_LEN: usize = 28;

/// Longest `xt_comment` annotation in bytes (`XT_MAX_COMMENT_LEN - 1`, the
/// kernel buffer also holds the terminating NUL)
pub const MAX_COMMENT_LEN: usize = 255;

/// Sanitizes a comment for safe use inside `--comment "..."`.
///
/// Removes double quotes, backslashes and control characters, then limits
/// the result to [`MAX_COMMENT_LEN`] bytes without splitting a character.
///
/// # Examples
///
/// ```
/// use fwchain::validators::sanitize_comment;
///
/// assert_eq!(sanitize_comment("allow \"web\"\n"), "allow web");
/// ```
pub fn sanitize_comment(input: &str) -> String {
    let mut out = String::new();
    for c in input
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '\\'))
    {
        if out.len() + c.len_utf8() > MAX_COMMENT_LEN {
            break;
        }
        out.push(c);
    }
    out
}

/// Validates a rule comment. Empty comments are valid (no annotation).
///
/// # Errors
///
/// Returns `Err` if the comment is too long or contains quotes, backslashes
/// or control characters.
pub fn validate_comment(comment: &str) -> Result<(), String> {
    if comment.len() > MAX_COMMENT_LEN {
        return Err(format!("Comment too long (max {MAX_COMMENT_LEN} bytes)"));
    }
    if comment.contains('"') || comment.contains('\\') {
        return Err("Comment contains quote or backslash".to_string());
    }
    if comment.chars().any(char::is_control) {
        return Err("Comment contains control characters".to_string());
    }
    Ok(())
}

/// Validates a chain name.
///
/// Rules:
/// - 1 to 28 characters
/// - ASCII alphanumeric, dash, underscore, dot only
/// - Cannot start with `-` (would read as a flag)
///
/// # Errors
///
/// Returns `Err` if the name violates any of the rules above.
pub fn validate_chain_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Chain name is empty".to_string());
    }
    if name.len() > MAX_CHAIN_NAME_LEN {
        return Err(format!(
            "Chain name too long (max {MAX_CHAIN_NAME_LEN} characters)"
        ));
    }
    if name.starts_with('-') {
        return Err("Chain name cannot start with '-'".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err("Chain name contains invalid characters".to_string());
    }
    Ok(())
}

/// Validates a `--goto`/`--jump` target. Same rules as chain names.
///
/// # Errors
///
/// Returns `Err` if the target is not a valid chain name.
pub fn validate_target(target: &str) -> Result<(), String> {
    validate_chain_name(target).map_err(|e| e.replacen("Chain name", "Target", 1))
}

/// Validates an installation prefix fragment.
///
/// The fingerprint sentinel [`HASH_PREFIX`] is reserved for hashing; using it
/// at installation would make installed text equal the hash input.
///
/// # Errors
///
/// Returns `Err` if the prefix is the sentinel.
pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.trim() == HASH_PREFIX {
        return Err(format!("Prefix '{HASH_PREFIX}' is reserved for fingerprinting"));
    }
    Ok(())
}

/// Validates the free-text fields of an action.
///
/// # Errors
///
/// Returns `Err` for invalid jump/goto targets or an empty DNAT address.
pub fn validate_action(action: &Action) -> Result<(), String> {
    match action {
        Action::Goto { target } | Action::Jump { target } => validate_target(target),
        Action::Dnat { dest_addr, .. } => {
            if dest_addr.is_empty() || dest_addr.chars().any(char::is_whitespace) {
                Err("DNAT address is empty or contains whitespace".to_string())
            } else {
                Ok(())
            }
        }
        Action::Return
        | Action::Drop
        | Action::Accept
        | Action::Masquerade
        | Action::ClearMark { .. }
        | Action::SetMark { .. } => Ok(()),
    }
}

/// Validates a rule's comment and action.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate_rule<M>(rule: &Rule<M>) -> Result<(), String> {
    validate_comment(&rule.comment)?;
    validate_action(&rule.action)
}

/// Validates a chain name and every rule in it.
///
/// # Errors
///
/// Returns the first failure, prefixed with the 1-based rule position for
/// rule-level problems.
pub fn validate_chain<M>(chain: &Chain<M>) -> Result<(), String> {
    validate_chain_name(&chain.name)?;
    for (idx, rule) in chain.rules.iter().enumerate() {
        validate_rule(rule).map_err(|e| format!("rule {}: {e}", idx + 1))?;
    }
    Ok(())
}
