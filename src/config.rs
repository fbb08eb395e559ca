//! Chain definition files
//!
//! Chains are described in JSON:
//!
//! ```json
//! {
//!   "chains": [
//!     {
//!       "name": "cali-INPUT",
//!       "rules": [
//!         { "match": ["-m conntrack --ctstate INVALID"], "action": { "kind": "drop" } },
//!         { "action": { "kind": "jump", "target": "cali-wl-to-host" }, "comment": "to host" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `match` and `comment` are optional. Clauses in `match` are rendered in order.

use crate::core::chain::Chain;
use crate::core::error::{Error, Result};
use crate::validators;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Current file format version
pub const FORMAT_VERSION: u32 = 1;

/// Maximum number of rules accepted in a single chain
///
/// Guards against malformed or hostile definition files.
pub const MAX_RULES_PER_CHAIN: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub chains: Vec<Chain>,
}

impl Default for ChainFile {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            chains: Vec::new(),
        }
    }
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

impl ChainFile {
    /// Validates every chain and rule in the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for the first problem found: an unsupported
    /// version, a duplicate or invalid chain name, too many rules, or an
    /// invalid rule.
    pub fn validate(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(Error::validation(
                "version",
                format!(
                    "Unsupported format version {} (expected {FORMAT_VERSION})",
                    self.version
                ),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for (idx, chain) in self.chains.iter().enumerate() {
            let field = format!("chains[{idx}]");
            if !seen.insert(chain.name.as_str()) {
                return Err(Error::validation(
                    field,
                    format!("Duplicate chain name '{}'", chain.name),
                ));
            }
            if chain.rules.len() > MAX_RULES_PER_CHAIN {
                return Err(Error::validation(
                    field,
                    format!(
                        "Chain '{}' has {} rules (max {MAX_RULES_PER_CHAIN})",
                        chain.name,
                        chain.rules.len()
                    ),
                ));
            }
            validators::validate_chain(chain).map_err(|message| Error::validation(field, message))?;
        }
        Ok(())
    }

    pub fn chain(&self, name: &str) -> Option<&Chain> {
        self.chains.iter().find(|c| c.name == name)
    }
}

/// Parses a chain file from a JSON string without validating it.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the JSON is malformed.
pub fn from_json_str(json: &str) -> Result<ChainFile> {
    Ok(serde_json::from_str(json)?)
}

/// Loads and validates a chain file from disk.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read, is not valid JSON, or fails
/// [`ChainFile::validate`].
pub fn load_chain_file(path: &Path) -> Result<ChainFile> {
    debug!("Loading chain definitions from {}", path.display());
    let json = std::fs::read_to_string(path)?;
    let file = from_json_str(&json)?;
    file.validate()?;
    info!(
        "Loaded {} chain(s) with {} rule(s)",
        file.chains.len(),
        file.chains.iter().map(Chain::len).sum::<usize>()
    );
    Ok(file)
}

/// Saves a chain file using an atomic write pattern.
/// 1. Writes to a temporary file next to the target.
/// 2. Flushes it to disk.
/// 3. Atomically renames it over the target path.
///
/// # Errors
///
/// Returns `Err` if serialization or any file operation fails. The
/// temporary file is removed on failure.
pub fn save_chain_file(path: &Path, file: &ChainFile) -> Result<()> {
    let json = serde_json::to_string_pretty(file)?;

    let temp_path = temp_path_for(path);
    if let Err(e) = write_then_rename(&temp_path, path, json.as_bytes()) {
        if let Err(cleanup) = std::fs::remove_file(&temp_path)
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            warn!(
                "Failed to remove temporary file {}: {cleanup}",
                temp_path.display()
            );
        }
        return Err(e.into());
    }

    debug!("Saved {} chain(s) to {}", file.chains.len(), path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    PathBuf::from(temp_path)
}

fn write_then_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut out = std::fs::File::create(temp_path)?;
    out.write_all(contents)?;
    out.sync_all()?;
    drop(out);

    std::fs::rename(temp_path, path)
}
