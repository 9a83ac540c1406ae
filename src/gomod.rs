//! Go toolchain collaborators
//!
//! Thin wrappers around the `go` commands this tool drives: `go list` for
//! the module inventory and `go get` for a single upgrade. Parsing and the
//! eligibility filter live here so the state machine only ever sees the
//! filtered, sorted dataset.

use std::io;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error as ThisError;

use crate::types::Module;

/// Failure enumerating modules.
#[derive(Debug, ThisError)]
pub enum InventoryError {
    #[error("failed to run `go list`: {0}")]
    Spawn(#[source] io::Error),
    #[error("`go list -m -u -json all` exited with {0}")]
    Exit(ExitStatus),
    #[error("malformed `go list` output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure performing or re-verifying an upgrade.
#[derive(Debug, ThisError)]
pub enum UpgradeError {
    #[error("failed to run `go get`: {0}")]
    Spawn(#[source] io::Error),
    #[error("`go get -u {target}` exited with {status}")]
    Exit { target: String, status: ExitStatus },
    /// The post-upgrade inventory refresh failed.
    #[error(transparent)]
    Refresh(#[from] InventoryError),
}

/// Either collaborator's failure. Both are terminal for the session: the
/// state machine performs no retry and no partial recovery.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
}

/// Run `go list -m -u -json all` and return the outdated, directly-required
/// modules sorted by path.
pub fn list_outdated() -> Result<Vec<Module>, InventoryError> {
    let output = Command::new("go")
        .args(["list", "-m", "-u", "-json", "all"])
        .stderr(Stdio::inherit())
        .output()
        .map_err(InventoryError::Spawn)?;

    if !output.status.success() {
        return Err(InventoryError::Exit(output.status));
    }

    parse_outdated(&output.stdout)
}

/// Decode the concatenated JSON objects `go list -json` emits, keeping only
/// records that want an upgrade. Sorted ascending by path, ordinal
/// comparison. Filtering happens exactly once, here; the rest of the
/// program never re-derives it.
pub fn parse_outdated(raw: &[u8]) -> Result<Vec<Module>, InventoryError> {
    let mut modules = serde_json::Deserializer::from_slice(raw)
        .into_iter::<Module>()
        .filter(|record| record.as_ref().map_or(true, Module::wants_upgrade))
        .collect::<Result<Vec<_>, _>>()?;

    modules.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(modules)
}

/// Run `go get -u path@version` for one module, then re-list so the caller
/// receives a post-upgrade snapshot.
///
/// The command's output is discarded; the alternate screen owns the
/// terminal while this runs.
pub fn upgrade(module: &Module) -> Result<Vec<Module>, UpgradeError> {
    if let Some(update) = &module.update {
        let target = format!("{}@{}", update.path, update.version);
        let status = Command::new("go")
            .args(["get", "-u", target.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(UpgradeError::Spawn)?;

        if !status.success() {
            return Err(UpgradeError::Exit { target, status });
        }
    }

    Ok(list_outdated()?)
}
