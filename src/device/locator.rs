//! Lazy resolution of the `adb` executable.

use std::time::Duration;

use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::AdbShellError;
use crate::Result;

/// Locations probed when no explicit path is configured, in order.
pub const ADB_CANDIDATES: &[&str] = &["/opt/homebrew/bin/adb", "/usr/local/bin/adb", "adb"];

/// Per-candidate limit for `adb version`.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves the adb executable once and caches the answer.
///
/// Share one locator between device facades with an `Arc`; the probe runs
/// on first use and later calls read the cached value.
#[derive(Debug)]
pub struct AdbLocator {
    candidates: Vec<String>,
    resolved: OnceCell<Option<String>>,
}

impl AdbLocator {
    /// Probe the default candidate locations.
    pub fn new() -> Self {
        Self {
            candidates: ADB_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            resolved: OnceCell::new(),
        }
    }

    /// Probe a specific list of candidates.
    pub fn with_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
            resolved: OnceCell::new(),
        }
    }

    /// Use `path` without probing.
    pub fn fixed(path: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            resolved: OnceCell::new_with(Some(Some(path.into()))),
        }
    }

    /// Resolve the executable path, probing on first call.
    pub async fn resolve(&self) -> Result<&str> {
        self.resolved
            .get_or_init(|| probe_candidates(&self.candidates))
            .await
            .as_deref()
            .ok_or(AdbShellError::AdbNotFound)
    }
}

impl Default for AdbLocator {
    fn default() -> Self {
        Self::new()
    }
}

async fn probe_candidates(candidates: &[String]) -> Option<String> {
    for candidate in candidates {
        if probe(candidate).await {
            info!("using adb at {}", candidate);
            return Some(candidate.clone());
        }
        debug!("adb candidate rejected: {}", candidate);
    }
    None
}

async fn probe(candidate: &str) -> bool {
    let output = Command::new(candidate)
        .arg("version")
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(PROBE_TIMEOUT, output).await {
        Ok(Ok(output)) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            looks_like_adb_version(&text)
        }
        _ => false,
    }
}

/// Whether `adb version` output identifies a usable adb.
pub fn looks_like_adb_version(text: &str) -> bool {
    let first_line = text.lines().next().unwrap_or("");
    first_line.contains("Android Debug Bridge") || first_line.contains("version")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_detection() {
        assert!(looks_like_adb_version(
            "Android Debug Bridge version 1.0.41\nVersion 35.0.2-12147458\n"
        ));
        assert!(!looks_like_adb_version("sh: adb: not found"));
        assert!(!looks_like_adb_version(""));
    }

    #[tokio::test]
    async fn test_fixed_path() {
        let locator = AdbLocator::fixed("/custom/adb");
        assert_eq!(locator.resolve().await.unwrap(), "/custom/adb");
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let locator = AdbLocator::with_candidates(["/nonexistent/adb-shellfs/adb"]);
        assert!(matches!(
            locator.resolve().await,
            Err(AdbShellError::AdbNotFound)
        ));
        // Cached: second call answers without probing again.
        assert!(locator.resolve().await.is_err());
    }
}
