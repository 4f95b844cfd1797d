use crate::extract::Extraction;
use crate::model::Surface;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const SNAPSHOT_VERSION: u32 = 1;

/// A persisted surface, so CI can keep a baseline artifact instead of
/// checking out the old source tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version for forward compatibility
    pub version: u32,
    /// Unix timestamp of creation
    pub created_at: String,
    /// Name of the tree root the snapshot was taken from
    pub root: String,
    pub surface: Surface,
    /// Files that failed to parse during extraction; a non-empty list means
    /// the surface is incomplete.
    pub failed_files: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unsupported snapshot version {0} (expected {SNAPSHOT_VERSION})")]
    Version(u32),
}

impl Snapshot {
    pub fn from_extraction(extraction: &Extraction, root: &Path) -> Self {
        let root_name = root
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("project")
            .to_string();

        Self {
            version: SNAPSHOT_VERSION,
            created_at: unix_now(),
            root: root_name,
            surface: extraction.surface.clone(),
            failed_files: extraction
                .errors
                .iter()
                .map(|e| e.path.display().to_string())
                .collect(),
        }
    }
}

pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::Version(snapshot.version));
    }
    Ok(snapshot)
}

/// Simple timestamp (no chrono dependency)
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractOptions, build_surface};

    #[test]
    fn snapshot_round_trips_through_json() {
        let tree = tempfile::tempdir().unwrap();
        std::fs::write(
            tree.path().join("api.py"),
            "def fetch(url: str, timeout: int = 30) -> str: ...\n",
        )
        .unwrap();

        let extraction = build_surface(tree.path(), &ExtractOptions::default()).unwrap();
        let snapshot = Snapshot::from_extraction(&extraction, tree.path());

        let out = tempfile::tempdir().unwrap();
        let file = out.path().join("baseline.json");
        save_snapshot(&snapshot, &file).unwrap();

        let loaded = load_snapshot(&file).unwrap();
        assert_eq!(loaded.version, SNAPSHOT_VERSION);
        assert!(loaded.failed_files.is_empty());
        assert_eq!(
            serde_json::to_string(&loaded.surface).unwrap(),
            serde_json::to_string(&snapshot.surface).unwrap()
        );
    }

    #[test]
    fn unknown_version_is_rejected() {
        let out = tempfile::tempdir().unwrap();
        let file = out.path().join("future.json");
        std::fs::write(
            &file,
            r#"{"version": 99, "created_at": "0", "root": "x", "surface": {"modules": []}, "failed_files": []}"#,
        )
        .unwrap();
        assert!(matches!(
            load_snapshot(&file),
            Err(SnapshotError::Version(99))
        ));
    }
}
