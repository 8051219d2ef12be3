// src/scaffold/manifest.rs

//! Scaffold manifest
//!
//! `init` records a SHA-256 digest for every rendered file in a JSON
//! manifest at the scaffold root. Later runs use it to tell our files
//! from locally edited ones, and `verify` reports drift against it.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::scaffold::assets::ASSETS;

/// Manifest file name, relative to the scaffold root
pub const MANIFEST_FILE: &str = ".mediashare-scaffold.json";

const MANIFEST_VERSION: u32 = 1;

/// Digest record for one rendered file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub sha256: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    /// Crate version that rendered the tracked tree
    pub tool_version: String,
    pub generated_at: String,
    pub entries: Vec<ManifestEntry>,
}

/// Condition of one manifest entry on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Present with the recorded digest
    Ok,
    /// Present but edited since it was rendered
    Modified,
    /// No longer on disk
    Missing,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Ok => "ok",
            FileStatus::Modified => "modified",
            FileStatus::Missing => "missing",
        }
    }
}

/// Outcome of checking a tree against its manifest
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Tracked path and its condition, in manifest order
    pub entries: Vec<(String, FileStatus)>,
}

impl VerifyReport {
    pub fn count(&self, status: FileStatus) -> usize {
        self.entries.iter().filter(|(_, s)| *s == status).count()
    }

    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|(_, s)| *s == FileStatus::Ok)
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

/// Hex-encoded SHA-256 of a byte buffer
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

impl Manifest {
    /// Manifest describing the embedded tree as it would render today
    pub fn for_assets() -> Self {
        let entries = ASSETS
            .iter()
            .map(|asset| ManifestEntry {
                path: asset.path.to_string(),
                sha256: sha256_hex(asset.contents.as_bytes()),
                size: asset.contents.len() as u64,
            })
            .collect();
        Manifest {
            version: MANIFEST_VERSION,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            entries,
        }
    }

    /// Load the manifest stored under `root`
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(Error::ManifestNotFound(path));
        }
        let data = fs::read_to_string(&path)?;
        let manifest: Manifest = serde_json::from_str(&data)
            .map_err(|e| Error::Manifest(format!("{}: {}", path.display(), e)))?;
        if manifest.version != MANIFEST_VERSION {
            return Err(Error::Manifest(format!(
                "unsupported manifest version {} (expected {})",
                manifest.version, MANIFEST_VERSION
            )));
        }
        Ok(manifest)
    }

    /// Write the manifest under `root`, replacing any previous one
    ///
    /// Goes through a temp file in the same directory so a crash never
    /// leaves a half-written manifest behind.
    pub fn write(&self, root: &Path) -> Result<()> {
        let path = root.join(MANIFEST_FILE);
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');

        let mut tmp = tempfile::NamedTempFile::new_in(root)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Digest recorded for `path`, if the manifest tracks it
    pub fn entry(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Compare every tracked file on disk against its recorded digest
    pub fn verify_tree(&self, root: &Path) -> VerifyReport {
        let mut report = VerifyReport::default();
        for entry in &self.entries {
            let status = match fs::read(root.join(&entry.path)) {
                Ok(data) if sha256_hex(&data) == entry.sha256 => FileStatus::Ok,
                Ok(_) => FileStatus::Modified,
                Err(_) => FileStatus::Missing,
            };
            report.entries.push((entry.path.clone(), status));
        }
        report
    }
}
