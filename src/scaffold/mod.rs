// src/scaffold/mod.rs

//! Rendering the deployment tree
//!
//! `render` lays the embedded tree out under a target directory. It is
//! safe to run repeatedly: files that already match are left alone, and
//! files a user has edited are never overwritten unless forced. The
//! previous manifest is what lets us tell "ours but outdated" apart
//! from "edited by hand".

pub mod assets;
pub mod manifest;

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::scaffold::assets::ASSETS;
use crate::scaffold::manifest::{sha256_hex, Manifest};

/// What happened to one file during a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Written for the first time
    Created,
    /// Already identical on disk
    Unchanged,
    /// Overwritten: either an outdated rendering of ours, or forced
    Updated,
    /// Locally edited and left alone
    Skipped,
    /// Could not be written, see the report's failures
    Failed,
}

impl RenderOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RenderOutcome::Created => "created",
            RenderOutcome::Unchanged => "unchanged",
            RenderOutcome::Updated => "updated",
            RenderOutcome::Skipped => "skipped",
            RenderOutcome::Failed => "failed",
        }
    }
}

/// Per-file outcomes of one render pass
#[derive(Debug, Default)]
pub struct RenderReport {
    pub outcomes: Vec<(String, RenderOutcome)>,
    /// One message per failed file; rendering carries on past failures
    pub failures: Vec<String>,
}

impl RenderReport {
    pub fn count(&self, outcome: RenderOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    pub fn has_skips(&self) -> bool {
        self.count(RenderOutcome::Skipped) > 0
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Render the embedded tree under `root`
///
/// With `force` set, locally edited files are overwritten instead of
/// skipped. The manifest is rewritten only when its entries actually
/// change, so an all-unchanged run leaves the tree byte-identical.
pub fn render(root: &Path, force: bool) -> Result<RenderReport> {
    fs::create_dir_all(root)?;
    let previous = Manifest::load(root).ok();

    let mut report = RenderReport::default();
    for asset in ASSETS {
        let target = root.join(asset.path);
        let desired = asset.contents.as_bytes();

        // A failed file does not stop the pass; the rest of the tree
        // still renders and the failure is reported at the end.
        let outcome = if target.is_dir() {
            fail(&mut report, asset.path, "a directory is in the way")
        } else {
            match fs::read(&target) {
                Err(_) => match write_atomic(&target, desired) {
                    Ok(()) => RenderOutcome::Created,
                    Err(e) => fail(&mut report, asset.path, &e.to_string()),
                },
                Ok(current) if current == desired => RenderOutcome::Unchanged,
                Ok(current) => {
                    let ours_but_outdated = previous
                        .as_ref()
                        .and_then(|m| m.entry(asset.path))
                        .is_some_and(|e| e.sha256 == sha256_hex(&current));
                    if force || ours_but_outdated {
                        match write_atomic(&target, desired) {
                            Ok(()) => RenderOutcome::Updated,
                            Err(e) => fail(&mut report, asset.path, &e.to_string()),
                        }
                    } else {
                        warn!(path = asset.path, "locally edited, not overwriting (use --force)");
                        RenderOutcome::Skipped
                    }
                }
            }
        };

        debug!(path = asset.path, outcome = outcome.label(), "rendered");
        report.outcomes.push((asset.path.to_string(), outcome));
    }

    // The manifest always records the digests of the embedded contents,
    // including for skipped files: those count as drift until resolved.
    let manifest = Manifest::for_assets();
    let manifest_unchanged = previous
        .as_ref()
        .is_some_and(|m| m.entries == manifest.entries);
    if !manifest_unchanged {
        manifest.write(root)?;
    }

    Ok(report)
}

fn fail(report: &mut RenderReport, path: &str, message: &str) -> RenderOutcome {
    warn!(path, message, "could not render");
    report.failures.push(format!("{path}: {message}"));
    RenderOutcome::Failed
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Render(format!("{} has no parent directory", path.display())))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
