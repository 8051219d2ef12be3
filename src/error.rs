// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for the MediaShare bootstrap tool
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors (manifest, HTTP payloads)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (health probing)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Scaffold rendering error
    #[error("Failed to render scaffold: {0}")]
    Render(String),

    /// Scaffold manifest is missing
    #[error("No scaffold manifest at {}: run `mediashare init` first", .0.display())]
    ManifestNotFound(PathBuf),

    /// Scaffold manifest exists but cannot be used
    #[error("Invalid scaffold manifest: {0}")]
    Manifest(String),

    /// Health probe gave up
    #[error("Health probe failed: {0}")]
    Probe(String),

    /// HTTP service error
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
