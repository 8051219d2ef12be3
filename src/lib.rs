// src/lib.rs

//! MediaShare deployment toolkit
//!
//! One binary covering the full path from empty directory to probed
//! deployment:
//!
//! - Scaffolding: render a fixed Ansible project and container build
//!   files, tracked by a checksum manifest for drift detection
//! - Validation: static shape checks over every generated (or edited)
//!   file before Ansible ever runs
//! - Runtime: the MediaShare API itself, four read-only JSON endpoints
//! - Probing: the same bounded health poll the deploy role performs

pub mod check;
pub mod config;
mod error;
pub mod probe;
pub mod scaffold;
pub mod server;

pub use error::{Error, Result};
