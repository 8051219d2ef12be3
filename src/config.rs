// src/config.rs

//! Runtime configuration for the MediaShare API
//!
//! The service identifies itself through three environment variables,
//! the same ones the generated deployment tree writes into the
//! container's env file (`roles/mediashare_app/templates/env.j2`):
//!
//! - `APP_VERSION` - reported version tag (default: crate version)
//! - `ENVIRONMENT` - environment tag, e.g. `development`, `production`
//! - `CLOUD_PROVIDER` - provider tag, e.g. `aws`, `gcp`

use semver::Version;
use std::env;
use tracing::warn;

/// Environment variable holding the reported version tag
pub const ENV_APP_VERSION: &str = "APP_VERSION";
/// Environment variable holding the environment tag
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
/// Environment variable holding the cloud provider tag
pub const ENV_CLOUD_PROVIDER: &str = "CLOUD_PROVIDER";

/// Default bind address for `mediashare serve`
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Identity the HTTP service reports on its endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub version: String,
    pub environment: String,
    pub cloud_provider: String,
}

impl ServiceConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    ///
    /// Empty values are treated as unset, matching how the env file
    /// template behaves when a deployment variable is blank.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = Self {
            version: get(ENV_APP_VERSION, env!("CARGO_PKG_VERSION")),
            environment: get(ENV_ENVIRONMENT, "development"),
            cloud_provider: get(ENV_CLOUD_PROVIDER, "unknown"),
        };

        if Version::parse(&config.version).is_err() {
            warn!(
                "APP_VERSION '{}' is not a semantic version; image tags derived from it may misbehave",
                config.version
            );
        }

        config
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = ServiceConfig::from_lookup(|_| None);
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.environment, "development");
        assert_eq!(config.cloud_provider, "unknown");
    }

    #[test]
    fn test_lookup_overrides_every_field() {
        let config = ServiceConfig::from_lookup(|name| match name {
            ENV_APP_VERSION => Some("2.3.1".to_string()),
            ENV_ENVIRONMENT => Some("production".to_string()),
            ENV_CLOUD_PROVIDER => Some("aws".to_string()),
            _ => None,
        });
        assert_eq!(config.version, "2.3.1");
        assert_eq!(config.environment, "production");
        assert_eq!(config.cloud_provider, "aws");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = ServiceConfig::from_lookup(|name| match name {
            ENV_ENVIRONMENT => Some("   ".to_string()),
            _ => Some(String::new()),
        });
        assert_eq!(config.environment, "development");
        assert_eq!(config.cloud_provider, "unknown");
    }

    #[test]
    fn test_non_semver_version_is_kept_verbatim() {
        // A bad tag is reported as-is; we only warn about it.
        let config = ServiceConfig::from_lookup(|name| match name {
            ENV_APP_VERSION => Some("latest".to_string()),
            _ => None,
        });
        assert_eq!(config.version, "latest");
    }

    #[test]
    fn test_default_trait_matches_empty_lookup() {
        assert_eq!(ServiceConfig::default(), ServiceConfig::from_lookup(|_| None));
    }
}
