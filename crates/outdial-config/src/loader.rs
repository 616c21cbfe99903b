// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./outdial.toml` > `~/.config/outdial/outdial.toml`
//! > `/etc/outdial/outdial.toml`, with environment variable overrides via the
//! `OUTDIAL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::OutdialConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/outdial/outdial.toml` (system-wide)
/// 3. `~/.config/outdial/outdial.toml` (user XDG config)
/// 4. `./outdial.toml` (local directory)
/// 5. `OUTDIAL_*` environment variables
pub fn load_config() -> Result<OutdialConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<OutdialConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OutdialConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OutdialConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OutdialConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for
/// diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OutdialConfig::default()))
        .merge(Toml::file("/etc/outdial/outdial.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("outdial/outdial.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("outdial.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `OUTDIAL_QUEUE_RETRY_DELAY_HOURS` must map to
/// `queue.retry_delay_hours`, not `queue.retry.delay.hours`.
fn env_provider() -> Env {
    Env::prefixed("OUTDIAL_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("blacklist_", "blacklist.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.service.name, "outdial");
        assert_eq!(config.queue.retry_delay_hours, 4);
    }

    #[test]
    fn toml_string_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[storage]
database_path = "/var/lib/outdial/calls.db"

[queue]
business_hours_close = 20
"#,
        )
        .unwrap();
        assert_eq!(config.storage.database_path, "/var/lib/outdial/calls.db");
        assert_eq!(config.queue.business_hours_close, 20);
        assert_eq!(config.queue.business_hours_open, 8);
    }

    #[test]
    fn unknown_key_fails_extraction() {
        let result = load_config_from_str(
            r#"
[service]
nmae = "typo"
"#,
        );
        assert!(result.is_err());
    }
}
