// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the outdial backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level outdial configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutdialConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Queue selection and rescheduling settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Blacklist scoping settings.
    #[serde(default)]
    pub blacklist: BlacklistConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "outdial".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "outdial.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Queue selection and rescheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Delay before an automatic retry after `no_answer`/`busy`, in hours.
    #[serde(default = "default_retry_delay_hours")]
    pub retry_delay_hours: i64,

    /// Fallback delay for a callback outcome without an explicit date,
    /// in minutes.
    #[serde(default = "default_callback_fallback_minutes")]
    pub callback_fallback_minutes: i64,

    /// Opening hour of the automatic-retry window (inclusive).
    #[serde(default = "default_business_hours_open")]
    pub business_hours_open: u32,

    /// Closing hour of the automatic-retry window (exclusive).
    #[serde(default = "default_business_hours_close")]
    pub business_hours_close: u32,

    /// Default batch size for `auto-assign` when none is given.
    #[serde(default = "default_auto_assign_limit")]
    pub auto_assign_limit: u32,

    /// Attempt cap applied to newly created contacts.
    #[serde(default = "default_max_call_attempts")]
    pub default_max_call_attempts: i32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            retry_delay_hours: default_retry_delay_hours(),
            callback_fallback_minutes: default_callback_fallback_minutes(),
            business_hours_open: default_business_hours_open(),
            business_hours_close: default_business_hours_close(),
            auto_assign_limit: default_auto_assign_limit(),
            default_max_call_attempts: default_max_call_attempts(),
        }
    }
}

fn default_retry_delay_hours() -> i64 {
    4
}

fn default_callback_fallback_minutes() -> i64 {
    60
}

fn default_business_hours_open() -> u32 {
    8
}

fn default_business_hours_close() -> u32 {
    21
}

fn default_auto_assign_limit() -> u32 {
    50
}

fn default_max_call_attempts() -> i32 {
    3
}

/// How far blacklist deactivation fan-out reaches when clearing the
/// `is_blacklisted` flag on contacts sharing the entry's phone number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Deserialize, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeactivationScope {
    /// Clear only contacts in the campaign the entry applied to.
    #[default]
    Campaign,
    /// Clear every contact sharing the phone, regardless of campaign.
    Global,
}

/// Blacklist scoping configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlacklistConfig {
    /// Fan-out scope used when an entry is deactivated.
    #[serde(default)]
    pub deactivation_scope: DeactivationScope,
}
