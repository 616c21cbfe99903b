// SPDX-FileCopyrightText: 2026 Outdial Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints serde attributes cannot express: a sane
//! business-hours window, positive delays, and a non-empty database path.

use crate::diagnostic::ConfigError;
use crate::model::OutdialConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &OutdialConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` is not one of {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let open = config.queue.business_hours_open;
    let close = config.queue.business_hours_close;
    if open >= close || close > 24 {
        errors.push(ConfigError::Validation {
            message: format!("queue business hours window [{open}, {close}) is invalid"),
        });
    }

    if config.queue.retry_delay_hours < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.retry_delay_hours must be at least 1, got {}",
                config.queue.retry_delay_hours
            ),
        });
    }

    if config.queue.callback_fallback_minutes < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.callback_fallback_minutes must be at least 1, got {}",
                config.queue.callback_fallback_minutes
            ),
        });
    }

    if config.queue.default_max_call_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.default_max_call_attempts must be at least 1, got {}",
                config.queue.default_max_call_attempts
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
