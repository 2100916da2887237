//! Configuration for loop detection.

use super::types::LoopDetectionError;
use crate::config::{
    CRITICAL_THRESHOLD, GLOBAL_CIRCUIT_BREAKER_THRESHOLD, MAX_TRACKED_SIGNATURES,
    WARNING_THRESHOLD,
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Loop detection configuration loaded from env/files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopDetectionConfig {
    /// Global toggle
    #[serde(rename = "loop_detection_enabled")]
    pub enabled: bool,

    /// Per-signature no-progress count that logs a warning
    #[serde(rename = "loop_warning_threshold")]
    pub warning_threshold: usize,
    /// Per-signature no-progress count that trips the poll-loop breaker
    #[serde(rename = "loop_critical_threshold")]
    pub critical_threshold: usize,
    /// Session-wide generic no-progress count that trips the global breaker
    #[serde(rename = "loop_global_circuit_breaker_threshold")]
    pub global_circuit_breaker_threshold: usize,
    /// Distinct signatures tracked per session; the least recently seen is
    /// evicted beyond this
    #[serde(rename = "loop_max_tracked_signatures")]
    pub max_tracked_signatures: usize,

    /// Tools that are always poll-style
    #[serde(rename = "loop_poll_tools")]
    pub poll_tools: Vec<String>,
    /// Parameter holding the call's intent (e.g. `action`)
    #[serde(rename = "loop_poll_action_field")]
    pub poll_action_field: String,
    /// Intent values that mark a call as a status poll
    #[serde(rename = "loop_poll_actions")]
    pub poll_actions: Vec<String>,
    /// `details` fields folded into the progress fingerprint
    #[serde(rename = "loop_progress_detail_fields")]
    pub progress_detail_fields: Vec<String>,
}

impl Default for LoopDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning_threshold: WARNING_THRESHOLD,
            critical_threshold: CRITICAL_THRESHOLD,
            global_circuit_breaker_threshold: GLOBAL_CIRCUIT_BREAKER_THRESHOLD,
            max_tracked_signatures: MAX_TRACKED_SIGNATURES,
            poll_tools: vec!["command_status".to_string()],
            poll_action_field: "action".to_string(),
            poll_actions: vec!["poll".to_string(), "status".to_string(), "log".to_string()],
            progress_detail_fields: vec![
                "status".to_string(),
                "aggregated".to_string(),
                "exitCode".to_string(),
            ],
        }
    }
}

impl LoopDetectionConfig {
    /// Load loop detection settings from config files and environment variables.
    ///
    /// Priority: env vars → config files → defaults. Invalid thresholds fall
    /// back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            .set_default("loop_detection_enabled", defaults.enabled)
            .and_then(|b| {
                b.set_default("loop_warning_threshold", defaults.warning_threshold as u64)
            })
            .and_then(|b| {
                b.set_default("loop_critical_threshold", defaults.critical_threshold as u64)
            })
            .and_then(|b| {
                b.set_default(
                    "loop_global_circuit_breaker_threshold",
                    defaults.global_circuit_breaker_threshold as u64,
                )
            })
            .and_then(|b| {
                b.set_default(
                    "loop_max_tracked_signatures",
                    defaults.max_tracked_signatures as u64,
                )
            })
            .and_then(|b| b.set_default("loop_poll_tools", defaults.poll_tools.clone()))
            .and_then(|b| {
                b.set_default("loop_poll_action_field", defaults.poll_action_field.clone())
            })
            .and_then(|b| b.set_default("loop_poll_actions", defaults.poll_actions.clone()))
            .and_then(|b| {
                b.set_default(
                    "loop_progress_detail_fields",
                    defaults.progress_detail_fields.clone(),
                )
            })
            .map(|b| {
                b.add_source(File::with_name("config/default").required(false))
                    .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
                    .add_source(File::with_name("config/local").required(false))
                    .add_source(
                        Environment::default()
                            .ignore_empty(true)
                            .try_parsing(true)
                            .list_separator(",")
                            .with_list_parse_key("loop_poll_tools")
                            .with_list_parse_key("loop_poll_actions")
                            .with_list_parse_key("loop_progress_detail_fields"),
                    )
            });

        let config = match builder {
            Ok(builder) => builder.build(),
            Err(err) => return Self::warn_and_default(err),
        };

        let settings: Self = match config.and_then(Config::try_deserialize) {
            Ok(settings) => settings,
            Err(err) => return Self::warn_and_default(err),
        };

        match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                warn!(error = %err, "Invalid loop detection thresholds, using defaults");
                Self {
                    warning_threshold: defaults.warning_threshold,
                    critical_threshold: defaults.critical_threshold,
                    global_circuit_breaker_threshold: defaults.global_circuit_breaker_threshold,
                    ..settings
                }
            }
        }
    }

    /// Check threshold ordering: `0 < warning <= critical < global`.
    ///
    /// # Errors
    ///
    /// Returns `LoopDetectionError::InvalidThresholds` when the ordering is violated.
    pub fn validate(&self) -> Result<(), LoopDetectionError> {
        let ordered = self.warning_threshold > 0
            && self.warning_threshold <= self.critical_threshold
            && self.critical_threshold < self.global_circuit_breaker_threshold;

        if ordered {
            Ok(())
        } else {
            Err(LoopDetectionError::InvalidThresholds {
                warning: self.warning_threshold,
                critical: self.critical_threshold,
                global: self.global_circuit_breaker_threshold,
            })
        }
    }

    fn warn_and_default(err: ConfigError) -> Self {
        warn!(error = %err, "Failed to load loop detection config, using defaults");
        Self::default()
    }
}
