//! # Media Configuration
//!
//! Settings for the media plugin. Every field has a serde default so hosts
//! can ship partial JSON.

use crate::error::{MediaError, Result};
use crate::state::PlayerKind;
use serde::{Deserialize, Serialize};

/// Media plugin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Native service every command is addressed to.
    ///
    /// Default: `"Mediaac"`.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Backend used when a handle does not pick one.
    ///
    /// Default: `androidPlayer`.
    #[serde(default)]
    pub default_player_kind: PlayerKind,

    /// Name of the one-shot gate released once the status channel is open.
    ///
    /// Default: `"onMediaPluginReady"`.
    #[serde(default = "default_readiness_gate_name")]
    pub readiness_gate_name: String,

    /// Log native failures that arrive for handles without an error callback.
    ///
    /// Default: true.
    #[serde(default = "default_report_unhandled_errors")]
    pub report_unhandled_errors: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            default_player_kind: PlayerKind::default(),
            readiness_gate_name: default_readiness_gate_name(),
            report_unhandled_errors: default_report_unhandled_errors(),
        }
    }
}

impl MediaConfig {
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_default_player_kind(mut self, kind: PlayerKind) -> Self {
        self.default_player_kind = kind;
        self
    }

    pub fn with_readiness_gate_name(mut self, name: impl Into<String>) -> Self {
        self.readiness_gate_name = name.into();
        self
    }

    pub fn with_report_unhandled_errors(mut self, report: bool) -> Self {
        self.report_unhandled_errors = report;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(MediaError::Config(
                "service_name must not be empty".to_string(),
            ));
        }
        if self.readiness_gate_name.trim().is_empty() {
            return Err(MediaError::Config(
                "readiness_gate_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_service_name() -> String {
    "Mediaac".to_string()
}

fn default_readiness_gate_name() -> String {
    "onMediaPluginReady".to_string()
}

fn default_report_unhandled_errors() -> bool {
    true
}
