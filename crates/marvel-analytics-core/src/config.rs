// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::channel::CHANNEL_NAME;
use crate::error::{AnalyticsError, Result};
use crate::policy::IMPORTANT_EVENTS;

/// Settings shared by every platform shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name of the method channel both shells register.
    pub channel_name: String,
    /// Value sent as `screen_class` with every screen view.
    pub screen_class: String,
    /// Event names that get an extra diagnostic log line.
    pub important_events: Vec<String>,
    /// Master switch for the diagnostic log (never affects forwarding).
    pub diagnostics: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel_name: CHANNEL_NAME.to_owned(),
            screen_class: "Flutter".to_owned(),
            important_events: IMPORTANT_EVENTS.iter().map(|name| (*name).to_owned()).collect(),
            diagnostics: true,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject settings that would produce unusable events.
    pub fn validate(&self) -> Result<()> {
        if self.channel_name.is_empty() {
            return Err(AnalyticsError::Config("channel_name must not be empty".into()));
        }
        if self.screen_class.is_empty() {
            return Err(AnalyticsError::Config("screen_class must not be empty".into()));
        }
        Ok(())
    }
}
