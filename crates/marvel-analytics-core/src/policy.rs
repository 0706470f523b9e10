// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Diagnostic log policy. Decides only whether an event gets an extra local
// log line; forwarding to the vendor never depends on it.

use std::collections::BTreeSet;

use crate::config::BridgeConfig;

/// Events worth a diagnostic log line by default.
pub const IMPORTANT_EVENTS: [&str; 5] = [
    "page_load_time",
    "character_search_initiated",
    "api_error",
    "character_view",
    "character_list_load",
];

/// Whether `name` is on the built-in allow-list.
pub fn is_important_event(name: &str) -> bool {
    IMPORTANT_EVENTS.contains(&name)
}

/// Allow-list driven diagnostic policy, shared by every platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPolicy {
    important: BTreeSet<String>,
    enabled: bool,
}

impl EventPolicy {
    pub fn new<I, S>(important: I, enabled: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            important: important.into_iter().map(Into::into).collect(),
            enabled,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.important_events.iter().cloned(), config.diagnostics)
    }

    pub fn is_important(&self, event_name: &str) -> bool {
        self.important.contains(event_name)
    }

    /// True when the event should also be written to the diagnostic log.
    pub fn should_log(&self, event_name: &str) -> bool {
        self.enabled && self.is_important(event_name)
    }
}

impl Default for EventPolicy {
    fn default() -> Self {
        Self::new(IMPORTANT_EVENTS, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_list() {
        assert!(is_important_event("character_view"));
        assert!(is_important_event("api_error"));
        assert!(!is_important_event("button_tap"));
        assert!(!is_important_event("Character_View"));
    }

    #[test]
    fn default_policy_matches_builtin_list() {
        let policy = EventPolicy::default();
        for name in IMPORTANT_EVENTS {
            assert!(policy.should_log(name));
        }
        assert!(!policy.should_log("screen_view"));
    }

    #[test]
    fn disabled_policy_never_logs() {
        let config = BridgeConfig {
            diagnostics: false,
            ..Default::default()
        };
        let policy = EventPolicy::from_config(&config);
        assert!(policy.is_important("page_load_time"));
        assert!(!policy.should_log("page_load_time"));
    }

    #[test]
    fn configured_list_replaces_default() {
        let policy = EventPolicy::new(["checkout"], true);
        assert!(policy.should_log("checkout"));
        assert!(!policy.should_log("page_load_time"));
    }
}
