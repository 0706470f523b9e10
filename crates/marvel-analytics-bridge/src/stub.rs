// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub sink for desktop/CI builds where no vendor SDK is linked.
//
// Every forward is written to the `tracing` log and succeeds, so the channel
// contract can be exercised off-device.

use marvel_analytics_core::error::Result;
use marvel_analytics_core::types::{EventPayload, UserProperty};

use crate::traits::AnalyticsSink;

/// Logging-only sink used on non-mobile platforms.
pub struct StubSink;

impl AnalyticsSink for StubSink {
    fn log_event(&self, event: &EventPayload) -> Result<()> {
        tracing::info!(
            event = %event.name,
            params = ?event.params,
            "stub sink: logEvent"
        );
        Ok(())
    }

    fn set_user_property(&self, property: &UserProperty) -> Result<()> {
        tracing::info!(
            name = %property.name,
            value = %property.value,
            "stub sink: setUserProperty"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marvel_analytics_core::types::EventParams;

    #[test]
    fn stub_accepts_everything() {
        let event = EventPayload::new("character_view", EventParams::new()).unwrap();
        assert!(StubSink.log_event(&event).is_ok());
        let property = UserProperty::new("tier", "").unwrap();
        assert!(StubSink.set_user_property(&property).is_ok());
    }
}
