// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The vendor sink seam. Each platform provides one implementation; the
// dispatcher never knows which.

use marvel_analytics_core::error::Result;
use marvel_analytics_core::types::{EventPayload, UserProperty};

/// The vendor analytics SDK as the bridge sees it.
///
/// Implementations forward and return. They do not retry, queue or batch;
/// delivery is the vendor's business. An `Err` propagates to the host.
pub trait AnalyticsSink {
    /// `logEvent(name, parameters)`.
    fn log_event(&self, event: &EventPayload) -> Result<()>;

    /// `setUserProperty(name, value)`.
    fn set_user_property(&self, property: &UserProperty) -> Result<()>;
}

/// Sink type held by the process-wide dispatcher.
pub type SharedSink = Box<dyn AnalyticsSink + Send + Sync>;

impl<S: AnalyticsSink + ?Sized> AnalyticsSink for Box<S> {
    fn log_event(&self, event: &EventPayload) -> Result<()> {
        (**self).log_event(event)
    }

    fn set_user_property(&self, property: &UserProperty) -> Result<()> {
        (**self).set_user_property(property)
    }
}

impl<S: AnalyticsSink + ?Sized> AnalyticsSink for &S {
    fn log_event(&self, event: &EventPayload) -> Result<()> {
        (**self).log_event(event)
    }

    fn set_user_property(&self, property: &UserProperty) -> Result<()> {
        (**self).set_user_property(property)
    }
}
