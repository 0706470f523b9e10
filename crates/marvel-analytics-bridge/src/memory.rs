// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory sink that records every forward. Used by tests and by the
// replay tool to show what would have reached the vendor.

use std::sync::{Mutex, PoisonError};

use marvel_analytics_core::error::{AnalyticsError, Result};
use marvel_analytics_core::types::{EventPayload, UserProperty};

use crate::traits::AnalyticsSink;

/// One forward, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Forwarded {
    Event(EventPayload),
    UserProperty(UserProperty),
}

/// Recording sink. Optionally fails every forward, to exercise propagation.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Forwarded>>,
    failure: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every forward fails with `AnalyticsError::Sink(reason)`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            records: Mutex::default(),
            failure: Some(reason.into()),
        }
    }

    pub fn records(&self) -> Vec<Forwarded> {
        self.lock().clone()
    }

    pub fn events(&self) -> Vec<EventPayload> {
        self.lock()
            .iter()
            .filter_map(|record| match record {
                Forwarded::Event(event) => Some(event.clone()),
                Forwarded::UserProperty(_) => None,
            })
            .collect()
    }

    pub fn user_properties(&self) -> Vec<UserProperty> {
        self.lock()
            .iter()
            .filter_map(|record| match record {
                Forwarded::UserProperty(property) => Some(property.clone()),
                Forwarded::Event(_) => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Forwarded> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Forwarded>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, record: Forwarded) -> Result<()> {
        if let Some(reason) = &self.failure {
            return Err(AnalyticsError::Sink(reason.clone()));
        }
        self.lock().push(record);
        Ok(())
    }
}

impl AnalyticsSink for MemorySink {
    fn log_event(&self, event: &EventPayload) -> Result<()> {
        self.record(Forwarded::Event(event.clone()))
    }

    fn set_user_property(&self, property: &UserProperty) -> Result<()> {
        self.record(Forwarded::UserProperty(property.clone()))
    }
}
