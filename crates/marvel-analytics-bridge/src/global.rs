// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide dispatcher.
//
// The platform shell installs it exactly once at startup, with the vendor
// sink it obtained from the already-bootstrapped SDK. After that it is
// read-only for the life of the process.

use std::sync::OnceLock;

use marvel_analytics_core::channel::{MethodCall, MethodCallHandler, MethodResponse};
use marvel_analytics_core::error::{AnalyticsError, Result};

use crate::dispatcher::Dispatcher;
use crate::traits::SharedSink;

static DISPATCHER: OnceLock<Dispatcher<SharedSink>> = OnceLock::new();

/// Install the process-wide dispatcher. A second install is rejected and the
/// first one stays in place.
pub fn install(dispatcher: Dispatcher<SharedSink>) -> Result<&'static Dispatcher<SharedSink>> {
    DISPATCHER
        .set(dispatcher)
        .map_err(|_| AnalyticsError::AlreadyInitialized)?;
    tracing::info!(sink = crate::platform_sink_name(), "analytics bridge installed");
    installed()
}

/// The installed dispatcher.
pub fn installed() -> Result<&'static Dispatcher<SharedSink>> {
    DISPATCHER.get().ok_or(AnalyticsError::NotInitialized)
}

/// Dispatch through the installed dispatcher.
pub fn handle(call: &MethodCall) -> Result<MethodResponse> {
    installed()?.on_method_call(call)
}
