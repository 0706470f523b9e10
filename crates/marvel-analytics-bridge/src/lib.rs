// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Marvel analytics: shared dispatcher and native platform bridges.
//!
//! Both platform shells translate their host call representation into a
//! [`MethodCall`](marvel_analytics_core::MethodCall) and hand it to the one
//! [`Dispatcher`] installed for the process. Only the vendor sink differs per
//! platform: Firebase through JNI on Android, `FIRAnalytics` through objc2 on
//! iOS, and a logging stub everywhere else.

pub mod dispatcher;
pub mod global;
#[cfg(any(target_os = "ios", target_os = "android"))]
pub mod logging;
pub mod memory;
pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod stub;

pub use dispatcher::Dispatcher;
pub use memory::MemorySink;
pub use traits::{AnalyticsSink, SharedSink};

/// Human-readable name of the vendor sink this build forwards to.
pub fn platform_sink_name() -> &'static str {
    #[cfg(target_os = "ios")]
    {
        "iOS (FIRAnalytics)"
    }
    #[cfg(target_os = "android")]
    {
        "Android (FirebaseAnalytics)"
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        "Desktop (stub)"
    }
}
