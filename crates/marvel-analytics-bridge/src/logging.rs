// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device log routing.
//
// No tracing subscriber runs inside the host app, so `tracing` falls back to
// `log` records (the `log` feature). Those go to logcat on Android and to the
// unified system log on iOS.

#![cfg(any(target_os = "android", target_os = "ios"))]

/// Logcat tag on Android.
#[cfg(target_os = "android")]
pub const LOG_TAG: &str = "MarvelAnalytics";

/// Unified-log subsystem on iOS.
#[cfg(target_os = "ios")]
pub const LOG_SUBSYSTEM: &str = "com.marvel.analytics";

/// Route bridge logs to the device log. Later calls are no-ops.
pub fn init_device_logging() {
    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag(LOG_TAG),
    );

    // A logger is already set after the first call.
    #[cfg(target_os = "ios")]
    let _ = oslog::OsLogger::new(LOG_SUBSYSTEM)
        .level_filter(log::LevelFilter::Debug)
        .init();
}
