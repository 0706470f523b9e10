// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Marvel analytics: channel types, parameter normalization and errors shared
// by every platform shell.

pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod normalize;
pub mod policy;
pub mod types;

pub use channel::{Method, MethodCall, MethodCallHandler, MethodResponse};
pub use config::BridgeConfig;
pub use error::AnalyticsError;
pub use policy::EventPolicy;
pub use types::*;
