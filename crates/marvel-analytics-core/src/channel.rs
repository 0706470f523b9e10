// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic method channel: calls, responses, and the handler seam
// every platform shell talks to.

use std::fmt;

use crate::error::Result;
use crate::types::{Arguments, ChannelValue};

/// Channel name registered by both platform shells.
pub const CHANNEL_NAME: &str = "com.marvel.analytics";

/// Reply value of `initialize`.
pub const INITIALIZE_REPLY: &str = "MethodChannel OK";

/// The methods the analytics channel understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Initialize,
    TrackEvent,
    SetUserProperty,
    TrackScreen,
    TrackError,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Initialize,
        Method::TrackEvent,
        Method::SetUserProperty,
        Method::TrackScreen,
        Method::TrackError,
    ];

    /// Wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::TrackEvent => "trackEvent",
            Method::SetUserProperty => "setUserProperty",
            Method::TrackScreen => "trackScreen",
            Method::TrackError => "trackError",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str() == name)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call received over the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Arguments,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// The recognised method, or `None` for anything outside the table.
    pub fn known_method(&self) -> Option<Method> {
        Method::from_name(&self.method)
    }
}

/// The single outcome of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Option<ChannelValue>),
    Error {
        code: String,
        message: String,
        details: Option<ChannelValue>,
    },
    /// The method name is not in the table.
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<ChannelValue>) -> Self {
        MethodResponse::Success(Some(value.into()))
    }

    pub fn empty() -> Self {
        MethodResponse::Success(None)
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        MethodResponse::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success(_))
    }
}

/// Anything that can answer method calls.
///
/// `Ok` carries the one response sent back over the channel. `Err` is a
/// failure the channel does not report (vendor sink, platform glue); the
/// platform shell hands it to the host's unhandled-error path.
pub trait MethodCallHandler {
    fn on_method_call(&self, call: &MethodCall) -> Result<MethodResponse>;
}
