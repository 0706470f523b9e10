// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the analytics bridge.

use thiserror::Error;

/// Channel error code for a missing or mistyped required argument.
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";

/// Top-level error type for all bridge operations.
///
/// Only [`AnalyticsError::InvalidArgument`] is ever reported back over the
/// channel. Everything else propagates to the host's own error handling.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    // -- Reported over the channel --
    #[error("{0}")]
    InvalidArgument(String),

    // -- Vendor sink --
    #[error("analytics sink failed: {0}")]
    Sink(String),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("analytics bridge already initialised")]
    AlreadyInitialized,

    #[error("analytics bridge not initialised")]
    NotInitialized,

    // -- Wire format / configuration --
    #[error("channel codec error: {0}")]
    Codec(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyticsError {
    /// The channel error code for errors that are answered rather than
    /// propagated, or `None` if the error must reach the host.
    pub fn channel_code(&self) -> Option<&'static str> {
        match self {
            AnalyticsError::InvalidArgument(_) => Some(INVALID_ARGUMENT),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
