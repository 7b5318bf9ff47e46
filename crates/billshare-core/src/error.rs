// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Billshare.

use thiserror::Error;

/// Top-level error type for all Billshare operations.
#[derive(Debug, Error)]
pub enum BillshareError {
    // -- Caller errors --
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Delivery --
    /// A single share target refused the hand-off. The dispatcher recovers
    /// from this by moving on to the next target.
    #[error("share target {target} unavailable: {reason}")]
    TargetUnavailable { target: String, reason: String },

    /// Every target, the generic chooser included, refused the hand-off.
    #[error("no application could accept the share: {0}")]
    DeliveryUnavailable(String),

    #[error("could not expose file for sharing: {0}")]
    FileExposure(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BillshareError>;
