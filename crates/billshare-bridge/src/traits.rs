// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native share capabilities.
//
// The dispatcher only ever talks to these traits, so the fallback logic is
// identical on every host and can be exercised with a mock in tests.

use std::path::Path;

use billshare_core::error::Result;
use billshare_core::types::{OutgoingShare, ShareableReference};

/// Unified bridge that groups all native share capabilities.
pub trait PlatformBridge: FileExposure + ShareLauncher + Send + Sync {
    /// Human-readable platform name (e.g. "Android", "Desktop (stub)").
    fn platform_name(&self) -> &str;
}

/// Turn a local file into a reference another application can read.
pub trait FileExposure {
    /// Expose `path` with read-only, time-bounded access for the receiver.
    ///
    /// Fails with `BillshareError::FileExposure` if the file does not exist
    /// or lies outside the directories the host is willing to expose.
    fn expose_for_sharing(&self, path: &Path) -> Result<ShareableReference>;
}

/// Hand a share request to the host OS.
pub trait ShareLauncher {
    /// Launch one share attempt restricted to `share.target`.
    ///
    /// Returns Ok(()) once the host accepted the hand-off. The user may still
    /// back out of the receiving app; that is not observable here.
    fn launch(&self, share: &OutgoingShare) -> Result<()>;
}
