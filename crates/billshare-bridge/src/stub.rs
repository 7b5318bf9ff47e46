// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where no share intent exists.
//
// Files are still checked and exposed (as `file://` URIs) so the dispatch
// path up to the launch is real; every launch returns `PlatformUnavailable`.

use std::path::Path;

use billshare_core::error::{BillshareError, Result};
use billshare_core::types::{OutgoingShare, ShareableReference};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl FileExposure for StubBridge {
    fn expose_for_sharing(&self, path: &Path) -> Result<ShareableReference> {
        let absolute = std::fs::canonicalize(path)
            .map_err(|e| BillshareError::FileExposure(format!("{}: {e}", path.display())))?;
        if !absolute.is_file() {
            return Err(BillshareError::FileExposure(format!(
                "{} is not a regular file",
                absolute.display()
            )));
        }
        Ok(ShareableReference(format!("file://{}", absolute.display())))
    }
}

impl ShareLauncher for StubBridge {
    fn launch(&self, share: &OutgoingShare) -> Result<()> {
        tracing::warn!(share_target = %share.target, "ShareLauncher::launch called on stub bridge");
        Err(BillshareError::PlatformUnavailable)
    }
}
