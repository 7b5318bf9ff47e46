// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory bridge used by the unit tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use billshare_core::error::{BillshareError, Result};
use billshare_core::types::{OutgoingShare, ShareTarget, ShareableReference};

use crate::traits::*;

#[derive(Debug, Default)]
pub(crate) struct Recorded {
    pub exposed: Vec<PathBuf>,
    /// Every launch attempt, successful or not, in call order.
    pub attempts: Vec<OutgoingShare>,
}

/// Bridge that records every call and refuses the configured targets.
#[derive(Clone, Default)]
pub(crate) struct RecordingBridge {
    recorded: Arc<Mutex<Recorded>>,
    unavailable: Vec<ShareTarget>,
    refuse_files: bool,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `target` fail as if the app were not installed.
    pub fn without(mut self, target: ShareTarget) -> Self {
        self.unavailable.push(target);
        self
    }

    /// Make every exposure fail as if the file were missing.
    pub fn refusing_files(mut self) -> Self {
        self.refuse_files = true;
        self
    }

    pub fn exposed(&self) -> Vec<PathBuf> {
        self.recorded.lock().expect("recorder lock").exposed.clone()
    }

    pub fn attempts(&self) -> Vec<OutgoingShare> {
        self.recorded.lock().expect("recorder lock").attempts.clone()
    }

    pub fn attempted_targets(&self) -> Vec<ShareTarget> {
        self.attempts().into_iter().map(|s| s.target).collect()
    }
}

impl PlatformBridge for RecordingBridge {
    fn platform_name(&self) -> &str {
        "Recording"
    }
}

impl FileExposure for RecordingBridge {
    fn expose_for_sharing(&self, path: &Path) -> Result<ShareableReference> {
        if self.refuse_files {
            return Err(BillshareError::FileExposure(format!(
                "{} does not exist",
                path.display()
            )));
        }
        let mut recorded = self.recorded.lock().expect("recorder lock");
        recorded.exposed.push(path.to_path_buf());
        Ok(ShareableReference(format!(
            "content://test.provider/{}",
            recorded.exposed.len()
        )))
    }
}

impl ShareLauncher for RecordingBridge {
    fn launch(&self, share: &OutgoingShare) -> Result<()> {
        self.recorded
            .lock()
            .expect("recorder lock")
            .attempts
            .push(share.clone());

        if self.unavailable.contains(&share.target) {
            return Err(BillshareError::TargetUnavailable {
                target: share.target.to_string(),
                reason: "No Activity found to handle Intent".into(),
            });
        }
        Ok(())
    }
}
