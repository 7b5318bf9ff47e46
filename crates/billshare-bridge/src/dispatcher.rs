// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Share dispatch with an ordered fallback chain.
//
// A request is turned into a single `OutgoingShare` payload and offered to
// each configured target in turn: primary package, business package, then
// the unrestricted chooser. The first target the host accepts wins. There
// is no delay between attempts and no retry of a target that refused.

use std::path::Path;

use tracing::{error, info, warn};

use billshare_core::config::ShareConfig;
use billshare_core::error::{BillshareError, Result};
use billshare_core::types::{
    ContentKind, DispatchReport, OutgoingShare, ShareRequest, ShareTarget, ShareableReference,
    SkippedTarget,
};

use crate::traits::*;

/// Builds share payloads and walks the target list until one is accepted.
///
/// Holds no per-call state: two identical dispatches are two independent
/// hand-offs.
pub struct ShareDispatcher {
    config: ShareConfig,
    bridge: Box<dyn PlatformBridge>,
}

impl ShareDispatcher {
    pub fn new(config: ShareConfig, bridge: Box<dyn PlatformBridge>) -> Self {
        Self { config, bridge }
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    pub fn platform_name(&self) -> &str {
        self.bridge.platform_name()
    }

    /// Share the request's file, falling back through the target list.
    ///
    /// # Errors
    ///
    /// - `FileExposure` if the file cannot be handed to another app. No
    ///   launch is attempted in that case.
    /// - `DeliveryUnavailable` if every target, the chooser included,
    ///   refused. Carries the chooser's failure reason.
    pub fn dispatch(&self, request: &ShareRequest) -> Result<DispatchReport> {
        let path = request.file_path();
        let content_kind = ContentKind::from_path(path, self.config.extension_matching);

        info!(
            path,
            mime = content_kind.mime_type(),
            platform = self.bridge.platform_name(),
            "dispatching share"
        );

        let reference = self.bridge.expose_for_sharing(Path::new(path))?;
        let payload = self.payload(request, content_kind, reference);

        let [primary, business, chooser] = self.config.targets();
        let mut skipped = Vec::new();
        for target in [primary, business] {
            match self.try_target(&payload, &target) {
                Ok(()) => return Ok(self.report(target, content_kind, skipped)),
                Err(reason) => skipped.push(SkippedTarget { target, reason }),
            }
        }

        match self.try_target(&payload, &chooser) {
            Ok(()) => Ok(self.report(chooser, content_kind, skipped)),
            Err(reason) => {
                error!(path, %reason, "no application accepted the share");
                Err(BillshareError::DeliveryUnavailable(reason))
            }
        }
    }

    /// One launch attempt. A refusal comes back as its display text.
    fn try_target(
        &self,
        payload: &OutgoingShare,
        target: &ShareTarget,
    ) -> std::result::Result<(), String> {
        self.bridge.launch(&payload.retarget(target.clone())).map_err(|e| {
            warn!(share_target = %target, error = %e, "share target refused");
            e.to_string()
        })
    }

    fn report(
        &self,
        target: ShareTarget,
        content_kind: ContentKind,
        skipped: Vec<SkippedTarget>,
    ) -> DispatchReport {
        info!(share_target = %target, skipped = skipped.len(), "share handed off");
        DispatchReport {
            delivered_via: target,
            content_kind,
            skipped,
        }
    }

    fn payload(
        &self,
        request: &ShareRequest,
        content_kind: ContentKind,
        reference: ShareableReference,
    ) -> OutgoingShare {
        OutgoingShare {
            content_kind,
            reference,
            text: request.message().map(str::to_owned),
            recipient_jid: request.recipient_hint().map(|hint| self.config.jid_for(hint)),
            grant_read: true,
            target: ShareTarget::Chooser,
            chooser_title: self.config.chooser_title.clone(),
        }
    }
}
