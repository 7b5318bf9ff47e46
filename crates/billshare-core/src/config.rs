// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Share bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ShareTarget;

/// File name of the persisted settings inside the app's data directory.
pub const CONFIG_FILE: &str = "share.json";

/// How file extensions are compared when inferring the content kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionMatching {
    /// `.PNG` is not a PNG.
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

/// Persistent share bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Method channel the Dart side talks to.
    pub channel_name: String,
    /// First application package to try.
    pub primary_package: String,
    /// Tried when the primary package refuses the share.
    pub business_package: String,
    /// Title of the generic chooser shown as the last resort.
    pub chooser_title: String,
    /// Appended to the recipient hint to form the advisory JID.
    pub jid_suffix: String,
    /// Appended to the application id to form the FileProvider authority.
    pub provider_authority_suffix: String,
    pub extension_matching: ExtensionMatching,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            channel_name: "com.example.invoice/whatsapp".into(),
            primary_package: "com.whatsapp".into(),
            business_package: "com.whatsapp.w4b".into(),
            chooser_title: "Share Invoice via".into(),
            jid_suffix: "@s.whatsapp.net".into(),
            provider_authority_suffix: ".provider".into(),
            extension_matching: ExtensionMatching::CaseSensitive,
        }
    }
}

impl ShareConfig {
    /// Targets in the order they are attempted. The chooser is always last.
    pub fn targets(&self) -> [ShareTarget; 3] {
        [
            ShareTarget::Package(self.primary_package.clone()),
            ShareTarget::Package(self.business_package.clone()),
            ShareTarget::Chooser,
        ]
    }

    /// Advisory JID for a recipient hint, with no normalisation applied.
    pub fn jid_for(&self, recipient_hint: &str) -> String {
        format!("{recipient_hint}{}", self.jid_suffix)
    }

    /// Load persisted settings. Returns `None` if the file is missing or
    /// cannot be parsed, so callers fall back to defaults.
    pub fn load(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable share config");
                None
            }
        }
    }

    /// Settings for this launch, persisted to `path` for the next one.
    ///
    /// A valid `override_json` wins and replaces the stored file. Otherwise
    /// the stored file is used, and if that is missing or unreadable the
    /// defaults are written out in its place. Failing to write is logged,
    /// not fatal.
    pub fn resolve(path: &Path, override_json: Option<&str>) -> Self {
        let overridden = override_json.and_then(|raw| match serde_json::from_str::<Self>(raw) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring invalid share config override");
                None
            }
        });

        let (config, dirty) = match overridden {
            Some(config) => (config, true),
            None => match Self::load(path) {
                Some(config) => (config, false),
                None => (Self::default(), true),
            },
        };

        if dirty {
            if let Err(e) = config.save(path) {
                tracing::warn!(path = %path.display(), error = %e, "could not persist share config");
            }
        }
        config
    }

    /// Persist settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
