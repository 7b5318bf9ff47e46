// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the invoice sharing screen.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the Dart side presents it (snackbar vs dialog).

use crate::error::BillshareError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Tapping share again may well work.
    Transient,
    /// User must do something (install an app, regenerate the invoice).
    ActionRequired,
    /// A bug or unsupported platform; retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a "Try again" button makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `BillshareError` into a `HumanError` a shop owner can act on.
pub fn humanize_error(err: &BillshareError) -> HumanError {
    match err {
        BillshareError::InvalidArgument(_) => HumanError {
            message: "There is no invoice to share.".into(),
            suggestion: "Create or open the invoice first, then tap share again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BillshareError::TargetUnavailable { target, .. } => HumanError {
            message: "That app isn't available.".into(),
            suggestion: format!("{target} could not open the invoice. Try again or pick another app."),
            retriable: true,
            severity: Severity::Transient,
        },

        BillshareError::DeliveryUnavailable(_) => HumanError {
            message: "No app on this phone can share this invoice.".into(),
            suggestion: "Install WhatsApp, or another app that can send PDFs and pictures, then try again."
                .into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        BillshareError::FileExposure(_) | BillshareError::Io(_) => HumanError {
            message: "We couldn't open the invoice file.".into(),
            suggestion: "The file may have been moved or deleted. Save the invoice again and retry."
                .into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BillshareError::Serialization(_) => HumanError {
            message: "Something went wrong while preparing the share.".into(),
            suggestion: "Restart the app and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BillshareError::Bridge(detail) => HumanError {
            message: "The phone refused to start sharing.".into(),
            suggestion: format!("Try again in a moment. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        BillshareError::PlatformUnavailable => HumanError {
            message: "Sharing isn't supported on this device.".into(),
            suggestion: "Use the app on an Android phone to send invoices.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_invoice_is_action_required() {
        let human = humanize_error(&BillshareError::InvalidArgument("File path is null".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn nothing_can_share_mentions_installing() {
        let human = humanize_error(&BillshareError::DeliveryUnavailable("no activity".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("Install"));
    }

    #[test]
    fn target_name_is_shown() {
        let err = BillshareError::TargetUnavailable {
            target: "com.whatsapp".into(),
            reason: "not installed".into(),
        };
        assert!(humanize_error(&err).suggestion.contains("com.whatsapp"));
    }

    #[test]
    fn desktop_is_permanent() {
        let human = humanize_error(&BillshareError::PlatformUnavailable);
        assert_eq!(human.severity, Severity::Permanent);
    }
}
