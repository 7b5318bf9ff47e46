// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Billshare share bridge.

use serde::Deserialize;

use crate::config::ExtensionMatching;
use crate::error::{BillshareError, Result};

/// Content types an invoice can be shared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Png,
    Jpeg,
    /// Default for every path that is not a recognised image.
    Pdf,
}

impl ContentKind {
    /// MIME type attached to the outgoing share.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }

    /// Infer the content kind from the suffix of the full path string.
    ///
    /// `.png` is checked first, then `.jpg` / `.jpeg`. Anything else,
    /// including a path with no extension at all, is treated as PDF.
    pub fn from_path(path: &str, matching: ExtensionMatching) -> Self {
        let folded;
        let path = match matching {
            ExtensionMatching::CaseSensitive => path,
            ExtensionMatching::CaseInsensitive => {
                folded = path.to_ascii_lowercase();
                folded.as_str()
            }
        };

        if path.ends_with(".png") {
            Self::Png
        } else if path.ends_with(".jpg") || path.ends_with(".jpeg") {
            Self::Jpeg
        } else {
            Self::Pdf
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Raw named arguments of a `shareToWhatsApp` method call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareArguments {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ShareArguments {
    /// Decode call arguments. Anything that is not an object of optional
    /// strings is rejected as a malformed call.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| BillshareError::InvalidArgument(format!("malformed arguments: {e}")))
    }

    /// Validate into a [`ShareRequest`].
    pub fn into_request(self) -> Result<ShareRequest> {
        let file_path = self
            .file_path
            .ok_or_else(|| BillshareError::InvalidArgument("File path is null".into()))?;
        ShareRequest::new(file_path, self.phone_number, self.message)
    }
}

/// A single, validated share request. Discarded once the call completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    file_path: String,
    recipient_hint: Option<String>,
    message: Option<String>,
}

impl ShareRequest {
    pub fn new(
        file_path: impl Into<String>,
        recipient_hint: Option<String>,
        message: Option<String>,
    ) -> Result<Self> {
        let file_path = file_path.into();
        if file_path.is_empty() {
            return Err(BillshareError::InvalidArgument("File path is empty".into()));
        }
        Ok(Self {
            file_path,
            recipient_hint,
            message,
        })
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Phone-number-like token, if one was supplied and is non-empty.
    pub fn recipient_hint(&self) -> Option<&str> {
        self.recipient_hint.as_deref().filter(|hint| !hint.is_empty())
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Where a single share attempt is directed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShareTarget {
    /// Restrict the share to one installed application package.
    Package(String),
    /// Unrestricted system chooser, narrowed only by content type.
    Chooser,
}

impl std::fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Package(name) => f.write_str(name),
            Self::Chooser => f.write_str("chooser"),
        }
    }
}

/// Temporary, read-only reference to a file that another application may
/// open (a `content://` URI on Android, a `file://` URI on desktop).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShareableReference(pub String);

impl ShareableReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShareableReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a platform needs to launch one share attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingShare {
    pub content_kind: ContentKind,
    pub reference: ShareableReference,
    /// Accompanying text (`EXTRA_TEXT`).
    pub text: Option<String>,
    /// Advisory recipient JID. Receiving apps are free to ignore it.
    pub recipient_jid: Option<String>,
    /// Grant the receiver temporary read access to `reference`.
    pub grant_read: bool,
    pub target: ShareTarget,
    /// Title shown when `target` is [`ShareTarget::Chooser`].
    pub chooser_title: String,
}

impl OutgoingShare {
    /// Same payload, redirected at another target.
    pub fn retarget(&self, target: ShareTarget) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

/// A target that refused the hand-off, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTarget {
    pub target: ShareTarget,
    pub reason: String,
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// The target the host accepted.
    pub delivered_via: ShareTarget,
    pub content_kind: ContentKind,
    /// Targets tried before `delivered_via`, in order.
    pub skipped: Vec<SkippedTarget>,
}

impl DispatchReport {
    /// Whether the share fell through to the generic chooser.
    pub fn used_chooser(&self) -> bool {
        self.delivered_via == ShareTarget::Chooser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn png_suffix() {
        assert_eq!(
            ContentKind::from_path("/data/invoice_12.png", ExtensionMatching::CaseSensitive),
            ContentKind::Png
        );
    }

    #[test]
    fn jpeg_suffixes() {
        for path in ["a.jpg", "/tmp/b.jpeg"] {
            assert_eq!(
                ContentKind::from_path(path, ExtensionMatching::CaseSensitive),
                ContentKind::Jpeg
            );
        }
    }

    #[test]
    fn everything_else_is_pdf() {
        for path in ["invoice.pdf", "invoice", "archive.png.zip", "photo.gif", "x.jpg "] {
            assert_eq!(
                ContentKind::from_path(path, ExtensionMatching::CaseSensitive),
                ContentKind::Pdf,
                "{path}"
            );
        }
    }

    #[test]
    fn uppercase_depends_on_matching_mode() {
        assert_eq!(
            ContentKind::from_path("SCAN.PNG", ExtensionMatching::CaseSensitive),
            ContentKind::Pdf
        );
        assert_eq!(
            ContentKind::from_path("SCAN.PNG", ExtensionMatching::CaseInsensitive),
            ContentKind::Png
        );
        assert_eq!(
            ContentKind::from_path("photo.JpEg", ExtensionMatching::CaseInsensitive),
            ContentKind::Jpeg
        );
    }

    #[test]
    fn mime_types() {
        assert_eq!(ContentKind::Png.mime_type(), "image/png");
        assert_eq!(ContentKind::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ContentKind::Pdf.mime_type(), "application/pdf");
    }

    #[test]
    fn empty_path_is_invalid() {
        let err = ShareRequest::new("", None, None).unwrap_err();
        assert!(matches!(err, BillshareError::InvalidArgument(_)));
    }

    #[test]
    fn empty_recipient_hint_is_ignored() {
        let req = ShareRequest::new("a.pdf", Some(String::new()), None).unwrap();
        assert_eq!(req.recipient_hint(), None);
    }

    #[test]
    fn arguments_decode_camel_case() {
        let args = ShareArguments::from_value(json!({
            "filePath": "/data/inv.pdf",
            "phoneNumber": "15551234567",
            "message": "Your invoice",
        }))
        .unwrap();
        let req = args.into_request().unwrap();
        assert_eq!(req.file_path(), "/data/inv.pdf");
        assert_eq!(req.recipient_hint(), Some("15551234567"));
        assert_eq!(req.message(), Some("Your invoice"));
    }

    #[test]
    fn missing_file_path_is_invalid() {
        let args = ShareArguments::from_value(json!({ "message": "hi" })).unwrap();
        let err = args.into_request().unwrap_err();
        assert!(matches!(err, BillshareError::InvalidArgument(ref m) if m == "File path is null"));
    }

    #[test]
    fn null_arguments_are_missing_file_path() {
        let args = ShareArguments::from_value(serde_json::Value::Null).unwrap();
        assert!(args.into_request().is_err());
    }

    #[test]
    fn non_string_file_path_is_malformed() {
        let err = ShareArguments::from_value(json!({ "filePath": 42 })).unwrap_err();
        assert!(matches!(err, BillshareError::InvalidArgument(_)));
    }

    #[test]
    fn retarget_keeps_payload() {
        let share = OutgoingShare {
            content_kind: ContentKind::Pdf,
            reference: ShareableReference("content://x/1".into()),
            text: Some("hi".into()),
            recipient_jid: None,
            grant_read: true,
            target: ShareTarget::Package("com.whatsapp".into()),
            chooser_title: "Share".into(),
        };
        let moved = share.retarget(ShareTarget::Chooser);
        assert_eq!(moved.target, ShareTarget::Chooser);
        assert_eq!(moved.reference, share.reference);
        assert_eq!(moved.text, share.text);
    }
}
