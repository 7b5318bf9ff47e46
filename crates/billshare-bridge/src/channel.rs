// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method channel handler for the Dart side.
//
// Calls and replies travel as JSON in the same envelope Flutter's
// `JSONMethodCodec` uses:
//
//   call     {"method": "shareToWhatsApp", "args": {"filePath": ...}}
//   success  [result]
//   error    [code, message, details]
//
// An unknown method gets no reply at all, which the Dart side surfaces as
// `MissingPluginException`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use billshare_core::error::{BillshareError, Result};
use billshare_core::human_errors::humanize_error;
use billshare_core::types::{DispatchReport, ShareArguments};

use crate::dispatcher::ShareDispatcher;

/// The only method this channel implements.
pub const SHARE_TO_WHATSAPP: &str = "shareToWhatsApp";

pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const FILE_UNAVAILABLE: &str = "FILE_UNAVAILABLE";
pub const DELIVERY_UNAVAILABLE: &str = "DELIVERY_UNAVAILABLE";
pub const BRIDGE_ERROR: &str = "BRIDGE_ERROR";

/// An incoming cross-language method invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default, rename = "args")]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Result of handling a [`MethodCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodReply {
    Success(Value),
    Error {
        code: String,
        message: Option<String>,
        details: Value,
    },
    NotImplemented,
}

impl MethodReply {
    /// Map a dispatch error to a channel error.
    ///
    /// `INVALID_ARGUMENT` carries no details. Every other code carries the
    /// human-readable form of the error so the Dart side can show it as-is.
    pub fn from_error(err: &BillshareError) -> Self {
        match err {
            BillshareError::InvalidArgument(message) => Self::Error {
                code: INVALID_ARGUMENT.into(),
                message: Some(message.clone()),
                details: Value::Null,
            },
            other => {
                let code = match other {
                    BillshareError::FileExposure(_) | BillshareError::Io(_) => FILE_UNAVAILABLE,
                    BillshareError::DeliveryUnavailable(_) => DELIVERY_UNAVAILABLE,
                    _ => BRIDGE_ERROR,
                };
                let human = humanize_error(other);
                Self::Error {
                    code: code.into(),
                    message: Some(other.to_string()),
                    details: json!({
                        "message": human.message,
                        "suggestion": human.suggestion,
                        "retriable": human.retriable,
                    }),
                }
            }
        }
    }

    /// Encode as a `JSONMethodCodec` reply envelope. `None` means "no reply".
    pub fn to_envelope(&self) -> Option<Value> {
        match self {
            Self::Success(result) => Some(json!([result])),
            Self::Error {
                code,
                message,
                details,
            } => Some(json!([code, message, details])),
            Self::NotImplemented => None,
        }
    }
}

/// Routes method calls on the share channel to the dispatcher.
pub struct ShareChannel {
    dispatcher: ShareDispatcher,
}

impl ShareChannel {
    pub fn new(dispatcher: ShareDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Channel name the Dart side must use.
    pub fn name(&self) -> &str {
        &self.dispatcher.config().channel_name
    }

    pub fn handle(&self, call: &MethodCall) -> MethodReply {
        match call.method.as_str() {
            SHARE_TO_WHATSAPP => match self.share(&call.arguments) {
                Ok(_) => MethodReply::Success(Value::Null),
                Err(e) => MethodReply::from_error(&e),
            },
            other => {
                tracing::debug!(method = other, channel = self.name(), "method not implemented");
                MethodReply::NotImplemented
            }
        }
    }

    /// Decode a JSON call, handle it, and encode the reply envelope.
    pub fn handle_json(&self, raw: &str) -> Option<String> {
        let reply = match serde_json::from_str::<MethodCall>(raw) {
            Ok(call) => self.handle(&call),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable method call");
                MethodReply::from_error(&BillshareError::InvalidArgument(format!(
                    "malformed method call: {e}"
                )))
            }
        };
        reply.to_envelope().map(|envelope| envelope.to_string())
    }

    fn share(&self, arguments: &Value) -> Result<DispatchReport> {
        let request = ShareArguments::from_value(arguments.clone())?.into_request()?;
        self.dispatcher.dispatch(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBridge;
    use billshare_core::config::ShareConfig;
    use billshare_core::types::ShareTarget;

    fn channel(bridge: &RecordingBridge) -> ShareChannel {
        ShareChannel::new(ShareDispatcher::new(
            ShareConfig::default(),
            Box::new(bridge.clone()),
        ))
    }

    fn share_call(args: Value) -> MethodCall {
        MethodCall::new(SHARE_TO_WHATSAPP, args)
    }

    #[test]
    fn success_replies_null() {
        let bridge = RecordingBridge::new();
        let reply = channel(&bridge).handle(&share_call(json!({
            "filePath": "/inv/1.pdf",
            "phoneNumber": "15551234567",
            "message": "Thanks for your order",
        })));

        assert_eq!(reply, MethodReply::Success(Value::Null));
        let share = &bridge.attempts()[0];
        assert_eq!(share.recipient_jid.as_deref(), Some("15551234567@s.whatsapp.net"));
        assert_eq!(share.text.as_deref(), Some("Thanks for your order"));
    }

    #[test]
    fn missing_file_path_is_invalid_argument() {
        let bridge = RecordingBridge::new();
        let reply = channel(&bridge).handle(&share_call(json!({ "message": "hi" })));

        assert_eq!(
            reply,
            MethodReply::Error {
                code: INVALID_ARGUMENT.into(),
                message: Some("File path is null".into()),
                details: Value::Null,
            }
        );
        assert!(bridge.exposed().is_empty());
        assert!(bridge.attempts().is_empty());
    }

    #[test]
    fn empty_file_path_touches_nothing() {
        let bridge = RecordingBridge::new();
        let reply = channel(&bridge).handle(&share_call(json!({ "filePath": "" })));

        assert!(matches!(reply, MethodReply::Error { ref code, .. } if code == INVALID_ARGUMENT));
        assert!(bridge.exposed().is_empty());
        assert!(bridge.attempts().is_empty());
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let bridge = RecordingBridge::new();
        let reply = channel(&bridge).handle(&MethodCall::new("shareToTelegram", json!({})));
        assert_eq!(reply, MethodReply::NotImplemented);
        assert_eq!(reply.to_envelope(), None);
    }

    #[test]
    fn delivery_failure_carries_human_details() {
        let bridge = RecordingBridge::new()
            .without(ShareTarget::Package("com.whatsapp".into()))
            .without(ShareTarget::Package("com.whatsapp.w4b".into()))
            .without(ShareTarget::Chooser);
        let reply = channel(&bridge).handle(&share_call(json!({ "filePath": "a.pdf" })));

        let MethodReply::Error { code, details, .. } = reply else {
            panic!("expected an error reply");
        };
        assert_eq!(code, DELIVERY_UNAVAILABLE);
        assert_eq!(details["retriable"], json!(true));
        assert!(details["message"].as_str().unwrap().contains("No app"));
    }

    #[test]
    fn missing_file_is_file_unavailable() {
        let bridge = RecordingBridge::new().refusing_files();
        let reply = channel(&bridge).handle(&share_call(json!({ "filePath": "gone.pdf" })));
        assert!(matches!(reply, MethodReply::Error { ref code, .. } if code == FILE_UNAVAILABLE));
    }

    #[test]
    fn json_round_trip_through_envelope() {
        let bridge = RecordingBridge::new();
        let out = channel(&bridge)
            .handle_json(r#"{"method":"shareToWhatsApp","args":{"filePath":"/inv/2.png"}}"#)
            .unwrap();
        assert_eq!(out, "[null]");
        assert_eq!(bridge.attempts()[0].content_kind.mime_type(), "image/png");
    }

    #[test]
    fn json_error_envelope_shape() {
        let bridge = RecordingBridge::new();
        let out = channel(&bridge)
            .handle_json(r#"{"method":"shareToWhatsApp","args":{}}"#)
            .unwrap();
        let envelope: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(envelope, json!(["INVALID_ARGUMENT", "File path is null", null]));
    }

    #[test]
    fn json_unknown_method_has_no_reply() {
        let bridge = RecordingBridge::new();
        assert_eq!(channel(&bridge).handle_json(r#"{"method":"other"}"#), None);
    }

    #[test]
    fn undecodable_call_is_invalid_argument() {
        let bridge = RecordingBridge::new();
        let out = channel(&bridge).handle_json("{not json").unwrap();
        let envelope: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(envelope[0], json!(INVALID_ARGUMENT));
        assert!(bridge.attempts().is_empty());
    }

    #[test]
    fn channel_name_from_config() {
        let bridge = RecordingBridge::new();
        assert_eq!(channel(&bridge).name(), "com.example.invoice/whatsapp");
    }
}
