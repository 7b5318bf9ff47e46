// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Billshare — native share bridge.
//
// The Dart side calls `shareToWhatsApp` on the method channel; `channel`
// decodes the call, `dispatcher` walks the target list, and the platform
// bridge (`android` on devices, `stub` on desktop/CI) touches the OS.

pub mod channel;
pub mod dispatcher;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

#[cfg(test)]
pub(crate) mod testing;

use billshare_core::ShareConfig;

/// Logcat tag for everything the bridge logs on Android.
#[cfg(target_os = "android")]
pub const LOG_TAG: &str = "Billshare";

pub use channel::{MethodCall, MethodReply, ShareChannel};
pub use dispatcher::ShareDispatcher;

/// Build the bridge implementation for the target operating system.
pub fn platform_bridge(config: &ShareConfig) -> Box<dyn traits::PlatformBridge> {
    #[cfg(target_os = "android")]
    {
        // Android: `jni` calls into ART, FileProvider for URI grants.
        Box::new(android::AndroidBridge::new(config))
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: files are exposed as file:// URIs, launches always fail.
        let _ = config;
        Box::new(stub::StubBridge)
    }
}

/// Route logs to the platform's log sink. Safe to call more than once.
///
/// On Android, `tracing` events are forwarded through its `log` bridge to
/// logcat under the `Billshare` tag. Elsewhere a `fmt` subscriber writes to
/// stdout, honouring `RUST_LOG` and defaulting to `info`.
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag(LOG_TAG),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .try_init();
    }
}
