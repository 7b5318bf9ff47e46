// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. The library is loaded by a small Kotlin object
// that forwards the Flutter method channel into Rust:
//
//   object BillshareBridge {
//       init { System.loadLibrary("billshare_bridge") }
//       external fun nativeInit(activity: Activity, configJson: String?)
//       external fun nativeHandleMethodCall(callJson: String): String?
//   }
//
// `MainActivity.configureFlutterEngine` calls `nativeInit(this, null)` and
// registers a `MethodChannel` handler that passes
// `{"method": call.method, "args": call.arguments}` to
// `nativeHandleMethodCall`, decoding the returned envelope into
// `result.success` / `result.error` / `result.notImplemented`.
//
// ## Threading
//
// `startActivity` must run on the main thread. Flutter delivers method
// channel calls on the platform (main) thread, so the handler above already
// satisfies this; calling `nativeHandleMethodCall` from a worker thread is a
// host bug.
//
// ## FileProvider
//
// The host manifest must declare a `FileProvider` with authority
// `${applicationId}.provider` (see `ShareConfig::provider_authority_suffix`)
// whose paths cover the directory invoices are written to.

#![cfg(target_os = "android")]

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::jstring;
use jni::{JNIEnv, JavaVM};

use billshare_core::config::{CONFIG_FILE, ShareConfig};
use billshare_core::error::{BillshareError, Result};
use billshare_core::types::{OutgoingShare, ShareTarget, ShareableReference};

use crate::channel::{MethodReply, ShareChannel};
use crate::dispatcher::ShareDispatcher;
use crate::traits::*;

// ---------------------------------------------------------------------------
// Intent constants
// ---------------------------------------------------------------------------

const ACTION_SEND: &str = "android.intent.action.SEND";
const EXTRA_STREAM: &str = "android.intent.extra.STREAM";
const EXTRA_TEXT: &str = "android.intent.extra.TEXT";

/// Undocumented WhatsApp extra naming the recipient JID. Advisory only.
const EXTRA_JID: &str = "jid";

const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

/// Global ref keeping the activity registered with `ndk_context` alive.
static PINNED_ACTIVITY: Mutex<Option<GlobalRef>> = Mutex::new(None);

static SHARE_CHANNEL: OnceLock<ShareChannel> = OnceLock::new();

/// Obtain a [`JNIEnv`] for the current thread, attaching it if needed.
fn jni_env() -> Result<JNIEnv<'static>> {
    let vm = JAVA_VM.get().ok_or_else(|| {
        BillshareError::Bridge("JavaVM not recorded; call BillshareBridge.nativeInit first".into())
    })?;
    vm.attach_current_thread_permanently()
        .map_err(|e| jni_err("failed to attach JNI thread", e))
}

/// Local ref to the hosting `Activity` registered by `nativeInit`.
///
/// The ref is taken while the pin is held, so a concurrent `nativeInit`
/// cannot free the object underneath it.
fn activity<'local>(env: &mut JNIEnv<'local>) -> Result<JObject<'local>> {
    let pinned = PINNED_ACTIVITY
        .lock()
        .map_err(|_| BillshareError::Bridge("activity lock poisoned".into()))?;
    let global = pinned.as_ref().ok_or_else(|| {
        BillshareError::Bridge(
            "Android context not initialised; call BillshareBridge.nativeInit first".into(),
        )
    })?;
    env.new_local_ref(global)
        .map_err(|e| jni_err("NewLocalRef(activity)", e))
}

/// Convenience: map any `jni::errors::Error` into `BillshareError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> BillshareError {
    BillshareError::Bridge(format!("{context}: {e}"))
}

/// Clear a pending Java exception and return its `toString()`.
///
/// Any further JNI call with an exception pending is undefined behaviour, so
/// this must run before the env is used again after a failed call.
fn take_java_exception(env: &mut JNIEnv<'_>) -> Option<String> {
    if !env.exception_check().unwrap_or(false) {
        return None;
    }
    let throwable = env.exception_occurred().ok()?;
    env.exception_clear().ok()?;
    if throwable.is_null() {
        return Some("unknown Java exception".into());
    }

    let description: JObject = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    let description: String = env.get_string(&JString::from(description)).ok()?.into();
    Some(description)
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the Billshare platform bridge.
///
/// Only the FileProvider authority suffix is kept on the Rust side; the
/// activity and VM come from the globals set up by `nativeInit`.
pub struct AndroidBridge {
    authority_suffix: String,
}

impl AndroidBridge {
    /// Create a new Android bridge.
    ///
    /// This does **not** touch JNI. The first JNI call happens lazily when
    /// a trait method is invoked.
    pub fn new(config: &ShareConfig) -> Self {
        Self {
            authority_suffix: config.provider_authority_suffix.clone(),
        }
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// FileExposure — androidx.core.content.FileProvider
// ---------------------------------------------------------------------------

impl FileExposure for AndroidBridge {
    /// Convert a file path into a `content://` URI via `FileProvider`.
    ///
    /// The URI itself carries no permission; the read grant is attached to
    /// the share intent with `FLAG_GRANT_READ_URI_PERMISSION` and expires
    /// with the receiving activity.
    fn expose_for_sharing(&self, path: &Path) -> Result<ShareableReference> {
        if !path.is_file() {
            return Err(BillshareError::FileExposure(format!(
                "{} does not exist or is not a file",
                path.display()
            )));
        }
        let path_str = path.to_str().ok_or_else(|| {
            BillshareError::FileExposure(format!("{} is not valid UTF-8", path.display()))
        })?;

        let mut env = jni_env()?;
        let activity = activity(&mut env)?;
        let activity = env.auto_local(activity);

        match content_uri(&mut env, &activity, path_str, &self.authority_suffix) {
            Ok(uri) => {
                tracing::debug!(path = path_str, %uri, "Android: file exposed via FileProvider");
                Ok(ShareableReference(uri))
            }
            Err(e) => Err(match take_java_exception(&mut env) {
                // IllegalArgumentException: path outside the provider's roots.
                Some(exception) => BillshareError::FileExposure(format!("{path_str}: {exception}")),
                None => e,
            }),
        }
    }
}

fn content_uri(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    path: &str,
    authority_suffix: &str,
) -> Result<String> {
    let j_path: JString = env
        .new_string(path)
        .map_err(|e| jni_err("new_string(path)", e))?;

    let file_obj: JObject = env
        .new_object(
            "java/io/File",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_path)],
        )
        .map_err(|e| jni_err("new File(path)", e))?;

    let authority = get_authority(env, activity, authority_suffix)?;
    let j_authority: JString = env
        .new_string(&authority)
        .map_err(|e| jni_err("new_string(authority)", e))?;

    let uri: JObject = env
        .call_static_method(
            "androidx/core/content/FileProvider",
            "getUriForFile",
            "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
            &[
                JValue::Object(activity),
                JValue::Object(&j_authority),
                JValue::Object(&file_obj),
            ],
        )
        .map_err(|e| jni_err("FileProvider.getUriForFile", e))?
        .l()
        .map_err(|e| jni_err("getUriForFile->l", e))?;

    let uri_string: JObject = env
        .call_method(&uri, "toString", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("Uri.toString", e))?
        .l()
        .map_err(|e| jni_err("Uri.toString->l", e))?;

    let uri_string: String = env
        .get_string(&JString::from(uri_string))
        .map_err(|e| jni_err("get_string(uri)", e))?
        .into();
    Ok(uri_string)
}

// ---------------------------------------------------------------------------
// ShareLauncher — Intent ACTION_SEND
// ---------------------------------------------------------------------------

impl ShareLauncher for AndroidBridge {
    /// Launch one `ACTION_SEND` attempt.
    ///
    /// A `Package` target pins the intent with `setPackage`, so a missing app
    /// surfaces as `ActivityNotFoundException`. The `Chooser` target wraps the
    /// intent in `Intent.createChooser`, narrowed only by the MIME type.
    fn launch(&self, share: &OutgoingShare) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity(&mut env)?;
        let activity = env.auto_local(activity);

        tracing::info!(
            share_target = %share.target,
            mime = share.content_kind.mime_type(),
            "Android: launching share intent"
        );

        match start_share(&mut env, &activity, share) {
            Ok(()) => {
                tracing::info!(share_target = %share.target, "Android: share intent dispatched");
                Ok(())
            }
            Err(e) => {
                let reason = take_java_exception(&mut env).unwrap_or_else(|| e.to_string());
                Err(BillshareError::TargetUnavailable {
                    target: share.target.to_string(),
                    reason,
                })
            }
        }
    }
}

fn start_share(env: &mut JNIEnv<'_>, activity: &JObject<'_>, share: &OutgoingShare) -> Result<()> {
    // -- Build ACTION_SEND intent -------------------------------------------
    let j_action: JString = env
        .new_string(ACTION_SEND)
        .map_err(|e| jni_err("new_string(ACTION_SEND)", e))?;

    let intent: JObject = env
        .new_object(
            "android/content/Intent",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_action)],
        )
        .map_err(|e| jni_err("new Intent(SEND)", e))?;

    // intent.setType(mimeType)
    let j_mime: JString = env
        .new_string(share.content_kind.mime_type())
        .map_err(|e| jni_err("new_string(mime)", e))?;

    env.call_method(
        &intent,
        "setType",
        "(Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&j_mime)],
    )
    .map_err(|e| jni_err("setType", e))?;

    // intent.putExtra(Intent.EXTRA_STREAM, Uri.parse(reference))
    let j_reference: JString = env
        .new_string(share.reference.as_str())
        .map_err(|e| jni_err("new_string(reference)", e))?;

    let uri: JObject = env
        .call_static_method(
            "android/net/Uri",
            "parse",
            "(Ljava/lang/String;)Landroid/net/Uri;",
            &[JValue::Object(&j_reference)],
        )
        .map_err(|e| jni_err("Uri.parse", e))?
        .l()
        .map_err(|e| jni_err("Uri.parse->l", e))?;

    let j_extra_stream: JString = env
        .new_string(EXTRA_STREAM)
        .map_err(|e| jni_err("new_string(EXTRA_STREAM)", e))?;

    env.call_method(
        &intent,
        "putExtra",
        "(Ljava/lang/String;Landroid/os/Parcelable;)Landroid/content/Intent;",
        &[JValue::Object(&j_extra_stream), JValue::Object(&uri)],
    )
    .map_err(|e| jni_err("putExtra(EXTRA_STREAM)", e))?;

    if let Some(text) = &share.text {
        put_string_extra(env, &intent, EXTRA_TEXT, text)?;
    }
    if let Some(jid) = &share.recipient_jid {
        put_string_extra(env, &intent, EXTRA_JID, jid)?;
    }

    if share.grant_read {
        env.call_method(
            &intent,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(FLAG_GRANT_READ_URI_PERMISSION)],
        )
        .map_err(|e| jni_err("addFlags", e))?;
    }

    // -- Pin the target -----------------------------------------------------
    let launchable: JObject = match &share.target {
        ShareTarget::Package(package) => {
            let j_package: JString = env
                .new_string(package)
                .map_err(|e| jni_err("new_string(package)", e))?;
            env.call_method(
                &intent,
                "setPackage",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_package)],
            )
            .map_err(|e| jni_err("setPackage", e))?;
            intent
        }
        ShareTarget::Chooser => {
            let j_title: JString = env
                .new_string(&share.chooser_title)
                .map_err(|e| jni_err("new_string(chooser_title)", e))?;
            env.call_static_method(
                "android/content/Intent",
                "createChooser",
                "(Landroid/content/Intent;Ljava/lang/CharSequence;)Landroid/content/Intent;",
                &[JValue::Object(&intent), JValue::Object(&j_title)],
            )
            .map_err(|e| jni_err("Intent.createChooser", e))?
            .l()
            .map_err(|e| jni_err("createChooser->l", e))?
        }
    };

    // -- Launch -------------------------------------------------------------
    env.call_method(
        activity,
        "startActivity",
        "(Landroid/content/Intent;)V",
        &[JValue::Object(&launchable)],
    )
    .map_err(|e| jni_err("startActivity(share)", e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `intent.putExtra(key, value)` with the `String` overload.
fn put_string_extra(
    env: &mut JNIEnv<'_>,
    intent: &JObject<'_>,
    key: &str,
    value: &str,
) -> Result<()> {
    let j_key: JString = env
        .new_string(key)
        .map_err(|e| jni_err("new_string(extra key)", e))?;
    let j_value: JString = env
        .new_string(value)
        .map_err(|e| jni_err("new_string(extra value)", e))?;

    env.call_method(
        intent,
        "putExtra",
        "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&j_key), JValue::Object(&j_value)],
    )
    .map_err(|e| jni_err("putExtra(String)", e))?;
    Ok(())
}

/// Build the FileProvider authority string for this application.
///
/// Convention: `<applicationId><suffix>`, `.provider` by default.
fn get_authority(env: &mut JNIEnv<'_>, activity: &JObject<'_>, suffix: &str) -> Result<String> {
    let j_pkg: JObject = env
        .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("getPackageName", e))?
        .l()
        .map_err(|e| jni_err("getPackageName->l", e))?;

    let pkg: String = env
        .get_string(&JString::from(j_pkg))
        .map_err(|e| jni_err("get_string(packageName)", e))?
        .into();

    Ok(format!("{pkg}{suffix}"))
}

/// `Context.getFilesDir()`, where the share config is kept.
fn files_dir(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<PathBuf> {
    let j_dir: JObject = env
        .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])
        .map_err(|e| jni_err("getFilesDir", e))?
        .l()
        .map_err(|e| jni_err("getFilesDir->l", e))?;
    if j_dir.is_null() {
        return Err(BillshareError::Bridge("getFilesDir returned null".into()));
    }

    let j_path: JObject = env
        .call_method(&j_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("File.getAbsolutePath", e))?
        .l()
        .map_err(|e| jni_err("File.getAbsolutePath->l", e))?;

    let path: String = env
        .get_string(&JString::from(j_path))
        .map_err(|e| jni_err("get_string(filesDir)", e))?
        .into();
    Ok(PathBuf::from(path))
}

/// Record the VM, pin `activity` and (re)register it with `ndk_context`.
fn init_context(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<()> {
    let vm = env
        .get_java_vm()
        .map_err(|e| jni_err("GetJavaVM", e))?;
    let vm_ptr = vm.get_java_vm_pointer();
    let _ = JAVA_VM.set(vm);

    let global = env
        .new_global_ref(activity)
        .map_err(|e| jni_err("NewGlobalRef(activity)", e))?;

    let mut pinned = PINNED_ACTIVITY
        .lock()
        .map_err(|_| BillshareError::Bridge("activity lock poisoned".into()))?;

    // SAFETY: `vm_ptr` is the process-wide JavaVM and `global` is a valid
    // global ref that outlives its registration: it is only dropped after
    // the next call has released the context and registered a replacement.
    unsafe {
        if pinned.is_some() {
            ndk_context::release_android_context();
        }
        ndk_context::initialize_android_context(vm_ptr.cast(), global.as_obj().as_raw().cast());
    }
    *pinned = Some(global);
    Ok(())
}

fn share_channel(config: ShareConfig) -> ShareChannel {
    let bridge = crate::platform_bridge(&config);
    ShareChannel::new(ShareDispatcher::new(config, bridge))
}

// ---------------------------------------------------------------------------
// JNI entry points
// ---------------------------------------------------------------------------

/// `BillshareBridge.nativeInit(activity, configJson)`.
///
/// Call from `configureFlutterEngine` and again whenever the activity is
/// recreated. Settings live in `<filesDir>/share.json`, written with the
/// defaults on first launch. A non-null `configJson` replaces the stored
/// settings. Only the first call in a process builds the channel.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_invoice_BillshareBridge_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    activity: JObject<'local>,
    config_json: JString<'local>,
) {
    crate::init_logging();

    if let Err(e) = init_context(&mut env, &activity) {
        tracing::error!(error = %e, "Android: share bridge initialisation failed");
        return;
    }

    let override_json: Option<String> = if config_json.is_null() {
        None
    } else {
        env.get_string(&config_json).ok().map(Into::into)
    };
    let config = match files_dir(&mut env, &activity) {
        Ok(dir) => ShareConfig::resolve(&dir.join(CONFIG_FILE), override_json.as_deref()),
        Err(e) => {
            let _ = take_java_exception(&mut env);
            tracing::warn!(error = %e, "Android: no files dir, share config not persisted");
            override_json
                .and_then(|raw| serde_json::from_str::<ShareConfig>(&raw).ok())
                .unwrap_or_default()
        }
    };

    if SHARE_CHANNEL.set(share_channel(config)).is_err() {
        tracing::debug!("Android: share channel already initialised, keeping existing config");
    }
    tracing::info!("Android: share bridge ready");
}

/// `BillshareBridge.nativeHandleMethodCall(callJson)`.
///
/// Returns the JSON reply envelope, or `null` for an unimplemented method.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_invoice_BillshareBridge_nativeHandleMethodCall<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    call_json: JString<'local>,
) -> jstring {
    let reply = match env.get_string(&call_json) {
        Ok(raw) => {
            let raw: String = raw.into();
            SHARE_CHANNEL
                .get_or_init(|| share_channel(ShareConfig::default()))
                .handle_json(&raw)
        }
        Err(e) => {
            let _ = take_java_exception(&mut env);
            MethodReply::from_error(&BillshareError::InvalidArgument(format!(
                "unreadable method call: {e}"
            )))
            .to_envelope()
            .map(|envelope| envelope.to_string())
        }
    };

    let Some(reply) = reply else {
        return std::ptr::null_mut();
    };
    match env.new_string(reply) {
        Ok(j_reply) => j_reply.into_raw(),
        Err(e) => {
            tracing::error!(error = %e, "Android: could not allocate reply string");
            std::ptr::null_mut()
        }
    }
}
