// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android host via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each trait method invokes the corresponding
// Android API (DownloadManager, CookieManager, FileProvider, Intents)
// through JNI calls into the ART runtime.
//
// ## Architecture notes
//
// The hosting Activity hands itself to `init_context` once at startup; the
// JavaVM and a global reference to the Activity are kept for the life of the
// session and released by `release_context`.
//
// Two small Java classes are expected in the host APK:
//
// - `com.filebridge.DownloadCompleteReceiver`, a `BroadcastReceiver` whose
//   `onReceive` reads `DownloadManager.EXTRA_DOWNLOAD_ID` and calls the
//   native `FileBridge.nativeOnDownloadComplete(long)`.
// - `com.filebridge.FileBridge.showNotice(Context, String, int)`, which posts a
//   `Toast` on the main looper, so notices are safe from any thread.
//
// The file chooser's result arrives through the Activity's
// `onActivityResult` with request code [`REQUEST_PICK_FILE`]; it is not
// routed back through this crate.

#![cfg(target_os = "android")]

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{AttachGuard, JNIEnv, JavaVM};

use filebridge_core::Notice;
use filebridge_core::error::{BridgeError, Result};
use filebridge_core::types::{
    CompletionNotification, DownloadId, DownloadRequest, DownloadStatus, PickerRequest,
    ViewRequest,
};

use crate::capabilities::{HostCapabilities, ReceiverScope};
use crate::events::CompletionSink;
use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Request code for the file chooser. The host Activity must recognise it
/// in its `onActivityResult` override.
pub const REQUEST_PICK_FILE: i32 = 0x4642_0001; // "FB" + 1

const ACTION_VIEW: &str = "android.intent.action.VIEW";
const ACTION_GET_CONTENT: &str = "android.intent.action.GET_CONTENT";
const ACTION_DOWNLOAD_COMPLETE: &str = "android.intent.action.DOWNLOAD_COMPLETE";
const CATEGORY_OPENABLE: &str = "android.intent.category.OPENABLE";

const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;
const FLAG_ACTIVITY_NEW_TASK: i32 = 0x1000_0000;

const RECEIVER_CLASS: &str = "com/filebridge/DownloadCompleteReceiver";
const NOTICE_CLASS: &str = "com/filebridge/FileBridge";

const SIG_REGISTER_RECEIVER: &str =
    "(Landroid/content/BroadcastReceiver;Landroid/content/IntentFilter;)Landroid/content/Intent;";
const SIG_REGISTER_RECEIVER_FLAGS: &str =
    "(Landroid/content/BroadcastReceiver;Landroid/content/IntentFilter;I)Landroid/content/Intent;";

static JVM: OnceLock<JavaVM> = OnceLock::new();
static CONTEXT: Mutex<Option<GlobalRef>> = Mutex::new(None);
static COMPLETION_SINK: Mutex<Option<CompletionSink>> = Mutex::new(None);

/// Bind the bridge to the hosting Activity.
///
/// Stores the JavaVM, pins the Activity with a global reference and
/// publishes both through `ndk_context` so other native libraries in the
/// process see the same context. Calling it again replaces the context.
pub fn init_context(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> Result<()> {
    let vm = env
        .get_java_vm()
        .map_err(|e| BridgeError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    let global = env
        .new_global_ref(context)
        .map_err(|e| BridgeError::Bridge(format!("failed to pin context: {e}")))?;

    let mut slot = CONTEXT
        .lock()
        .map_err(|_| BridgeError::Bridge("context lock poisoned".into()))?;
    if slot.is_some() {
        // SAFETY: a context was published by a previous call and is still
        // pinned by the global reference we are about to replace.
        unsafe { ndk_context::release_android_context() };
    }

    // SAFETY: both pointers stay valid while `global` lives in `CONTEXT`
    // and the VM lives for the whole process.
    unsafe {
        ndk_context::initialize_android_context(
            vm.get_java_vm_pointer().cast(),
            global.as_obj().as_raw().cast(),
        );
    }
    *slot = Some(global);
    let _ = JVM.set(vm);

    tracing::info!("Android context initialised");
    Ok(())
}

/// Drop the Activity reference taken by [`init_context`].
pub fn release_context() {
    if let Ok(mut slot) = CONTEXT.lock() {
        if slot.take().is_some() {
            // SAFETY: paired with the initialisation in `init_context`.
            unsafe { ndk_context::release_android_context() };
            tracing::info!("Android context released");
        }
    }
}

/// Forward a download-complete broadcast to the registered listener.
///
/// Called from the JNI entry point on whatever thread delivered the
/// broadcast. Returns `false` if no listener is registered.
pub fn deliver_completion(id: DownloadId) -> bool {
    match COMPLETION_SINK.lock() {
        Ok(slot) => slot.as_ref().is_some_and(|sink| sink.signal(id)),
        Err(_) => false,
    }
}

/// Obtain a [`JNIEnv`] for the current thread.
///
/// A thread that was not attached is detached again when the guard drops,
/// which frees every local reference it created. Runtime worker threads
/// therefore never accumulate locals across calls.
fn jni_env() -> Result<AttachGuard<'static>> {
    let vm = JVM.get().ok_or_else(|| {
        BridgeError::Bridge("JavaVM not initialised; call init_context first".into())
    })?;
    vm.attach_current_thread()
        .map_err(|e| BridgeError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Obtain the hosting Activity as a [`JObject`].
fn activity() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(BridgeError::Bridge(
            "Android context is null; activity not initialised".into(),
        ));
    }
    // SAFETY: the pointer is the global reference pinned in `CONTEXT`.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Map a `jni::errors::Error` into `BridgeError::Bridge`, describing and
/// clearing any pending Java exception so the next call can proceed.
fn jni_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> BridgeError {
    if let jni::errors::Error::JavaException = e {
        let detail = take_exception(env).unwrap_or_else(|| "Java exception".into());
        return BridgeError::Bridge(format!("{context}: {detail}"));
    }
    BridgeError::Bridge(format!("{context}: {e}"))
}

/// Clear the pending exception and return its `toString()`.
fn take_exception(env: &mut JNIEnv<'_>) -> Option<String> {
    let throwable = env.exception_occurred().ok()?;
    env.exception_clear().ok()?;
    if throwable.is_null() {
        return None;
    }
    let text: JObject = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    let text: String = env.get_string(&JString::from(text)).ok()?.into();
    Some(text)
}

// ---------------------------------------------------------------------------
// Host struct
// ---------------------------------------------------------------------------

/// Android implementation of the Filebridge host services.
///
/// Holds the capability flags and the registered completion receiver; all
/// other state lives on the Java side.
pub struct AndroidHost {
    capabilities: HostCapabilities,
    platform_name: String,
    authority_suffix: String,
    receiver: Mutex<Option<GlobalRef>>,
}

impl AndroidHost {
    /// Create a host for the given API level.
    ///
    /// No JNI call is made here; the first one happens lazily when
    /// a trait method is invoked.
    pub fn new(api_level: u32) -> Self {
        Self {
            capabilities: HostCapabilities::for_api_level(api_level),
            platform_name: format!("Android (API {api_level})"),
            authority_suffix: ".fileprovider".into(),
            receiver: Mutex::new(None),
        }
    }

    /// Suffix appended to the package name to form the FileProvider
    /// authority.
    pub fn with_authority_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.authority_suffix = suffix.into();
        self
    }

    fn take_receiver(&self) -> Result<Option<GlobalRef>> {
        Ok(self
            .receiver
            .lock()
            .map_err(|_| BridgeError::Bridge("receiver lock poisoned".into()))?
            .take())
    }
}

impl HostPlatform for AndroidHost {
    fn platform_name(&self) -> &str {
        &self.platform_name
    }

    fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }
}

// ---------------------------------------------------------------------------
// DownloadService: android.app.DownloadManager
// ---------------------------------------------------------------------------

impl DownloadService for AndroidHost {
    /// Build a `DownloadManager.Request` and enqueue it.
    fn enqueue(&self, request: &DownloadRequest) -> Result<DownloadId> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(
            url = %request.url,
            filename = %request.filename,
            destination = request.destination.host_name(),
            "Android: enqueueing download"
        );

        let uri = parse_uri(&mut env, &request.url)?;
        let dm_request: JObject = env
            .new_object(
                "android/app/DownloadManager$Request",
                "(Landroid/net/Uri;)V",
                &[JValue::Object(&uri)],
            )
            .map_err(|e| jni_err(&mut env, "new DownloadManager.Request", e))?;

        for (name, value) in &request.headers {
            let j_name = new_string(&mut env, name)?;
            let j_value = new_string(&mut env, value)?;
            env.call_method(
                &dm_request,
                "addRequestHeader",
                "(Ljava/lang/String;Ljava/lang/String;)Landroid/app/DownloadManager$Request;",
                &[JValue::Object(&j_name), JValue::Object(&j_value)],
            )
            .map_err(|e| jni_err(&mut env, "addRequestHeader", e))?;
        }

        let j_title = new_string(&mut env, &request.title)?;
        env.call_method(
            &dm_request,
            "setTitle",
            "(Ljava/lang/CharSequence;)Landroid/app/DownloadManager$Request;",
            &[JValue::Object(&j_title)],
        )
        .map_err(|e| jni_err(&mut env, "setTitle", e))?;

        let j_description = new_string(&mut env, &request.description)?;
        env.call_method(
            &dm_request,
            "setDescription",
            "(Ljava/lang/CharSequence;)Landroid/app/DownloadManager$Request;",
            &[JValue::Object(&j_description)],
        )
        .map_err(|e| jni_err(&mut env, "setDescription", e))?;

        env.call_method(
            &dm_request,
            "setNotificationVisibility",
            "(I)Landroid/app/DownloadManager$Request;",
            &[JValue::Int(request.notification.host_value())],
        )
        .map_err(|e| jni_err(&mut env, "setNotificationVisibility", e))?;

        let j_dir = new_string(&mut env, request.destination.host_name())?;
        let j_filename = new_string(&mut env, &request.filename)?;
        env.call_method(
            &dm_request,
            "setDestinationInExternalPublicDir",
            "(Ljava/lang/String;Ljava/lang/String;)Landroid/app/DownloadManager$Request;",
            &[JValue::Object(&j_dir), JValue::Object(&j_filename)],
        )
        .map_err(|e| jni_err(&mut env, "setDestinationInExternalPublicDir", e))?;

        if let Some(mime_type) = &request.mime_type {
            let j_mime = new_string(&mut env, mime_type)?;
            env.call_method(
                &dm_request,
                "setMimeType",
                "(Ljava/lang/String;)Landroid/app/DownloadManager$Request;",
                &[JValue::Object(&j_mime)],
            )
            .map_err(|e| jni_err(&mut env, "setMimeType", e))?;
        }

        env.call_method(
            &dm_request,
            "setAllowedNetworkTypes",
            "(I)Landroid/app/DownloadManager$Request;",
            &[JValue::Int(request.networks.host_flags())],
        )
        .map_err(|e| jni_err(&mut env, "setAllowedNetworkTypes", e))?;

        let manager = download_manager(&mut env, &activity)?;
        let id = env
            .call_method(
                &manager,
                "enqueue",
                "(Landroid/app/DownloadManager$Request;)J",
                &[JValue::Object(&dm_request)],
            )
            .map_err(|e| jni_err(&mut env, "DownloadManager.enqueue", e))?
            .j()
            .map_err(|e| jni_err(&mut env, "enqueue->j", e))?;

        tracing::info!(id, "Android: download enqueued");
        Ok(DownloadId(id))
    }

    /// Read the status, local URI and reason columns for one download.
    fn query(&self, id: DownloadId) -> Result<Option<CompletionNotification>> {
        let mut env = jni_env()?;
        let activity = activity()?;

        let query: JObject = env
            .new_object("android/app/DownloadManager$Query", "()V", &[])
            .map_err(|e| jni_err(&mut env, "new DownloadManager.Query", e))?;

        let ids = env
            .new_long_array(1)
            .map_err(|e| jni_err(&mut env, "new_long_array", e))?;
        env.set_long_array_region(&ids, 0, &[id.0])
            .map_err(|e| jni_err(&mut env, "set_long_array_region", e))?;

        env.call_method(
            &query,
            "setFilterById",
            "([J)Landroid/app/DownloadManager$Query;",
            &[JValue::Object(&ids)],
        )
        .map_err(|e| jni_err(&mut env, "setFilterById", e))?;

        let manager = download_manager(&mut env, &activity)?;
        let cursor: JObject = env
            .call_method(
                &manager,
                "query",
                "(Landroid/app/DownloadManager$Query;)Landroid/database/Cursor;",
                &[JValue::Object(&query)],
            )
            .map_err(|e| jni_err(&mut env, "DownloadManager.query", e))?
            .l()
            .map_err(|e| jni_err(&mut env, "query->l", e))?;

        if cursor.is_null() {
            return Ok(None);
        }

        let record = read_record(&mut env, &cursor, id);

        if let Err(e) = env.call_method(&cursor, "close", "()V", &[]) {
            let err = jni_err(&mut env, "Cursor.close", e);
            tracing::warn!(error = %err, "Android: failed to close download cursor");
        }

        record
    }
}

// ---------------------------------------------------------------------------
// CookieStore: android.webkit.CookieManager
// ---------------------------------------------------------------------------

impl CookieStore for AndroidHost {
    fn cookie_for(&self, url: &str) -> Result<Option<String>> {
        let mut env = jni_env()?;

        let manager: JObject = env
            .call_static_method(
                "android/webkit/CookieManager",
                "getInstance",
                "()Landroid/webkit/CookieManager;",
                &[],
            )
            .map_err(|e| jni_err(&mut env, "CookieManager.getInstance", e))?
            .l()
            .map_err(|e| jni_err(&mut env, "getInstance->l", e))?;

        let j_url = new_string(&mut env, url)?;
        let cookie: JObject = env
            .call_method(
                &manager,
                "getCookie",
                "(Ljava/lang/String;)Ljava/lang/String;",
                &[JValue::Object(&j_url)],
            )
            .map_err(|e| jni_err(&mut env, "CookieManager.getCookie", e))?
            .l()
            .map_err(|e| jni_err(&mut env, "getCookie->l", e))?;

        optional_string(&mut env, cookie, "getCookie")
    }
}

// ---------------------------------------------------------------------------
// ViewLauncher: Intent ACTION_VIEW
// ---------------------------------------------------------------------------

impl ViewLauncher for AndroidHost {
    fn view(&self, request: &ViewRequest) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(
            uri = %request.uri,
            mime = ?request.mime_type,
            "Android: dispatching view intent"
        );

        let intent = new_intent(&mut env, ACTION_VIEW)?;
        let uri = parse_uri(&mut env, &request.uri)?;

        match &request.mime_type {
            Some(mime_type) => {
                let j_mime = new_string(&mut env, mime_type)?;
                env.call_method(
                    &intent,
                    "setDataAndType",
                    "(Landroid/net/Uri;Ljava/lang/String;)Landroid/content/Intent;",
                    &[JValue::Object(&uri), JValue::Object(&j_mime)],
                )
                .map_err(|e| jni_err(&mut env, "setDataAndType", e))?;
            }
            None => {
                env.call_method(
                    &intent,
                    "setData",
                    "(Landroid/net/Uri;)Landroid/content/Intent;",
                    &[JValue::Object(&uri)],
                )
                .map_err(|e| jni_err(&mut env, "setData", e))?;
            }
        }

        let mut flags = FLAG_ACTIVITY_NEW_TASK;
        if request.grant_read {
            flags |= FLAG_GRANT_READ_URI_PERMISSION;
        }
        env.call_method(
            &intent,
            "setFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(flags)],
        )
        .map_err(|e| jni_err(&mut env, "setFlags", e))?;

        env.call_method(
            &activity,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[JValue::Object(&intent)],
        )
        .map_err(|e| jni_err(&mut env, "startActivity(view)", e))?;

        tracing::info!("Android: view intent dispatched");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ContentGrants: androidx.core.content.FileProvider
// ---------------------------------------------------------------------------

impl ContentGrants for AndroidHost {
    fn grant_for_file(&self, path: &Path) -> Result<String> {
        let mut env = jni_env()?;
        let activity = activity()?;

        let j_path = new_string(&mut env, &path.to_string_lossy())?;
        let file: JObject = env
            .new_object(
                "java/io/File",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&j_path)],
            )
            .map_err(|e| jni_err(&mut env, "new File", e))?;

        let authority = get_authority(&mut env, &activity, &self.authority_suffix)?;
        let j_authority = new_string(&mut env, &authority)?;

        let content_uri: JObject = env
            .call_static_method(
                "androidx/core/content/FileProvider",
                "getUriForFile",
                "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
                &[
                    JValue::Object(&activity),
                    JValue::Object(&j_authority),
                    JValue::Object(&file),
                ],
            )
            .map_err(|e| jni_err(&mut env, "FileProvider.getUriForFile", e))?
            .l()
            .map_err(|e| jni_err(&mut env, "getUriForFile->l", e))?;

        let text: JObject = env
            .call_method(&content_uri, "toString", "()Ljava/lang/String;", &[])
            .map_err(|e| jni_err(&mut env, "Uri.toString", e))?
            .l()
            .map_err(|e| jni_err(&mut env, "toString->l", e))?;

        optional_string(&mut env, text, "Uri.toString")?
            .ok_or_else(|| BridgeError::Bridge("FileProvider returned a null URI".into()))
    }
}

// ---------------------------------------------------------------------------
// ContentPicker: Intent ACTION_GET_CONTENT
// ---------------------------------------------------------------------------

impl ContentPicker for AndroidHost {
    /// Launch the generic content picker.
    ///
    /// The result arrives asynchronously via `onActivityResult` with
    /// request code [`REQUEST_PICK_FILE`].
    fn launch_picker(&self, request: &PickerRequest) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(mime = %request.mime_type, "Android: launching ACTION_GET_CONTENT");

        let intent = new_intent(&mut env, ACTION_GET_CONTENT)?;

        let j_mime = new_string(&mut env, &request.mime_type)?;
        env.call_method(
            &intent,
            "setType",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&j_mime)],
        )
        .map_err(|e| jni_err(&mut env, "setType", e))?;

        if request.openable_only {
            let j_category = new_string(&mut env, CATEGORY_OPENABLE)?;
            env.call_method(
                &intent,
                "addCategory",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_category)],
            )
            .map_err(|e| jni_err(&mut env, "addCategory(OPENABLE)", e))?;
        }

        env.call_method(
            &activity,
            "startActivityForResult",
            "(Landroid/content/Intent;I)V",
            &[JValue::Object(&intent), JValue::Int(REQUEST_PICK_FILE)],
        )
        .map_err(|e| jni_err(&mut env, "startActivityForResult(GET_CONTENT)", e))?;

        tracing::info!(
            request_code = REQUEST_PICK_FILE,
            "Android: file chooser dispatched, result arrives via onActivityResult"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notifier: Toast via the host helper
// ---------------------------------------------------------------------------

impl Notifier for AndroidHost {
    fn notify(&self, notice: &Notice) {
        if let Err(e) = show_notice(notice) {
            tracing::warn!(error = %e, text = %notice.text, "Android: failed to show notice");
        }
    }
}

fn show_notice(notice: &Notice) -> Result<()> {
    let mut env = jni_env()?;
    let activity = activity()?;

    let j_text = new_string(&mut env, &notice.text)?;
    env.call_static_method(
        NOTICE_CLASS,
        "showNotice",
        "(Landroid/content/Context;Ljava/lang/String;I)V",
        &[
            JValue::Object(&activity),
            JValue::Object(&j_text),
            JValue::Int(notice.duration.host_value()),
        ],
    )
    .map_err(|e| jni_err(&mut env, "FileBridge.showNotice", e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CompletionRegistry: BroadcastReceiver for DOWNLOAD_COMPLETE
// ---------------------------------------------------------------------------

impl CompletionRegistry for AndroidHost {
    fn register_completion_listener(
        &self,
        scope: ReceiverScope,
        sink: CompletionSink,
    ) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;

        // A second registration replaces the first; the old receiver must
        // not stay registered with the context.
        if let Some(previous) = self.take_receiver()? {
            tracing::warn!("Android: replacing registered download receiver");
            unregister_receiver(&mut env, &activity, &previous)?;
        }

        let receiver: JObject = env
            .new_object(RECEIVER_CLASS, "()V", &[])
            .map_err(|e| jni_err(&mut env, "new DownloadCompleteReceiver", e))?;

        let j_action = new_string(&mut env, ACTION_DOWNLOAD_COMPLETE)?;
        let filter: JObject = env
            .new_object(
                "android/content/IntentFilter",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&j_action)],
            )
            .map_err(|e| jni_err(&mut env, "new IntentFilter", e))?;

        match scope.host_flag() {
            Some(flag) => env.call_method(
                &activity,
                "registerReceiver",
                SIG_REGISTER_RECEIVER_FLAGS,
                &[JValue::Object(&receiver), JValue::Object(&filter), JValue::Int(flag)],
            ),
            None => env.call_method(
                &activity,
                "registerReceiver",
                SIG_REGISTER_RECEIVER,
                &[JValue::Object(&receiver), JValue::Object(&filter)],
            ),
        }
        .map_err(|e| jni_err(&mut env, "registerReceiver", e))?;

        let global = env
            .new_global_ref(&receiver)
            .map_err(|e| jni_err(&mut env, "new_global_ref(receiver)", e))?;

        *self
            .receiver
            .lock()
            .map_err(|_| BridgeError::Bridge("receiver lock poisoned".into()))? = Some(global);
        *COMPLETION_SINK
            .lock()
            .map_err(|_| BridgeError::Bridge("completion sink lock poisoned".into()))? = Some(sink);

        tracing::info!(?scope, "Android: download receiver registered");
        Ok(())
    }

    fn unregister_completion_listener(&self) -> Result<()> {
        if let Ok(mut slot) = COMPLETION_SINK.lock() {
            slot.take();
        }

        let Some(receiver) = self.take_receiver()? else {
            return Ok(());
        };

        let mut env = jni_env()?;
        let activity = activity()?;
        unregister_receiver(&mut env, &activity, &receiver)
    }
}

fn unregister_receiver(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    receiver: &GlobalRef,
) -> Result<()> {
    env.call_method(
        activity,
        "unregisterReceiver",
        "(Landroid/content/BroadcastReceiver;)V",
        &[JValue::Object(receiver.as_obj())],
    )
    .map_err(|e| jni_err(env, "unregisterReceiver", e))?;

    tracing::info!("Android: download receiver unregistered");
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn new_string<'a>(env: &mut JNIEnv<'a>, value: &str) -> Result<JString<'a>> {
    env.new_string(value)
        .map_err(|e| jni_err(env, "new_string", e))
}

/// Convert a possibly-null `java.lang.String` into an owned `String`.
fn optional_string(
    env: &mut JNIEnv<'_>,
    value: JObject<'_>,
    context: &str,
) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let text: String = env
        .get_string(&JString::from(value))
        .map_err(|e| jni_err(env, context, e))?
        .into();
    Ok(Some(text))
}

/// `Uri.parse(value)`.
fn parse_uri<'a>(env: &mut JNIEnv<'a>, value: &str) -> Result<JObject<'a>> {
    let j_value = new_string(env, value)?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_value)],
    )
    .map_err(|e| jni_err(env, "Uri.parse", e))?
    .l()
    .map_err(|e| jni_err(env, "Uri.parse->l", e))
}

/// `new Intent(action)`.
fn new_intent<'a>(env: &mut JNIEnv<'a>, action: &str) -> Result<JObject<'a>> {
    let j_action = new_string(env, action)?;
    env.new_object(
        "android/content/Intent",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&j_action)],
    )
    .map_err(|e| jni_err(env, "new Intent", e))
}

/// `context.getSystemService(Context.DOWNLOAD_SERVICE)`.
fn download_manager<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    let j_service = new_string(env, "download")?;
    let manager = env
        .call_method(
            activity,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&j_service)],
        )
        .map_err(|e| jni_err(env, "getSystemService(download)", e))?
        .l()
        .map_err(|e| jni_err(env, "getSystemService->l", e))?;

    if manager.is_null() {
        return Err(BridgeError::Bridge("download service unavailable".into()));
    }
    Ok(manager)
}

/// Read the first row of a DownloadManager cursor.
fn read_record(
    env: &mut JNIEnv<'_>,
    cursor: &JObject<'_>,
    id: DownloadId,
) -> Result<Option<CompletionNotification>> {
    let has_row = env
        .call_method(cursor, "moveToFirst", "()Z", &[])
        .map_err(|e| jni_err(env, "Cursor.moveToFirst", e))?
        .z()
        .map_err(|e| jni_err(env, "moveToFirst->z", e))?;
    if !has_row {
        return Ok(None);
    }

    let status_col = column_index(env, cursor, "status")?;
    let status = env
        .call_method(cursor, "getInt", "(I)I", &[JValue::Int(status_col)])
        .map_err(|e| jni_err(env, "Cursor.getInt(status)", e))?
        .i()
        .map_err(|e| jni_err(env, "getInt->i", e))?;
    let status = DownloadStatus::from_host(status);

    let local_uri = match status {
        DownloadStatus::Successful => {
            let col = column_index(env, cursor, "local_uri")?;
            let value: JObject = env
                .call_method(cursor, "getString", "(I)Ljava/lang/String;", &[JValue::Int(col)])
                .map_err(|e| jni_err(env, "Cursor.getString(local_uri)", e))?
                .l()
                .map_err(|e| jni_err(env, "getString->l", e))?;
            optional_string(env, value, "local_uri")?
        }
        _ => None,
    };

    let reason = match status {
        DownloadStatus::Failed => {
            let col = column_index(env, cursor, "reason")?;
            let value = env
                .call_method(cursor, "getInt", "(I)I", &[JValue::Int(col)])
                .map_err(|e| jni_err(env, "Cursor.getInt(reason)", e))?
                .i()
                .map_err(|e| jni_err(env, "getInt->i", e))?;
            Some(value)
        }
        _ => None,
    };

    Ok(Some(CompletionNotification {
        id,
        status,
        local_uri,
        reason,
    }))
}

fn column_index(env: &mut JNIEnv<'_>, cursor: &JObject<'_>, column: &str) -> Result<i32> {
    let j_column = new_string(env, column)?;
    env.call_method(
        cursor,
        "getColumnIndex",
        "(Ljava/lang/String;)I",
        &[JValue::Object(&j_column)],
    )
    .map_err(|e| jni_err(env, "Cursor.getColumnIndex", e))?
    .i()
    .map_err(|e| jni_err(env, "getColumnIndex->i", e))
}

/// Build the FileProvider authority string for this application.
///
/// Convention: `<applicationId><suffix>`, read from the Activity's
/// `getPackageName()`.
fn get_authority(env: &mut JNIEnv<'_>, activity: &JObject<'_>, suffix: &str) -> Result<String> {
    let j_pkg: JObject = env
        .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err(env, "getPackageName", e))?
        .l()
        .map_err(|e| jni_err(env, "getPackageName->l", e))?;

    let pkg = optional_string(env, j_pkg, "getPackageName")?
        .ok_or_else(|| BridgeError::Bridge("package name is null".into()))?;

    Ok(format!("{pkg}{suffix}"))
}
