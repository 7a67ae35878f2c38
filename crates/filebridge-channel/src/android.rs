// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JNI entry points for `com.filebridge.FileBridge`.
//
// The Java side calls `nativeInit` once with the hosting Activity, routes
// every method call through `nativeInvoke`, forwards DOWNLOAD_COMPLETE
// broadcasts to `nativeOnDownloadComplete` and tears down with
// `nativeDispose`.

use std::sync::{Arc, Mutex, PoisonError};

use jni::JNIEnv;
use jni::objects::{JClass, JObject, JString};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jint, jlong, jstring};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

use filebridge_bridge::android::{self, AndroidHost};
use filebridge_core::BridgeConfig;
use filebridge_core::error::{BridgeError, Result};
use filebridge_core::types::DownloadId;

use crate::correlator::CorrelatorHandle;
use crate::dispatch::{self, MethodReply};
use crate::logging;
use crate::session::BridgeSession;

/// Process-wide session state owned by the Java peer.
struct NativeSession {
    runtime: Runtime,
    session: BridgeSession<AndroidHost>,
    correlator: Option<CorrelatorHandle>,
}

static SESSION: Mutex<Option<NativeSession>> = Mutex::new(None);

fn start_session(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
    api_level: u32,
    config: BridgeConfig,
) -> Result<NativeSession> {
    android::init_context(env, context)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("filebridge")
        .enable_all()
        .build()?;

    let host = filebridge_bridge::platform_host(api_level)
        .with_authority_suffix(config.file_provider_suffix.clone());
    let session = BridgeSession::new(Arc::new(host), config);

    let correlator = {
        let _guard = runtime.enter();
        session.start()?
    };

    Ok(NativeSession {
        runtime,
        session,
        correlator: Some(correlator),
    })
}

fn stop_session(mut native: NativeSession) {
    if let Some(handle) = native.correlator.take() {
        native.runtime.block_on(handle.shutdown());
    }
    drop(native);
    android::release_context();
}

fn read_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> Result<String> {
    if value.is_null() {
        return Ok(String::new());
    }
    env.get_string(value)
        .map(Into::into)
        .map_err(|e| BridgeError::Bridge(format!("failed to read Java string: {e}")))
}

fn reply_to_java(env: &mut JNIEnv<'_>, reply: &MethodReply) -> jstring {
    match env.new_string(reply.to_json()) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!(error = %e, "failed to allocate reply string");
            std::ptr::null_mut()
        }
    }
}

/// `static native boolean nativeInit(Context context, int apiLevel, String configJson)`
///
/// `configJson` may be null or empty for the defaults. A document that does
/// not parse fails initialisation.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_filebridge_FileBridge_nativeInit(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    context: JObject<'_>,
    api_level: jint,
    config_json: JString<'_>,
) -> jboolean {
    logging::init();

    let config = match read_string(&mut env, &config_json)
        .and_then(|json| BridgeConfig::from_json_or_default(&json))
    {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid bridge configuration");
            return JNI_FALSE;
        }
    };

    let mut slot = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(previous) = slot.take() {
        warn!("replacing existing bridge session");
        stop_session(previous);
    }

    let api_level = u32::try_from(api_level).unwrap_or(0);
    let tracking = config.tracking;
    match start_session(&mut env, &context, api_level, config) {
        Ok(native) => {
            *slot = Some(native);
            info!(api_level, ?tracking, "bridge initialised");
            JNI_TRUE
        }
        Err(e) => {
            error!(error = %e, "bridge initialisation failed");
            JNI_FALSE
        }
    }
}

/// `static native String nativeInvoke(String method, String argsJson)`
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_filebridge_FileBridge_nativeInvoke(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    method: JString<'_>,
    args_json: JString<'_>,
) -> jstring {
    let decoded = read_string(&mut env, &method)
        .and_then(|m| read_string(&mut env, &args_json).map(|a| (m, a)));

    let reply = match decoded {
        Ok((method, args)) => {
            let slot = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(native) => dispatch::invoke(&native.session, &method, &args),
                None => MethodReply::from_result(Err(BridgeError::PlatformUnavailable)),
            }
        }
        Err(e) => MethodReply::from_result(Err(e)),
    };

    reply_to_java(&mut env, &reply)
}

/// `static native boolean nativeOnDownloadComplete(long id)`
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_filebridge_FileBridge_nativeOnDownloadComplete(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    id: jlong,
) -> jboolean {
    if android::deliver_completion(DownloadId(id)) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// `static native void nativeDispose()`
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_filebridge_FileBridge_nativeDispose(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) {
    let native = SESSION.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(native) = native {
        stop_session(native);
        info!("bridge disposed");
    }
}
