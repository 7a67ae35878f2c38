// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Filebridge: host platform service abstractions.
//!
//! This crate defines the traits the bridge uses to reach the host's
//! download queue, cookie store, viewer, picker and notifications, plus the
//! completion event channel and capability flags. Backends exist for
//! Android (JNI) and for desktop/CI builds (stub).

pub mod capabilities;
pub mod events;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

pub use capabilities::{HostCapabilities, ReceiverScope};
pub use events::{CompletionSink, CompletionSubscription, subscribe};
pub use traits::HostPlatform;

/// Host implementation for the target operating system.
///
/// On Android the host is bound to the application context registered with
/// `android::init_context` and to the given API level.
#[cfg(target_os = "android")]
pub fn platform_host(api_level: u32) -> android::AndroidHost {
    android::AndroidHost::new(api_level)
}

/// Host implementation for the target operating system.
///
/// Desktop/CI builds get a stub whose services report `PlatformUnavailable`.
#[cfg(not(target_os = "android"))]
pub fn platform_host(_api_level: u32) -> stub::StubHost {
    stub::StubHost
}
