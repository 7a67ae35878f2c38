// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filebridge Channel. The session behind the app's platform channel: download
// submission and completion correlation, the file opener, the picker and
// inbound method dispatch. On Android it also exports the JNI entry points.

pub mod correlator;
pub mod dispatch;
pub mod download;
pub mod logging;
pub mod opener;
pub mod picker;
pub mod session;
pub mod tracker;

#[cfg(target_os = "android")]
mod android;

#[cfg(test)]
mod testing;

pub use correlator::{CompletionCorrelator, Correlation, CorrelatorHandle};
pub use dispatch::{MethodCall, MethodReply, dispatch, invoke};
pub use session::BridgeSession;
pub use tracker::{PendingDownloads, TrackedDownload};
