// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging bootstrap. Desktop builds get a fmt subscriber on stderr. Android
// has no visible stderr, so events go to logcat through `android_logger`.

#[cfg(not(target_os = "android"))]
use tracing_subscriber::EnvFilter;

/// Tag under which Android log lines appear in logcat.
pub const LOG_TAG: &str = "filebridge";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` filter. Returns `false` if a subscriber was already installed.
#[cfg(not(target_os = "android"))]
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// Route logging to logcat under [`LOG_TAG`]. No tracing subscriber is
/// installed, so tracing events reach logcat as `log` records. Returns
/// `false` on every call after the first.
#[cfg(target_os = "android")]
pub fn init() -> bool {
    use std::sync::atomic::{AtomicBool, Ordering};

    use android_logger::Config;
    use log::LevelFilter;

    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Info)
            .with_tag(LOG_TAG),
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_init_is_a_no_op() {
        init();
        assert!(!init());
    }
}
