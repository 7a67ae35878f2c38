// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub host for desktop/CI builds where the mobile host services are
// unavailable.
//
// Every service returns `PlatformUnavailable`; the real implementation
// lives in the `android` module.

use std::path::Path;

use filebridge_core::Notice;
use filebridge_core::error::{BridgeError, Result};
use filebridge_core::types::{
    CompletionNotification, DownloadId, DownloadRequest, PickerRequest, ViewRequest,
};

use crate::capabilities::{HostCapabilities, ReceiverScope};
use crate::events::CompletionSink;
use crate::traits::*;

/// No-op host returned on non-mobile platforms.
pub struct StubHost;

impl HostPlatform for StubHost {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::for_api_level(0)
    }
}

impl DownloadService for StubHost {
    fn enqueue(&self, _request: &DownloadRequest) -> Result<DownloadId> {
        tracing::warn!("DownloadService::enqueue called on stub host");
        Err(BridgeError::PlatformUnavailable)
    }

    fn query(&self, _id: DownloadId) -> Result<Option<CompletionNotification>> {
        Err(BridgeError::PlatformUnavailable)
    }
}

impl CookieStore for StubHost {
    fn cookie_for(&self, _url: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

impl ViewLauncher for StubHost {
    fn view(&self, _request: &ViewRequest) -> Result<()> {
        tracing::warn!("ViewLauncher::view called on stub host");
        Err(BridgeError::PlatformUnavailable)
    }
}

impl ContentGrants for StubHost {
    fn grant_for_file(&self, _path: &Path) -> Result<String> {
        Err(BridgeError::PlatformUnavailable)
    }
}

impl ContentPicker for StubHost {
    fn launch_picker(&self, _request: &PickerRequest) -> Result<()> {
        tracing::warn!("ContentPicker::launch_picker called on stub host");
        Err(BridgeError::PlatformUnavailable)
    }
}

impl Notifier for StubHost {
    fn notify(&self, notice: &Notice) {
        tracing::info!(text = %notice.text, "notice (stub host)");
    }
}

impl CompletionRegistry for StubHost {
    fn register_completion_listener(
        &self,
        _scope: ReceiverScope,
        _sink: CompletionSink,
    ) -> Result<()> {
        tracing::warn!("CompletionRegistry::register_completion_listener called on stub host");
        Err(BridgeError::PlatformUnavailable)
    }

    fn unregister_completion_listener(&self) -> Result<()> {
        Ok(())
    }
}
