// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the host services Filebridge
// delegates to. Each backend (Android, desktop stub, test fakes) implements
// every trait; the session only ever talks to `HostPlatform`.

use std::path::Path;

use filebridge_core::Notice;
use filebridge_core::error::Result;
use filebridge_core::types::{
    CompletionNotification, DownloadId, DownloadRequest, PickerRequest, ViewRequest,
};

use crate::capabilities::{HostCapabilities, ReceiverScope};
use crate::events::CompletionSink;

/// Unified host that groups every service the bridge needs.
pub trait HostPlatform:
    DownloadService
    + CookieStore
    + ViewLauncher
    + ContentGrants
    + ContentPicker
    + Notifier
    + CompletionRegistry
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "Android 14").
    fn platform_name(&self) -> &str;

    /// Capabilities of the running host, resolved once at startup.
    fn capabilities(&self) -> HostCapabilities;
}

/// The host's managed download queue.
pub trait DownloadService {
    /// Hand a request to the host queue. The transfer happens out of band.
    fn enqueue(&self, request: &DownloadRequest) -> Result<DownloadId>;

    /// Read back the host record for a download. `None` if the host no
    /// longer knows the id.
    fn query(&self, id: DownloadId) -> Result<Option<CompletionNotification>>;
}

/// The ambient cookie store shared with the application's web layer.
pub trait CookieStore {
    /// Cookie header value for `url`, if any.
    fn cookie_for(&self, url: &str) -> Result<Option<String>>;
}

/// The host's generic "view resource" action.
pub trait ViewLauncher {
    /// Ask the host to open `request.uri` in a suitable viewer.
    fn view(&self, request: &ViewRequest) -> Result<()>;
}

/// Scoped, revocable references to local files.
pub trait ContentGrants {
    /// Content URI exposing `path` under this application's identity.
    fn grant_for_file(&self, path: &Path) -> Result<String>;
}

/// The host's generic "pick content" action.
pub trait ContentPicker {
    /// Launch the picker. The chosen item is delivered through a separate
    /// host callback.
    fn launch_picker(&self, request: &PickerRequest) -> Result<()>;
}

/// Transient user-visible acknowledgements.
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// Registration of the download-completion listener.
pub trait CompletionRegistry {
    /// Start forwarding completion signals into `sink`.
    fn register_completion_listener(&self, scope: ReceiverScope, sink: CompletionSink)
    -> Result<()>;

    /// Stop forwarding completion signals.
    fn unregister_completion_listener(&self) -> Result<()>;
}
