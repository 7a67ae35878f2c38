// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording fake host used by the unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use filebridge_bridge::capabilities::{HostCapabilities, ReceiverScope};
use filebridge_bridge::events::CompletionSink;
use filebridge_bridge::traits::*;
use filebridge_core::Notice;
use filebridge_core::error::{BridgeError, Result};
use filebridge_core::types::{
    CompletionNotification, DownloadId, DownloadRequest, PickerRequest, ViewRequest,
};

/// In-memory host that records every call and can be told to fail.
pub(crate) struct FakeHost {
    capabilities: HostCapabilities,
    next_id: AtomicI64,
    pub cookies: Mutex<HashMap<String, String>>,
    pub cookie_lookups: Mutex<Vec<String>>,
    pub enqueued: Mutex<Vec<DownloadRequest>>,
    pub records: Mutex<HashMap<DownloadId, CompletionNotification>>,
    pub views: Mutex<Vec<ViewRequest>>,
    pub grants: Mutex<Vec<PathBuf>>,
    pub pickers: Mutex<Vec<PickerRequest>>,
    pub notices: Mutex<Vec<Notice>>,
    pub sink: Mutex<Option<CompletionSink>>,
    pub registered_scope: Mutex<Option<ReceiverScope>>,
    pub unregistered: AtomicUsize,
    pub fail_enqueue: Mutex<Option<String>>,
    pub fail_view: Mutex<Option<String>>,
    pub fail_picker: Mutex<Option<String>>,
}

impl FakeHost {
    pub fn new(api_level: u32) -> Self {
        Self {
            capabilities: HostCapabilities::for_api_level(api_level),
            next_id: AtomicI64::new(100),
            cookies: Mutex::default(),
            cookie_lookups: Mutex::default(),
            enqueued: Mutex::default(),
            records: Mutex::default(),
            views: Mutex::default(),
            grants: Mutex::default(),
            pickers: Mutex::default(),
            notices: Mutex::default(),
            sink: Mutex::default(),
            registered_scope: Mutex::default(),
            unregistered: AtomicUsize::new(0),
            fail_enqueue: Mutex::default(),
            fail_view: Mutex::default(),
            fail_picker: Mutex::default(),
        }
    }

    pub fn with_cookie(self, url: &str, cookie: &str) -> Self {
        self.cookies
            .lock()
            .unwrap()
            .insert(url.to_string(), cookie.to_string());
        self
    }

    /// Store the host record for a finished download.
    pub fn finish(&self, notification: CompletionNotification) {
        self.records
            .lock()
            .unwrap()
            .insert(notification.id, notification);
    }

    /// Store the record and fire the completion broadcast.
    pub fn broadcast(&self, notification: CompletionNotification) -> bool {
        let id = notification.id;
        self.finish(notification);
        let sink = self.sink.lock().unwrap().clone();
        sink.is_some_and(|s| s.signal(id))
    }

    pub fn last_request(&self) -> DownloadRequest {
        self.enqueued.lock().unwrap().last().cloned().expect("no request enqueued")
    }

    pub fn notice_texts(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.text.clone())
            .collect()
    }

    pub fn view_count(&self) -> usize {
        self.views.lock().unwrap().len()
    }
}

impl HostPlatform for FakeHost {
    fn platform_name(&self) -> &str {
        "Fake"
    }

    fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }
}

impl DownloadService for FakeHost {
    fn enqueue(&self, request: &DownloadRequest) -> Result<DownloadId> {
        if let Some(reason) = self.fail_enqueue.lock().unwrap().clone() {
            return Err(BridgeError::Bridge(reason));
        }
        self.enqueued.lock().unwrap().push(request.clone());
        Ok(DownloadId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn query(&self, id: DownloadId) -> Result<Option<CompletionNotification>> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }
}

impl CookieStore for FakeHost {
    fn cookie_for(&self, url: &str) -> Result<Option<String>> {
        self.cookie_lookups.lock().unwrap().push(url.to_string());
        Ok(self.cookies.lock().unwrap().get(url).cloned())
    }
}

impl ViewLauncher for FakeHost {
    fn view(&self, request: &ViewRequest) -> Result<()> {
        if let Some(reason) = self.fail_view.lock().unwrap().clone() {
            return Err(BridgeError::Bridge(reason));
        }
        self.views.lock().unwrap().push(request.clone());
        Ok(())
    }
}

impl ContentGrants for FakeHost {
    fn grant_for_file(&self, path: &Path) -> Result<String> {
        self.grants.lock().unwrap().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("content://com.example.app.fileprovider/files/{name}"))
    }
}

impl ContentPicker for FakeHost {
    fn launch_picker(&self, request: &PickerRequest) -> Result<()> {
        if let Some(reason) = self.fail_picker.lock().unwrap().clone() {
            return Err(BridgeError::Bridge(reason));
        }
        self.pickers.lock().unwrap().push(request.clone());
        Ok(())
    }
}

impl Notifier for FakeHost {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

impl CompletionRegistry for FakeHost {
    fn register_completion_listener(
        &self,
        scope: ReceiverScope,
        sink: CompletionSink,
    ) -> Result<()> {
        *self.registered_scope.lock().unwrap() = Some(scope);
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn unregister_completion_listener(&self) -> Result<()> {
        self.sink.lock().unwrap().take();
        self.unregistered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
