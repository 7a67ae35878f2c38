// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inbound method-call routing.
//
// The application layer sends `{ method, args }` pairs with JSON arguments
// and receives a `MethodReply` serialised as `{"ok": "..."}` or
// `{"error": {"code": "...", "message": "..."}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use filebridge_bridge::traits::HostPlatform;
use filebridge_core::error::{BridgeError, Result};
use filebridge_core::types::DownloadRequestSpec;

use crate::session::BridgeSession;

pub const DOWNLOAD_FILE: &str = "downloadFile";
pub const OPEN_FILE: &str = "openFile";
pub const SHOW_FILE_CHOOSER: &str = "showFileChooser";

/// One inbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenFileArgs {
    url: String,
}

/// Result handed back to the application layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodReply {
    Ok(String),
    Error { code: String, message: String },
}

impl MethodReply {
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(message) => Self::Ok(message),
            Err(e) => Self::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"error":{{"code":"BRIDGE_ERROR","message":"{e}"}}}}"#)
        })
    }
}

/// Route `call` to the matching session operation.
pub fn dispatch<H>(session: &BridgeSession<H>, call: &MethodCall) -> Result<String>
where
    H: HostPlatform + ?Sized + 'static,
{
    debug!(method = %call.method, "dispatching method call");
    match call.method.as_str() {
        DOWNLOAD_FILE => {
            let spec: DownloadRequestSpec = serde_json::from_value(call.args.clone())
                .map_err(|e| BridgeError::from(e).into_download_failure())?;
            let id = session.download_file(&spec)?;
            Ok(format!("Download started with ID: {id}"))
        }
        OPEN_FILE => {
            let args: OpenFileArgs = serde_json::from_value(call.args.clone())
                .map_err(|e| session.reject_open(e.into()))?;
            session.open_file(&args.url)?;
            Ok("File opened".to_string())
        }
        SHOW_FILE_CHOOSER => {
            session.show_file_chooser()?;
            Ok("File chooser opened".to_string())
        }
        other => {
            warn!(method = other, "unknown method");
            Err(BridgeError::NotImplemented(other.to_string()))
        }
    }
}

/// Decode a raw call, dispatch it and encode the reply.
pub fn invoke<H>(session: &BridgeSession<H>, method: &str, args_json: &str) -> MethodReply
where
    H: HostPlatform + ?Sized + 'static,
{
    let args = if args_json.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(args_json)
    };

    let result = match args {
        Ok(args) => dispatch(session, &MethodCall::new(method, args)),
        Err(e) => Err(fold_for_method(session, method, e.into())),
    };
    MethodReply::from_result(result)
}

/// Tag an argument-decoding failure with the error of the called method.
fn fold_for_method<H>(session: &BridgeSession<H>, method: &str, err: BridgeError) -> BridgeError
where
    H: HostPlatform + ?Sized + 'static,
{
    match method {
        DOWNLOAD_FILE => err.into_download_failure(),
        OPEN_FILE => session.reject_open(err),
        SHOW_FILE_CHOOSER => err.into_chooser_failure(),
        other => BridgeError::NotImplemented(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use filebridge_core::BridgeConfig;

    use super::*;
    use crate::testing::FakeHost;

    fn session() -> (Arc<FakeHost>, BridgeSession<FakeHost>) {
        let host = Arc::new(FakeHost::new(34));
        let session = BridgeSession::new(Arc::clone(&host), BridgeConfig::default());
        (host, session)
    }

    #[test]
    fn download_file_reports_id() {
        let (host, session) = session();
        let call = MethodCall::new(
            DOWNLOAD_FILE,
            json!({
                "url": "https://example.com/a",
                "filename": "a",
                "mimeType": "application/pdf",
            }),
        );

        assert_eq!(dispatch(&session, &call).unwrap(), "Download started with ID: 100");
        assert_eq!(host.last_request().filename, "a.pdf");
    }

    #[test]
    fn download_without_url_is_download_failure() {
        let (_host, session) = session();
        let call = MethodCall::new(DOWNLOAD_FILE, json!({ "filename": "a" }));
        assert_eq!(dispatch(&session, &call).unwrap_err().code(), "DOWNLOAD_FAILED");
    }

    #[test]
    fn open_file_and_chooser_report_success() {
        let (host, session) = session();

        let open = MethodCall::new(OPEN_FILE, json!({ "url": "https://example.com/a.png" }));
        assert_eq!(dispatch(&session, &open).unwrap(), "File opened");
        assert_eq!(host.view_count(), 1);

        let chooser = MethodCall::new(SHOW_FILE_CHOOSER, Value::Null);
        assert_eq!(dispatch(&session, &chooser).unwrap(), "File chooser opened");
        assert_eq!(host.pickers.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let (host, session) = session();
        let err = dispatch(&session, &MethodCall::new("shareFile", Value::Null)).unwrap_err();

        assert!(matches!(err, BridgeError::NotImplemented(ref m) if m == "shareFile"));
        assert!(host.enqueued.lock().unwrap().is_empty());
        assert_eq!(host.view_count(), 0);
    }

    #[test]
    fn method_call_args_default_to_null() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"showFileChooser"}"#).unwrap();
        assert_eq!(call.args, Value::Null);
    }

    #[test]
    fn replies_serialise_as_tagged_json() {
        let ok = MethodReply::Ok("File opened".into());
        assert_eq!(ok.to_json(), r#"{"ok":"File opened"}"#);

        let err = MethodReply::from_result(Err(BridgeError::ChooserFailed("boom".into())));
        assert_eq!(
            err.to_json(),
            r#"{"error":{"code":"CHOOSER_FAILED","message":"boom"}}"#
        );
    }

    #[test]
    fn invoke_decodes_raw_arguments() {
        let (_host, session) = session();

        let reply = invoke(&session, OPEN_FILE, r#"{"url":"/tmp/does-not-exist.pdf"}"#);
        assert_eq!(reply, MethodReply::Ok("File opened".into()));

        assert!(invoke(&session, SHOW_FILE_CHOOSER, "").is_ok());

        let reply = invoke(&session, DOWNLOAD_FILE, "{not json");
        assert!(matches!(reply, MethodReply::Error { ref code, .. } if code == "DOWNLOAD_FAILED"));

        let reply = invoke(&session, "shareFile", "{not json");
        assert!(matches!(reply, MethodReply::Error { ref code, .. } if code == "NOT_IMPLEMENTED"));
    }

    #[test]
    fn undecodable_open_arguments_are_shown_to_the_user() {
        let (host, session) = session();

        let err = dispatch(&session, &MethodCall::new(OPEN_FILE, json!({ "path": "/a" })))
            .unwrap_err();
        assert_eq!(err.code(), "OPEN_FAILED");

        let reply = invoke(&session, OPEN_FILE, "{not json");
        assert!(matches!(reply, MethodReply::Error { ref code, .. } if code == "OPEN_FAILED"));

        let notices = host.notice_texts();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.starts_with("Unable to open the file")));
        assert_eq!(host.view_count(), 0);
    }
}
