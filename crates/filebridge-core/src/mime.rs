// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MIME tables: filename extension inference, destination classification
// and viewer hints by suffix.

use crate::types::DestinationDir;

/// Hint passed to the view action when no suffix matches.
pub const WILDCARD_MIME: &str = "*/*";

/// Ordered, first-match table from a MIME fragment to the extension
/// appended to an extension-less filename.
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("pdf", ".pdf"),
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("text", ".txt"),
];

/// Suffix table used to pick a viewer hint for a resource path.
const VIEWER_TABLE: &[(&str, &str)] = &[
    (".pdf", "application/pdf"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".doc", "application/msword"),
    (
        ".docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".xls", "application/vnd.ms-excel"),
    (
        ".xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
];

/// Extension for a declared MIME type, if the table knows one.
///
/// Matching is by containment, so `application/pdf` and `application/x-pdf`
/// both yield `.pdf`.
pub fn infer_extension(mime_type: &str) -> Option<&'static str> {
    EXTENSION_TABLE
        .iter()
        .find(|(fragment, _)| mime_type.contains(fragment))
        .map(|(_, ext)| *ext)
}

/// Destination filename for a download.
///
/// An absent filename becomes `default_label` as-is. A filename without
/// any `.` gets an extension inferred from `mime_type`. A filename that
/// already has a `.` is never touched.
pub fn resolve_filename(
    filename: Option<&str>,
    mime_type: Option<&str>,
    default_label: &str,
) -> String {
    let Some(name) = filename else {
        return default_label.to_string();
    };

    if name.contains('.') {
        return name.to_string();
    }

    match mime_type.and_then(infer_extension) {
        Some(ext) => format!("{name}{ext}"),
        None => name.to_string(),
    }
}

/// Public storage area for a download: pictures for anything image-like,
/// downloads otherwise.
pub fn destination_for(mime_type: Option<&str>) -> DestinationDir {
    match mime_type {
        Some(mime) if mime.contains("image") => DestinationDir::Pictures,
        _ => DestinationDir::Downloads,
    }
}

/// Viewer hint for a resource path, by suffix. Falls back to
/// [`WILDCARD_MIME`].
pub fn viewer_hint(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();
    VIEWER_TABLE
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
        .map(|(_, mime)| *mime)
        .unwrap_or(WILDCARD_MIME)
}
