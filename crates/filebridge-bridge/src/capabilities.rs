// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host capability flags, resolved once from the host API level.

/// First API level that requires broadcast receivers to declare whether
/// other applications may reach them.
pub const RECEIVER_SCOPING_API_LEVEL: u32 = 33;

/// First API level that forbids handing raw `file://` paths to other apps.
pub const CONTENT_GRANT_API_LEVEL: u32 = 24;

/// How the download-completion listener is registered with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverScope {
    /// The host has no export scoping; register without flags.
    Implicit,
    /// Register as reachable by this application only.
    NotExported,
}

impl ReceiverScope {
    /// Registration flag value, if one must be passed.
    pub fn host_flag(&self) -> Option<i32> {
        match self {
            Self::Implicit => None,
            Self::NotExported => Some(0x4),
        }
    }
}

/// What the running host requires of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    pub api_level: u32,
    pub receiver_scope: ReceiverScope,
    /// Local files must be exposed to viewers through a content grant.
    pub content_grants: bool,
}

impl HostCapabilities {
    pub fn for_api_level(api_level: u32) -> Self {
        let receiver_scope = if api_level >= RECEIVER_SCOPING_API_LEVEL {
            ReceiverScope::NotExported
        } else {
            ReceiverScope::Implicit
        };
        Self {
            api_level,
            receiver_scope,
            content_grants: api_level >= CONTENT_GRANT_API_LEVEL,
        }
    }
}
