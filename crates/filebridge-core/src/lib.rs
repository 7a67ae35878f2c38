// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filebridge core: types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod mime;
pub mod notice;
pub mod types;

pub use config::{BridgeConfig, TrackingMode};
pub use error::BridgeError;
pub use notice::{Notice, NoticeDuration};
pub use types::*;
