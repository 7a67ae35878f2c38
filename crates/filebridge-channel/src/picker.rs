// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Picker launcher: presents the system content chooser.

use tracing::info;

use filebridge_bridge::traits::HostPlatform;
use filebridge_core::BridgeConfig;
use filebridge_core::error::Result;
use filebridge_core::types::PickerRequest;

/// Picker request for the configured content filter, limited to openable
/// items.
pub fn picker_request(config: &BridgeConfig) -> PickerRequest {
    PickerRequest {
        mime_type: config.chooser_mime_type.clone(),
        openable_only: true,
    }
}

/// Launch the content chooser. The selection result is not delivered back.
pub fn show_file_chooser<H>(host: &H, config: &BridgeConfig) -> Result<()>
where
    H: HostPlatform + ?Sized,
{
    let request = picker_request(config);
    host.launch_picker(&request)?;
    info!(mime_type = %request.mime_type, "file chooser launched");
    Ok(())
}
