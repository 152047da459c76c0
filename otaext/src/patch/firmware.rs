// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    format::{script::Directive, zip::EntryReader},
    util,
};

/// The modem firmware blob. Unlike partition images, the blob is already
/// packaged by the release tools under a lowercased path, so only the install
/// directives are emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FirmwarePatchSpec {
    /// Whether the blob is checked for at all.
    pub enabled: bool,
    /// Entry checked for in the input archive.
    pub source: String,
    /// Path of the blob inside the OTA package.
    pub package_path: String,
    /// Block device the blob is written to.
    pub destination: String,
}

impl Default for FirmwarePatchSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            source: "INSTALL/firmware-update/NON-HLOS.bin".to_owned(),
            package_path: "install/firmware-update/NON-HLOS.bin".to_owned(),
            destination: "/dev/block/bootdevice/by-name/modem".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirmwareAction {
    pub package_path: String,
    pub destination: String,
}

impl FirmwareAction {
    pub fn partition_name(&self) -> &str {
        util::last_segment(&self.destination)
    }

    /// The print and extract statements that install the blob.
    pub fn directives(&self) -> [Directive; 2] {
        [
            Directive::Print(format!(
                "Patching {} image unconditionally...",
                self.partition_name(),
            )),
            Directive::ExtractFile {
                package_path: self.package_path.clone(),
                device_path: self.destination.clone(),
            },
        ]
    }
}

/// Check whether the firmware blob is present in `archive`.
pub fn plan_firmware_patch(
    archive: &impl EntryReader,
    spec: &FirmwarePatchSpec,
) -> Option<FirmwareAction> {
    if !spec.enabled {
        return None;
    } else if !archive.entry_exists(&spec.source) {
        debug!("Firmware blob not present in input: {}", spec.source);
        return None;
    }

    Some(FirmwareAction {
        package_path: spec.package_path.clone(),
        destination: spec.destination.clone(),
    })
}
