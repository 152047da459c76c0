// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    format::{metadata, zip::EntryCompression},
    patch::{
        firmware::FirmwarePatchSpec,
        image::{self, ImagePatchSpec},
    },
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Metadata entry path is empty")]
    EmptyMetadataPath,
    #[error("Image source name is empty")]
    EmptyImageSource,
    #[error("Image source must be a bare file name: {0:?}")]
    NestedImageSource(String),
    #[error("Image {0:?} is listed more than once")]
    DuplicateImage(String),
    #[error("Firmware entry paths must not be empty")]
    EmptyFirmwarePath,
    #[error("Device path must be absolute and name a file: {0:?}")]
    InvalidDevicePath(String),
    #[error("Failed to read profile: {0:?}")]
    Read(String, #[source] std::io::Error),
    #[error("Failed to parse profile: {0:?}")]
    Parse(String, #[source] toml_edit::de::Error),
    #[error("Failed to serialize profile")]
    Serialize(#[from] toml_edit::ser::Error),
}

type Result<T> = std::result::Result<T, Error>;

fn default_metadata() -> String {
    metadata::PATH_ANDROID_INFO.to_owned()
}

/// Describes what a device's OTA extension patches. Every field has a default,
/// so an empty profile produces the stock behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceProfile {
    /// Text entry containing the `require version-*` lines.
    #[serde(default = "default_metadata")]
    pub metadata: String,
    /// Compression for images added to the output archive.
    #[serde(default)]
    pub compression: EntryCompression,
    /// Partition images, patched in list order.
    #[serde(default = "image::default_image_patches", rename = "image")]
    pub images: Vec<ImagePatchSpec>,
    /// Modem firmware blob.
    #[serde(default)]
    pub firmware: FirmwarePatchSpec,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            metadata: default_metadata(),
            compression: EntryCompression::default(),
            images: image::default_image_patches(),
            firmware: FirmwarePatchSpec::default(),
        }
    }
}

impl DeviceProfile {
    pub fn from_toml(data: &str, name: &str) -> Result<Self> {
        let profile: Self =
            toml_edit::de::from_str(data).map_err(|e| Error::Parse(name.to_owned(), e))?;
        profile.validate()?;

        Ok(profile)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml_edit::ser::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.metadata.is_empty() {
            return Err(Error::EmptyMetadataPath);
        }

        // Image sources double as output entry names, so they must be unique.
        let mut seen = HashSet::new();

        for spec in &self.images {
            if spec.source.is_empty() {
                return Err(Error::EmptyImageSource);
            } else if spec.source.contains('/') {
                return Err(Error::NestedImageSource(spec.source.clone()));
            } else if !seen.insert(spec.source.as_str()) {
                return Err(Error::DuplicateImage(spec.source.clone()));
            }

            check_device_path(&spec.destination)?;
        }

        let firmware = &self.firmware;
        if firmware.enabled {
            if firmware.source.is_empty() || firmware.package_path.is_empty() {
                return Err(Error::EmptyFirmwarePath);
            }

            check_device_path(&firmware.destination)?;
        }

        Ok(())
    }
}

fn check_device_path(path: &str) -> Result<()> {
    if !path.starts_with('/') || path.ends_with('/') {
        return Err(Error::InvalidDevicePath(path.to_owned()));
    }

    Ok(())
}

/// Load and validate a profile from a TOML file.
pub fn load_profile(path: &Path) -> Result<DeviceProfile> {
    let name = path.to_string_lossy();
    let data = fs::read_to_string(path).map_err(|e| Error::Read(name.to_string(), e))?;

    DeviceProfile::from_toml(&data, &name)
}
