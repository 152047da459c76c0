// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    format::zip::{self, EntryReader},
    util::{self, NumBytes},
};

/// Directory inside the target-files style input that holds partition images.
pub const IMAGES_DIR: &str = "IMAGES/";

/// A partition image that is flashed in full whenever the input contains it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePatchSpec {
    /// File name under [`IMAGES_DIR`]. This is also the name of the entry
    /// written to the output archive.
    pub source: String,
    /// Block device the image is written to.
    pub destination: String,
}

impl ImagePatchSpec {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn source_path(&self) -> String {
        format!("{IMAGES_DIR}{}", self.source)
    }
}

/// The images patched unconditionally when no profile overrides them.
pub fn default_image_patches() -> Vec<ImagePatchSpec> {
    vec![
        ImagePatchSpec::new("dtbo.img", "/dev/block/bootdevice/by-name/dtbo"),
        ImagePatchSpec::new("vbmeta.img", "/dev/block/bootdevice/by-name/vbmeta"),
    ]
}

/// An image that was found in the input and needs to be installed.
#[derive(Clone, PartialEq, Eq)]
pub struct PatchAction {
    pub source: String,
    pub destination: String,
    pub data: Vec<u8>,
}

impl PatchAction {
    /// Name of the partition, taken from the last component of the device
    /// path.
    pub fn partition_name(&self) -> &str {
        util::last_segment(&self.destination)
    }
}

impl std::fmt::Debug for PatchAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchAction")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("data", &NumBytes(self.data.len()))
            .finish()
    }
}

/// Determine which of `specs` are present in `archive`, in order. Images that
/// are absent are skipped.
pub fn plan_patches(
    archive: &mut impl EntryReader,
    specs: &[ImagePatchSpec],
) -> Result<Vec<PatchAction>, zip::Error> {
    let mut actions = vec![];

    for spec in specs {
        let path = spec.source_path();

        if !archive.entry_exists(&path) {
            debug!("Image not present in input: {path}");
            continue;
        }

        let data = archive.read_entry(&path)?;

        debug!("Staging {path} ({:?}) for {}", NumBytes(data.len()), spec.destination);

        actions.push(PatchAction {
            source: spec.source.clone(),
            destination: spec.destination.clone(),
            data,
        });
    }

    Ok(actions)
}
