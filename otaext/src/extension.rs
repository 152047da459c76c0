// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Hooks invoked by the release tools while generating an OTA. Each hook is
//! independent: it receives the archives and script it operates on and keeps
//! no state between calls.

use clap::ValueEnum;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::DeviceProfile,
    format::{
        metadata,
        script::UpdateScript,
        zip::{self, EntryReader, EntryWriter},
    },
    patch::{
        assertion,
        firmware::{self, FirmwareAction},
        image,
    },
    util::NumBytes,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to load firmware requirement")]
    Metadata(#[from] metadata::Error),
    #[error("Failed to stage image: {0}")]
    StageImage(String, #[source] zip::Error),
    #[error("Failed to read images from input")]
    ReadImages(#[source] zip::Error),
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum BuildMode {
    /// Full OTA. Firmware requirements come from the input archive.
    #[default]
    Full,
    /// Incremental OTA. Firmware requirements come from the target archive.
    Incremental,
}

/// An image written to the output archive by the install-end phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedImage {
    pub name: String,
    pub destination: String,
    pub size: usize,
}

/// What the install-end phase added to the package.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub firmware: Option<FirmwareAction>,
    pub images: Vec<StagedImage>,
}

impl InstallReport {
    pub fn is_empty(&self) -> bool {
        self.firmware.is_none() && self.images.is_empty()
    }
}

pub struct DeviceExtension {
    profile: DeviceProfile,
}

impl DeviceExtension {
    pub fn new(profile: DeviceProfile) -> Self {
        Self { profile }
    }

    /// Assertions phase of a full OTA. Returns whether an assertion was added.
    pub fn full_ota_assertions(
        &self,
        input: &mut impl EntryReader,
        script: &mut UpdateScript,
    ) -> Result<bool> {
        info!("Adding full OTA assertions");

        self.add_modem_assertion(input, script)
    }

    /// Assertions phase of an incremental OTA. The requirement is read from
    /// the target build, not the source.
    pub fn incremental_ota_assertions(
        &self,
        target: &mut impl EntryReader,
        script: &mut UpdateScript,
    ) -> Result<bool> {
        info!("Adding incremental OTA assertions");

        self.add_modem_assertion(target, script)
    }

    /// Install-end phase of a full OTA.
    pub fn full_ota_install_end(
        &self,
        input: &mut impl EntryReader,
        output: &mut impl EntryWriter,
        script: &mut UpdateScript,
    ) -> Result<InstallReport> {
        info!("Adding full OTA install-end steps");

        self.install_end(input, output, script)
    }

    /// Install-end phase of an incremental OTA. This is identical to the full
    /// OTA phase since the images are always flashed in full.
    pub fn incremental_ota_install_end(
        &self,
        input: &mut impl EntryReader,
        output: &mut impl EntryWriter,
        script: &mut UpdateScript,
    ) -> Result<InstallReport> {
        info!("Adding incremental OTA install-end steps");

        self.install_end(input, output, script)
    }

    fn add_modem_assertion(
        &self,
        archive: &mut impl EntryReader,
        script: &mut UpdateScript,
    ) -> Result<bool> {
        let requirement =
            metadata::extract_firmware_requirement(archive, &self.profile.metadata)?;

        let Some(directive) = assertion::build_assertion(&requirement) else {
            return Ok(false);
        };

        debug!("Adding assertion: {directive}");
        script.add_assertion(directive);

        Ok(true)
    }

    fn install_end(
        &self,
        input: &mut impl EntryReader,
        output: &mut impl EntryWriter,
        script: &mut UpdateScript,
    ) -> Result<InstallReport> {
        let mut report = InstallReport {
            firmware: self.update_firmware(&*input, script),
            images: vec![],
        };

        let actions =
            image::plan_patches(input, &self.profile.images).map_err(Error::ReadImages)?;

        for action in actions {
            output
                .write_entry(&action.source, &action.data)
                .map_err(|e| Error::StageImage(action.source.clone(), e))?;

            script.print(format!(
                "Patching {} image unconditionally...",
                action.partition_name(),
            ));
            script.extract_file(&action.source, &action.destination);

            info!(
                "Patching {} ({:?}) to {}",
                action.source,
                NumBytes(action.data.len()),
                action.destination,
            );

            report.images.push(StagedImage {
                name: action.source,
                destination: action.destination,
                size: action.data.len(),
            });
        }

        Ok(report)
    }

    fn update_firmware(
        &self,
        input: &impl EntryReader,
        script: &mut UpdateScript,
    ) -> Option<FirmwareAction> {
        let action = firmware::plan_firmware_patch(input, &self.profile.firmware)?;

        info!(
            "Patching {} firmware to {}",
            action.package_path, action.destination,
        );

        for directive in action.directives() {
            script.push(directive);
        }

        Some(action)
    }
}
