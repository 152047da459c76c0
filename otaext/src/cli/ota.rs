/*
 * SPDX-FileCopyrightText: 2022-2026 Andrew Gunnerson
 * SPDX-License-Identifier: GPL-3.0-only
 */

use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::{
    config::{self, DeviceProfile},
    extension::{BuildMode, DeviceExtension},
    format::{
        metadata,
        script::UpdateScript,
        zip::{OutputArchive, SourceArchive},
    },
    patch::{assertion, firmware, image},
    util::{self, NumBytes},
};

fn open_archive(path: &Path) -> Result<SourceArchive<BufReader<File>>> {
    let reader =
        File::open(path).with_context(|| format!("Failed to open for reading: {path:?}"))?;
    let archive = SourceArchive::new(BufReader::new(reader))
        .with_context(|| format!("Failed to read zip: {path:?}"))?;

    Ok(archive)
}

fn load_profile(path: Option<&Path>) -> Result<DeviceProfile> {
    match path {
        Some(p) => {
            config::load_profile(p).with_context(|| format!("Failed to load profile: {p:?}"))
        }
        None => Ok(DeviceProfile::default()),
    }
}

/// Move a finished temporary file into place. [`NamedTempFile`] forces 600
/// permissions, so reapply the umask-derived mode first.
fn persist_output(temp_writer: NamedTempFile, output: &Path) -> Result<()> {
    let temp_path = temp_writer.path().to_owned();

    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::prelude::PermissionsExt};

        use rustix::{fs::Mode, process::umask};

        let mask = umask(Mode::empty());
        umask(mask);

        // Mac uses a 16-bit value.
        #[allow(clippy::useless_conversion)]
        let mode = u32::from(0o666 & !mask.bits());

        temp_writer
            .as_file()
            .set_permissions(Permissions::from_mode(mode))
            .with_context(|| format!("Failed to set permissions to {mode:o}: {temp_path:?}"))?;
    }

    temp_writer.persist(output).with_context(|| {
        format!("Failed to move temporary file to output path: {temp_path:?} -> {output:?}")
    })?;

    Ok(())
}

pub fn patch_subcommand(cli: &PatchCli) -> Result<()> {
    let start = Instant::now();

    let profile = load_profile(cli.profile.as_deref())?;
    let compression = profile.compression;
    let extension = DeviceExtension::new(profile);

    let mut input = open_archive(&cli.input)?;
    let mut script = UpdateScript::new();

    if cli.mode == BuildMode::Full && cli.target.is_some() {
        warn!("Ignoring --target for full OTA");
    }

    let asserted = match cli.mode {
        BuildMode::Full => extension.full_ota_assertions(&mut input, &mut script),
        BuildMode::Incremental => {
            let target_path = cli
                .target
                .as_deref()
                .ok_or_else(|| anyhow!("Incremental mode requires --target"))?;
            let mut target = open_archive(target_path)?;

            extension.incremental_ota_assertions(&mut target, &mut script)
        }
    }
    .context("Failed to add OTA assertions")?;

    if !asserted {
        warn!("No firmware version assertion added");
    }

    let temp_writer = NamedTempFile::with_prefix_in(
        cli.output
            .file_name()
            .unwrap_or_else(|| OsStr::new("otaext.tmp")),
        util::parent_path(&cli.output),
    )
    .context("Failed to open temporary output file")?;
    let mut output = OutputArchive::new(BufWriter::new(temp_writer), compression);

    let report = match cli.mode {
        BuildMode::Full => extension.full_ota_install_end(&mut input, &mut output, &mut script),
        BuildMode::Incremental => {
            extension.incremental_ota_install_end(&mut input, &mut output, &mut script)
        }
    }
    .context("Failed to add OTA install-end steps")?;

    if report.is_empty() {
        warn!("Input contains nothing to patch unconditionally");
    }

    let buffered_writer = output.finish().context("Failed to finalize output zip")?;
    let mut temp_writer = buffered_writer
        .into_inner()
        .context("Failed to flush output zip")?;
    temp_writer.flush().context("Failed to flush output zip")?;

    persist_output(temp_writer, &cli.output)?;

    let rendered = script.render();

    match &cli.script {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write script: {path:?}"))?;
        }
        None => print!("{rendered}"),
    }

    info!("Completed after {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}

/// Write the human-readable summary shown by `ota info`.
pub fn write_info(cli: &InfoCli, mut writer: impl Write) -> Result<()> {
    let profile = load_profile(cli.profile.as_deref())?;
    let mut input = open_archive(&cli.input)?;

    let requirement = metadata::extract_firmware_requirement(&mut input, &profile.metadata)
        .with_context(|| format!("Failed to read firmware requirement: {:?}", cli.input))?;

    let show = |token: &Option<String>| match token {
        Some(t) => format!("{t:?}"),
        None => "(not set)".to_owned(),
    };

    writeln!(writer, "Metadata: {}", profile.metadata)?;
    writeln!(writer, "Modem version: {}", show(&requirement.modem_version))?;
    writeln!(writer, "UI version: {}", show(&requirement.ui_version))?;

    match assertion::build_assertion(&requirement) {
        Some(directive) => writeln!(writer, "Assertion: {directive}")?,
        None => writeln!(writer, "Assertion: (none)")?,
    }

    match firmware::plan_firmware_patch(&input, &profile.firmware) {
        Some(action) => writeln!(
            writer,
            "Firmware: {} -> {}",
            action.package_path, action.destination,
        )?,
        None => writeln!(writer, "Firmware: (not present)")?,
    }

    let actions = image::plan_patches(&mut input, &profile.images)
        .with_context(|| format!("Failed to read images: {:?}", cli.input))?;

    writeln!(writer, "Images:")?;

    for spec in &profile.images {
        match actions.iter().find(|a| a.source == spec.source) {
            Some(action) => writeln!(
                writer,
                "- {} -> {}: {:?}, sha256={}",
                action.source,
                action.destination,
                NumBytes(action.data.len()),
                util::sha256_hex(&action.data),
            )?,
            None => writeln!(writer, "- {}: (not present)", spec.source)?,
        }
    }

    Ok(())
}

pub fn info_subcommand(cli: &InfoCli) -> Result<()> {
    write_info(cli, io::stdout().lock())
}

pub fn ota_main(cli: &OtaCli) -> Result<()> {
    match &cli.command {
        OtaCommand::Patch(c) => patch_subcommand(c),
        OtaCommand::Info(c) => info_subcommand(c),
    }
}

/// Add firmware assertions and unconditional image patches to an OTA.
#[derive(Debug, Parser)]
pub struct PatchCli {
    /// Path to input target files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    /// Path to target build zip for incremental OTAs.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub target: Option<PathBuf>,

    /// Kind of OTA being built.
    #[arg(long, value_enum, default_value_t)]
    pub mode: BuildMode,

    /// Path to zip receiving the patched images.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub output: PathBuf,

    /// Path to write updater-script statements to.
    ///
    /// If unset, the statements are written to stdout.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub script: Option<PathBuf>,

    /// Device profile TOML.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub profile: Option<PathBuf>,
}

/// Show the firmware requirement and patchable images of an input zip.
#[derive(Debug, Parser)]
pub struct InfoCli {
    /// Path to input target files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    /// Device profile TOML.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub profile: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum OtaCommand {
    Patch(PatchCli),
    Info(InfoCli),
}

/// Patch or inspect OTA inputs.
#[derive(Debug, Parser)]
pub struct OtaCli {
    #[command(subcommand)]
    command: OtaCommand,
}
