// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{self, DeviceProfile};

fn dump_subcommand(_cli: &DumpCli) -> Result<()> {
    let data = DeviceProfile::default()
        .to_toml()
        .context("Failed to serialize default profile")?;

    print!("{data}");

    Ok(())
}

fn check_subcommand(cli: &CheckCli) -> Result<()> {
    let profile = config::load_profile(&cli.profile)
        .with_context(|| format!("Failed to load profile: {:?}", cli.profile))?;

    info!(
        "Profile is valid: {} image(s), firmware {}",
        profile.images.len(),
        if profile.firmware.enabled { "enabled" } else { "disabled" },
    );

    Ok(())
}

pub fn profile_main(cli: &ProfileCli) -> Result<()> {
    match &cli.command {
        ProfileCommand::Dump(c) => dump_subcommand(c),
        ProfileCommand::Check(c) => check_subcommand(c),
    }
}

/// Print the built-in device profile.
#[derive(Debug, Parser)]
struct DumpCli {}

/// Validate a device profile.
#[derive(Debug, Parser)]
struct CheckCli {
    /// Path to profile TOML.
    #[arg(short, long, value_name = "FILE", value_parser)]
    profile: PathBuf,
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    Dump(DumpCli),
    Check(CheckCli),
}

/// Inspect or validate device profiles.
#[derive(Debug, Parser)]
pub struct ProfileCli {
    #[command(subcommand)]
    command: ProfileCommand,
}
