// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

use crate::format::zip::{self, EntryReader};

pub const PATH_ANDROID_INFO: &str = "OTA/android-info.txt";

static MODEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"require\s+version-modem\s*=\s*(.+)").unwrap());
static UI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"require\s+version-nubiaUI\s*=\s*(.+)").unwrap());

#[derive(Debug, Error)]
pub enum Error {
    #[error("Metadata entry not found in archive: {0}")]
    MissingMetadataEntry(String),
    #[error("Metadata entry is not valid UTF-8: {0}")]
    InvalidUtf8(String, #[source] std::string::FromUtf8Error),
    #[error("Failed to read metadata entry")]
    Archive(#[from] zip::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Firmware versions that the device must already have installed for the
/// package to apply. Either field is `None` when the metadata does not
/// mention it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FirmwareRequirement {
    pub modem_version: Option<String>,
    pub ui_version: Option<String>,
}

impl FirmwareRequirement {
    pub fn is_empty(&self) -> bool {
        self.modem_version.is_none() && self.ui_version.is_none()
    }
}

/// Find the first match of `regex` anywhere in `text` and return its capture
/// with trailing whitespace removed.
fn find_token(regex: &Regex, text: &str) -> Option<String> {
    let captures = regex.captures(text)?;
    // Unicode White_Space only. The ASCII separators 0x1c-0x1f are kept.
    let token = captures.get(1)?.as_str().trim_end();

    trace!("Matched {:?} -> {token:?}", captures.get(0)?.as_str());

    Some(token.to_owned())
}

/// Extract the firmware requirement tokens from `android-info.txt`-style text.
/// The two searches are independent of each other.
pub fn parse_firmware_requirement(text: &str) -> FirmwareRequirement {
    FirmwareRequirement {
        modem_version: find_token(&MODEM_REGEX, text),
        ui_version: find_token(&UI_REGEX, text),
    }
}

/// Read the metadata entry at `path` and parse its firmware requirement. A
/// missing entry is an error since the release tools always include it.
pub fn extract_firmware_requirement(
    archive: &mut impl EntryReader,
    path: &str,
) -> Result<FirmwareRequirement> {
    if !archive.entry_exists(path) {
        return Err(Error::MissingMetadataEntry(path.to_owned()));
    }

    let data = archive.read_entry(path)?;
    let text = String::from_utf8(data).map_err(|e| Error::InvalidUtf8(path.to_owned(), e))?;
    let requirement = parse_firmware_requirement(&text);

    debug!("Firmware requirement from {path}: {requirement:?}");

    Ok(requirement)
}
