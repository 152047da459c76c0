// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use tracing::debug;

use crate::format::{metadata::FirmwareRequirement, script::Directive};

/// A token is usable if it names a concrete version. `*` means any version
/// is acceptable.
fn is_concrete(token: &str) -> bool {
    !token.is_empty() && !token.contains('*')
}

/// Build the modem version assertion for `requirement`. Nothing is emitted
/// unless both tokens are present and concrete.
pub fn build_assertion(requirement: &FirmwareRequirement) -> Option<Directive> {
    let (Some(modem_version), Some(ui_version)) =
        (&requirement.modem_version, &requirement.ui_version)
    else {
        debug!("Incomplete firmware requirement, skipping assertion: {requirement:?}");
        return None;
    };

    if !is_concrete(modem_version) || !is_concrete(ui_version) {
        debug!("Wildcard or empty firmware requirement, skipping assertion: {requirement:?}");
        return None;
    }

    Some(Directive::AssertModem {
        modem_version: modem_version.clone(),
        ui_version: ui_version.clone(),
    })
}
