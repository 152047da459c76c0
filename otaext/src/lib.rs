/*
 * SPDX-FileCopyrightText: 2023-2026 Andrew Gunnerson
 * SPDX-License-Identifier: GPL-3.0-only
 */

//! Device-specific OTA extension: patches whole partition images and the modem
//! firmware into an OTA and gates installation on the installed firmware
//! version.
//!
//! The CLI source files use concrete types wherever possible for simplicity,
//! while the "library"-style source files aim to be generic.

pub mod cli;
pub mod config;
pub mod extension;
pub mod format;
pub mod patch;
pub mod util;
