// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

/// A single updater-script statement. The rendered text is consumed verbatim
/// by recovery's edify interpreter, so the wording must not change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Message shown on the recovery UI. The text is not escaped.
    Print(String),
    /// Extract a file from the package to a device path.
    ExtractFile {
        package_path: String,
        device_path: String,
    },
    /// Abort unless the installed modem firmware is at least the given
    /// version.
    AssertModem {
        modem_version: String,
        ui_version: String,
    },
    /// Arbitrary statement appended as-is.
    Raw(String),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Print(message) => write!(f, "ui_print(\"{message}\");"),
            Self::ExtractFile {
                package_path,
                device_path,
            } => write!(f, "package_extract_file(\"{package_path}\", \"{device_path}\");"),
            Self::AssertModem {
                modem_version,
                ui_version,
            } => write!(
                f,
                "assert(nubia.verify_modem(\"{modem_version}\") == \"1\" || \
                abort(\"ERROR: This package requires firmware from nubiaUI {ui_version}  \
                or newer. Please upgrade firmware and retry!\"););",
            ),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

/// The statements contributed to an OTA's updater-script. Assertions run
/// before installation begins and are kept separate from the body. Both lists
/// are append-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateScript {
    assertions: Vec<Directive>,
    body: Vec<Directive>,
}

impl UpdateScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_assertion(&mut self, directive: Directive) {
        self.assertions.push(directive);
    }

    pub fn print(&mut self, message: impl Into<String>) {
        self.body.push(Directive::Print(message.into()));
    }

    pub fn extract_file(&mut self, package_path: impl Into<String>, device_path: impl Into<String>) {
        self.body.push(Directive::ExtractFile {
            package_path: package_path.into(),
            device_path: device_path.into(),
        });
    }

    pub fn append_extra(&mut self, text: impl Into<String>) {
        self.body.push(Directive::Raw(text.into()));
    }

    pub fn push(&mut self, directive: Directive) {
        self.body.push(directive);
    }

    pub fn assertions(&self) -> &[Directive] {
        &self.assertions
    }

    pub fn body(&self) -> &[Directive] {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty() && self.body.is_empty()
    }

    /// Render all statements, assertions first, one per line.
    pub fn render(&self) -> String {
        let mut result = String::new();

        for directive in self.assertions.iter().chain(&self.body) {
            result.push_str(&directive.to_string());
            result.push('\n');
        }

        result
    }
}
