/*
 * SPDX-FileCopyrightText: 2023-2026 Andrew Gunnerson
 * SPDX-License-Identifier: GPL-3.0-only
 */

use std::{fmt, path::Path};

use num_traits::PrimInt;

/// A small wrapper to format a number as a size in bytes.
#[derive(Clone, Copy)]
pub struct NumBytes<T: PrimInt>(pub T);

impl<T: PrimInt + fmt::Debug> fmt::Debug for NumBytes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == T::one() {
            write!(f, "<{:?} byte>", self.0)
        } else {
            write!(f, "<{:?} bytes>", self.0)
        }
    }
}

/// Get the last `/`-separated component of a device path. Unlike
/// [`Path::file_name`], this never fails and a trailing slash yields an empty
/// string.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Get the non-empty parent of a path. If the path has no parent in the string,
/// then `.` is returned. This does not perform any filesystem operations.
pub fn parent_path(path: &Path) -> &Path {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            return parent;
        }
    }

    Path::new(".")
}

/// Compute the lowercase hex SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = ring::digest::digest(&ring::digest::SHA256, data);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment_of_device_path() {
        assert_eq!(last_segment("/dev/block/bootdevice/by-name/dtbo"), "dtbo");
        assert_eq!(last_segment("vbmeta"), "vbmeta");
        assert_eq!(last_segment("/dev/block/"), "");
    }

    #[test]
    fn parent_of_bare_file_name() {
        assert_eq!(parent_path(Path::new("out.zip")), Path::new("."));
        assert_eq!(parent_path(Path::new("dir/out.zip")), Path::new("dir"));
    }

    #[test]
    fn num_bytes_plural() {
        assert_eq!(format!("{:?}", NumBytes(1u32)), "<1 byte>");
        assert_eq!(format!("{:?}", NumBytes(4096usize)), "<4096 bytes>");
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        );
    }
}
