// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use otaext::{
    cli::ota::{InfoCli, PatchCli, patch_subcommand, write_info},
    extension::BuildMode,
};
use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

const ANDROID_INFO: &str = "require version-modem = 1234567890\nrequire version-nubiaUI = V1.0\n";

const ASSERTION: &str = r#"assert(nubia.verify_modem("1234567890") == "1" || abort("ERROR: This package requires firmware from nubiaUI V1.0  or newer. Please upgrade firmware and retry!"););"#;

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());

    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }

    writer.finish().unwrap();
}

fn dir_names(dir: &Path) -> Vec<String> {
    let mut names = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    names.sort();
    names
}

fn patch_cli(dir: &Path, mode: BuildMode, target: Option<PathBuf>) -> PatchCli {
    PatchCli {
        input: dir.join("input.zip"),
        target,
        mode,
        output: dir.join("out.zip"),
        script: Some(dir.join("script.edify")),
        profile: None,
    }
}

#[test]
fn incremental_requires_target() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(
        &dir.path().join("input.zip"),
        &[("OTA/android-info.txt", ANDROID_INFO)],
    );

    let cli = patch_cli(dir.path(), BuildMode::Incremental, None);
    let err = patch_subcommand(&cli).unwrap_err();

    assert!(err.to_string().contains("--target"), "{err:?}");
    assert!(!cli.output.exists());
    assert_eq!(dir_names(dir.path()), ["input.zip"]);
}

#[test]
fn failed_run_keeps_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(&dir.path().join("input.zip"), &[("IMAGES/dtbo.img", "dtbo contents")]);

    let cli = patch_cli(dir.path(), BuildMode::Full, None);
    fs::write(&cli.output, "old").unwrap();

    // No metadata entry.
    assert!(patch_subcommand(&cli).is_err());
    assert_eq!(fs::read_to_string(&cli.output).unwrap(), "old");
    assert_eq!(dir_names(dir.path()), ["input.zip", "out.zip"]);
}

#[test]
fn full_patch_writes_zip_and_script() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(
        &dir.path().join("input.zip"),
        &[
            ("OTA/android-info.txt", ANDROID_INFO),
            ("IMAGES/dtbo.img", "dtbo contents"),
        ],
    );

    let cli = patch_cli(dir.path(), BuildMode::Full, None);
    patch_subcommand(&cli).unwrap();

    // The temporary file was persisted under the output name.
    assert_eq!(dir_names(dir.path()), ["input.zip", "out.zip", "script.edify"]);

    let mut zip_reader = ZipArchive::new(File::open(&cli.output).unwrap()).unwrap();
    assert_eq!(zip_reader.len(), 1);

    let mut data = String::new();
    zip_reader
        .by_name("dtbo.img")
        .unwrap()
        .read_to_string(&mut data)
        .unwrap();
    assert_eq!(data, "dtbo contents");

    assert_eq!(
        fs::read_to_string(dir.path().join("script.edify")).unwrap(),
        format!(
            "{ASSERTION}\n\
            ui_print(\"Patching dtbo image unconditionally...\");\n\
            package_extract_file(\"dtbo.img\", \"/dev/block/bootdevice/by-name/dtbo\");\n",
        ),
    );
}

#[test]
fn incremental_patch_uses_target_metadata() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(
        &dir.path().join("input.zip"),
        &[("IMAGES/vbmeta.img", "vbmeta contents")],
    );
    let target = dir.path().join("target.zip");
    write_zip(&target, &[("OTA/android-info.txt", ANDROID_INFO)]);

    let cli = patch_cli(dir.path(), BuildMode::Incremental, Some(target));
    patch_subcommand(&cli).unwrap();

    let script = fs::read_to_string(dir.path().join("script.edify")).unwrap();
    let lines = script.lines().collect::<Vec<_>>();

    assert_eq!(
        lines,
        [
            ASSERTION,
            r#"ui_print("Patching vbmeta image unconditionally...");"#,
            r#"package_extract_file("vbmeta.img", "/dev/block/bootdevice/by-name/vbmeta");"#,
        ],
    );
}

#[test]
fn info_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.zip");
    write_zip(
        &input,
        &[
            ("OTA/android-info.txt", ANDROID_INFO),
            ("IMAGES/dtbo.img", "dtbo contents"),
            ("INSTALL/firmware-update/NON-HLOS.bin", "modem contents"),
        ],
    );

    let cli = InfoCli {
        input,
        profile: None,
    };
    let mut output = vec![];
    write_info(&cli, &mut output).unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        format!(
            "Metadata: OTA/android-info.txt\n\
            Modem version: \"1234567890\"\n\
            UI version: \"V1.0\"\n\
            Assertion: {ASSERTION}\n\
            Firmware: install/firmware-update/NON-HLOS.bin -> /dev/block/bootdevice/by-name/modem\n\
            Images:\n\
            - dtbo.img -> /dev/block/bootdevice/by-name/dtbo: <13 bytes>, \
            sha256=56ae87e6054bfbda15b85ab1111c407d71fc179d5ebef3e4360110f2024e0b47\n\
            - vbmeta.img: (not present)\n",
        ),
    );
}
