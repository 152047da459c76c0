// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use otaext::format::script::{Directive, UpdateScript};

#[test]
fn render_directives() {
    assert_eq!(
        Directive::Print("Patching dtbo image unconditionally...".to_owned()).to_string(),
        r#"ui_print("Patching dtbo image unconditionally...");"#,
    );
    assert_eq!(
        Directive::ExtractFile {
            package_path: "dtbo.img".to_owned(),
            device_path: "/dev/block/bootdevice/by-name/dtbo".to_owned(),
        }
        .to_string(),
        r#"package_extract_file("dtbo.img", "/dev/block/bootdevice/by-name/dtbo");"#,
    );
    assert_eq!(Directive::Raw("# raw".to_owned()).to_string(), "# raw");
}

#[test]
fn assertions_render_first() {
    let mut script = UpdateScript::new();
    assert!(script.is_empty());
    assert_eq!(script.render(), "");

    script.print("first");
    script.append_extra("second;");
    script.add_assertion(Directive::Raw("assert(true);".to_owned()));
    script.extract_file("a.img", "/dev/a");

    assert_eq!(script.assertions().len(), 1);
    assert_eq!(script.body().len(), 3);
    assert_eq!(
        script.render(),
        "assert(true);\n\
        ui_print(\"first\");\n\
        second;\n\
        package_extract_file(\"a.img\", \"/dev/a\");\n",
    );
}
