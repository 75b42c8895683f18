//! Integration tests for kiln-cli.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use zip::ZipArchive;

/// `kiln` with the config lookup pinned inside `home`.
fn kiln(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kiln").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}

fn entry_names(path: &Path) -> Vec<String> {
    let bytes = fs::read(path).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_help_flag() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("extract"));
}

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_list_names() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("application\n"))
        .stdout(predicate::str::contains("health-check\n"));
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    let out = kiln(temp.path())
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["application", "gitignore", "health-check", "readme"]);
}

#[test]
fn test_generate_archive() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args([
            "generate",
            "application",
            "-p",
            "application=shop",
            "--root",
            "shop",
            "--out",
            "shop.zip",
        ])
        .assert()
        .success();

    assert_eq!(
        entry_names(&temp.path().join("shop.zip")),
        vec![
            "shop/",
            "shop/.gitignore",
            "shop/README.md",
            "shop/docs/",
            "shop/docs/health.md",
        ]
    );
}

#[test]
fn test_generate_is_byte_deterministic() {
    let temp = TempDir::new().unwrap();
    for out in ["a.zip", "b.zip"] {
        kiln(temp.path())
            .args(["generate", "application", "-p", "application=shop", "--out", out])
            .assert()
            .success();
    }
    assert_eq!(
        fs::read(temp.path().join("a.zip")).unwrap(),
        fs::read(temp.path().join("b.zip")).unwrap()
    );
}

#[test]
fn test_generate_directory_and_force() {
    let temp = TempDir::new().unwrap();
    let args = [
        "generate",
        "application",
        "-p",
        "application=shop",
        "--dir",
        "shop",
    ];

    kiln(temp.path()).args(args).assert().success();
    let readme = fs::read_to_string(temp.path().join("shop/README.md")).unwrap();
    assert!(readme.contains("## Health"));

    kiln(temp.path())
        .args(args)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    kiln(temp.path()).args(args).arg("--force").assert().success();
}

#[test]
fn test_generate_from_seed_archive() {
    let temp = TempDir::new().unwrap();
    let seed = temp.path().join("seed");
    fs::create_dir_all(seed.join("src")).unwrap();
    fs::write(seed.join("src/index.js"), "// app\n").unwrap();

    kiln(temp.path())
        .args(["pack", "seed", "--out", "seed.zip", "--root", "upload"])
        .assert()
        .success();

    kiln(temp.path())
        .args([
            "generate",
            "readme",
            "--from",
            "seed.zip",
            "-p",
            "serviceName=shop",
            "--dir",
            "out",
        ])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join("out/src/index.js")).unwrap(),
        "// app\n"
    );
    assert!(temp.path().join("out/README.md").is_file());
}

#[test]
fn test_generate_with_props_file_and_json_output() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("props.toml"),
        "application = \"My Shop\"\nsubFolderName = \"api\"\n",
    )
    .unwrap();

    let out = kiln(temp.path())
        .args([
            "--output-format",
            "json",
            "generate",
            "application",
            "--props",
            "props.toml",
            "--out",
            "out.zip",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["generator"], "application");
    assert_eq!(report["kind"], "archive");
    assert_eq!(report["files"], 3);
}

#[test]
fn test_extract_round_trip() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["generate", "gitignore", "-p", "serviceName=shop", "--out", "g.zip"])
        .assert()
        .success();

    kiln(temp.path())
        .args(["extract", "g.zip", "unpacked"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted"));

    assert!(
        fs::read_to_string(temp.path().join("unpacked/.gitignore"))
            .unwrap()
            .starts_with("# shop\n")
    );
}

#[test]
fn test_quiet_flag() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["-q", "generate", "readme", "-p", "serviceName=shop", "--out", "r.zip"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_verbose_flag_logs_info() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["-v", "generate", "readme", "-p", "serviceName=shop", "--out", "r.zip"])
        .assert()
        .success()
        .stderr(predicate::str::contains("INFO"));
}

#[test]
fn test_catalog_from_config_file() {
    let temp = TempDir::new().unwrap();
    let catalog = temp.path().join("catalog/license");
    fs::create_dir_all(&catalog).unwrap();
    fs::write(
        catalog.join("generator.toml"),
        "[generator]\nname = \"license\"\ncategory = \"support\"\n\n\
         [[files]]\npath = \"LICENSE\"\ncontent = \"MIT\\n\"\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("kiln.toml"),
        format!(
            "[catalog]\npath = \"{}\"\n",
            temp.path().join("catalog").display()
        ),
    )
    .unwrap();

    kiln(temp.path())
        .args(["-c", "kiln.toml", "list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("license\n"));
}

#[test]
fn test_catalog_from_environment() {
    let temp = TempDir::new().unwrap();
    let catalog = temp.path().join("catalog/notes");
    fs::create_dir_all(&catalog).unwrap();
    fs::write(
        catalog.join("generator.toml"),
        "[generator]\nname = \"notes\"\ncategory = \"support\"\n",
    )
    .unwrap();

    kiln(temp.path())
        .env("KILN_CATALOG__PATH", temp.path().join("catalog"))
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("notes\n"));
}

#[test]
fn test_init_then_config_get() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["-c", "kiln.toml", "init"])
        .assert()
        .success();
    assert!(temp.path().join("kiln.toml").is_file());

    kiln(temp.path())
        .args(["-c", "kiln.toml", "config", "get", "output.format"])
        .assert()
        .success()
        .stdout("auto\n");

    kiln(temp.path())
        .args(["-c", "kiln.toml", "init"])
        .assert()
        .code(2);
}

#[test]
fn test_config_path_honours_flag() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["-c", "custom.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_shell_completions() {
    let temp = TempDir::new().unwrap();
    kiln(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kiln"));
}
