//! End-to-end tests over the real filesystem and zip codec.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use tempfile::TempDir;
use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

use kiln_adapters::{LocalFilesystem, ZipCodec, build_registry};
use kiln_core::application::{ArchiveCodec, GeneratorService, ProjectService};
use kiln_core::domain::{FileMode, Properties, ResourceTree};

fn project_service(catalog: Option<&Path>) -> ProjectService {
    let registry = build_registry(catalog).unwrap();
    ProjectService::new(
        GeneratorService::new(registry),
        Box::new(ZipCodec::new()),
        Box::new(LocalFilesystem::new()),
    )
}

fn application_props() -> Properties {
    Properties::new()
        .with("application", "shop")
        .with("runtime", "node")
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn application_archive_is_deterministic() {
    let service = project_service(None);

    let a = service
        .generate_archive(
            "application",
            "shop",
            ResourceTree::new(),
            &application_props(),
            &Properties::new(),
        )
        .unwrap();
    let b = service
        .generate_archive(
            "application",
            "shop",
            ResourceTree::new(),
            &application_props(),
            &Properties::new(),
        )
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(
        entry_names(&a),
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
fn imported_archive_seeds_a_run() {
    let temp = TempDir::new().unwrap();
    let service = project_service(None);

    let mut seed = ResourceTree::new();
    seed.put_text("src/main.js", "console.log('hi')\n").unwrap();
    seed.put("bin/start", "#!/bin/sh\n", FileMode::EXECUTABLE)
        .unwrap();
    let upload = ZipCodec::new().zip("upload", &seed).unwrap();

    let imported = service.import_archive(&upload, temp.path()).unwrap();
    assert_eq!(imported, seed);

    let tree = service
        .generate("application", imported, &application_props(), &Properties::new())
        .unwrap();

    assert_eq!(tree.text("src/main.js").unwrap(), "console.log('hi')\n");
    assert_eq!(tree.get("bin/start").unwrap().mode(), FileMode::EXECUTABLE);
    assert!(tree.contains("README.md"));
    // scratch directory is gone
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn unsafe_upload_is_rejected_and_scratch_cleaned() {
    let temp = TempDir::new().unwrap();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("../evil.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"evil").unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let err = project_service(None)
        .import_archive(&bytes, temp.path())
        .unwrap_err();

    assert_eq!(err.category(), kiln_core::error::ErrorCategory::Security);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn materialize_then_pack_round_trips() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("shop");
    let service = project_service(None);

    let tree = service
        .generate(
            "application",
            ResourceTree::new(),
            &application_props(),
            &Properties::new(),
        )
        .unwrap();
    service.materialize(&tree, &out, false).unwrap();

    assert!(out.join("docs/health.md").is_file());
    assert!(service.materialize(&tree, &out, false).is_err());
    service.materialize(&tree, &out, true).unwrap();

    let packed = service.pack_directory(&out, "shop").unwrap();
    let direct = ZipCodec::new().zip("shop", &tree).unwrap();
    assert_eq!(entry_names(&packed), entry_names(&direct));
}

#[test]
fn catalog_generators_extend_builtins() {
    let catalog = TempDir::new().unwrap();
    let dir = catalog.path().join("license");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("generator.toml"),
        r#"
[generator]
name = "license"
category = "support"
description = "MIT license file"

[properties]
required = ["serviceName"]
optional = ["runtime", "env"]

[[files]]
path = "LICENSE"
content = "MIT License - {{serviceName}}\n"

[[transforms]]
kind = "insert-after"
target = "README.md"
anchor = "<!-- kiln:sections -->"
snippet = "\n\n## License\n\nMIT\n"
"#,
    )
    .unwrap();

    let service = project_service(Some(catalog.path()));
    let names: Vec<String> = service
        .list_generators()
        .into_iter()
        .map(|info| info.name)
        .collect();
    assert!(names.contains(&"license".to_string()));
    assert!(names.contains(&"application".to_string()));

    let props = Properties::new().with("serviceName", "shop");
    let tree = service
        .generate("readme", ResourceTree::new(), &props, &Properties::new())
        .unwrap();
    let tree = service
        .generate("license", tree, &props, &Properties::new())
        .unwrap();

    assert_eq!(tree.text("LICENSE").unwrap(), "MIT License - shop\n");
    assert!(tree.text("README.md").unwrap().ends_with("## License\n\nMIT\n\n"));
}

#[test]
fn missing_catalog_falls_back_to_builtins() {
    let registry = build_registry(Some(Path::new("/definitely/not/here"))).unwrap();
    assert_eq!(registry.len(), 4);
}
