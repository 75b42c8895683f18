//! Integration tests for kiln-core.

use std::sync::Arc;

use kiln_core::domain::{derive_service_name, paths::join};
use kiln_core::prelude::*;

struct Base(GeneratorDescriptor);

impl Generator for Base {
    fn descriptor(&self) -> &GeneratorDescriptor {
        &self.0
    }

    fn generate(
        &self,
        _invocation: &mut Invocation<'_>,
        mut tree: ResourceTree,
        props: &Properties,
    ) -> KilnResult<GeneratorInvocationResult> {
        let name = props.require_str("serviceName")?;
        tree.put_text(
            "src/Main.java",
            &format!("// imports\nclass {name} {{\n    // members\n}}\n"),
        )?;
        Ok(GeneratorInvocationResult::new(tree, props.clone()))
    }
}

struct Overlay(GeneratorDescriptor);

impl Generator for Overlay {
    fn descriptor(&self) -> &GeneratorDescriptor {
        &self.0
    }

    fn generate(
        &self,
        invocation: &mut Invocation<'_>,
        tree: ResourceTree,
        props: &Properties,
    ) -> KilnResult<GeneratorInvocationResult> {
        let service_name = derive_service_name(
            props.require_str("application")?,
            props.optional_str("subFolderName")?,
        );
        let derived = Properties::new().with("serviceName", service_name);
        let tree = invocation.invoke("base", tree, &derived)?;
        Ok(GeneratorInvocationResult::new(tree, derived))
    }
}

fn registry() -> Arc<GeneratorRegistry> {
    let base = GeneratorDescriptor::new(
        "base",
        GeneratorCategory::Runtime,
        PropertySchema::new().required("serviceName", PropertyShape::String),
    )
    .unwrap();

    let overlay = GeneratorDescriptor::new(
        "overlay",
        GeneratorCategory::Capability,
        PropertySchema::new()
            .required("application", PropertyShape::String)
            .optional("subFolderName", PropertyShape::String),
    )
    .unwrap()
    .with_transforms([
        TransformAction::insert_after("src/*.java", "// imports", "\nimport health.Check;").unwrap(),
        TransformAction::insert_before("src/*.java", "    // members", "    Check check;\n")
            .unwrap(),
    ]);

    GeneratorRegistry::builder()
        .register(Base(base))
        .unwrap()
        .register(Overlay(overlay))
        .unwrap()
        .build()
}

#[test]
fn overlay_splices_into_base_output() {
    let service = GeneratorService::new(registry());
    let props = Properties::new().with("application", "shop");

    let tree = service
        .apply("overlay", ResourceTree::new(), &props, &Properties::new())
        .unwrap();

    assert_eq!(
        tree.text("src/Main.java").unwrap(),
        "// imports\nimport health.Check;\nclass shop {\n    Check check;\n    // members\n}\n"
    );
}

#[test]
fn seed_tree_is_preserved() {
    let service = GeneratorService::new(registry());
    let mut seed = ResourceTree::new();
    seed.put_text("existing/notes.txt", "keep me").unwrap();
    let props = Properties::new().with("application", "shop");

    let tree = service
        .apply("overlay", seed, &props, &Properties::new())
        .unwrap();

    assert_eq!(tree.text("existing/notes.txt").unwrap(), "keep me");
    assert!(tree.contains("src/Main.java"));
}

#[test]
fn unknown_property_stops_before_any_generator_runs() {
    let service = GeneratorService::new(registry());
    let props = Properties::new()
        .with("application", "shop")
        .with("typo", "x");

    let err = service
        .apply("overlay", ResourceTree::new(), &props, &Properties::new())
        .unwrap_err();

    assert_eq!(
        err,
        KilnError::Domain(DomainError::UnknownProperty { key: "typo".into() })
    );
}

#[test]
fn path_join_matches_url_expectations() {
    assert_eq!(join(["https://host/", "/path"]), "https://host/path");
    assert_eq!(join(["/a/", "/b"]), "/a/b");
}
