//! Generators that ship with Kiln.
//!
//! | Name | Category | Writes |
//! |------|----------|--------|
//! | `readme` | support | `README.md` with the `<!-- kiln:sections -->` anchor |
//! | `gitignore` | support | `.gitignore` |
//! | `health-check` | capability | `docs/health.md`, a "Health" README section |
//! | `application` | runtime | runs the three above with a derived `serviceName` |
//!
//! Every built-in accepts the optional `runtime` and `env` keys so that
//! `application` can forward them unchanged.

use std::sync::Arc;

use kiln_core::{
    application::{Generator, GeneratorRegistryBuilder, Invocation},
    domain::{
        DomainError, FileMode, GeneratorCategory, GeneratorDescriptor, GeneratorInvocationResult,
        Properties, PropertySchema, PropertyShape, ResourceTree, TransformAction,
        derive_service_name,
    },
    error::KilnResult,
};

use crate::generators::declarative::DeclarativeGenerator;

/// Anchor that capability generators splice README sections after.
pub const README_SECTIONS_ANCHOR: &str = "<!-- kiln:sections -->";

/// Keys forwarded from `application` to its children when present.
const PASS_THROUGH: [&str; 2] = ["runtime", "env"];

/// Children of `application`, in invocation order.
const APPLICATION_CHILDREN: [&str; 3] = ["readme", "gitignore", "health-check"];

fn service_schema() -> PropertySchema {
    PropertySchema::new()
        .required("serviceName", PropertyShape::String)
        .optional("runtime", PropertyShape::String)
        .optional("env", PropertyShape::Any)
}

/// All built-in generators.
pub fn builtin_generators() -> Result<Vec<Arc<dyn Generator>>, DomainError> {
    Ok(vec![
        Arc::new(ReadmeGenerator::new()?),
        Arc::new(gitignore()?),
        Arc::new(health_check()?),
        Arc::new(ApplicationGenerator::new()?),
    ])
}

/// Register every built-in on `builder`.
pub fn register_builtins(
    mut builder: GeneratorRegistryBuilder,
) -> Result<GeneratorRegistryBuilder, DomainError> {
    for generator in builtin_generators()? {
        builder = builder.register_shared(generator)?;
    }
    Ok(builder)
}

// ── readme ────────────────────────────────────────────────────────────────────

pub struct ReadmeGenerator {
    descriptor: GeneratorDescriptor,
}

impl ReadmeGenerator {
    pub fn new() -> Result<Self, DomainError> {
        let descriptor = GeneratorDescriptor::new(
            "readme",
            GeneratorCategory::Support,
            service_schema().optional("description", PropertyShape::String),
        )?
        .with_description("Project README with a section anchor for capabilities");
        Ok(Self { descriptor })
    }
}

impl Generator for ReadmeGenerator {
    fn descriptor(&self) -> &GeneratorDescriptor {
        &self.descriptor
    }

    fn generate(
        &self,
        _invocation: &mut Invocation<'_>,
        mut tree: ResourceTree,
        props: &Properties,
    ) -> KilnResult<GeneratorInvocationResult> {
        let name = props.require_str("serviceName")?;
        let mut readme = format!("# {name}\n\n");
        if let Some(description) = props.optional_str("description")? {
            readme.push_str(description);
            readme.push_str("\n\n");
        }
        if let Some(runtime) = props.optional_str("runtime")? {
            readme.push_str(&format!("Runtime: `{runtime}`\n\n"));
        }
        readme.push_str(README_SECTIONS_ANCHOR);
        readme.push('\n');

        tree.put_text("README.md", &readme)?;
        Ok(GeneratorInvocationResult::new(tree, props.clone()))
    }
}

// ── gitignore / health-check ─────────────────────────────────────────────────

fn gitignore() -> Result<DeclarativeGenerator, DomainError> {
    let descriptor =
        GeneratorDescriptor::new("gitignore", GeneratorCategory::Support, service_schema())?
            .with_description("Common ignore rules");
    Ok(DeclarativeGenerator::new(descriptor).with_file(
        ".gitignore",
        "# {{serviceName}}\n.env\n*.log\ntarget/\nnode_modules/\n",
        FileMode::FILE,
    ))
}

fn health_check() -> Result<DeclarativeGenerator, DomainError> {
    let descriptor = GeneratorDescriptor::new(
        "health-check",
        GeneratorCategory::Capability,
        service_schema(),
    )?
    .with_description("Health endpoint documentation")
    .with_transform(TransformAction::insert_after(
        "README.md",
        README_SECTIONS_ANCHOR,
        "\n\n## Health\n\nSee [docs/health.md](docs/health.md).\n",
    )?);
    Ok(DeclarativeGenerator::new(descriptor).with_file(
        "docs/health.md",
        "# {{serviceName}} health\n\n`GET /health` returns `200 OK` while the service is up.\n",
        FileMode::FILE,
    ))
}

// ── application ──────────────────────────────────────────────────────────────

/// Composite runtime generator.
pub struct ApplicationGenerator {
    descriptor: GeneratorDescriptor,
}

impl ApplicationGenerator {
    pub fn new() -> Result<Self, DomainError> {
        let schema = PropertySchema::new()
            .required("application", PropertyShape::String)
            .optional("subFolderName", PropertyShape::String)
            .optional("runtime", PropertyShape::String)
            .optional("env", PropertyShape::Any);
        let descriptor =
            GeneratorDescriptor::new("application", GeneratorCategory::Runtime, schema)?
                .with_description("README, ignore rules and health docs for one service");
        Ok(Self { descriptor })
    }
}

impl Generator for ApplicationGenerator {
    fn descriptor(&self) -> &GeneratorDescriptor {
        &self.descriptor
    }

    fn generate(
        &self,
        invocation: &mut Invocation<'_>,
        mut tree: ResourceTree,
        props: &Properties,
    ) -> KilnResult<GeneratorInvocationResult> {
        let service_name = derive_service_name(
            props.require_str("application")?,
            props.optional_str("subFolderName")?,
        );
        let mut derived = Properties::new().with("serviceName", service_name);
        derived.forward_from(props, &PASS_THROUGH);

        for child in APPLICATION_CHILDREN {
            tree = invocation.invoke(child, tree, &derived)?;
        }

        Ok(GeneratorInvocationResult::new(tree, derived))
    }
}
