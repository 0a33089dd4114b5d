//! Stub file assembly.

use crate::error::CodegenError;
use crate::python::{ClassGenerator, FunctionGenerator, find_struct_members};
use starstub_schema::{DEFAULT_GEN_TAG, Package, TypeId, select_targets};

/// Tool name printed in the generated-file banner by default.
pub const DEFAULT_TOOL_NAME: &str = "github.com/tilt-dev/tilt-starlark-docs-codegen";

/// Settings for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Comment tag that marks a type for generation.
    pub tag: String,
    /// Tool name printed in the banner.
    pub tool_name: String,
}

impl GeneratorConfig {
    /// Creates a configuration with the default tag and banner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: DEFAULT_GEN_TAG.to_string(),
            tool_name: DEFAULT_TOOL_NAME.to_string(),
        }
    }

    /// Sets the generation tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Sets the tool name printed in the banner.
    #[must_use]
    pub fn tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Stub generator for one package.
pub struct Generator<'a> {
    package: &'a Package,
    targets: Vec<TypeId>,
    config: GeneratorConfig,
}

impl<'a> Generator<'a> {
    /// Creates a generator for explicitly chosen targets.
    ///
    /// Targets are emitted in the order given.
    #[must_use]
    pub fn new(package: &'a Package, targets: Vec<TypeId>, config: GeneratorConfig) -> Self {
        Self {
            package,
            targets,
            config,
        }
    }

    /// Creates a generator for the types tagged with `config.tag`.
    ///
    /// # Errors
    /// Returns `CodegenError::Tag` if a type carries a malformed tag.
    pub fn from_package(package: &'a Package, config: GeneratorConfig) -> Result<Self, CodegenError> {
        let targets = select_targets(package, &config.tag)?;
        tracing::info!(
            "{} generation targets tagged +{} in package {}",
            targets.len(),
            config.tag,
            package.name
        );
        Ok(Self::new(package, targets, config))
    }

    /// Generates the complete stub file.
    ///
    /// Member classes come first so every later annotation refers to a name
    /// that is already declared, then the target functions, then the member
    /// constructor functions.
    ///
    /// # Errors
    /// Returns `CodegenError` if any target or member type cannot be rendered.
    /// Nothing is returned on failure.
    pub fn generate(&self) -> Result<String, CodegenError> {
        let universe = &self.package.universe;
        let members = find_struct_members(universe, &self.targets)?;

        let classes = ClassGenerator::new(universe);
        let functions = FunctionGenerator::new(universe);

        let mut output = self.generate_preamble();

        for &id in &members {
            output.push_str(&classes.generate(id));
        }

        for &id in &self.targets {
            tracing::debug!("generating {}", universe.get(id).name.name);
            output.push_str(&functions.generate_top_level(id)?);
        }

        for &id in &members {
            output.push_str(&functions.generate_member(id)?);
        }

        Ok(output)
    }

    /// Generates the file header.
    fn generate_preamble(&self) -> String {
        let mut output = String::new();
        output.push_str("from typing import Dict, List, Optional\n");
        output.push('\n');
        output.push_str(&format!("# AUTOGENERATED by {}\n", self.config.tool_name));
        output.push_str("# DO NOT EDIT MANUALLY\n");
        output
    }
}
