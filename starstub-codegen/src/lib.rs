//! # Starstub Codegen
//!
//! Starlark/Python stub generation from annotated Go types.
//!
//! This crate provides:
//! - Discovery of the struct types reachable from generation targets
//! - Class stubs and constructor function stubs with docstrings
//! - Python identifier naming rules
//! - Output to `__init__.py` in a directory or to standard output

pub mod error;
pub mod generator;
pub mod naming;
pub mod output;
pub mod python;

pub use error::CodegenError;
pub use generator::{DEFAULT_TOOL_NAME, Generator, GeneratorConfig};
pub use output::{Destination, OUTPUT_FILE_NAME, STDOUT_SENTINEL, write_output};

use starstub_schema::Package;
use std::path::Path;

/// Generates the stub file for an already loaded package.
///
/// # Arguments
/// * `package` - Loaded Go package
/// * `config` - Generation settings
///
/// # Returns
/// The complete stub file as a string.
///
/// # Errors
/// Returns `CodegenError` if a tag is malformed or a type cannot be rendered.
pub fn generate_from_package(
    package: &Package,
    config: &GeneratorConfig,
) -> Result<String, CodegenError> {
    let generator = Generator::from_package(package, config.clone())?;
    generator.generate()
}

/// Generates the stub file for the Go package in a directory.
///
/// # Arguments
/// * `dir` - Directory holding the package's `.go` files
/// * `config` - Generation settings
///
/// # Returns
/// The complete stub file as a string.
///
/// # Errors
/// Returns `CodegenError` if loading, tag parsing, or generation fails.
pub fn generate_from_dir(dir: &Path, config: &GeneratorConfig) -> Result<String, CodegenError> {
    let package = starstub_schema::load_package(dir)?;
    generate_from_package(&package, config)
}

/// Loads a package, generates its stubs and writes them to the destination.
///
/// The destination is opened only after generation succeeds, so a failed
/// run leaves any previous output untouched.
///
/// # Errors
/// Returns `CodegenError` if any step fails.
pub fn run(
    input: &Path,
    destination: &Destination,
    config: &GeneratorConfig,
) -> Result<(), CodegenError> {
    let content = generate_from_dir(input, config)?;
    write_output(destination, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TYPES: &str = r#"package v1alpha1

// Button is a UI button.
// +tilt:starlark-gen=true
type UIButton struct {
	Spec UIButtonSpec `json:"spec,omitempty"`
}

type UIButtonSpec struct {
	// The button text.
	Text string `json:"text"`
	// Whether the button is disabled.
	Disabled bool `json:"disabled,omitempty"`
}
"#;

    fn package_dir(source: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("types.go"), source).expect("write source");
        dir
    }

    #[test]
    fn test_generate_from_dir() {
        let input = package_dir(TYPES);
        let output = generate_from_dir(input.path(), &GeneratorConfig::default()).expect("generate");

        assert!(output.starts_with("from typing import Dict, List, Optional\n"));
        assert!(output.contains("\n\ndef ui_button(\n"));
        assert!(output.contains("  text: str = \"\",\n"));
        assert!(output.contains("  disabled: bool = False,\n"));
        assert!(!output.contains("+tilt"));
    }

    #[test]
    fn test_run_writes_init_file() {
        let input = package_dir(TYPES);
        let out = tempfile::tempdir().expect("tempdir");
        let destination = Destination::Directory(out.path().to_path_buf());

        run(input.path(), &destination, &GeneratorConfig::default()).expect("run");

        let written = fs::read_to_string(out.path().join(OUTPUT_FILE_NAME)).expect("read");
        let expected =
            generate_from_dir(input.path(), &GeneratorConfig::default()).expect("generate");
        assert_eq!(written, expected);
    }

    #[test]
    fn test_run_failure_leaves_no_output() {
        let input = package_dir(
            "package p\n\n// +tilt:starlark-gen=true\ntype A struct {\n\tSpec ASpec\n}\n\ntype ASpec struct {\n\tRatio float64\n}\n",
        );
        let out = tempfile::tempdir().expect("tempdir");
        let destination = Destination::Directory(out.path().to_path_buf());

        let err = run(input.path(), &destination, &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedShape { .. }));
        assert!(!out.path().join(OUTPUT_FILE_NAME).exists());
    }

    #[test]
    fn test_run_failure_keeps_previous_output() {
        let input = package_dir("package p\n\n// +tilt:starlark-gen=true\ntype A struct{}\n");
        let out = tempfile::tempdir().expect("tempdir");
        let path = out.path().join(OUTPUT_FILE_NAME);
        fs::write(&path, "previous\n").expect("seed");
        let destination = Destination::Directory(out.path().to_path_buf());

        let err = run(input.path(), &destination, &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, CodegenError::MissingSpec { .. }));
        assert_eq!(fs::read_to_string(&path).expect("read"), "previous\n");
    }

    #[test]
    fn test_missing_input_dir() {
        let out = tempfile::tempdir().expect("tempdir");
        let err = generate_from_dir(&out.path().join("nope"), &GeneratorConfig::default())
            .unwrap_err();
        assert!(matches!(err, CodegenError::Parse(_)));
    }

    #[test]
    fn test_imported_struct_becomes_member_class() {
        let module = tempfile::tempdir().expect("tempdir");
        fs::write(module.path().join("go.mod"), "module example.com/app\n").expect("write go.mod");
        let meta = module.path().join("vendor/k8s.io/apimachinery/pkg/apis/meta/v1");
        let api = module.path().join("api");
        fs::create_dir_all(&meta).expect("mkdir");
        fs::create_dir_all(&api).expect("mkdir");
        fs::write(
            meta.join("types.go"),
            r#"package v1

// A label selector is a label query over a set of resources.
type LabelSelector struct {
	// Labels to match.
	MatchLabels map[string]string
}
"#,
        )
        .expect("write meta");
        fs::write(
            api.join("types.go"),
            r#"package api

import metav1 "k8s.io/apimachinery/pkg/apis/meta/v1"

// KubernetesDiscovery watches pods.
// +tilt:starlark-gen=true
type KubernetesDiscovery struct {
	Spec KubernetesDiscoverySpec
}

type KubernetesDiscoverySpec struct {
	// Pods to watch.
	Selector metav1.LabelSelector
	// Optional extra selector.
	Extra *metav1.LabelSelector
}
"#,
        )
        .expect("write api");

        let output = generate_from_dir(&api, &GeneratorConfig::default()).expect("generate");
        assert!(output.contains(
            "\n\nclass LabelSelector:\n  \"\"\"\n  A label selector is a label query over a set of resources.\n"
        ));
        assert!(output.contains("  selector: LabelSelector = None,\n"));
        assert!(output.contains("  extra: Optional[LabelSelector] = None,\n"));
        assert!(output.contains("\n\ndef label_selector(\n  match_labels: Dict[str, str] = None,\n) -> LabelSelector:\n"));
        assert_eq!(output.matches("class LabelSelector:").count(), 1);
    }

    #[test]
    fn test_custom_tag() {
        let input = package_dir(
            "package p\n\n// +docs:gen=true\ntype A struct {\n\tSpec ASpec\n}\n\ntype ASpec struct {\n\tName string\n}\n",
        );
        let default_output =
            generate_from_dir(input.path(), &GeneratorConfig::default()).expect("generate");
        assert!(!default_output.contains("def a("));

        let config = GeneratorConfig::new().tag("docs:gen");
        let output = generate_from_dir(input.path(), &config).expect("generate");
        assert!(output.contains("\n\ndef a(\n"));
    }
}
