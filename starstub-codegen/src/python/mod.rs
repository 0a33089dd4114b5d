//! Python stub generation modules.
//!
//! The stubs are valid Python (and Starlark) that carry only signatures and
//! docstrings.

pub mod classes;
pub mod functions;
pub mod members;
pub mod params;

pub use classes::ClassGenerator;
pub use functions::FunctionGenerator;
pub use members::find_struct_members;
pub use params::{Param, Shape, classify};

use crate::error::CodegenError;
use starstub_schema::{Kind, Type, TypeId, Universe, filter_comment_tags};

/// Name of the field that holds a target's user-settable configuration.
pub const SPEC_FIELD: &str = "Spec";

/// Placeholder for fields without documentation.
pub const MISSING_DOC: &str = "Documentation missing";

/// Returns the struct type behind a target's `Spec` field.
///
/// # Errors
/// Returns `CodegenError::MissingSpec` if the target has no `Spec` field and
/// `CodegenError::UnsupportedShape` if the field is not a struct.
pub fn spec_type(universe: &Universe, target: TypeId) -> Result<&Type, CodegenError> {
    let ty = universe.get(target);
    let member = ty
        .member(SPEC_FIELD)
        .ok_or_else(|| CodegenError::missing_spec(&ty.name.name))?;

    let mut spec = universe.get(member.type_id);
    if spec.kind == Kind::Pointer {
        if let Some(elem) = spec.elem {
            spec = universe.get(elem);
        }
    }
    if spec.kind != Kind::Struct {
        return Err(CodegenError::unsupported(
            &ty.name.name,
            SPEC_FIELD,
            spec.name.to_string(),
        ));
    }
    Ok(spec)
}

/// Renders comment lines as docstring text.
///
/// Tag lines and the empty lines around the text are dropped. Continuation
/// lines are prefixed with `indent`; empty lines stay empty. Backslashes and
/// `"""` are escaped so the text is a valid docstring body.
pub(crate) fn doc_text(lines: &[String], indent: &str) -> String {
    let mut lines = filter_comment_tags(lines);
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());

    let mut out = String::new();
    for (i, line) in lines[start..].iter().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(&escape_docstring(line));
    }
    out
}

fn escape_docstring(line: &str) -> String {
    line.replace('\\', r"\\").replace(r#"""""#, r#"\"\"\""#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use starstub_schema::{SourceFile, parse_package};

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_doc_text_filters_tags() {
        let doc = doc_text(
            &lines(&["Cmd runs a process.", "", "+genclient", "+tilt:starlark-gen=true"]),
            "  ",
        );
        assert_eq!(doc, "Cmd runs a process.");
    }

    #[test]
    fn test_doc_text_indents_continuations() {
        let doc = doc_text(&lines(&["First.", "", "Second."]), "      ");
        assert_eq!(doc, "First.\n\n      Second.");
    }

    #[test]
    fn test_doc_text_escapes_triple_quotes() {
        let doc = doc_text(&lines(&[r#"Use """ carefully."#]), "  ");
        assert_eq!(doc, r#"Use \"\"\" carefully."#);
    }

    #[test]
    fn test_doc_text_escapes_backslashes() {
        let doc = doc_text(&lines(&[r"Windows path such as C:\xdir\Users."]), "  ");
        assert_eq!(doc, r"Windows path such as C:\\xdir\\Users.");

        let doc = doc_text(&lines(&[r#"Ends with \""""#]), "  ");
        assert_eq!(doc, r#"Ends with \\\"\"\""#);
    }

    #[test]
    fn test_doc_text_drops_leading_blank_after_tags() {
        let doc = doc_text(&lines(&["+k8s:openapi-gen=true", "", "Doc."]), "  ");
        assert_eq!(doc, "Doc.");
    }

    #[test]
    fn test_doc_text_empty() {
        assert_eq!(doc_text(&lines(&["+only-a-tag"]), "  "), "");
    }

    #[test]
    fn test_spec_type() {
        let src = r#"package p

type A struct {
	Spec ASpec
}

type ASpec struct {
	X string
}

type B struct {
	Spec *ASpec
}

type C struct {
	Spec string
}

type D struct{}
"#;
        let pkg = parse_package("p", &[SourceFile::new("p.go", src)]).expect("Failed to parse");
        let u = &pkg.universe;

        let a = spec_type(u, pkg.types["A"]).expect("A spec");
        assert_eq!(a.name.name, "ASpec");
        let b = spec_type(u, pkg.types["B"]).expect("B spec");
        assert_eq!(b.name.name, "ASpec");

        let err = spec_type(u, pkg.types["C"]).unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedShape { .. }));

        let err = spec_type(u, pkg.types["D"]).unwrap_err();
        assert!(matches!(err, CodegenError::MissingSpec { ref type_name } if type_name == "D"));
    }
}
