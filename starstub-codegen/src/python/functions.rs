//! Constructor function stub generation.

use super::{MISSING_DOC, doc_text, params::Param, params::classify, spec_type};
use crate::error::CodegenError;
use crate::naming::function_name;
use starstub_schema::{Member, TypeId, Universe};
use std::collections::HashSet;

/// Leading parameters of every top-level function: name, signature, docs.
const METADATA_PARAMS: [(&str, &str, &str); 3] = [
    ("name", "name: str", "The name in the Object metadata."),
    (
        "labels",
        "labels: Dict[str, str] = None",
        "A set of key/value pairs in the Object metadata for grouping objects.",
    ),
    (
        "annotations",
        "annotations: Dict[str, str] = None",
        "A set of key/value pairs in the Object metadata for attaching data to objects.",
    ),
];

/// A parameter together with its rendered documentation.
type DocumentedParam = (Param, String);

/// Generator for constructor function stubs.
pub struct FunctionGenerator<'a> {
    universe: &'a Universe,
}

impl<'a> FunctionGenerator<'a> {
    /// Creates a new function generator.
    #[must_use]
    pub fn new(universe: &'a Universe) -> Self {
        Self { universe }
    }

    /// Generates the function stub for a generation target.
    ///
    /// The function takes the object metadata parameters followed by one
    /// parameter per field of the target's `Spec`.
    ///
    /// # Errors
    /// Returns `CodegenError` if the target has no `Spec` field, a field
    /// cannot be classified, or two parameters end up with the same name.
    pub fn generate_top_level(&self, target: TypeId) -> Result<String, CodegenError> {
        let ty = self.universe.get(target);
        let spec = spec_type(self.universe, target)?;
        let mut params = self.params(&ty.name.name, &spec.members)?;

        for (param, _) in &mut params {
            if METADATA_PARAMS.iter().any(|(name, _, _)| *name == param.name) {
                param.name.push('_');
            }
        }
        check_unique(
            &ty.name.name,
            METADATA_PARAMS
                .iter()
                .map(|(name, _, _)| *name)
                .chain(params.iter().map(|(p, _)| p.name.as_str())),
        )?;

        let mut output = String::new();
        output.push_str(&format!("\n\ndef {}(\n", function_name(&ty.name.name)));
        for (_, signature, _) in METADATA_PARAMS {
            output.push_str(&format!("  {},\n", signature));
        }
        for (param, _) in &params {
            output.push_str(&format!("  {},\n", param.render()));
        }
        output.push_str("):\n");

        let mut args: Vec<(&str, &str)> = METADATA_PARAMS
            .iter()
            .map(|(name, _, doc)| (*name, *doc))
            .collect();
        args.extend(params.iter().map(|(p, doc)| (p.name.as_str(), doc.as_str())));

        push_docstring(&mut output, &ty.comment_lines, &args);
        output.push_str("  pass\n");

        Ok(output)
    }

    /// Generates the constructor function stub for a member type.
    ///
    /// # Errors
    /// Returns `CodegenError` if a field cannot be classified or two fields
    /// map to the same parameter name.
    pub fn generate_member(&self, id: TypeId) -> Result<String, CodegenError> {
        let ty = self.universe.get(id);
        let params = self.params(&ty.name.name, &ty.members)?;
        check_unique(&ty.name.name, params.iter().map(|(p, _)| p.name.as_str()))?;
        let name = function_name(&ty.name.name);

        let mut output = String::new();
        if params.is_empty() {
            output.push_str(&format!("\n\ndef {}() -> {}:\n", name, ty.name.name));
        } else {
            output.push_str(&format!("\n\ndef {}(\n", name));
            for (param, _) in &params {
                output.push_str(&format!("  {},\n", param.render()));
            }
            output.push_str(&format!(") -> {}:\n", ty.name.name));
        }

        let args: Vec<(&str, &str)> = params
            .iter()
            .map(|(p, doc)| (p.name.as_str(), doc.as_str()))
            .collect();
        push_docstring(&mut output, &ty.comment_lines, &args);
        output.push_str("  pass\n");

        Ok(output)
    }

    /// Classifies every non-time field of `owner`.
    fn params(&self, owner: &str, members: &[Member]) -> Result<Vec<DocumentedParam>, CodegenError> {
        members
            .iter()
            .filter(|m| !self.universe.is_time_member(m))
            .map(|m| {
                let param = classify(self.universe, owner, m)?;
                let doc = doc_text(&m.comment_lines, "      ");
                let doc = if doc.is_empty() {
                    MISSING_DOC.to_string()
                } else {
                    doc
                };
                Ok((param, doc))
            })
            .collect()
    }
}

/// Fails on the first parameter name that repeats.
fn check_unique<'p>(
    owner: &str,
    names: impl IntoIterator<Item = &'p str>,
) -> Result<(), CodegenError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CodegenError::duplicate_param(owner, name));
        }
    }
    Ok(())
}

/// Appends the docstring: type documentation, then the `Args:` section.
fn push_docstring(output: &mut String, comment_lines: &[String], args: &[(&str, &str)]) {
    let doc = doc_text(comment_lines, "  ");
    if doc.is_empty() && args.is_empty() {
        return;
    }

    output.push_str("  \"\"\"\n");
    if !doc.is_empty() {
        output.push_str(&format!("  {}\n", doc));
        if !args.is_empty() {
            output.push('\n');
        }
    }
    if !args.is_empty() {
        output.push_str("  Args:\n");
        for (name, doc) in args {
            output.push_str(&format!("    {}: {}\n", name, doc));
        }
    }
    output.push_str("  \"\"\"\n");
}
