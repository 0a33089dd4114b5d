//! Class stub generation for member types.

use super::doc_text;
use starstub_schema::{TypeId, Universe};

/// Generator for class stubs.
///
/// A class stub only anchors the type name for annotations and carries the
/// type's documentation. It must appear before any function naming it.
pub struct ClassGenerator<'a> {
    universe: &'a Universe,
}

impl<'a> ClassGenerator<'a> {
    /// Creates a new class generator.
    #[must_use]
    pub fn new(universe: &'a Universe) -> Self {
        Self { universe }
    }

    /// Generates the class stub for a member type.
    #[must_use]
    pub fn generate(&self, id: TypeId) -> String {
        let ty = self.universe.get(id);
        let mut output = String::new();

        output.push_str(&format!("\n\nclass {}:\n", ty.name.name));

        let doc = doc_text(&ty.comment_lines, "  ");
        if !doc.is_empty() {
            output.push_str("  \"\"\"\n");
            output.push_str(&format!("  {}\n", doc));
            output.push_str("  \"\"\"\n");
        }
        output.push_str("  pass\n");

        output
    }
}
