//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types.
//!
//! ```ignore
//! use starstub::prelude::*;
//! ```

// Schema types
pub use starstub_schema::{
    GoModule, ImportSource, Kind, Member, Package, ParseError, SourceFile, TagError, Type, TypeId,
    TypeName, Universe,
};
pub use starstub_schema::{load_package, parse_package, parse_package_with, select_targets};

// Codegen types
pub use starstub_codegen::{CodegenError, Destination, Generator, GeneratorConfig};
pub use starstub_codegen::{generate_from_dir, generate_from_package, write_output};
