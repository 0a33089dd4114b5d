//! # Starstub Schema
//!
//! Go package loader and type universe.
//!
//! This crate provides:
//! - Go source parsing via the tree-sitter Go grammar
//! - Imported package lookup through `go.mod`, `vendor/` and the module cache
//! - A type universe of named and anonymous types with resolved members
//! - Doc comment extraction and `+key=value` tag parsing
//! - Selection of the types flagged for stub generation

pub mod comments;
pub mod error;
pub mod gomod;
pub mod loader;
pub mod parser;
pub mod types;

pub use comments::{TAG_MARKER, filter_comment_tags};
pub use error::{ParseError, TagError};
pub use gomod::GoModule;
pub use loader::{DEFAULT_GEN_TAG, load_package, select_targets};
pub use parser::{ImportSource, NoImports, SourceFile, parse_package, parse_package_with};
pub use types::{Kind, Member, Package, Type, TypeId, TypeName, Universe};
