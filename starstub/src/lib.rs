//! # Starstub
//!
//! Starlark/Python documentation stubs generated from annotated Go API types.
//!
//! A Go type whose doc comment carries `+tilt:starlark-gen=true` becomes a
//! constructor function taking the object metadata and one parameter per
//! field of its `Spec`. Every struct reachable from those fields gets a class
//! stub and a constructor function of its own.
//!
//! ## Quick Start
//!
//! ```ignore
//! use starstub::prelude::*;
//! use std::path::Path;
//!
//! let config = GeneratorConfig::default();
//! let destination = Destination::parse("api/v1alpha1");
//! starstub::codegen::run(Path::new("pkg/apis/core/v1alpha1"), &destination, &config)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Go package loading, type universe, comment tags
//! - [`codegen`] - Stub generation and output

pub mod prelude;

/// Go package loading and the type universe.
pub mod schema {
    pub use starstub_schema::*;
}

/// Stub generation and output.
pub mod codegen {
    pub use starstub_codegen::*;
}
