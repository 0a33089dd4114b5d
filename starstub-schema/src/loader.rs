//! Package loading and generation target selection.

use crate::comments::extract_single_bool_tag;
use crate::error::{ParseError, TagError};
use crate::gomod::GoModule;
use crate::parser::{SourceFile, parse_package, parse_package_with};
use crate::types::{Package, TypeId};
use std::path::Path;

/// Default tag that marks a type for stub generation.
pub const DEFAULT_GEN_TAG: &str = "tilt:starlark-gen";

/// Loads the Go package in `dir`.
///
/// Every `*.go` file directly inside the directory is read, in file name
/// order. Test files (`*_test.go`) are skipped. When a `go.mod` is found
/// above the directory, imported packages are loaded from the module's
/// `vendor/` directory, the module itself or the module cache.
///
/// # Errors
/// Returns `ParseError` if the directory cannot be read, holds no Go sources,
/// any source fails to parse, or `go.mod` is malformed.
pub fn load_package(dir: &Path) -> Result<Package, ParseError> {
    let files = read_go_files(dir)?;
    if files.is_empty() {
        return Err(ParseError::NoSources {
            dir: dir.to_path_buf(),
        });
    }

    let path = dir.to_string_lossy();
    let package = match GoModule::find(dir)? {
        Some(module) => {
            tracing::debug!("following imports through module {}", module.path());
            parse_package_with(&path, &files, &module)?
        }
        None => {
            tracing::debug!("no go.mod above {}, imports are not followed", dir.display());
            parse_package(&path, &files)?
        }
    };
    tracing::info!(
        "loaded package {} from {}: {} files, {} declared types",
        package.name,
        dir.display(),
        files.len(),
        package.types.len()
    );
    Ok(package)
}

/// Reads the non-test `*.go` files directly inside `dir`, in file name order.
pub(crate) fn read_go_files(dir: &Path) -> Result<Vec<SourceFile>, ParseError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ParseError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ParseError::io(dir, e))?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!("skipping non UTF-8 file name: {}", path.display());
            continue;
        };
        if !path.is_file() || !file_name.ends_with(".go") || file_name.ends_with("_test.go") {
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let text = std::fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!("read {} ({} bytes)", path.display(), text.len());
        files.push(SourceFile::new(name, text));
    }
    Ok(files)
}

/// Returns the declared types whose comments set `+<tag>=true`, sorted by name.
///
/// # Errors
/// Returns `TagError` if a type carries a malformed value for the tag.
pub fn select_targets(package: &Package, tag: &str) -> Result<Vec<TypeId>, TagError> {
    let mut targets = Vec::new();
    for (id, ty) in package.declared() {
        let type_name = ty.name.to_string();
        if extract_single_bool_tag(&type_name, tag, false, &ty.comment_lines)? {
            tracing::debug!("selected generation target {}", ty.name.name);
            targets.push(id);
        }
    }
    Ok(targets)
}
