//! Go module lookup for imported packages.
//!
//! A [`GoModule`] is read from the `go.mod` file above the loaded package.
//! Import paths are searched, in order, in the module's `vendor/` directory,
//! inside the module itself, and in the Go module cache at the version the
//! module requires (after applying `replace` directives).

use crate::error::ParseError;
use crate::loader::read_go_files;
use crate::parser::{ImportSource, SourceFile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the module definition file.
pub const GO_MOD_FILE: &str = "go.mod";

/// Target of a `replace` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Replacement {
    /// A local directory, relative to the module root unless absolute.
    Dir(PathBuf),
    /// Another module version in the module cache.
    Module {
        /// Module path.
        path: String,
        /// Module version.
        version: String,
    },
}

/// A Go module and where its dependencies live on disk.
#[derive(Debug, Clone)]
pub struct GoModule {
    root: PathBuf,
    path: String,
    requires: BTreeMap<String, String>,
    replaces: BTreeMap<String, Replacement>,
    mod_cache: Option<PathBuf>,
}

impl GoModule {
    /// Finds the module containing `dir` by walking up to the nearest
    /// `go.mod`. The module cache defaults to the Go tool's location.
    ///
    /// # Errors
    /// Returns `ParseError` if `dir` cannot be resolved or the `go.mod` file
    /// cannot be read or parsed.
    pub fn find(dir: &Path) -> Result<Option<Self>, ParseError> {
        let dir = dir.canonicalize().map_err(|e| ParseError::io(dir, e))?;
        for ancestor in dir.ancestors() {
            let file = ancestor.join(GO_MOD_FILE);
            if !file.is_file() {
                continue;
            }
            let text = std::fs::read_to_string(&file).map_err(|e| ParseError::io(&file, e))?;
            let module = Self::parse(ancestor, &text)?;
            tracing::debug!("module {} rooted at {}", module.path, ancestor.display());
            return Ok(Some(match default_mod_cache() {
                Some(cache) => module.mod_cache(cache),
                None => module,
            }));
        }
        Ok(None)
    }

    /// Parses the text of a `go.mod` file for the module rooted at `root`.
    ///
    /// Only `module`, `require` and `replace` directives are read; the rest
    /// are ignored.
    ///
    /// # Errors
    /// Returns `ParseError::GoMod` for malformed directives or a missing
    /// `module` line.
    pub fn parse(root: impl Into<PathBuf>, text: &str) -> Result<Self, ParseError> {
        let root = root.into();
        let mut module = Self {
            path: String::new(),
            requires: BTreeMap::new(),
            replaces: BTreeMap::new(),
            mod_cache: None,
            root,
        };

        let mut block: Option<&str> = None;
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.split("//").next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let (verb, args) = match block {
                Some(_) if line == ")" => {
                    block = None;
                    continue;
                }
                Some(verb) => (verb, line),
                None => {
                    let (verb, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
                    let args = args.trim();
                    if args == "(" {
                        block = Some(verb);
                        continue;
                    }
                    (verb, args)
                }
            };
            module
                .directive(verb, args)
                .map_err(|message| module.error(idx + 1, message))?;
        }

        if module.path.is_empty() {
            return Err(module.error(1, "missing module directive".to_string()));
        }
        Ok(module)
    }

    /// Sets the module cache directory.
    #[must_use]
    pub fn mod_cache(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mod_cache = Some(dir.into());
        self
    }

    /// Module path from the `module` directive.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the directory holding the package at `import_path`, if any.
    #[must_use]
    pub fn locate(&self, import_path: &str) -> Option<PathBuf> {
        let vendored = self.root.join("vendor").join(import_path);
        if vendored.is_dir() {
            return Some(vendored);
        }

        if let Some(rest) = strip_module(import_path, &self.path) {
            let dir = self.root.join(rest);
            return dir.is_dir().then_some(dir);
        }

        let (module, version) = self
            .requires
            .iter()
            .filter(|(module, _)| strip_module(import_path, module).is_some())
            .max_by_key(|(module, _)| module.len())?;
        let rest = strip_module(import_path, module)?;

        let base = match self.replaces.get(module) {
            Some(Replacement::Dir(dir)) => self.root.join(dir),
            Some(Replacement::Module { path, version }) => self.cached(path, version)?,
            None => self.cached(module, version)?,
        };
        let dir = base.join(rest);
        dir.is_dir().then_some(dir)
    }

    fn cached(&self, module: &str, version: &str) -> Option<PathBuf> {
        let cache = self.mod_cache.as_ref()?;
        Some(cache.join(format!("{}@{}", escape_path(module), version)))
    }

    fn directive(&mut self, verb: &str, args: &str) -> Result<(), String> {
        match verb {
            "module" => {
                self.path = unquote(args).to_string();
                Ok(())
            }
            "require" => {
                let fields: Vec<&str> = args.split_whitespace().collect();
                let [module, version, ..] = fields.as_slice() else {
                    return Err(format!("require needs a module and a version: '{args}'"));
                };
                self.requires
                    .insert(unquote(module).to_string(), (*version).to_string());
                Ok(())
            }
            "replace" => {
                let Some((old, new)) = args.split_once("=>") else {
                    return Err(format!("replace without '=>': '{args}'"));
                };
                let old = old
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| format!("replace without a module: '{args}'"))?;
                let new: Vec<&str> = new.split_whitespace().collect();
                let replacement = match new.as_slice() {
                    [dir] => Replacement::Dir(PathBuf::from(unquote(dir))),
                    [path, version] => Replacement::Module {
                        path: unquote(path).to_string(),
                        version: (*version).to_string(),
                    },
                    _ => return Err(format!("malformed replacement: '{args}'")),
                };
                self.replaces.insert(unquote(old).to_string(), replacement);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn error(&self, line: usize, message: String) -> ParseError {
        ParseError::GoMod {
            path: self.root.join(GO_MOD_FILE),
            line,
            message,
        }
    }
}

impl ImportSource for GoModule {
    fn load(&self, import_path: &str) -> Result<Option<Vec<SourceFile>>, ParseError> {
        let Some(dir) = self.locate(import_path) else {
            return Ok(None);
        };
        tracing::debug!("import {} found in {}", import_path, dir.display());
        let files = read_go_files(&dir)?;
        Ok((!files.is_empty()).then_some(files))
    }
}

/// The module cache the Go tool uses: `$GOMODCACHE`, else
/// `$GOPATH/pkg/mod` for the first `GOPATH` entry, else `~/go/pkg/mod`.
fn default_mod_cache() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("GOMODCACHE").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if let Some(gopath) = std::env::var_os("GOPATH") {
        if let Some(first) = std::env::split_paths(&gopath).find(|p| !p.as_os_str().is_empty()) {
            return Some(first.join("pkg").join("mod"));
        }
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join("go").join("pkg").join("mod"))
}

/// Module cache path escaping: every upper case letter becomes `!` and its
/// lower case form.
fn escape_path(module: &str) -> String {
    let mut escaped = String::with_capacity(module.len());
    for c in module.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Returns the path of `import_path` inside `module`, or `None` if the
/// import is not part of the module.
fn strip_module<'p>(import_path: &'p str, module: &str) -> Option<&'p str> {
    if import_path == module {
        return Some("");
    }
    import_path.strip_prefix(module)?.strip_prefix('/')
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}
