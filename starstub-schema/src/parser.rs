//! Go source parser.
//!
//! This module turns Go source text into a [`Package`] using the tree-sitter
//! Go grammar. Only type declarations are read; functions, constants and
//! variables are ignored.
//!
//! Qualified types such as `metav1.LabelSelector` are followed into the
//! imported package when an [`ImportSource`] can supply its files. Imports
//! are loaded on demand, starting from the declarations of the root package,
//! so unrelated packages are never parsed.

use crate::comments::{clean_lines, comment_text};
use crate::error::ParseError;
use crate::types::{Kind, Member, Package, Type, TypeId, TypeName, Universe};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tree_sitter::{Node, Parser, Tree};

/// Predeclared Go type names.
const BUILTIN_TYPES: [&str; 21] = [
    "any",
    "bool",
    "byte",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// A Go source file handed to the parser.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name, used in error messages.
    pub name: String,
    /// File contents.
    pub text: String,
}

impl SourceFile {
    /// Creates a new source file.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Supplies the source files of imported packages.
pub trait ImportSource {
    /// Returns the files of the package with the given import path, or
    /// `None` if the package cannot be found.
    ///
    /// # Errors
    /// Returns `ParseError` if the package exists but cannot be read.
    fn load(&self, import_path: &str) -> Result<Option<Vec<SourceFile>>, ParseError>;
}

/// Import source that finds nothing. Qualified types stay unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl ImportSource for NoImports {
    fn load(&self, _import_path: &str) -> Result<Option<Vec<SourceFile>>, ParseError> {
        Ok(None)
    }
}

/// Parses the files of one Go package without following imports.
///
/// # Arguments
/// * `path` - Package path recorded in every declared type name
/// * `files` - Source files of the package
///
/// # Errors
/// Returns `ParseError` if a file has syntax errors, lacks a package clause,
/// or the files declare different packages.
pub fn parse_package(path: &str, files: &[SourceFile]) -> Result<Package, ParseError> {
    parse_package_with(path, files, &NoImports)
}

/// Parses the files of one Go package, loading imported packages from
/// `imports` as the package's types refer to them.
///
/// Imported packages are parsed leniently: a file with syntax errors or a
/// different package clause is skipped with a warning. A qualifier whose
/// package cannot be found leaves the type unresolved (`Kind::Unknown`).
///
/// # Errors
/// Returns `ParseError` if a root file has syntax errors, lacks a package
/// clause, or the root files declare different packages. Errors reading an
/// imported package are returned as well.
pub fn parse_package_with(
    path: &str,
    files: &[SourceFile],
    imports: &dyn ImportSource,
) -> Result<Package, ParseError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_go::LANGUAGE.into())?;

    let root = parse_files(&mut parser, path, files.to_vec(), true)?
        .ok_or_else(|| ParseError::invalid("no source files given"))?;
    let mut graph = ImportGraph::new(parser, imports, root);
    graph.load_referenced()?;
    let packages = graph.packages;

    let mut decls = Vec::new();
    for (idx, package) in packages.iter().enumerate() {
        for file in &package.files {
            collect_decls(idx, file, &mut decls)?;
        }
    }
    let name = packages[0].name.clone();
    tracing::debug!(
        "package {} ({}): {} type declarations across {} packages",
        name,
        path,
        decls.len(),
        packages.len()
    );

    let mut resolver = Resolver::new(&packages, &decls);
    resolver.resolve_all()?;

    Ok(Package {
        path: path.to_string(),
        name,
        universe: resolver.universe,
        types: resolver.declared,
    })
}

/// A package parsed but not yet resolved.
struct ParsedPackage {
    path: String,
    name: String,
    files: Vec<ParsedFile>,
    /// Names each declaration refers to, keyed by declared name.
    refs: BTreeMap<String, TypeRefs>,
}

struct ParsedFile {
    source: SourceFile,
    tree: Tree,
    imports: Vec<ImportSpec>,
    /// Package qualifiers looked up so far, mapped to the loaded package.
    scope: HashMap<String, Option<usize>>,
}

#[derive(Debug, Clone)]
struct ImportSpec {
    alias: Option<String>,
    path: String,
}

#[derive(Debug, Default)]
struct TypeRefs {
    file: usize,
    locals: Vec<String>,
    qualified: Vec<(String, String)>,
}

/// Parses the files of one package.
///
/// With `strict` set, the first bad file is an error. Otherwise bad files
/// are skipped, files whose package clause disagrees with the rest are
/// dropped, and `None` is returned when nothing usable is left.
fn parse_files(
    parser: &mut Parser,
    path: &str,
    files: Vec<SourceFile>,
    strict: bool,
) -> Result<Option<ParsedPackage>, ParseError> {
    let mut checked: Vec<(Tree, String, SourceFile)> = Vec::with_capacity(files.len());
    for source in files {
        let expected = if strict {
            checked.first().map(|(_, name, _)| name.as_str())
        } else {
            None
        };
        match parse_file(parser, &source, expected) {
            Ok((tree, name)) => checked.push((tree, name, source)),
            Err(e) if strict => return Err(e),
            Err(e) => tracing::warn!("skipping {} in {}: {}", source.name, path, e),
        }
    }

    let Some(name) = majority_name(path, checked.iter().map(|(_, name, _)| name.as_str())) else {
        return Ok(None);
    };

    let mut parsed = Vec::with_capacity(checked.len());
    let mut refs = BTreeMap::new();
    for (tree, file_name, source) in checked {
        if file_name != name {
            tracing::warn!(
                "skipping {} in {}: package {} is not {}",
                source.name,
                path,
                file_name,
                name
            );
            continue;
        }
        let root = tree.root_node();
        let imports = import_specs(root, &source.text)?;
        collect_refs(root, &source.text, parsed.len(), &mut refs)?;
        parsed.push(ParsedFile {
            source,
            tree,
            imports,
            scope: HashMap::new(),
        });
    }

    Ok(Some(ParsedPackage {
        path: path.to_string(),
        name,
        files: parsed,
        refs,
    }))
}

/// The most common package clause. Ties go to the name the import path
/// suggests, then to the first file.
fn majority_name<'n>(path: &str, names: impl Iterator<Item = &'n str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for name in names {
        match counts.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }
    let mut best: Option<(&str, (usize, bool))> = None;
    for (name, count) in counts {
        let key = (count, guesses_name(path, name));
        if best.is_none_or(|(_, best_key)| key > best_key) {
            best = Some((name, key));
        }
    }
    best.map(|(name, _)| name.to_string())
}

fn parse_file(
    parser: &mut Parser,
    file: &SourceFile,
    expected: Option<&str>,
) -> Result<(Tree, String), ParseError> {
    let tree = parser.parse(&file.text, None).ok_or_else(|| {
        ParseError::invalid(format!("parser produced no tree for '{}'", file.name))
    })?;
    check_syntax(&file.name, &tree)?;

    let name = package_clause(tree.root_node(), &file.text)?.ok_or_else(|| {
        ParseError::invalid(format!("missing package clause in '{}'", file.name))
    })?;
    if let Some(expected) = expected {
        if expected != name {
            return Err(ParseError::PackageMismatch {
                file: file.name.clone(),
                expected: expected.to_string(),
                found: name,
            });
        }
    }
    Ok((tree, name))
}

/// Fails with the first syntax error in the tree, if any.
fn check_syntax(file: &str, tree: &Tree) -> Result<(), ParseError> {
    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }
    let line = first_error_row(root).map_or(1, |row| row + 1);
    Err(ParseError::Syntax {
        file: file.to_string(),
        line,
    })
}

fn first_error_row(node: Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(row) = first_error_row(child) {
                return Some(row);
            }
        }
    }
    None
}

fn package_clause(root: Node<'_>, src: &str) -> Result<Option<String>, ParseError> {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() != "package_clause" {
            continue;
        }
        let mut inner = child.walk();
        for ident in child.named_children(&mut inner) {
            if ident.kind() == "package_identifier" {
                return Ok(Some(text(ident, src)?.to_string()));
            }
        }
    }
    Ok(None)
}

fn import_specs(root: Node<'_>, src: &str) -> Result<Vec<ImportSpec>, ParseError> {
    let mut specs = Vec::new();
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        if decl.kind() != "import_declaration" {
            continue;
        }
        let mut inner = decl.walk();
        for child in decl.named_children(&mut inner) {
            match child.kind() {
                "import_spec" => push_import(child, src, &mut specs)?,
                "import_spec_list" => {
                    let mut list = child.walk();
                    for spec in child.named_children(&mut list) {
                        if spec.kind() == "import_spec" {
                            push_import(spec, src, &mut specs)?;
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok(specs)
}

/// Dot and blank imports bind no qualifier and are skipped.
fn push_import(spec: Node<'_>, src: &str, out: &mut Vec<ImportSpec>) -> Result<(), ParseError> {
    let Some(path) = spec.child_by_field_name("path") else {
        return Ok(());
    };
    let alias = match spec.child_by_field_name("name") {
        None => None,
        Some(name) if name.kind() == "package_identifier" => Some(text(name, src)?.to_string()),
        Some(_) => return Ok(()),
    };
    out.push(ImportSpec {
        alias,
        path: unquote(text(path, src)?).to_string(),
    });
    Ok(())
}

fn collect_refs(
    root: Node<'_>,
    src: &str,
    file: usize,
    out: &mut BTreeMap<String, TypeRefs>,
) -> Result<(), ParseError> {
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        if decl.kind() != "type_declaration" {
            continue;
        }
        let mut inner = decl.walk();
        for spec in decl.named_children(&mut inner) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }
            let (Some(name), Some(ty)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) else {
                continue;
            };
            let mut refs = TypeRefs {
                file,
                ..TypeRefs::default()
            };
            type_refs(ty, src, &mut refs)?;
            out.insert(text(name, src)?.to_string(), refs);
        }
    }
    Ok(())
}

fn type_refs(node: Node<'_>, src: &str, refs: &mut TypeRefs) -> Result<(), ParseError> {
    match node.kind() {
        "type_identifier" => refs.locals.push(text(node, src)?.to_string()),
        "qualified_type" => {
            if let (Some(package), Some(name)) = (
                node.child_by_field_name("package"),
                node.child_by_field_name("name"),
            ) {
                refs.qualified
                    .push((text(package, src)?.to_string(), text(name, src)?.to_string()));
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                type_refs(child, src, refs)?;
            }
        }
    }
    Ok(())
}

/// Packages loaded so far, the root package first.
struct ImportGraph<'s> {
    parser: Parser,
    source: &'s dyn ImportSource,
    packages: Vec<ParsedPackage>,
    by_path: HashMap<String, Option<usize>>,
}

impl<'s> ImportGraph<'s> {
    fn new(parser: Parser, source: &'s dyn ImportSource, root: ParsedPackage) -> Self {
        let mut by_path = HashMap::new();
        by_path.insert(root.path.clone(), Some(0));
        Self {
            parser,
            source,
            packages: vec![root],
            by_path,
        }
    }

    /// Loads every package reachable from the root package's declarations.
    fn load_referenced(&mut self) -> Result<(), ParseError> {
        let mut queue: VecDeque<(usize, String)> = self.packages[0]
            .refs
            .keys()
            .map(|name| (0, name.clone()))
            .collect();
        let mut seen = HashSet::new();

        while let Some((package, name)) = queue.pop_front() {
            if !seen.insert((package, name.clone())) {
                continue;
            }
            let Some(refs) = self.packages[package].refs.get(&name) else {
                continue;
            };
            let file = refs.file;
            let qualified = refs.qualified.clone();
            queue.extend(refs.locals.iter().map(|local| (package, local.clone())));

            for (qualifier, target) in qualified {
                if let Some(imported) = self.qualifier(package, file, &qualifier)? {
                    queue.push_back((imported, target));
                }
            }
        }
        Ok(())
    }

    /// Resolves a qualifier used in one file. Results are kept in the file's scope.
    fn qualifier(
        &mut self,
        package: usize,
        file: usize,
        qualifier: &str,
    ) -> Result<Option<usize>, ParseError> {
        let parsed = &self.packages[package].files[file];
        if let Some(&known) = parsed.scope.get(qualifier) {
            return Ok(known);
        }
        let imports = parsed.imports.clone();

        let resolved = self.resolve_qualifier(qualifier, &imports)?;
        let parsed = &mut self.packages[package].files[file];
        if resolved.is_none() {
            tracing::debug!(
                "package qualifier {} in {} not resolved",
                qualifier,
                parsed.source.name
            );
        }
        parsed.scope.insert(qualifier.to_string(), resolved);
        Ok(resolved)
    }

    fn resolve_qualifier(
        &mut self,
        qualifier: &str,
        imports: &[ImportSpec],
    ) -> Result<Option<usize>, ParseError> {
        if let Some(spec) = imports
            .iter()
            .find(|spec| spec.alias.as_deref() == Some(qualifier))
        {
            return self.ensure(&spec.path);
        }

        // Unaliased imports are named by their package clause. Paths that
        // look like the qualifier are tried first.
        let (likely, others): (Vec<&ImportSpec>, Vec<&ImportSpec>) = imports
            .iter()
            .filter(|spec| spec.alias.is_none())
            .partition(|spec| guesses_name(&spec.path, qualifier));
        for spec in likely.into_iter().chain(others) {
            if let Some(idx) = self.ensure(&spec.path)? {
                if self.packages[idx].name == qualifier {
                    return Ok(Some(idx));
                }
            }
        }
        Ok(None)
    }

    /// Returns the package at `import_path`, loading it on first use.
    fn ensure(&mut self, import_path: &str) -> Result<Option<usize>, ParseError> {
        if let Some(&known) = self.by_path.get(import_path) {
            return Ok(known);
        }
        self.by_path.insert(import_path.to_string(), None);

        let Some(files) = self.source.load(import_path)? else {
            tracing::debug!("import {} not found", import_path);
            return Ok(None);
        };
        let Some(package) = parse_files(&mut self.parser, import_path, files, false)? else {
            tracing::warn!("import {} has no usable Go files", import_path);
            return Ok(None);
        };
        tracing::debug!(
            "loaded import {} as package {} ({} files)",
            import_path,
            package.name,
            package.files.len()
        );

        let idx = self.packages.len();
        self.packages.push(package);
        self.by_path.insert(import_path.to_string(), Some(idx));
        Ok(Some(idx))
    }
}

/// Returns true if the import path's last element suggests `qualifier` as
/// the package name (`yaml.v2`, `go-yaml`, `foo/v2`).
fn guesses_name(import_path: &str, qualifier: &str) -> bool {
    let mut segments = import_path.rsplit('/');
    let Some(last) = segments.next() else {
        return false;
    };
    let previous = segments.next().filter(|_| is_major_version(last));
    std::iter::once(last)
        .chain(previous)
        .map(|segment| segment.strip_prefix("go-").unwrap_or(segment))
        .any(|segment| segment.split('.').next() == Some(qualifier))
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn text<'s>(node: Node<'_>, src: &'s str) -> Result<&'s str, ParseError> {
    Ok(node.utf8_text(src.as_bytes())?)
}

fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let child = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    child
}

/// Strips one layer of backticks or double quotes from a string literal.
fn unquote(literal: &str) -> &str {
    for quote in ['`', '"'] {
        if let Some(inner) = literal
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    literal
}

fn unparen(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_type" {
        match first_named_child(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Tracks the comment block directly above the next declaration.
#[derive(Debug, Default)]
struct PendingComments {
    lines: Vec<String>,
    last_row: Option<usize>,
    prev_end_row: Option<usize>,
}

impl PendingComments {
    fn push(&mut self, node: Node<'_>, src: &str) -> Result<(), ParseError> {
        let start = node.start_position().row;
        if self.prev_end_row == Some(start) {
            // Trailing comment on the previous declaration's line.
            self.lines.clear();
            self.last_row = None;
            return Ok(());
        }
        if self.last_row.is_some_and(|row| row + 1 != start) {
            self.lines.clear();
        }
        self.lines.extend(comment_text(text(node, src)?));
        self.last_row = Some(node.end_position().row);
        Ok(())
    }

    /// Returns the comment lines attached to `node`, if adjacent.
    fn take_for(&mut self, node: Node<'_>) -> Vec<String> {
        let start = node.start_position().row;
        let lines = std::mem::take(&mut self.lines);
        let adjacent = self.last_row.is_some_and(|row| row + 1 == start);
        self.last_row = None;
        self.prev_end_row = Some(node.end_position().row);
        if adjacent { clean_lines(lines) } else { Vec::new() }
    }
}

/// Package and file an expression appears in.
#[derive(Clone, Copy)]
struct Scope<'a> {
    package: usize,
    file: &'a ParsedFile,
}

impl<'a> Scope<'a> {
    fn src(self) -> &'a str {
        &self.file.source.text
    }

    fn imported(self, qualifier: &str) -> Option<usize> {
        self.file.scope.get(qualifier).copied().flatten()
    }
}

/// A named type declaration awaiting resolution.
struct Decl<'a> {
    package: usize,
    name: String,
    type_node: Node<'a>,
    file: &'a ParsedFile,
    alias: bool,
    comment_lines: Vec<String>,
}

impl<'a> Decl<'a> {
    fn scope(&self) -> Scope<'a> {
        Scope {
            package: self.package,
            file: self.file,
        }
    }
}

fn collect_decls<'a>(
    package: usize,
    file: &'a ParsedFile,
    out: &mut Vec<Decl<'a>>,
) -> Result<(), ParseError> {
    let src = file.source.text.as_str();
    let root = file.tree.root_node();
    let mut pending = PendingComments::default();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "comment" => pending.push(child, src)?,
            "type_declaration" => {
                let doc = pending.take_for(child);
                collect_type_specs(package, file, child, doc, out)?;
            }
            _ => {
                pending.take_for(child);
            }
        }
    }
    Ok(())
}

fn collect_type_specs<'a>(
    package: usize,
    file: &'a ParsedFile,
    decl: Node<'a>,
    mut doc: Vec<String>,
    out: &mut Vec<Decl<'a>>,
) -> Result<(), ParseError> {
    let src = file.source.text.as_str();
    let mut specs = Vec::new();
    let mut pending = PendingComments::default();
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "comment" => pending.push(child, src)?,
            "type_spec" | "type_alias" => {
                let lines = pending.take_for(child);
                specs.push((child, lines));
            }
            _ => {
                pending.take_for(child);
            }
        }
    }

    // A lone spec inherits the comment written above the `type` keyword.
    let single = specs.len() == 1;
    for (spec, mut lines) in specs {
        if single && lines.is_empty() {
            lines = std::mem::take(&mut doc);
        }
        let name = spec
            .child_by_field_name("name")
            .ok_or_else(|| ParseError::invalid("type declaration without a name"))?;
        let type_node = spec
            .child_by_field_name("type")
            .ok_or_else(|| ParseError::invalid("type declaration without a type"))?;
        out.push(Decl {
            package,
            name: text(name, src)?.to_string(),
            type_node,
            file,
            alias: spec.kind() == "type_alias",
            comment_lines: lines,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Resolving,
    Done,
}

/// Resolves declarations of every loaded package into one universe.
struct Resolver<'a> {
    packages: &'a [ParsedPackage],
    decls: &'a [Decl<'a>],
    universe: Universe,
    declared: BTreeMap<String, TypeId>,
    named: HashMap<(usize, String), TypeId>,
    by_id: HashMap<TypeId, usize>,
    aliases: HashMap<(usize, String), usize>,
    alias_stack: Vec<(usize, String)>,
    state: Vec<State>,
}

impl<'a> Resolver<'a> {
    fn new(packages: &'a [ParsedPackage], decls: &'a [Decl<'a>]) -> Self {
        let mut resolver = Self {
            packages,
            decls,
            universe: Universe::new(),
            declared: BTreeMap::new(),
            named: HashMap::new(),
            by_id: HashMap::new(),
            aliases: HashMap::new(),
            alias_stack: Vec::new(),
            state: vec![State::Pending; decls.len()],
        };

        for (idx, decl) in decls.iter().enumerate() {
            let key = (decl.package, decl.name.clone());
            if decl.alias {
                resolver.aliases.insert(key, idx);
                continue;
            }
            let path = packages[decl.package].path.as_str();
            let mut ty = Type::new(TypeName::new(path, decl.name.as_str()), Kind::Unknown);
            ty.comment_lines = decl.comment_lines.clone();
            let id = resolver.universe.intern(ty);
            resolver.named.insert(key, id);
            resolver.by_id.insert(id, idx);
            if decl.package == 0 {
                resolver.declared.insert(decl.name.clone(), id);
            }
        }

        resolver
    }

    fn resolve_all(&mut self) -> Result<(), ParseError> {
        for idx in 0..self.decls.len() {
            if !self.decls[idx].alias {
                self.resolve_decl(idx)?;
            }
        }
        Ok(())
    }

    fn resolve_decl(&mut self, idx: usize) -> Result<(), ParseError> {
        match self.state[idx] {
            State::Done => return Ok(()),
            State::Resolving => {
                tracing::debug!("cyclic type definition: {}", self.decls[idx].name);
                return Ok(());
            }
            State::Pending => {}
        }
        self.state[idx] = State::Resolving;

        let decls = self.decls;
        let decl = &decls[idx];
        let id = self.named[&(decl.package, decl.name.clone())];
        let node = unparen(decl.type_node);

        match node.kind() {
            "struct_type" => {
                let members = self.resolve_fields(node, decl.scope())?;
                let ty = self.universe.get_mut(id);
                ty.kind = Kind::Struct;
                ty.members = members;
            }
            "interface_type" => {
                self.universe.get_mut(id).kind = Kind::Interface;
            }
            _ => {
                let target = self.resolve_expr(node, decl.scope())?;
                if let Some(&other) = self.by_id.get(&target) {
                    self.resolve_decl(other)?;
                }
                let target_ty = self.universe.get(target).clone();
                let ty = self.universe.get_mut(id);
                match target_ty.kind {
                    Kind::Struct => {
                        ty.kind = Kind::Struct;
                        ty.members = target_ty.members;
                    }
                    Kind::Interface => ty.kind = Kind::Interface,
                    Kind::Alias => {
                        ty.kind = Kind::Alias;
                        ty.underlying = target_ty.underlying;
                    }
                    _ => {
                        ty.kind = Kind::Alias;
                        ty.underlying = Some(target);
                    }
                }
            }
        }

        self.state[idx] = State::Done;
        Ok(())
    }

    fn resolve_fields(&mut self, node: Node<'a>, scope: Scope<'a>) -> Result<Vec<Member>, ParseError> {
        let mut cursor = node.walk();
        let list = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "field_declaration_list");
        let Some(list) = list else {
            return Ok(Vec::new());
        };

        let mut members = Vec::new();
        let mut pending = PendingComments::default();
        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            match child.kind() {
                "comment" => pending.push(child, scope.src())?,
                "field_declaration" => {
                    let comment_lines = pending.take_for(child);
                    self.resolve_field(child, scope, comment_lines, &mut members)?;
                }
                _ => {
                    pending.take_for(child);
                }
            }
        }
        Ok(members)
    }

    fn resolve_field(
        &mut self,
        field: Node<'a>,
        scope: Scope<'a>,
        comment_lines: Vec<String>,
        members: &mut Vec<Member>,
    ) -> Result<(), ParseError> {
        let src = scope.src();
        let type_node = field
            .child_by_field_name("type")
            .ok_or_else(|| ParseError::invalid("field declaration without a type"))?;
        let mut type_id = self.resolve_expr(type_node, scope)?;

        let mut cursor = field.walk();
        let names = field
            .children_by_field_name("name", &mut cursor)
            .map(|n| text(n, src).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        if names.is_empty() {
            let mut cursor = field.walk();
            let starred = field
                .children(&mut cursor)
                .any(|c| !c.is_named() && c.kind() == "*");
            if starred {
                type_id = self.pointer_to(type_id);
            }
            members.push(Member {
                name: embedded_name(type_node, src)?,
                type_id,
                comment_lines,
            });
            return Ok(());
        }

        for name in names {
            members.push(Member {
                name,
                type_id,
                comment_lines: comment_lines.clone(),
            });
        }
        Ok(())
    }

    fn resolve_expr(&mut self, node: Node<'a>, scope: Scope<'a>) -> Result<TypeId, ParseError> {
        let src = scope.src();
        let node = unparen(node);
        match node.kind() {
            "type_identifier" => self.resolve_named(scope.package, text(node, src)?),
            "qualified_type" => {
                let package = node
                    .child_by_field_name("package")
                    .ok_or_else(|| ParseError::invalid("qualified type without a package"))?;
                let name = node
                    .child_by_field_name("name")
                    .ok_or_else(|| ParseError::invalid("qualified type without a name"))?;
                let (qualifier, name) = (text(package, src)?, text(name, src)?);
                match scope.imported(qualifier) {
                    Some(imported) => self.resolve_named(imported, name),
                    None => {
                        let ty = Type::new(TypeName::new(qualifier, name), Kind::Unknown);
                        Ok(self.universe.intern(ty))
                    }
                }
            }
            "pointer_type" => {
                let inner = first_named_child(node)
                    .ok_or_else(|| ParseError::invalid("pointer type without an element"))?;
                let elem = self.resolve_expr(inner, scope)?;
                Ok(self.pointer_to(elem))
            }
            "slice_type" => {
                let elem = self.field_type(node, "element", scope)?;
                let name = format!("[]{}", self.universe.get(elem).name);
                Ok(self.composite(Kind::Slice, name, elem, None))
            }
            "array_type" => {
                let length = node
                    .child_by_field_name("length")
                    .map(|n| text(n, src))
                    .transpose()?
                    .unwrap_or("...");
                let elem = self.field_type(node, "element", scope)?;
                let name = format!("[{}]{}", length, self.universe.get(elem).name);
                Ok(self.composite(Kind::Array, name, elem, None))
            }
            "map_type" => {
                let key = self.field_type(node, "key", scope)?;
                let value = self.field_type(node, "value", scope)?;
                let name = format!(
                    "map[{}]{}",
                    self.universe.get(key).name,
                    self.universe.get(value).name
                );
                Ok(self.composite(Kind::Map, name, value, Some(key)))
            }
            "struct_type" => {
                let members = self.resolve_fields(node, scope)?;
                let mut ty = Type::new(TypeName::bare(collapse_ws(text(node, src)?)), Kind::Struct);
                ty.members = members;
                Ok(self.universe.intern(ty))
            }
            kind => {
                let kind = match kind {
                    "interface_type" => Kind::Interface,
                    "function_type" => Kind::Func,
                    "channel_type" => Kind::Chan,
                    _ => Kind::Unknown,
                };
                let ty = Type::new(TypeName::bare(collapse_ws(text(node, src)?)), kind);
                Ok(self.universe.intern(ty))
            }
        }
    }

    /// Resolves a type name declared in (or predeclared for) `package`.
    fn resolve_named(&mut self, package: usize, name: &str) -> Result<TypeId, ParseError> {
        let key = (package, name.to_string());
        if let Some(&id) = self.named.get(&key) {
            return Ok(id);
        }

        if let Some(&idx) = self.aliases.get(&key) {
            if !self.alias_stack.contains(&key) {
                let decls = self.decls;
                let decl = &decls[idx];
                self.alias_stack.push(key);
                let resolved = self.resolve_expr(decl.type_node, decl.scope());
                self.alias_stack.pop();
                return resolved;
            }
            tracing::debug!("cyclic type alias: {}", name);
        } else if BUILTIN_TYPES.contains(&name) {
            let ty = Type::new(TypeName::bare(name), Kind::Builtin);
            return Ok(self.universe.intern(ty));
        }

        let path = self.packages[package].path.as_str();
        let ty = Type::new(TypeName::new(path, name), Kind::Unknown);
        Ok(self.universe.intern(ty))
    }

    fn field_type(&mut self, node: Node<'a>, field: &str, scope: Scope<'a>) -> Result<TypeId, ParseError> {
        let child = node.child_by_field_name(field).ok_or_else(|| {
            ParseError::invalid(format!("{} without a {} type", node.kind(), field))
        })?;
        self.resolve_expr(child, scope)
    }

    fn pointer_to(&mut self, elem: TypeId) -> TypeId {
        let name = format!("*{}", self.universe.get(elem).name);
        self.composite(Kind::Pointer, name, elem, None)
    }

    fn composite(&mut self, kind: Kind, name: String, elem: TypeId, key: Option<TypeId>) -> TypeId {
        let mut ty = Type::new(TypeName::bare(name), kind);
        ty.elem = Some(elem);
        ty.key = key;
        self.universe.intern(ty)
    }
}

/// Name given to an embedded field: the short name of its type.
fn embedded_name(node: Node<'_>, src: &str) -> Result<String, ParseError> {
    let node = unparen(node);
    match node.kind() {
        "qualified_type" => match node.child_by_field_name("name") {
            Some(name) => Ok(text(name, src)?.to_string()),
            None => Ok(text(node, src)?.to_string()),
        },
        "generic_type" => match node.child_by_field_name("type") {
            Some(inner) => embedded_name(inner, src),
            None => Ok(text(node, src)?.to_string()),
        },
        "pointer_type" => match first_named_child(node) {
            Some(inner) => embedded_name(inner, src),
            None => Ok(text(node, src)?.to_string()),
        },
        _ => Ok(text(node, src)?.to_string()),
    }
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
