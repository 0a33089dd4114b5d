//! Type universe definitions.
//!
//! This module contains the data structures describing a loaded Go package:
//! named and anonymous types, struct members, and the arena that owns them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Names of the Go types that are treated as time stamps.
const TIME_TYPE_NAMES: [&str; 2] = ["Time", "MicroTime"];

/// Handle to a type stored in a [`Universe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

/// Fully qualified type name.
///
/// Builtins and anonymous types (`*T`, `[]T`, `map[K]V`) have an empty package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    /// Package path or import alias the type belongs to.
    pub package: String,
    /// Short type name.
    pub name: String,
}

impl TypeName {
    /// Creates a new type name.
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Creates a name without a package (builtins and anonymous types).
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(String::new(), name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// Structural kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Predeclared Go type such as `string` or `int32`.
    Builtin,
    /// Struct type.
    Struct,
    /// Pointer to `elem`.
    Pointer,
    /// Named type defined over a non-struct type; see `underlying`.
    Alias,
    /// Slice of `elem`.
    Slice,
    /// Fixed-length array of `elem`.
    Array,
    /// Map from `key` to `elem`.
    Map,
    /// Interface type.
    Interface,
    /// Function type.
    Func,
    /// Channel type.
    Chan,
    /// Reference the loader could not resolve (other packages, generics).
    Unknown,
}

/// A type in the universe.
#[derive(Debug, Clone)]
pub struct Type {
    /// Type name.
    pub name: TypeName,
    /// Type kind.
    pub kind: Kind,
    /// Struct members, in declaration order.
    pub members: Vec<Member>,
    /// Element type of pointers, slices, arrays and maps.
    pub elem: Option<TypeId>,
    /// Key type of maps.
    pub key: Option<TypeId>,
    /// Resolved underlying type of aliases.
    pub underlying: Option<TypeId>,
    /// Doc comment lines, tags included.
    pub comment_lines: Vec<String>,
}

impl Type {
    /// Creates a type of the given kind with no members or references.
    #[must_use]
    pub fn new(name: TypeName, kind: Kind) -> Self {
        Self {
            name,
            kind,
            members: Vec::new(),
            elem: None,
            key: None,
            underlying: None,
            comment_lines: Vec::new(),
        }
    }

    /// Returns true if the type was declared by name in some package.
    #[must_use]
    pub fn is_named(&self) -> bool {
        !self.name.package.is_empty()
    }

    /// Returns true if this is the predeclared type `name`.
    #[must_use]
    pub fn is_builtin(&self, name: &str) -> bool {
        self.kind == Kind::Builtin && self.name.name == name
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Struct member.
#[derive(Debug, Clone)]
pub struct Member {
    /// Field name; for embedded fields the name of the embedded type.
    pub name: String,
    /// Field type.
    pub type_id: TypeId,
    /// Doc comment lines, tags included.
    pub comment_lines: Vec<String>,
}

/// Arena of all types seen while loading a package.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    types: Vec<Type>,
    index: HashMap<String, TypeId>,
}

impl Universe {
    /// Creates an empty universe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the type behind an id.
    #[must_use]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.0]
    }

    /// Returns the id for `ty`'s name, inserting `ty` if the name is new.
    pub(crate) fn intern(&mut self, ty: Type) -> TypeId {
        let key = ty.name.to_string();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = TypeId(self.types.len());
        self.types.push(ty);
        self.index.insert(key, id);
        id
    }

    /// Returns the element type of a pointer, slice, array or map.
    #[must_use]
    pub fn elem(&self, id: TypeId) -> Option<&Type> {
        self.get(id).elem.map(|e| self.get(e))
    }

    /// Returns true if the member holds a timestamp, directly or by pointer.
    ///
    /// Timestamps are the `Time` and `MicroTime` types of any imported
    /// package (`metav1.Time`, `time.Time`).
    #[must_use]
    pub fn is_time_member(&self, member: &Member) -> bool {
        let mut ty = self.get(member.type_id);
        if ty.kind == Kind::Pointer {
            match self.elem(member.type_id) {
                Some(elem) => ty = elem,
                None => return false,
            }
        }
        ty.is_named() && TIME_TYPE_NAMES.contains(&ty.name.name.as_str())
    }
}

/// A loaded Go package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Path the package was loaded from.
    pub path: String,
    /// Package name from the `package` clause.
    pub name: String,
    /// Every type referenced by the package.
    pub universe: Universe,
    /// Named types declared in the package, keyed by short name.
    pub types: BTreeMap<String, TypeId>,
}

impl Package {
    /// Looks up a type declared in this package.
    #[must_use]
    pub fn type_named(&self, name: &str) -> Option<&Type> {
        self.types.get(name).map(|&id| self.universe.get(id))
    }

    /// Iterates over the declared types sorted by name.
    pub fn declared(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types
            .values()
            .map(|&id| (id, self.universe.get(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_display() {
        assert_eq!(TypeName::bare("string").to_string(), "string");
        assert_eq!(TypeName::new("metav1", "Time").to_string(), "metav1.Time");
    }

    #[test]
    fn test_intern_dedupes_by_name() {
        let mut universe = Universe::new();
        let a = universe.intern(Type::new(TypeName::bare("string"), Kind::Builtin));
        let b = universe.intern(Type::new(TypeName::bare("string"), Kind::Builtin));
        assert_eq!(a, b);

        let c = universe.intern(Type::new(TypeName::bare("int32"), Kind::Builtin));
        assert_ne!(a, c);
    }

    #[test]
    fn test_is_time_member() {
        let mut universe = Universe::new();
        let time = universe.intern(Type::new(TypeName::new("metav1", "Time"), Kind::Unknown));
        let mut ptr = Type::new(TypeName::bare("*metav1.Time"), Kind::Pointer);
        ptr.elem = Some(time);
        let ptr = universe.intern(ptr);
        let string = universe.intern(Type::new(TypeName::bare("string"), Kind::Builtin));

        let member = |type_id| Member {
            name: "StartedAt".to_string(),
            type_id,
            comment_lines: Vec::new(),
        };

        assert!(universe.is_time_member(&member(time)));
        assert!(universe.is_time_member(&member(ptr)));
        assert!(!universe.is_time_member(&member(string)));
    }
}
