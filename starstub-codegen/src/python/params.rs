//! Field type classification.
//!
//! Maps each struct field to a Python parameter: a name, a type annotation
//! and a default value literal.

use crate::error::CodegenError;
use crate::naming::arg_name;
use starstub_schema::{Kind, Member, Type, TypeId, Universe};

/// Field type shapes that have a Python rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'a> {
    /// `string` or a named type over `string`.
    String,
    /// `*string`.
    OptionalString,
    /// `bool`.
    Bool,
    /// `int32`.
    Int,
    /// `map[string]string`.
    StringMap,
    /// `[]string`.
    StringList,
    /// A named struct.
    Struct(&'a str),
    /// Pointer to a named struct.
    OptionalStruct(&'a str),
    /// Slice of a named struct.
    StructList(&'a str),
}

impl<'a> Shape<'a> {
    /// Classifies a type, returning `None` for shapes without a rendering.
    #[must_use]
    pub fn of(universe: &'a Universe, id: TypeId) -> Option<Self> {
        let ty = universe.get(id);
        let elem = ty.elem.map(|e| universe.get(e));

        match ty.kind {
            Kind::Builtin => match ty.name.name.as_str() {
                "string" => Some(Self::String),
                "bool" => Some(Self::Bool),
                "int32" => Some(Self::Int),
                _ => None,
            },
            Kind::Alias => {
                let underlying = ty.underlying.map(|u| universe.get(u))?;
                underlying.is_builtin("string").then_some(Self::String)
            }
            Kind::Pointer => {
                let elem = elem?;
                if elem.is_builtin("string") {
                    Some(Self::OptionalString)
                } else {
                    named_struct(elem).map(Self::OptionalStruct)
                }
            }
            Kind::Map => {
                let key = ty.key.map(|k| universe.get(k))?;
                let value = elem?;
                (key.is_builtin("string") && value.is_builtin("string")).then_some(Self::StringMap)
            }
            Kind::Slice => {
                let elem = elem?;
                if elem.is_builtin("string") {
                    Some(Self::StringList)
                } else {
                    named_struct(elem).map(Self::StructList)
                }
            }
            Kind::Struct => named_struct(ty).map(Self::Struct),
            _ => None,
        }
    }

    /// Returns the Python type annotation.
    #[must_use]
    pub fn annotation(&self) -> String {
        match self {
            Self::String => "str".to_string(),
            Self::OptionalString => "Optional[str]".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Int => "int".to_string(),
            Self::StringMap => "Dict[str, str]".to_string(),
            Self::StringList => "List[str]".to_string(),
            Self::Struct(name) => (*name).to_string(),
            Self::OptionalStruct(name) => format!("Optional[{name}]"),
            Self::StructList(name) => format!("List[{name}]"),
        }
    }

    /// Returns the default value literal.
    ///
    /// Collections default to `None` so an unset value stays distinguishable
    /// from an explicitly empty one.
    #[must_use]
    pub const fn default_literal(&self) -> &'static str {
        match self {
            Self::String => r#""""#,
            Self::Bool => "False",
            Self::Int => "0",
            Self::OptionalString
            | Self::StringMap
            | Self::StringList
            | Self::Struct(_)
            | Self::OptionalStruct(_)
            | Self::StructList(_) => "None",
        }
    }
}

fn named_struct(ty: &Type) -> Option<&str> {
    (ty.kind == Kind::Struct && ty.is_named()).then_some(ty.name.name.as_str())
}

/// A rendered function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Python type annotation.
    pub annotation: String,
    /// Default value literal.
    pub default: &'static str,
}

impl Param {
    /// Renders the parameter as it appears in a signature, without the comma.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}: {} = {}", self.name, self.annotation, self.default)
    }
}

/// Classifies a struct field of `owner`.
///
/// # Errors
/// Returns `CodegenError::UnsupportedShape` naming the owner, the field and
/// its type when the field type has no Python rendering.
pub fn classify(universe: &Universe, owner: &str, member: &Member) -> Result<Param, CodegenError> {
    let shape = Shape::of(universe, member.type_id).ok_or_else(|| {
        CodegenError::unsupported(
            owner,
            &member.name,
            universe.get(member.type_id).name.to_string(),
        )
    })?;

    Ok(Param {
        name: arg_name(&member.name),
        annotation: shape.annotation(),
        default: shape.default_literal(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use starstub_schema::{Package, SourceFile, parse_package};

    const SOURCE: &str = r#"package p

import metav1 "k8s.io/apimachinery/pkg/apis/meta/v1"

type Mode string

type Count int32

type Probe struct{}

type Fields struct {
	Name        string
	Mode        Mode
	Target      *string
	Enabled     bool
	Port        int32
	Env         map[string]string
	Args        []string
	Probe       Probe
	Readiness   *Probe
	Probes      []Probe
	Labels      map[string]string
	Annotations map[string]string

	Size     int64
	Count    Count
	Ratio    float64
	Nested   map[string]Probe
	Modes    []Mode
	Keyed    map[Mode]string
	Bytes    []byte
	Grid     [4]string
	External metav1.LabelSelector
	Inline   struct{ X string }
	Any      interface{}
}
"#;

    fn package() -> Package {
        parse_package("p", &[SourceFile::new("p.go", SOURCE)]).expect("Failed to parse")
    }

    fn classify_field(pkg: &Package, field: &str) -> Result<Param, CodegenError> {
        let fields = pkg.type_named("Fields").expect("Fields");
        let member = fields.member(field).expect("field");
        classify(&pkg.universe, "Fields", member)
    }

    fn rendered(pkg: &Package, field: &str) -> String {
        classify_field(pkg, field).expect("classify").render()
    }

    #[test]
    fn test_scalar_shapes() {
        let pkg = package();
        assert_eq!(rendered(&pkg, "Name"), r#"name: str = """#);
        assert_eq!(rendered(&pkg, "Mode"), r#"mode: str = """#);
        assert_eq!(rendered(&pkg, "Target"), "target: Optional[str] = None");
        assert_eq!(rendered(&pkg, "Enabled"), "enabled: bool = False");
        assert_eq!(rendered(&pkg, "Port"), "port: int = 0");
    }

    #[test]
    fn test_collection_shapes() {
        let pkg = package();
        assert_eq!(rendered(&pkg, "Env"), "env: Dict[str, str] = None");
        assert_eq!(rendered(&pkg, "Args"), "args: List[str] = None");
    }

    #[test]
    fn test_struct_shapes() {
        let pkg = package();
        assert_eq!(rendered(&pkg, "Probe"), "probe: Probe = None");
        assert_eq!(rendered(&pkg, "Readiness"), "readiness: Optional[Probe] = None");
        assert_eq!(rendered(&pkg, "Probes"), "probes: List[Probe] = None");
    }

    #[test]
    fn test_fixed_names() {
        let pkg = package();
        assert_eq!(rendered(&pkg, "Labels"), "spec_labels: Dict[str, str] = None");
        assert_eq!(
            rendered(&pkg, "Annotations"),
            "spec_anotations: Dict[str, str] = None"
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        let pkg = package();
        for field in [
            "Size", "Count", "Ratio", "Nested", "Modes", "Keyed", "Bytes", "Grid", "External",
            "Inline", "Any",
        ] {
            let err = classify_field(&pkg, field).unwrap_err();
            match err {
                CodegenError::UnsupportedShape {
                    type_name,
                    field: name,
                    ..
                } => {
                    assert_eq!(type_name, "Fields");
                    assert_eq!(name, field);
                }
                other => panic!("unexpected error for {field}: {other}"),
            }
        }
    }

    #[test]
    fn test_unsupported_error_names_type() {
        let pkg = package();
        let err = classify_field(&pkg, "Nested").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Nested"));
        assert!(message.contains("map[string]p.Probe"));
    }
}
