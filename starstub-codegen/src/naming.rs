//! Identifier conversion for generated parameters and functions.

/// Python keywords that cannot be used as parameter names.
const PYTHON_KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Parameter names fixed by field name rather than derived from it.
const ARG_NAME_OVERRIDES: [(&str, &str); 2] =
    [("Labels", "spec_labels"), ("Annotations", "spec_anotations")];

/// Converts a Go identifier to snake_case.
///
/// Word boundaries are lower-to-upper transitions, the last capital of an
/// acronym run (`HTTPGet` -> `http_get`), letter/digit transitions, and
/// `_`, `-`, `.` or space separators.
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }

        if i > 0 && !result.is_empty() && !result.ends_with('_') {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let boundary = if c.is_uppercase() {
                prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next.is_some_and(char::is_lowercase))
            } else if c.is_ascii_digit() {
                prev.is_alphabetic()
            } else {
                prev.is_ascii_digit()
            };
            if boundary {
                result.push('_');
            }
        }

        result.extend(c.to_lowercase());
    }

    while result.ends_with('_') {
        result.pop();
    }
    result
}

/// Returns true if `name` is a reserved Python keyword.
#[must_use]
pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Makes `name` usable as a Python identifier.
#[must_use]
pub fn python_ident(name: String) -> String {
    if is_python_keyword(&name) {
        format!("{name}_")
    } else {
        name
    }
}

/// Derives the parameter name for a struct field.
#[must_use]
pub fn arg_name(field: &str) -> String {
    if let Some((_, fixed)) = ARG_NAME_OVERRIDES.iter().find(|(name, _)| *name == field) {
        return (*fixed).to_string();
    }
    python_ident(to_snake_case(field))
}

/// Derives the function name for a type.
#[must_use]
pub fn function_name(type_name: &str) -> String {
    python_ident(to_snake_case(type_name))
}
