//! Comment text extraction and `+key=value` tag handling.

use crate::error::TagError;
use std::collections::BTreeMap;

/// Sentinel that starts a machine-readable tag line.
pub const TAG_MARKER: char = '+';

/// Splits one raw comment token into text lines with the markers removed.
///
/// Line comments lose `//` and a single following space. Compiler directives
/// such as `//go:generate` produce no lines.
#[must_use]
pub fn comment_text(raw: &str) -> Vec<String> {
    if let Some(body) = raw.strip_prefix("//") {
        if is_directive(body) {
            return Vec::new();
        }
        let body = body.strip_prefix(' ').unwrap_or(body);
        return vec![body.to_string()];
    }

    let inner = raw
        .strip_prefix("/*")
        .and_then(|s| s.strip_suffix("*/"))
        .unwrap_or(raw);
    inner.lines().map(str::to_string).collect()
}

/// Returns true for `//go:build`-style directives and the `//line`,
/// `//extern` and `//export` pragmas.
fn is_directive(body: &str) -> bool {
    if ["line ", "extern ", "export "]
        .iter()
        .any(|prefix| body.starts_with(prefix))
    {
        return true;
    }
    let Some((head, tail)) = body.split_once(':') else {
        return false;
    };
    !head.is_empty()
        && head
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && tail
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Normalizes a comment block.
///
/// Trailing whitespace is trimmed, runs of empty lines collapse into one,
/// and leading and trailing empty lines are dropped.
#[must_use]
pub fn clean_lines(lines: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.trim_end().to_string();
        if line.is_empty() && result.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        result.push(line);
    }
    while result.last().is_some_and(|l| l.is_empty()) {
        result.pop();
    }
    result
}

/// Returns true if the line is a tag line rather than documentation.
#[must_use]
pub fn is_tag_line(line: &str) -> bool {
    line.trim().starts_with(TAG_MARKER)
}

/// Drops tag lines, keeping documentation text only.
#[must_use]
pub fn filter_comment_tags(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|l| !is_tag_line(l))
        .cloned()
        .collect()
}

/// Collects every `+key=value` tag in the lines.
///
/// A tag without `=` records an empty value.
#[must_use]
pub fn extract_comment_tags(lines: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut tags: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in lines {
        let Some(body) = line.trim().strip_prefix(TAG_MARKER) else {
            continue;
        };
        let (key, value) = body.split_once('=').unwrap_or((body, ""));
        tags.entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    tags
}

/// Reads a boolean tag, falling back to `default` when it is absent.
///
/// # Errors
/// Returns `TagError` if the tag carries a non-boolean value or is repeated
/// with different values.
pub fn extract_single_bool_tag(
    type_name: &str,
    tag: &str,
    default: bool,
    lines: &[String],
) -> Result<bool, TagError> {
    let tags = extract_comment_tags(lines);
    let Some(values) = tags.get(tag) else {
        return Ok(default);
    };

    if values.iter().any(|v| v != &values[0]) {
        return Err(TagError::Conflicting {
            type_name: type_name.to_string(),
            tag: tag.to_string(),
            values: values.clone(),
        });
    }

    match values[0].as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(TagError::InvalidBool {
            type_name: type_name.to_string(),
            tag: tag.to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_comment_text_line() {
        assert_eq!(comment_text("// Cmd runs a process."), vec!["Cmd runs a process."]);
        assert_eq!(comment_text("//  indented"), vec![" indented"]);
        assert_eq!(comment_text("//"), vec![""]);
    }

    #[test]
    fn test_comment_text_directive() {
        assert!(comment_text("//go:generate stringer").is_empty());
        assert!(comment_text("//line foo.go:10").is_empty());
        assert!(comment_text("//export GoCallback").is_empty());
        assert!(comment_text("//extern c_puts").is_empty());
        assert_eq!(comment_text("// export the data").len(), 1);
        assert_eq!(comment_text("//exported fields follow").len(), 1);
        assert_eq!(comment_text("// +tilt:starlark-gen=true").len(), 1);
        assert_eq!(comment_text("//+k8s:openapi-gen=true").len(), 1);
    }

    #[test]
    fn test_comment_text_block() {
        assert_eq!(comment_text("/* one\ntwo */"), vec![" one", "two "]);
    }

    #[test]
    fn test_clean_lines() {
        let cleaned = clean_lines(lines(&["", "First.  ", "", "", "Second.", "", ""]));
        assert_eq!(cleaned, lines(&["First.", "", "Second."]));
    }

    #[test]
    fn test_filter_comment_tags() {
        let filtered = filter_comment_tags(&lines(&[
            "Cmd represents a process on the host machine.",
            "",
            "+genclient",
            "  +tilt:starlark-gen=true",
        ]));
        assert_eq!(
            filtered,
            lines(&["Cmd represents a process on the host machine.", ""])
        );
    }

    #[test]
    fn test_extract_comment_tags() {
        let tags = extract_comment_tags(&lines(&[
            "+genclient",
            "+k8s:deepcopy-gen:interfaces=k8s.io/apimachinery/pkg/runtime.Object",
            "not a tag",
        ]));
        assert_eq!(tags["genclient"], vec![""]);
        assert_eq!(
            tags["k8s:deepcopy-gen:interfaces"],
            vec!["k8s.io/apimachinery/pkg/runtime.Object"]
        );
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_bool_tag_values() {
        let tag = "tilt:starlark-gen";
        assert!(!extract_single_bool_tag("Cmd", tag, false, &[]).expect("absent"));
        assert!(
            extract_single_bool_tag("Cmd", tag, false, &lines(&["+tilt:starlark-gen=true"]))
                .expect("true")
        );
        assert!(
            !extract_single_bool_tag("Cmd", tag, true, &lines(&["+tilt:starlark-gen=false"]))
                .expect("false")
        );
        assert!(
            extract_single_bool_tag(
                "Cmd",
                tag,
                false,
                &lines(&["+tilt:starlark-gen=true", "+tilt:starlark-gen=true"])
            )
            .expect("repeated")
        );
    }

    #[test]
    fn test_bool_tag_malformed() {
        let tag = "tilt:starlark-gen";
        let err = extract_single_bool_tag("Cmd", tag, false, &lines(&["+tilt:starlark-gen=yes"]))
            .unwrap_err();
        assert!(matches!(err, TagError::InvalidBool { ref value, .. } if value == "yes"));

        let err = extract_single_bool_tag("Cmd", tag, false, &lines(&["+tilt:starlark-gen"]))
            .unwrap_err();
        assert!(matches!(err, TagError::InvalidBool { .. }));

        let err = extract_single_bool_tag(
            "Cmd",
            tag,
            false,
            &lines(&["+tilt:starlark-gen=true", "+tilt:starlark-gen=false"]),
        )
        .unwrap_err();
        assert!(matches!(err, TagError::Conflicting { .. }));
        assert!(err.to_string().contains("Cmd"));
    }
}
