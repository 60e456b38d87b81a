//! Prop surface discovery — the real parameter names accepted by the
//! destination code unit, found by lightweight static inspection of the
//! provided source contents. No repository crawling happens here; callers
//! hand in file contents they already hold.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Object-destructuring parameter patterns: `({ size, label = "x" }: Props)`.
static DESTRUCTURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\{([^}]*)\}").expect("destructure regex"));

/// `interface Props { ... }` / `type Props = { ... }` member blocks.
static TYPE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:interface\s+\w+(?:\s+extends\s+[^{]+)?|type\s+\w+\s*=)\s*\{(.*?)\}")
        .expect("type block regex")
});

/// One member line inside a type block: `readonly size?: "sm" | "lg";`.
static MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:readonly\s+)?([A-Za-z_$][\w$]*)\??\s*:").expect("member regex")
});

/// Plain named parameter lists: `function Button(label, onPress)`.
static PLAIN_PARAMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"function\s+[A-Za-z_$][\w$]*\s*\(([^(){}]*)\)").expect("plain params regex")
});

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").expect("ident regex"));

/// The statically-discovered parameter names of a consuming code unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropSurface {
    params: BTreeSet<String>,
}

impl PropSurface {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Inspect provided source-file contents for parameter names.
    pub fn inspect<S: AsRef<str>>(sources: &[S]) -> Self {
        let mut params = BTreeSet::new();
        for source in sources {
            let source = source.as_ref();
            for captures in DESTRUCTURE_RE.captures_iter(source) {
                collect_entries(&captures[1], &mut params);
            }
            for captures in TYPE_BLOCK_RE.captures_iter(source) {
                for member in MEMBER_RE.captures_iter(&captures[1]) {
                    params.insert(member[1].to_string());
                }
            }
            for captures in PLAIN_PARAMS_RE.captures_iter(source) {
                collect_entries(&captures[1], &mut params);
            }
        }
        Self { params }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains(name)
    }

    pub fn contains_ci(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.params.iter().any(|p| p.to_lowercase() == lower)
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(String::as_str)
    }

    /// The single parameter matching `predicate`, or `None` when zero or
    /// several match — coercion only fires on an unambiguous target.
    pub fn unique_match<F>(&self, predicate: F) -> Option<&str>
    where
        F: Fn(&str) -> bool,
    {
        let mut matches = self.params.iter().filter(|p| predicate(p));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }
}

/// Pull identifiers out of a comma-separated parameter or destructure list.
fn collect_entries(list: &str, params: &mut BTreeSet<String>) {
    for entry in list.split(',') {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with("...") {
            continue;
        }
        let name = entry
            .split(|c| c == ':' || c == '=')
            .next()
            .unwrap_or(entry)
            .trim()
            .trim_end_matches('?');
        if IDENT_RE.is_match(name) {
            params.insert(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_destructured_params() {
        let source = r#"
            export function Button({ size, label = "Button", onPress, ...rest }: ButtonProps) {
                return null;
            }
        "#;
        let surface = PropSurface::inspect(&[source]);
        assert!(surface.contains("size"));
        assert!(surface.contains("label"));
        assert!(surface.contains("onPress"));
        assert!(!surface.contains("rest"));
    }

    #[test]
    fn finds_interface_members() {
        let source = r#"
            interface ButtonProps extends BaseProps {
                size?: "sm" | "lg";
                readonly disabled: boolean;
                iconLeft?: ReactNode;
            }
        "#;
        let surface = PropSurface::inspect(&[source]);
        assert!(surface.contains("size"));
        assert!(surface.contains("disabled"));
        assert!(surface.contains("iconLeft"));
    }

    #[test]
    fn finds_plain_parameter_lists() {
        let source = "function badge(label, tone = 'neutral') { return label; }";
        let surface = PropSurface::inspect(&[source]);
        assert!(surface.contains("label"));
        assert!(surface.contains("tone"));
    }

    #[test]
    fn unique_match_requires_exactly_one_candidate() {
        let surface = PropSurface::from_names(["iconLeft", "iconRight", "label"]);
        assert_eq!(
            surface.unique_match(|p| p.to_lowercase().contains("left")),
            Some("iconLeft")
        );
        assert_eq!(surface.unique_match(|p| p.to_lowercase().contains("icon")), None);
    }

    #[test]
    fn arrow_destructures_are_covered() {
        let source = "export const Chip = ({ label, removable }) => <span>{label}</span>;";
        let surface = PropSurface::inspect(&[source]);
        assert!(surface.contains("label"));
        assert!(surface.contains("removable"));
    }
}
