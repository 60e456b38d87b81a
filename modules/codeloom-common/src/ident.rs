//! Identifier normalization shared by evidence extraction and rendering.

/// Normalize a raw axis key to a camelCase identifier.
///
/// Splits on non-alphanumeric boundaries; all-caps segments are folded
/// ("SIZE" -> "size") while mixed-case interiors are preserved
/// ("iconPosition" stays "iconPosition").
pub fn camel_case(raw: &str) -> String {
    let mut out = String::new();
    for word in raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut chars = word.chars();
        let Some(first) = chars.next() else { continue };
        let rest: String = chars.collect();
        let rest = if rest.chars().any(|c| c.is_lowercase()) {
            rest
        } else {
            rest.to_lowercase()
        };
        if out.is_empty() {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(&rest);
    }
    out
}

/// Lowercase token with every non-alphanumeric character mapped to `_`.
/// Used for enum value tokens: "With icon" -> "with_icon".
pub fn enum_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Collapse a layer or file name to a plain token: runs of non-alphanumeric
/// characters become a single `_`. An all-punctuation name collapses to `"_"`.
pub fn sanitize_token(raw: &str) -> String {
    let mut out = String::new();
    let mut prev_underscore = false;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            out.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }
    out
}

/// Strip a candidate prop name down to a legal bare identifier: leading
/// dots, a trailing `?`, and any remaining non-alphanumeric characters are
/// removed. A leading digit gets an underscore prefix.
pub fn sanitize_identifier(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('.').trim_end_matches('?');
    let mut out: String = trimmed
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Whether `s` can appear unquoted as an object key in generated code.
pub fn is_bare_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Derive a human-readable default string from a camelCase prop name:
/// "buttonLabel" -> "Button Label".
pub fn title_from_ident(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        if c.is_uppercase() && !current.is_empty() {
            words.push(current.clone());
            current.clear();
        }
        if c.is_alphanumeric() {
            current.push(c);
        } else if !current.is_empty() {
            words.push(current.clone());
            current.clear();
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
