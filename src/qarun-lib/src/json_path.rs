//! Dotted path lookup shared by JSON_PATH assertions and extraction rules.
//!
//! Supported syntax: `a.b.c`, `items[0].id`, `matrix[1][0]`, `items.0.id`,
//! with an optional leading `$` or `$.`. A JSON `null` at the end of the path
//! is a found value; a missing key, an out-of-range index or a step through a
//! scalar is "not found".

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

pub fn parse_path(path: &str) -> Option<Vec<PathStep>> {
    let path = path.trim();
    let path = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);

    let mut steps = Vec::new();
    if path.is_empty() {
        return Some(steps);
    }

    for segment in path.split('.') {
        let (name, mut rest) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };
        if name.is_empty() && rest.is_empty() {
            return None;
        }
        if !name.is_empty() {
            steps.push(PathStep::Key(name.to_string()));
        }
        while !rest.is_empty() {
            let close = rest.find(']')?;
            let index = rest.get(1..close)?.trim().parse::<usize>().ok()?;
            steps.push(PathStep::Index(index));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return None;
            }
        }
    }
    Some(steps)
}

/// Resolves `path` against `root`. `None` means not found.
pub fn resolve<'a>(path: &str, root: &'a Value) -> Option<&'a Value> {
    let steps = parse_path(path)?;
    let mut current = root;
    for step in &steps {
        current = match (step, current) {
            (PathStep::Key(key), Value::Object(map)) => map.get(key)?,
            (PathStep::Key(key), Value::Array(items)) => items.get(key.parse::<usize>().ok()?)?,
            (PathStep::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Text form used for comparisons and extracted variables: strings verbatim,
/// everything else as compact JSON (`null` becomes `"null"`).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
