use serde_json::{Map, Value};

/// `$ref` chains deeper than this stop resolving; self-referencing schemas
/// would otherwise never end.
const MAX_DEPTH: usize = 12;

/// Builds a sample value for a JSON schema: explicit examples win, then
/// local `$ref`s, object properties, one-item arrays and placeholder
/// primitives.
pub fn example_from_schema(schema: Option<&Value>, document: &Value) -> Value {
    match schema {
        Some(schema) => generate(schema, document, 0),
        None => Value::Object(Map::new()),
    }
}

fn resolve_ref<'a>(reference: &str, document: &'a Value) -> Option<&'a Value> {
    reference
        .strip_prefix('#')
        .and_then(|pointer| document.pointer(pointer))
}

fn generate(schema: &Value, document: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    if let Some(example) = schema.get("example").filter(|e| !e.is_null()) {
        return example.clone();
    }
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        if let Some(target) = resolve_ref(reference, document) {
            return generate(target, document, depth + 1);
        }
    }
    for combinator in ["allOf", "oneOf", "anyOf"] {
        if let Some(first) = schema
            .get(combinator)
            .and_then(Value::as_array)
            .and_then(|variants| variants.first())
        {
            if combinator != "allOf" {
                return generate(first, document, depth + 1);
            }
            let mut merged = Map::new();
            for part in schema[combinator].as_array().into_iter().flatten() {
                if let Value::Object(fields) = generate(part, document, depth + 1) {
                    merged.extend(fields);
                }
            }
            return Value::Object(merged);
        }
    }

    let schema_type = schema.get("type").and_then(Value::as_str);
    if schema_type == Some("object") || schema.get("properties").is_some() {
        let mut example = Map::new();
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                example.insert(name.clone(), generate(property, document, depth + 1));
            }
        }
        return Value::Object(example);
    }

    match schema_type {
        Some("array") => match schema.get("items") {
            Some(items) => Value::Array(vec![generate(items, document, depth + 1)]),
            None => Value::Array(Vec::new()),
        },
        Some("string") => schema
            .get("enum")
            .and_then(Value::as_array)
            .and_then(|values| values.first())
            .cloned()
            .unwrap_or_else(|| Value::String("string".to_string())),
        Some("number") | Some("integer") => Value::from(0),
        Some("boolean") => Value::Bool(false),
        _ => Value::Null,
    }
}
