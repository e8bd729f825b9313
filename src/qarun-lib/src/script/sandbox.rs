use crate::config::EngineConfig;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Dynamic, Engine, EvalAltResult, Map};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::time::Instant;

const MAX_STRING_SIZE: usize = 1 << 20;
const MAX_COLLECTION_SIZE: usize = 10_000;
const MAX_CALL_LEVELS: usize = 32;
const MAX_EXPR_DEPTH: usize = 64;

/// A fresh engine per invocation: no module imports, no file or network
/// access, bounded by operation count and wall-clock time.
pub fn build_engine(config: &EngineConfig) -> Engine {
    let mut engine = Engine::new();

    engine.set_module_resolver(DummyModuleResolver::new());
    engine.set_max_operations(config.script_max_operations);
    engine.set_max_string_size(MAX_STRING_SIZE);
    engine.set_max_array_size(MAX_COLLECTION_SIZE);
    engine.set_max_map_size(MAX_COLLECTION_SIZE);
    engine.set_max_call_levels(MAX_CALL_LEVELS);
    engine.set_max_expr_depths(MAX_EXPR_DEPTH, MAX_EXPR_DEPTH);

    let started = Instant::now();
    let budget = config.script_timeout;
    engine.on_progress(move |_| {
        if started.elapsed() > budget {
            Some(Dynamic::from("timeout"))
        } else {
            None
        }
    });

    engine.on_print(|text| tracing::info!(target: "qarun::script", "{text}"));
    engine.on_debug(|text, _source, pos| {
        tracing::debug!(target: "qarun::script", "{pos:?} {text}")
    });

    register_primitives(&mut engine);
    engine
}

fn register_primitives(engine: &mut Engine) {
    engine.register_fn("timestamp", || chrono::Utc::now().timestamp_millis());
    engine.register_fn("timestamp_secs", || chrono::Utc::now().timestamp());
    engine.register_fn("iso_now", || chrono::Utc::now().to_rfc3339());
    engine.register_fn("uuid", || uuid::Uuid::new_v4().to_string());
    engine.register_fn("random", || rand::random::<f64>());
    engine.register_fn("random_int", random_int);
    engine.register_fn("sha1", |input: &str| hex::encode(Sha1::digest(input.as_bytes())));
    engine.register_fn("sha256", |input: &str| {
        hex::encode(Sha256::digest(input.as_bytes()))
    });
    engine.register_fn("base64_encode", |input: &str| STANDARD.encode(input));
    engine.register_fn("json_parse", json_parse);
    engine.register_fn("json_stringify", json_stringify);
}

fn random_int(min: i64, max: i64) -> Result<i64, Box<EvalAltResult>> {
    use rand::Rng;
    if min > max {
        return Err(format!("random_int: min {min} is greater than max {max}").into());
    }
    Ok(rand::rng().random_range(min..=max))
}

fn json_parse(input: &str) -> Result<Dynamic, Box<EvalAltResult>> {
    let value: serde_json::Value =
        serde_json::from_str(input).map_err(|e| format!("json_parse: {e}"))?;
    rhai::serde::to_dynamic(value)
}

fn json_stringify(value: Dynamic) -> Result<String, Box<EvalAltResult>> {
    let value: serde_json::Value = rhai::serde::from_dynamic(&value)?;
    Ok(value.to_string())
}

pub fn to_map<'a>(pairs: impl IntoIterator<Item = (&'a String, &'a String)>) -> Map {
    pairs
        .into_iter()
        .map(|(k, v)| (k.as_str().into(), Dynamic::from(v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval<T: Clone + Send + Sync + 'static>(script: &str) -> Result<T, Box<EvalAltResult>> {
        build_engine(&EngineConfig::default()).eval::<T>(script)
    }

    #[test]
    fn test_hash_and_encoding_primitives() {
        assert_eq!(
            eval::<String>(r#"sha256("abc")"#).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            eval::<String>(r#"sha1("abc")"#).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(eval::<String>(r#"base64_encode("hi")"#).unwrap(), "aGk=");
    }

    #[test]
    fn test_json_round_trip_in_script() {
        let out = eval::<String>(r#"let v = json_parse("{\"a\":[1,2]}"); v.a.len().to_string()"#)
            .unwrap();
        assert_eq!(out, "2");
        let text = eval::<String>(r#"json_stringify(#{ name: "x" })"#).unwrap();
        assert_eq!(text, r#"{"name":"x"}"#);
    }

    #[test]
    fn test_random_int_guard() {
        assert!(eval::<i64>("random_int(5, 1)").is_err());
        let value = eval::<i64>("random_int(3, 3)").unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn test_imports_are_blocked() {
        assert!(eval::<()>(r#"import "fs" as fs;"#).is_err());
    }

    #[test]
    fn test_operation_limit() {
        let mut config = EngineConfig::default();
        config.script_max_operations = 1_000;
        let engine = build_engine(&config);
        assert!(engine.run("let x = 0; loop { x += 1; }").is_err());
    }
}
