#![allow(dead_code)]
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn qarun_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qarun"));
    // Keep the developer's shell settings out of the tests.
    cmd.env_remove("QARUN_WORKSPACE")
        .env_remove("QARUN_AI_API_KEY")
        .env_remove("QARUN_AI_ENDPOINT")
        .env_remove("QARUN_AI_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

/// Writes `workspace` as `qarun.json` inside `dir` and returns its path.
pub fn write_workspace(dir: &Path, workspace: &Value) -> PathBuf {
    let path = dir.join("qarun.json");
    fs::write(&path, serde_json::to_string_pretty(workspace).unwrap()).unwrap();
    path
}

pub fn read_workspace(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn json_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(exp_map), Value::Object(act_map)) => exp_map.iter().all(|(k, v)| {
            act_map
                .get(k)
                .is_some_and(|act_v| json_subset(v, act_v))
        }),
        (Value::Array(exp_arr), Value::Array(act_arr)) => {
            exp_arr.len() == act_arr.len()
                && exp_arr
                    .iter()
                    .zip(act_arr.iter())
                    .all(|(e, a)| json_subset(e, a))
        }
        (Value::String(s), _) if s == "{{*}}" => true,
        (Value::String(s), Value::String(a)) if s.starts_with("{{regex:") && s.ends_with("}}") => {
            let pattern = &s[8..s.len() - 2];
            regex::Regex::new(pattern).is_ok_and(|re| re.is_match(a))
        }
        _ => expected == actual,
    }
}
