use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

fn render_text_from_model<T: Serialize + ?Sized>(model: &T) -> String {
    let value = serde_json::to_value(model).unwrap_or(Value::Null);
    render_value(&value, 0)
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(arr) => arr.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn render_value(value: &Value, indent: usize) -> String {
    let pad = " ".repeat(indent);
    match value {
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => format!("{pad}{}\n", scalar(value)),
        Value::String(s) => s.lines().map(|line| format!("{pad}{line}\n")).collect(),
        Value::Array(arr) => {
            let mut out = String::new();
            for item in arr {
                match item {
                    Value::Array(_) | Value::Object(_) => {
                        out.push_str(&format!("{pad}-\n"));
                        out.push_str(&render_value(item, indent + 2));
                    }
                    _ => out.push_str(&format!("{pad}- {}\n", scalar(item))),
                }
            }
            out
        }
        Value::Object(map) => {
            let mut out = String::new();
            for (key, item) in map {
                match item {
                    // Absent optional fields and empty maps add nothing useful in text.
                    Value::Null => {}
                    _ if is_empty_container(item) => {}
                    Value::Array(_) | Value::Object(_) => {
                        out.push_str(&format!("{pad}{key}:\n"));
                        out.push_str(&render_value(item, indent + 2));
                    }
                    Value::String(s) if s.contains('\n') => {
                        out.push_str(&format!("{pad}{key}:\n"));
                        out.push_str(&render_value(item, indent + 2));
                    }
                    _ => out.push_str(&format!("{pad}{key}: {}\n", scalar(item))),
                }
            }
            out
        }
    }
}

pub struct Formatter {
    engine: OutputFormat,
}

impl Formatter {
    pub fn new(engine: OutputFormat) -> Self {
        Self { engine }
    }

    pub fn is_json(&self) -> bool {
        self.engine == OutputFormat::Json
    }

    pub fn format<T: Serialize>(&self, model: &T) -> String {
        match self.engine {
            OutputFormat::Text => render_text_from_model(model),
            OutputFormat::Json => pretty(model),
        }
    }

    /// Text mode shows the condensed `view`; JSON mode emits the full `model`.
    pub fn format_view<V: Serialize, M: Serialize>(&self, view: &V, model: &M) -> String {
        match self.engine {
            OutputFormat::Text => render_text_from_model(view),
            OutputFormat::Json => pretty(model),
        }
    }

    pub fn format_list<T: Serialize>(&self, list: &[T], title: &str, empty_msg: &str) -> String {
        match self.engine {
            OutputFormat::Text => {
                if list.is_empty() {
                    format!("{empty_msg}\n")
                } else {
                    let content = render_text_from_model(list);
                    if title.is_empty() {
                        content
                    } else {
                        format!("{title}\n{content}")
                    }
                }
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(list).unwrap_or_else(|_| "[]".to_string()) + "\n"
            }
        }
    }
}

fn pretty<T: Serialize + ?Sized>(model: &T) -> String {
    serde_json::to_string_pretty(model).unwrap_or_default() + "\n"
}

pub fn get_formatter(output_format: &OutputFormat) -> Formatter {
    Formatter::new(*output_format)
}
