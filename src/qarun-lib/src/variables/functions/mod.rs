pub mod datetime;
pub mod random;
pub mod traits;

use lazy_static::lazy_static;
use std::collections::HashMap;
use traits::PlaceholderFunction;

lazy_static! {
    static ref FUNCTIONS: HashMap<String, Box<dyn PlaceholderFunction>> = {
        let mut m = HashMap::new();
        register(random::guid::RandomGuid, &mut m);
        register(random::int::RandomInt, &mut m);
        register(datetime::now::DateTimeNow, &mut m);
        register(datetime::timestamp::DateTimeTimestamp, &mut m);
        m
    };
}

fn register<F: PlaceholderFunction + 'static>(
    f: F,
    m: &mut HashMap<String, Box<dyn PlaceholderFunction>>,
) {
    m.insert(f.full_name(), Box::new(f));
}

pub fn get_function(full_name: &str) -> Option<&'static dyn PlaceholderFunction> {
    FUNCTIONS.get(full_name).map(|f| f.as_ref())
}

pub fn call(full_name: &str, args: &[String]) -> Result<String, String> {
    let function = get_function(full_name).ok_or_else(|| format!("unknown function {full_name}"))?;
    function.validate_args(args)?;
    function.execute(args)
}

/// Splits `"a, b", 'c', 3` into arguments, honouring single and double quotes.
pub fn parse_args(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut seen_any = false;

    for ch in raw.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(ch);
                seen_any = true;
            }
            (None, ',') => {
                args.push(current.trim().to_string());
                current.clear();
            }
            (None, c) => {
                if !c.is_whitespace() {
                    seen_any = true;
                }
                current.push(c);
            }
        }
    }
    if seen_any || !args.is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert!(get_function("random.guid").is_some());
        assert!(get_function("random.int").is_some());
        assert!(get_function("datetime.now").is_some());
        assert!(get_function("datetime.timestamp").is_some());
        assert!(get_function("io.read_file").is_none());
    }

    #[test]
    fn test_call_validates_args() {
        assert!(call("random.guid", &["x".to_string()]).is_err());
        assert!(call("nope.nothing", &[]).is_err());
        assert_eq!(call("random.guid", &[]).unwrap().len(), 36);
    }

    #[test]
    fn test_parse_args() {
        assert!(parse_args("").is_empty());
        assert!(parse_args("   ").is_empty());
        assert_eq!(parse_args("1, 10"), vec!["1", "10"]);
        assert_eq!(parse_args("\"yyyy-MM-dd\""), vec!["yyyy-MM-dd"]);
        assert_eq!(parse_args("'a, b', c"), vec!["a, b", "c"]);
        assert_eq!(parse_args("\"\""), vec![""]);
    }
}
