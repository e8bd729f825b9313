use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref VARIABLE_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_.-]*$").unwrap();
}

pub fn validate_path_exists(path: &str) -> Result<String, String> {
    if Path::new(path).exists() {
        Ok(path.to_string())
    } else {
        Err(format!("Path does not exist: {path}"))
    }
}

/// An `http(s)://` URL or an existing file.
pub fn validate_source(source: &str) -> Result<String, String> {
    if is_url(source) {
        Ok(source.to_string())
    } else {
        validate_path_exists(source)
    }
}

pub fn is_url(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub fn validate_variable_name(name: &str) -> Result<String, String> {
    if name.len() > 50 {
        return Err("Name must be 50 characters or less".to_string());
    }
    if !VARIABLE_NAME_REGEX.is_match(name) {
        return Err(format!(
            "Name must match pattern: {}",
            VARIABLE_NAME_REGEX.as_str()
        ));
    }
    Ok(name.to_string())
}

pub fn validate_variable(variable: &str) -> Result<String, String> {
    let Some((name, _)) = variable.split_once('=') else {
        return Err("Variable must be in format NAME=VALUE".to_string());
    };
    if let Err(e) = validate_variable_name(name) {
        return Err(format!("Invalid variable name: {e}"));
    }
    Ok(variable.to_string())
}

pub fn validate_positive(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(format!("Expected a positive whole number, got '{value}'")),
        Ok(n) => Ok(n),
    }
}

pub fn validate_status_code(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(code) if (100..=599).contains(&code) => Ok(code),
        _ => Err(format!("Expected an HTTP status code, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_variable() {
        assert!(validate_variable("baseUrl=http://localhost:3000").is_ok());
        assert!(validate_variable("api.key=a=b").is_ok());
        assert!(validate_variable("token=").is_ok());

        assert!(validate_variable("token").is_err());
        assert!(validate_variable("1token=x").is_err());
        assert!(validate_variable("my token=x").is_err());
    }

    #[test]
    fn test_validate_source() {
        assert!(validate_source("https://petstore3.swagger.io/api/v3/openapi.json").is_ok());
        assert!(validate_source("definitely/not/here.json").is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert_eq!(validate_positive("30"), Ok(30));
        assert!(validate_positive("0").is_err());
        assert!(validate_positive("-1").is_err());
        assert_eq!(validate_status_code("404"), Ok(404));
        assert!(validate_status_code("99").is_err());
    }
}
