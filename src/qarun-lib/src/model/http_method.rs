use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(Self::GET),
            "POST" => Some(Self::POST),
            "PUT" => Some(Self::PUT),
            "PATCH" => Some(Self::PATCH),
            "DELETE" => Some(Self::DELETE),
            "HEAD" => Some(Self::HEAD),
            "OPTIONS" => Some(Self::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::PATCH => "PATCH",
            Self::DELETE => "DELETE",
            Self::HEAD => "HEAD",
            Self::OPTIONS => "OPTIONS",
        }
    }

    /// GET and HEAD never carry a body, whatever the request's body type says.
    pub fn allows_body(&self) -> bool {
        !matches!(self, Self::GET | Self::HEAD)
    }

    pub fn to_reqwest_method(self) -> reqwest::Method {
        match self {
            Self::GET => reqwest::Method::GET,
            Self::POST => reqwest::Method::POST,
            Self::PUT => reqwest::Method::PUT,
            Self::PATCH => reqwest::Method::PATCH,
            Self::DELETE => reqwest::Method::DELETE,
            Self::HEAD => reqwest::Method::HEAD,
            Self::OPTIONS => reqwest::Method::OPTIONS,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::GET));
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::POST));
        assert_eq!(HttpMethod::parse(" patch "), Some(HttpMethod::PATCH));
        assert_eq!(HttpMethod::parse("options"), Some(HttpMethod::OPTIONS));

        assert_eq!(HttpMethod::parse("TRACE"), None);
        assert_eq!(HttpMethod::parse(""), None);
    }

    #[test]
    fn test_allows_body() {
        assert!(!HttpMethod::GET.allows_body());
        assert!(!HttpMethod::HEAD.allows_body());
        assert!(HttpMethod::POST.allows_body());
        assert!(HttpMethod::DELETE.allows_body());
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(HttpMethod::GET.to_reqwest_method(), reqwest::Method::GET);
        assert_eq!(HttpMethod::PATCH.to_reqwest_method(), reqwest::Method::PATCH);
        assert_eq!(
            HttpMethod::OPTIONS.to_reqwest_method(),
            reqwest::Method::OPTIONS
        );
    }

    #[test]
    fn test_serde_uses_upper_case_names() {
        let json = serde_json::to_string(&HttpMethod::DELETE).unwrap();
        assert_eq!(json, "\"DELETE\"");
        let parsed: HttpMethod = serde_json::from_str("\"PUT\"").unwrap();
        assert_eq!(parsed, HttpMethod::PUT);
    }
}
