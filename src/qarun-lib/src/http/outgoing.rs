use super::body::{self, PreparedBody};
use crate::error::{BodyError, HttpError};
use crate::model::{HttpMethod, Request};
use crate::variables::{self, VariableMap};
use indexmap::IndexMap;

/// The transient, fully substituted request. Auth and scripts mutate this,
/// never the stored [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub query: IndexMap<String, String>,
    pub body: PreparedBody,
}

impl OutgoingRequest {
    pub fn from_request(request: &Request, scopes: &[&VariableMap]) -> Result<Self, BodyError> {
        let headers = request
            .headers
            .iter()
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, value)| (name.clone(), variables::substitute(value, scopes)))
            .collect();
        let query = request
            .query_params
            .iter()
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, value)| (name.clone(), variables::substitute(value, scopes)))
            .collect();
        let (method, body) = body::prepare(&request.body, request.method, scopes)?;

        Ok(Self {
            method,
            url: variables::substitute(request.url.trim(), scopes),
            headers,
            query,
            body,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces any header with the same name regardless of case.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.keys().position(|k| k.eq_ignore_ascii_case(name)) {
            Some(index) => {
                if let Some((_, existing)) = self.headers.get_index_mut(index) {
                    *existing = value;
                }
            }
            None => {
                self.headers.insert(name.to_string(), value);
            }
        }
    }

    pub fn set_query(&mut self, name: &str, value: impl Into<String>) {
        self.query.insert(name.to_string(), value.into());
    }

    /// Base URL plus query parameters, appended after any query already in the URL.
    pub fn final_url(&self) -> Result<reqwest::Url, HttpError> {
        let mut url = reqwest::Url::parse(&self.url).map_err(|e| HttpError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}
