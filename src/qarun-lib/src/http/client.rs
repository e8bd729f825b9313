use super::body::{PreparedBody, JSON_CONTENT_TYPE};
use super::OutgoingRequest;
use crate::config::EngineConfig;
use crate::error::HttpError;
use crate::model::SentRequest;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: String,
    pub elapsed: Duration,
}

impl HttpResponse {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// Exact name first, then case-insensitive: reqwest hands header names
    /// back lowercased, so `Content-Type` would otherwise never match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }
}

pub fn build_client(config: &EngineConfig) -> Result<reqwest::Client, HttpError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| HttpError::Transport(error_chain(&e)))
}

fn header_map(outgoing: &OutgoingRequest, user_agent: &str) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &outgoing.headers {
        let invalid = |message: String| HttpError::InvalidHeader {
            name: name.clone(),
            message,
        };
        let header_name =
            HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(header_name, header_value);
    }
    if !headers.contains_key(USER_AGENT) {
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        }
    }
    Ok(headers)
}

/// Sends the request and reads the whole response. The elapsed time covers
/// the network call and body read only.
pub async fn execute_request(
    client: &reqwest::Client,
    outgoing: &OutgoingRequest,
    config: &EngineConfig,
) -> Result<(HttpResponse, SentRequest), HttpError> {
    let url = outgoing.final_url()?;
    let mut headers = header_map(outgoing, &config.user_agent)?;

    tracing::debug!("{} {}", outgoing.method, url);

    let mut builder = client.request(outgoing.method.to_reqwest_method(), url.clone());
    builder = match &outgoing.body {
        PreparedBody::None => builder,
        PreparedBody::Json(value) => {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
            }
            builder.body(value.to_string())
        }
        PreparedBody::UrlEncoded(fields) => builder.form(fields),
        PreparedBody::Multipart(fields) => {
            let form = fields
                .iter()
                .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                    form.text(name.clone(), value.clone())
                });
            builder.multipart(form)
        }
        PreparedBody::Text(text) => builder.body(text.clone()),
    };

    let sent = SentRequest {
        method: outgoing.method,
        url: url.to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect(),
        body: outgoing.body.display_text(),
    };
    for (name, value) in &sent.headers {
        tracing::debug!("  {name}: {value}");
    }

    let started = Instant::now();
    let response = builder
        .headers(headers)
        .send()
        .await
        .map_err(|e| map_reqwest_error(e, config))?;
    let status = response.status().as_u16();

    let mut response_headers: IndexMap<String, String> = IndexMap::new();
    for (name, value) in response.headers() {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        response_headers
            .entry(name.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    let body = response
        .text()
        .await
        .map_err(|e| match map_reqwest_error(e, config) {
            timeout @ HttpError::Timeout(_) => timeout,
            other => HttpError::Body(other.to_string()),
        })?;
    let elapsed = started.elapsed();

    tracing::debug!("response {} in {} ms", status, elapsed.as_millis());

    Ok((
        HttpResponse {
            status,
            headers: response_headers,
            body,
            elapsed,
        },
        sent,
    ))
}

fn map_reqwest_error(error: reqwest::Error, config: &EngineConfig) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout(config.request_timeout.as_millis() as u64)
    } else if error.is_connect() {
        HttpError::Connect(error_chain(&error))
    } else {
        HttpError::Transport(error_chain(&error))
    }
}

/// reqwest's top-level message hides the cause; walk the source chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
