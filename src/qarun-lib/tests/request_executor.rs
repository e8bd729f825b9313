use qarun_lib::model::{
    Assertion, AssertionOperator, AssertionType, Auth, BearerConfig, ExecutionStatus,
    HttpMethod, OAuth2Config, Request, RequestBody,
};
use qarun_lib::{EngineConfig, RequestExecutor, VariableMap};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn vars(pairs: &[(&str, &str)]) -> VariableMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn executor() -> RequestExecutor {
    RequestExecutor::new(EngineConfig::default()).unwrap()
}

#[tokio::test]
async fn test_substituted_request_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(query_param("notify", "yes"))
        .and(header("X-Tenant", "acme"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "name": "Ada \"the first\"", "age": 36 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "create".to_string(),
        title: "Create user".to_string(),
        method: HttpMethod::POST,
        url: "{{baseUrl}}/users".to_string(),
        headers: [("X-Tenant".to_string(), "{{tenant}}".to_string())]
            .into_iter()
            .collect(),
        query_params: [("notify".to_string(), "yes".to_string())]
            .into_iter()
            .collect(),
        body: RequestBody::Json(r#"{"name": "{{name}}", "age": 36}"#.to_string()),
        assertions: vec![
            Assertion::new(AssertionType::StatusCode, "", AssertionOperator::Equals, "201"),
            Assertion::new(AssertionType::JsonPath, "id", AssertionOperator::Equals, "7"),
        ],
        ..Default::default()
    };
    let scope = vars(&[
        ("baseUrl", &mock_server.uri()),
        ("tenant", "acme"),
        ("name", "Ada \"the first\""),
    ]);

    let execution = executor().execute(&request, &[&scope]).await;

    assert_eq!(execution.status, ExecutionStatus::Passed, "{:?}", execution.failures);
    assert_eq!(execution.status_code, Some(201));
    assert_eq!(execution.assertion_results.len(), 2);

    let sent = execution.sent_request.expect("sent request recorded");
    assert_eq!(sent.method, HttpMethod::POST);
    assert_eq!(sent.url, format!("{}/users?notify=yes", mock_server.uri()));
    assert_eq!(sent.headers.get("x-tenant").map(String::as_str), Some("acme"));
}

#[tokio::test]
async fn test_failed_assertions_are_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("x-region", "eu-west")
                .set_body_json(json!({ "status": "degraded" })),
        )
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "health".to_string(),
        url: format!("{}/health", mock_server.uri()),
        assertions: vec![
            Assertion::new(AssertionType::StatusCode, "", AssertionOperator::Equals, "200"),
            Assertion::new(
                AssertionType::HeaderValue,
                "X-Region",
                AssertionOperator::MatchesRegex,
                "^eu-",
            ),
            Assertion::new(
                AssertionType::JsonPath,
                "status",
                AssertionOperator::Equals,
                "ok",
            ),
        ],
        ..Default::default()
    };

    let execution = executor().execute(&request, &[]).await;

    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.status_code, Some(503));
    assert_eq!(
        execution.failures,
        vec![
            "STATUS_CODE: expected status 200, got 503".to_string(),
            "JSON_PATH status: expected 'ok', got 'degraded'".to_string(),
        ]
    );
    assert!(execution.assertion_results[1].passed);
}

#[tokio::test]
async fn test_bearer_token_from_extracted_scope_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("Authorization", "Bearer from-login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "me".to_string(),
        url: format!("{}/me", mock_server.uri()),
        auth: Auth::Bearer(BearerConfig {
            token: "{{token}}".to_string(),
        }),
        ..Default::default()
    };
    let extracted = vars(&[("token", "from-login")]);
    let environment = vars(&[("token", "from-environment")]);

    let execution = executor()
        .execute(&request, &[&extracted, &environment])
        .await;

    assert_eq!(execution.status, ExecutionStatus::Passed);
    assert_eq!(execution.status_code, Some(200));
}

#[tokio::test]
async fn test_oauth2_client_credentials_token_is_fetched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=qa-client"))
        .and(body_string_contains("client_secret=qa-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "issued-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .and(header("Authorization", "Bearer issued-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "reports".to_string(),
        url: format!("{}/reports", mock_server.uri()),
        auth: Auth::OAuth2(OAuth2Config {
            token_url: "{{authUrl}}/token".to_string(),
            client_id: "qa-client".to_string(),
            client_secret: "{{clientSecret}}".to_string(),
            ..Default::default()
        }),
        assertions: vec![Assertion::new(
            AssertionType::StatusCode,
            "",
            AssertionOperator::Equals,
            "200",
        )],
        ..Default::default()
    };
    let scope = vars(&[("authUrl", &mock_server.uri()), ("clientSecret", "qa-secret")]);

    let execution = executor().execute(&request, &[&scope]).await;

    assert_eq!(execution.status, ExecutionStatus::Passed, "{:?}", execution.error_message);
}

#[tokio::test]
async fn test_oauth2_token_failure_is_an_error_execution() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "reports".to_string(),
        url: format!("{}/reports", mock_server.uri()),
        auth: Auth::OAuth2(OAuth2Config {
            token_url: format!("{}/token", mock_server.uri()),
            client_id: "qa-client".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    };

    let execution = executor().execute(&request, &[]).await;

    assert_eq!(execution.status, ExecutionStatus::Error);
    assert_eq!(execution.status_code, None);
    let message = execution.error_message.unwrap();
    assert!(message.contains("401"), "{message}");
    assert!(message.contains("invalid_client"), "{message}");
}

#[tokio::test]
async fn test_graphql_always_posts_query_and_variables() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_json(json!({
            "query": "query User($id: ID!) { user(id: $id) { name } }",
            "variables": { "id": "42" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "user": { "name": "Ada" } } })),
        )
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "gql".to_string(),
        // Stored as GET; GraphQL bodies are sent with POST regardless.
        method: HttpMethod::GET,
        url: format!("{}/graphql", mock_server.uri()),
        body: RequestBody::GraphQl {
            query: "query User($id: ID!) { user(id: $id) { name } }".to_string(),
            variables: r#"{"id": "{{userId}}"}"#.to_string(),
        },
        assertions: vec![Assertion::new(
            AssertionType::JsonPath,
            "data.user.name",
            AssertionOperator::Equals,
            "Ada",
        )],
        ..Default::default()
    };
    let scope = vars(&[("userId", "42")]);

    let execution = executor().execute(&request, &[&scope]).await;

    assert_eq!(execution.status, ExecutionStatus::Passed, "{:?}", execution.failures);
    assert_eq!(execution.sent_request.unwrap().method, HttpMethod::POST);
}

#[tokio::test]
async fn test_pre_request_script_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/signed"))
        .and(header("X-Signature", "sig-abc"))
        .and(query_param("nonce", "n1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "signed".to_string(),
        url: format!("{}/signed", mock_server.uri()),
        pre_request_script: Some(
            r#"
            let headers = #{ "X-Signature": "sig-" + "abc" };
            let queryParams = #{ nonce: "n1" };
            "#
            .to_string(),
        ),
        assertions: vec![Assertion::new(
            AssertionType::StatusCode,
            "",
            AssertionOperator::Equals,
            "200",
        )],
        ..Default::default()
    };

    let execution = executor().execute(&request, &[]).await;

    assert_eq!(execution.status, ExecutionStatus::Passed);
    assert!(execution.warnings.is_empty());
}

#[tokio::test]
async fn test_broken_script_is_a_warning_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "ping".to_string(),
        url: format!("{}/ping", mock_server.uri()),
        pre_request_script: Some("let headers = ".to_string()),
        ..Default::default()
    };

    let execution = executor().execute(&request, &[]).await;

    assert_eq!(execution.status, ExecutionStatus::Passed);
    assert_eq!(execution.warnings.len(), 1);
    assert!(execution.warnings[0].starts_with("Pre-request script failed"));
}

#[tokio::test]
async fn test_custom_assertion_sees_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": [1, 2, 3], "total": 30 })),
        )
        .mount(&mock_server)
        .await;

    let request = Request {
        id: "cart".to_string(),
        url: format!("{}/cart", mock_server.uri()),
        assertions: vec![
            Assertion::new(
                AssertionType::Custom,
                "",
                AssertionOperator::Custom,
                "status == 200 && json.items.len() == 3",
            ),
            Assertion::new(
                AssertionType::Custom,
                "",
                AssertionOperator::Custom,
                "json.total > 100",
            ),
        ],
        ..Default::default()
    };

    let execution = executor().execute(&request, &[]).await;

    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert!(execution.assertion_results[0].passed);
    assert!(!execution.assertion_results[1].passed);
}
