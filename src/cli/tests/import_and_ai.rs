use serde_json::{json, Value};
use std::fs;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{qarun_cmd, read_workspace, stderr, stdout};

fn petstore() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "servers": [{ "url": "https://petstore.test/v1" }],
        "paths": {
            "/pets": {
                "get": { "tags": ["pets"], "summary": "List pets" },
                "post": {
                    "tags": ["pets"],
                    "summary": "Create pet",
                    "requestBody": { "content": { "application/json": {
                        "schema": { "type": "object", "properties": { "name": { "type": "string", "example": "Rex" } } }
                    }}}
                }
            },
            "/store/inventory": {
                "get": { "tags": ["store"], "operationId": "getInventory" }
            }
        }
    })
}

fn chat_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

#[test]
fn test_import_openapi_file_separate_collections() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let spec_path = dir.path().join("petstore.json");
    fs::write(&spec_path, petstore().to_string())?;
    let workspace = dir.path().join("qarun.json");

    let output = qarun_cmd()
        .args(["import", "openapi", "--separate", "-w"])
        .arg(&workspace)
        .arg(&spec_path)
        .output()?;

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Successfully imported 3 API requests from Petstore"));
    assert!(out.contains("Petstore - pets"));
    assert!(out.contains("Petstore - store"));

    let saved = read_workspace(&workspace);
    assert_eq!(saved["collections"].as_array().unwrap().len(), 2);
    let requests = saved["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 3);
    let create = requests.iter().find(|r| r["title"] == "Create pet").unwrap();
    assert_eq!(create["url"], "https://petstore.test/v1/pets");
    assert_eq!(create["bodyType"], "JSON");
    assert_eq!(create["body"]["name"], "Rex");
    Ok(())
}

#[test]
fn test_import_rejects_document_without_paths() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let spec_path = dir.path().join("broken.json");
    fs::write(
        &spec_path,
        json!({ "openapi": "3.0.0", "info": { "title": "T", "version": "1" } }).to_string(),
    )?;
    let workspace = dir.path().join("qarun.json");

    let output = qarun_cmd()
        .args(["import", "openapi", "-w"])
        .arg(&workspace)
        .arg(&spec_path)
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error: Import failed:"));
    assert!(!workspace.exists());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_import_openapi_from_url() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(petstore()))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir()?;
    let workspace = dir.path().join("qarun.json");

    let output = qarun_cmd()
        .args(["import", "openapi", "-o", "json", "-w"])
        .arg(&workspace)
        .arg(format!("{}/openapi.json", mock_server.uri()))
        .output()?;

    assert!(output.status.success(), "{}", stderr(&output));
    let summary: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(summary["totalRequests"], 3);
    assert_eq!(summary["collections"][0]["title"], "Petstore");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_import_url_not_found_is_network_error() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir()?;
    let output = qarun_cmd()
        .args(["import", "openapi", "-w"])
        .arg(dir.path().join("qarun.json"))
        .arg(format!("{}/missing.json", mock_server.uri()))
        .output()?;

    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).contains("status 404"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ai_request_saved_to_collection() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    let reply = "```json\n{\"title\": \"Get user\", \"method\": \"GET\", \"url\": \"https://api.test/users/1\", \"headers\": {\"Accept\": \"application/json\"}, \"description\": \"Fetches one user\"}\n```";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(reply)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir()?;
    let workspace = common::write_workspace(
        dir.path(),
        &json!({ "collections": [{ "id": "c1", "title": "Users" }] }),
    );

    let output = qarun_cmd()
        .args(["ai", "request", "fetch user 1", "-c", "Users", "-o", "json", "-w"])
        .arg(&workspace)
        .arg("--ai-endpoint")
        .arg(format!("{}/v1", mock_server.uri()))
        .env("QARUN_AI_API_KEY", "test-key")
        .output()?;

    assert!(output.status.success(), "{}", stderr(&output));
    let generated: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(generated["description"], "Fetches one user");

    let saved = read_workspace(&workspace);
    let requests = saved["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["collectionId"], "c1");
    assert_eq!(requests[0]["url"], "https://api.test/users/1");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ai_assertions_from_body_file() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    let reply = r#"[
        {"type": "STATUS_CODE", "operator": "EQUALS", "expectedValue": "200", "description": "OK"},
        {"type": "JSON_PATH", "field": "id", "operator": "EXISTS", "expectedValue": "", "description": "has id"}
    ]"#;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(reply)))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir()?;
    let workspace = common::write_workspace(
        dir.path(),
        &json!({
            "collections": [{ "id": "c1", "title": "Users" }],
            "requests": [{ "id": "r1", "title": "Get", "url": "https://api.test/u", "collectionId": "c1" }]
        }),
    );
    let body_file = dir.path().join("body.json");
    fs::write(&body_file, r#"{"id": 1}"#)?;

    let output = qarun_cmd()
        .args(["ai", "assertions", "r1", "--save", "-w"])
        .arg(&workspace)
        .arg("--body-file")
        .arg(&body_file)
        .arg("--ai-endpoint")
        .arg(format!("{}/v1", mock_server.uri()))
        .output()?;

    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Suggested assertions:"));
    assert!(out.contains("STATUS_CODE EQUALS 200"));
    assert!(out.contains("JSON_PATH id EXISTS"));

    let saved = read_workspace(&workspace);
    assert_eq!(saved["requests"][0]["assertions"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ai_rejects_invalid_operator() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    let reply = r#"[{"type": "JSON_PATH", "field": "age", "operator": "GREATER_THAN", "expectedValue": "0"}]"#;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(reply)))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir()?;
    let workspace = common::write_workspace(
        dir.path(),
        &json!({
            "collections": [{ "id": "c1", "title": "Users" }],
            "requests": [{ "id": "r1", "title": "Get", "url": "https://api.test/u", "collectionId": "c1" }]
        }),
    );
    let body_file = dir.path().join("body.json");
    fs::write(&body_file, r#"{"age": 3}"#)?;

    let output = qarun_cmd()
        .args(["ai", "assertions", "r1", "--save", "-w"])
        .arg(&workspace)
        .arg("--body-file")
        .arg(&body_file)
        .arg("--ai-endpoint")
        .arg(format!("{}/v1", mock_server.uri()))
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("generated item 0 is invalid"));
    let saved = read_workspace(&workspace);
    assert!(saved["requests"][0]["assertions"].as_array().unwrap().is_empty());
    Ok(())
}
