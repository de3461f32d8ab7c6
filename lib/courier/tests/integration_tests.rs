//! Integration tests for `Client` over `HyperTransport` using wiremock.

use std::time::Duration;

use assert2::{check, let_assert};
use courier::{
    AbortController, Client, Error, FileValue, HeaderMap, HeaderValue, ResponseData, TransportOptions,
    Value,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, header, header_regex, method, path, query_param},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

fn client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .prefix("/api")
        .header("x-client", "courier-tests")
        .build()
        .expect("client")
}

#[tokio::test]
async fn test_get_json() {
    let mock_server = MockServer::start().await;

    let user = User {
        id: 1,
        name: "Alice".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/api/users/1"))
        .and(header("x-client", "courier-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&user))
        .mount(&mock_server)
        .await;

    let response = client(&mock_server).get("/users/1").send().await.expect("response");

    check!(response.status_code == 200);
    let_assert!(ResponseData::Json(data) = &response.data);
    check!(data == &json!({"id": 1, "name": "Alice"}));
    check!(response.json::<User>().expect("typed") == user);
}

#[tokio::test]
async fn test_send_json_typed() {
    let mock_server = MockServer::start().await;

    let input = json!({"name": "Bob"});
    let output = User {
        id: 42,
        name: "Bob".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(&input))
        .respond_with(ResponseTemplate::new(201).set_body_json(&output))
        .mount(&mock_server)
        .await;

    let created = client(&mock_server)
        .post("/users")
        .json(&input)
        .send_json::<User>()
        .await
        .expect("created");

    check!(created.status_code == 201);
    check!(created.data == output);
}

#[tokio::test]
async fn test_text_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/plain; charset=utf-8"))
        .mount(&mock_server)
        .await;

    let response = client(&mock_server).get("/health").send().await.expect("response");

    check!(response.data.as_text() == Some("ok"));
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/logo"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50], "image/png"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).get("/logo").send().await;

    let_assert!(Err(Error::UnsupportedContentType(content_type)) = result);
    check!(content_type == "image/png");
}

#[tokio::test]
async fn test_http_error_carries_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).get("/users/999").send().await;

    let_assert!(Err(err) = result);
    check!(err.is_http());
    check!(err.status() == Some(404));
    let_assert!(Some(body) = err.body());
    check!(body.as_json() == Some(&json!({"error": "not found"})));
}

#[tokio::test]
async fn test_http_error_with_text_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).delete("/users/1").send().await;

    let_assert!(Err(Error::Http(failure)) = result);
    check!(failure.status() == 503);
    check!(failure.body().as_text() == Some("maintenance"));
}

#[tokio::test]
async fn test_nested_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "rust"))
        .and(query_param("filter[lang]", "en"))
        .and(query_param("tags[0]", "async"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = client(&mock_server)
        .get_with_query("/search", json!({"q": "rust", "filter": {"lang": "en"}}))
        .query_value(json!({"tags": ["async"]}))
        .send()
        .await
        .expect("response");

    check!(response.status_code == 200);
}

#[tokio::test]
async fn test_form_sends_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/profile"))
        .and(header_regex("content-type", "^multipart/form-data; boundary=.+$"))
        .and(body_string_contains("name=\"user[name]\""))
        .and(body_string_contains("filename=\"me.png\""))
        .and(body_string_contains("PNG-DATA"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let avatar = FileValue::new("me.png", b"PNG-DATA".to_vec()).with_content_type("image/png");
    let payload = Value::object([(
        "user",
        Value::object([("name", Value::from("Ada")), ("avatar", Value::File(avatar))]),
    )]);

    let response = client(&mock_server)
        .post("/profile")
        .header("content-type", "application/json")
        .form(payload)
        .send()
        .await
        .expect("response");

    check!(response.status_code == 204);
}

#[tokio::test]
async fn test_get_never_sends_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .get("/items")
        .json(&json!({"ignored": true}))
        .send()
        .await
        .expect("response");

    let requests = mock_server.received_requests().await.expect("recording enabled");
    let_assert!([request] = requests.as_slice());
    check!(request.body.is_empty());
}

#[tokio::test]
async fn test_header_precedence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/whoami"))
        .and(header("x-client", "override"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert("x-client", HeaderValue::from_static("override"));

    let response = client(&mock_server)
        .get("/whoami")
        .header("x-client", "descriptor")
        .header("x-trace", "abc")
        .send_with(headers, TransportOptions::new())
        .await
        .expect("response");

    check!(response.status_code == 200);
}

#[tokio::test]
async fn test_abort_during_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let controller = AbortController::new();
    let aborter = controller.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        aborter.abort();
    });

    let result = client(&mock_server)
        .get("/slow")
        .signal(controller.signal())
        .send()
        .await;

    let_assert!(Err(Error::Aborted) = result);
}

#[tokio::test]
async fn test_already_aborted_sends_nothing() {
    let mock_server = MockServer::start().await;

    let controller = AbortController::new();
    controller.abort();

    let result = client(&mock_server)
        .get("/never")
        .signal(controller.signal())
        .send()
        .await;

    let_assert!(Err(Error::Aborted) = result);
    let requests = mock_server.received_requests().await.expect("recording enabled");
    check!(requests.is_empty());
}

#[tokio::test]
async fn test_connection_error() {
    let client = Client::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .expect("client");

    let result = client.get("/").send().await;

    let err = result.expect_err("expected connection error");
    assert!(err.is_connection(), "Expected connection error, got: {err}");
}

#[tokio::test]
async fn test_debug_does_not_change_outcome() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Updated"})))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let quiet = client.put("/users/1").json(&json!({"name": "Updated"})).send().await;
    let verbose = client
        .put("/users/1")
        .json(&json!({"name": "Updated"}))
        .debug(true)
        .send()
        .await;

    let_assert!(Ok(quiet) = quiet);
    let_assert!(Ok(verbose) = verbose);
    check!(quiet == verbose);
}
