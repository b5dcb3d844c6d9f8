//! End-to-end runs of the executor against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `Executor` with the
//! real `UreqTransport` over HTTP. Covers joining, redirect chains and
//! limits, JSON mode, header precedence and charset decoding.

use std::net::SocketAddr;

use http_task_core::{Executor, RequestSpec, ResponseBody, TaskResult};
use serde_json::json;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn run(spec: &RequestSpec) -> TaskResult {
    Executor::new().execute(spec)
}

fn success(result: TaskResult) -> (ResponseBody, u16) {
    match result {
        TaskResult::Success { body, status_code } => (body, status_code),
        failure => panic!("expected success, got {failure:?}"),
    }
}

#[test]
fn makes_a_request() {
    let addr = start_server();
    let result = run(&RequestSpec::new("get", &format!("http://{addr}/get")));

    let json = serde_json::to_value(&result).unwrap();
    let mut keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, ["body", "status_code"]);
    assert_eq!(json["status_code"], 200);
}

#[test]
fn joins_the_url_and_path() {
    let addr = start_server();
    let spec = RequestSpec {
        path: Some("post".into()),
        ..RequestSpec::new("post", &format!("http://{addr}"))
    };
    let (body, status) = success(run(&spec));
    assert_eq!(status, 200);

    let echo: serde_json::Value = serde_json::from_str(body.as_text().unwrap()).unwrap();
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["url"], format!("http://{addr}/post"));
}

#[test]
fn every_method_is_dispatched_as_its_verb() {
    let addr = start_server();
    for method in ["get", "post", "put", "patch", "delete", "options"] {
        let spec = RequestSpec {
            json_endpoint: true,
            ..RequestSpec::new(method, &format!("http://{addr}/anything"))
        };
        let (body, status) = success(run(&spec));
        assert_eq!(status, 200, "{method}");
        assert_eq!(body.as_json().unwrap()["method"], method.to_uppercase());
    }
}

#[test]
fn head_returns_status_with_empty_body() {
    let addr = start_server();
    let (body, status) = success(run(&RequestSpec::new("HEAD", &format!("http://{addr}/get"))));
    assert_eq!(status, 200);
    assert_eq!(body, ResponseBody::Text(String::new()));
}

#[test]
fn reports_final_status_code() {
    let addr = start_server();
    let (_, status) = success(run(&RequestSpec::new("get", &format!("http://{addr}/status/418"))));
    assert_eq!(status, 418);
}

#[test]
fn follows_redirects() {
    let addr = start_server();
    let spec = RequestSpec {
        follow_redirects: true,
        max_redirects: Some(20),
        json_endpoint: true,
        ..RequestSpec::new("get", &format!("http://{addr}/redirect-to?url=http://{addr}/get"))
    };
    let (body, status) = success(run(&spec));
    assert_eq!(status, 200);
    assert_eq!(body.as_json().unwrap()["url"], format!("http://{addr}/get"));
}

#[test]
fn relative_redirect_chain_resolves() {
    let addr = start_server();
    let spec = RequestSpec {
        follow_redirects: true,
        max_redirects: Some(3),
        ..RequestSpec::new("get", &format!("http://{addr}/relative-redirect/3"))
    };
    let (_, status) = success(run(&spec));
    assert_eq!(status, 200);
}

#[test]
fn redirect_is_returned_when_not_following() {
    let addr = start_server();
    let (_, status) = success(run(&RequestSpec::new(
        "get",
        &format!("http://{addr}/absolute-redirect/1"),
    )));
    assert_eq!(status, 302);
}

#[test]
fn errors_with_too_many_redirects() {
    let addr = start_server();
    let spec = RequestSpec {
        follow_redirects: true,
        max_redirects: Some(3),
        ..RequestSpec::new("get", &format!("http://{addr}/absolute-redirect/5"))
    };
    let json = serde_json::to_value(run(&spec)).unwrap();
    assert_eq!(json["_error"]["kind"], "http_request/too-many-redirects-error");
    assert_eq!(json["_error"]["msg"], "Too many redirects (max: 3)");
}

#[test]
fn zero_max_redirects_rejects_first_redirect() {
    let addr = start_server();
    let spec = RequestSpec {
        follow_redirects: true,
        max_redirects: Some(0),
        ..RequestSpec::new("get", &format!("http://{addr}/absolute-redirect/1"))
    };
    assert_eq!(run(&spec).kind(), Some("http_request/too-many-redirects-error"));
}

#[test]
fn errors_if_the_body_is_not_a_string() {
    let addr = start_server();
    let spec = RequestSpec {
        body: Some(json!({"foo": "bar"})),
        ..RequestSpec::new("post", &format!("http://{addr}/post"))
    };
    let json = serde_json::to_value(run(&spec)).unwrap();
    assert!(json.get("_error").is_some());
    assert_eq!(json["_error"]["kind"], "http_request/body-type-error");
}

#[test]
fn json_endpoint_sets_content_type() {
    let addr = start_server();
    let spec = RequestSpec {
        json_endpoint: true,
        ..RequestSpec::new("get", &format!("http://{addr}/headers"))
    };
    let (body, _) = success(run(&spec));
    assert_eq!(body.as_json().unwrap()["headers"]["Content-Type"], "application/json");
}

#[test]
fn json_endpoint_content_type_can_be_overridden() {
    let addr = start_server();
    let spec = RequestSpec {
        json_endpoint: true,
        headers: [("Content-Type".to_string(), "text/plain".to_string())].into(),
        ..RequestSpec::new("get", &format!("http://{addr}/headers"))
    };
    let (body, _) = success(run(&spec));
    assert_eq!(body.as_json().unwrap()["headers"]["Content-Type"], "text/plain");
}

#[test]
fn json_endpoint_formats_body_as_json() {
    let addr = start_server();
    let spec = RequestSpec {
        json_endpoint: true,
        body: Some(json!({"foo": "bar"})),
        ..RequestSpec::new("post", &format!("http://{addr}/anything"))
    };
    let (body, _) = success(run(&spec));
    assert_eq!(body.as_json().unwrap()["json"], json!({"foo": "bar"}));
}

#[test]
fn json_endpoint_reports_unparsable_body() {
    let addr = start_server();
    let spec = RequestSpec {
        json_endpoint: true,
        ..RequestSpec::new("get", &format!("http://{addr}/html"))
    };
    assert_eq!(run(&spec).kind(), Some("http_request/json-parse-error"));
}

#[test]
fn json_endpoint_rejects_empty_ok_body() {
    let addr = start_server();
    let spec = RequestSpec {
        json_endpoint: true,
        ..RequestSpec::new("get", &format!("http://{addr}/status/200"))
    };
    assert_eq!(run(&spec).kind(), Some("http_request/json-parse-error"));

    let spec = RequestSpec {
        json_endpoint: true,
        ..RequestSpec::new("get", &format!("http://{addr}/status/204"))
    };
    let (body, status) = success(run(&spec));
    assert_eq!(status, 204);
    assert_eq!(body, ResponseBody::Json(serde_json::Value::Null));
}

#[test]
fn decodes_declared_charset_to_utf8() {
    let addr = start_server();
    let (body, _) = success(run(&RequestSpec::new(
        "get",
        &format!("http://{addr}/encoding/latin1"),
    )));
    assert_eq!(body.as_text(), Some(mock_server::LATIN1_TEXT));

    let (body, _) = success(run(&RequestSpec::new(
        "get",
        &format!("http://{addr}/encoding/utf8"),
    )));
    assert_eq!(body.as_text(), Some("\u{2713} unicode \u{263a}"));
}

#[test]
fn undecodable_body_is_an_encoding_error() {
    let addr = start_server();
    for route in ["invalid", "unknown"] {
        let result = run(&RequestSpec::new("get", &format!("http://{addr}/encoding/{route}")));
        assert_eq!(result.kind(), Some("http_request/encoding-error"), "{route}");
    }
}

#[test]
fn connection_failure_is_a_connect_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/get");
    let json = serde_json::to_value(run(&RequestSpec::new("get", &url))).unwrap();
    assert_eq!(json["_error"]["kind"], "http_request/connect-error");
    assert!(json["_error"]["msg"]
        .as_str()
        .unwrap()
        .starts_with(&format!("Failed to connect to {url}")));
}

#[test]
fn repeated_requests_are_identical() {
    let addr = start_server();
    let spec = RequestSpec::new("get", &format!("http://{addr}/encoding/utf8"));
    assert_eq!(run(&spec), run(&spec));
}
