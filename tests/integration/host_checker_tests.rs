//! Real checker tests.
//!
//! Runs `HostChecker` against a local server on 127.0.0.1.

use std::time::Duration;

use check_service::check::{CheckRequest, Checker, HostChecker};
use check_service::cli::output::Console;
use check_service::net::client::HttpConfig;
use check_service::{CheckError, CheckOrchestrator};

use crate::mocks::{closed_port, MockServer};

const OK_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 7\r\nConnection: close\r\n\r\nhealthy";

fn checker() -> HostChecker {
    HostChecker::with_config(HttpConfig {
        connect_timeout_ms: 5000,
        read_timeout_ms: 5000,
    })
}

#[test]
fn test_direct_get() {
    let server = MockServer::serve(OK_RESPONSE);
    let uri = format!("http://127.0.0.1:{}/status?full=1", server.port);

    let outcome = checker()
        .check(&CheckRequest::new(uri, None::<String>))
        .unwrap();

    assert_eq!(outcome.status, Some(200));
    assert_eq!(outcome.reason, "OK");
    assert_eq!(outcome.body, "healthy");
    assert_eq!(outcome.warning, None);

    let request = server.request();
    assert!(request.starts_with("GET /status?full=1 HTTP/1.1\r\n"));
}

#[test]
fn test_routed_get_preserves_host_header() {
    let server = MockServer::serve(OK_RESPONSE);
    let port = server.port;
    // The URI host never resolves; only the routing host is contacted
    let uri = format!("http://service.example.invalid:{}/status", port);

    let outcome = checker()
        .check(&CheckRequest::new(uri, Some("127.0.0.1")))
        .unwrap();

    assert_eq!(outcome.status, Some(200));
    let request = server.request();
    assert!(request.starts_with("GET /status HTTP/1.1\r\n"));
    assert!(request.contains(&format!("Host: service.example.invalid:{}\r\n", port)));
}

#[test]
fn test_chunked_body() {
    let server = MockServer::serve(
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n4\r\ndefg\r\n0\r\n\r\n",
    );
    let uri = format!("http://127.0.0.1:{}/", server.port);

    let outcome = checker()
        .check(&CheckRequest::new(uri, None::<String>))
        .unwrap();

    assert_eq!(outcome.body, "abcdefg");
    server.request();
}

#[test]
fn test_not_found_is_error_response() {
    let server = MockServer::serve("HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\n\r\ngone");
    let uri = format!("http://127.0.0.1:{}/incorrecturi", server.port);

    let result = checker().check(&CheckRequest::new(uri, None::<String>));

    match result {
        Err(CheckError::ErrorResponse { response, warning }) => {
            assert_eq!(response.status, 404);
            assert_eq!(response.reason, "Not Found");
            assert_eq!(response.body, "gone");
            assert_eq!(warning, None);
        }
        other => panic!("expected error response, got {:?}", other),
    }
    server.request();
}

#[test]
fn test_redirect_is_followed() {
    let target = MockServer::serve(OK_RESPONSE);
    let location = format!("http://127.0.0.1:{}/status/", target.port);
    let origin = MockServer::serve(format!(
        "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\n\r\n",
        location
    ));
    let uri = format!("http://127.0.0.1:{}/status", origin.port);

    let outcome = checker()
        .check(&CheckRequest::new(uri, None::<String>))
        .unwrap();

    assert_eq!(outcome.status, Some(200));
    assert_eq!(outcome.body, "healthy");
    assert_eq!(outcome.exit_code(), 0);
    assert!(origin.request().starts_with("GET /status HTTP/1.1\r\n"));
    assert!(target.request().starts_with("GET /status/ HTTP/1.1\r\n"));
}

#[test]
fn test_relative_redirect_stays_on_routing_host() {
    let server = MockServer::serve_all(vec![
        "HTTP/1.1 301 Moved Permanently\r\nLocation: /status/\r\nContent-Length: 0\r\n\r\n"
            .to_string(),
        OK_RESPONSE.to_string(),
    ]);
    let port = server.port;
    let uri = format!("http://service.example.invalid:{}/status", port);

    let outcome = checker()
        .check(&CheckRequest::new(uri, Some("127.0.0.1")))
        .unwrap();

    assert_eq!(outcome.status, Some(200));
    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].starts_with("GET /status/ HTTP/1.1\r\n"));
    assert!(requests[1].contains(&format!("Host: service.example.invalid:{}\r\n", port)));
}

#[test]
fn test_too_many_redirects() {
    let redirect = "HTTP/1.1 307 Temporary Redirect\r\nLocation: /again\r\nContent-Length: 0\r\n\r\n";
    let server = MockServer::serve_all(vec![redirect.to_string(), redirect.to_string()]);
    let uri = format!("http://127.0.0.1:{}/", server.port);

    let result = checker()
        .with_max_redirects(1)
        .check(&CheckRequest::new(uri, None::<String>));

    match result {
        Err(CheckError::Other(message)) => assert!(message.starts_with("Too many redirects")),
        other => panic!("expected too many redirects, got {:?}", other),
    }
    assert_eq!(server.requests().len(), 2);
}

#[test]
fn test_stalled_body_is_an_error() {
    let server = MockServer::serve_stalled(
        "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial",
        Duration::from_secs(2),
    );
    let uri = format!("http://127.0.0.1:{}/", server.port);

    let checker = HostChecker::with_config(HttpConfig {
        connect_timeout_ms: 5000,
        read_timeout_ms: 500,
    });
    let result = checker.check(&CheckRequest::new(uri, None::<String>));

    assert!(matches!(result, Err(CheckError::Io { .. })), "got {:?}", result);
    server.request();
}

#[test]
fn test_complete_body_on_open_connection() {
    let server = MockServer::serve_stalled(OK_RESPONSE, Duration::from_secs(2));
    let uri = format!("http://127.0.0.1:{}/", server.port);

    let checker = HostChecker::with_config(HttpConfig {
        connect_timeout_ms: 5000,
        read_timeout_ms: 500,
    });
    let outcome = checker
        .check(&CheckRequest::new(uri, None::<String>))
        .unwrap();

    assert_eq!(outcome.body, "healthy");
    server.request();
}

#[test]
fn test_unresolvable_routing_host() {
    let result = checker().check(&CheckRequest::new(
        "http://127.0.0.1/",
        Some("no-such-node.example.invalid"),
    ));

    match result {
        Err(CheckError::HostNotFound { host }) => assert_eq!(host, "no-such-node.example.invalid"),
        other => panic!("expected host not found, got {:?}", other),
    }
}

#[test]
fn test_invalid_uri() {
    let result = checker().check(&CheckRequest::new("not a uri", None::<String>));
    assert!(matches!(result, Err(CheckError::InvalidEndpoint { .. })));
}

#[test]
fn test_unsupported_scheme() {
    let result = checker().check(&CheckRequest::new("ftp://127.0.0.1/file", None::<String>));
    assert!(matches!(result, Err(CheckError::UnsupportedScheme { .. })));
}

#[test]
fn test_connection_refused() {
    let uri = format!("http://127.0.0.1:{}/", closed_port());
    let result = checker().check(&CheckRequest::new(uri, None::<String>));
    assert!(matches!(result, Err(CheckError::Connect { .. })));
}

#[test]
fn test_full_run_through_routing_host() {
    let server = MockServer::serve(OK_RESPONSE);
    let uri = format!("http://service.example.invalid:{}/status", server.port);

    let orchestrator = CheckOrchestrator::new(checker());
    let mut console = Console::new(Vec::new(), false);
    let code = orchestrator.run([uri.as_str(), "-d", "127.0.0.1"], &mut console);
    let output = String::from_utf8(console.into_inner()).unwrap();

    assert_eq!(code, 0);
    assert!(output.contains(&format!("200 OK from HTTP GET to {} on 127.0.0.1", uri)));
    assert!(output.contains("healthy"));
    server.request();
}

#[test]
fn test_full_run_server_error() {
    let server = MockServer::serve(
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 5\r\n\r\nboom!",
    );
    let uri = format!("http://127.0.0.1:{}/", server.port);

    let orchestrator = CheckOrchestrator::new(checker());
    let mut console = Console::new(Vec::new(), false);
    let code = orchestrator.run([uri.as_str()], &mut console);
    let output = String::from_utf8(console.into_inner()).unwrap();

    assert_eq!(code, 500);
    assert!(output.contains("500 Internal Server Error from HTTP GET"));
    assert!(output.contains("boom!"));
    server.request();
}

#[test]
fn test_full_run_unresolvable_routing_host() {
    let orchestrator = CheckOrchestrator::new(checker());
    let mut console = Console::new(Vec::new(), false);
    let code = orchestrator.run(
        ["http://127.0.0.1/", "-d", "no-such-node.example.invalid"],
        &mut console,
    );
    let output = String::from_utf8(console.into_inner()).unwrap();

    assert_eq!(code, -2);
    assert!(output.contains("Host no-such-node.example.invalid cannot be contacted or does not exist."));
}
