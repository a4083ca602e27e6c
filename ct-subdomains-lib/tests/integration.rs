// ct-subdomains-lib/tests/integration.rs

//! End-to-end tests against a local mock of the search endpoint.

use ct_subdomains_lib::{
    extract_subdomains, ExtractConfig, ExtractError, SubdomainExtractor, ACCEPT_ENCODING,
    ACCEPT_LANGUAGE, DEFAULT_USER_AGENT,
};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULTS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>crt.sh | example.com</title></head>
<body>
<table><tr><td class="title">crt.sh</td></tr></table>
<table class="outer">
  <tr><th>Criteria</th><td>Type: Identity Match: ILIKE Search: 'example.com'</td></tr>
  <tr><th>Certificates</th><td>
    <table>
      <tr>
        <th>crt.sh ID</th><th>Logged At</th><th>Not Before</th>
        <th>Not After</th><th>Matching Identities</th><th>Issuer Name</th>
      </tr>
      <tr>
        <td><a href="?id=1">1</a></td><td>2024-05-01</td><td>2024-05-01</td>
        <td>2024-07-30</td><td>*.example.com<br>example.com</td>
        <td>C=US, O=Let's Encrypt, CN=R3</td>
      </tr>
      <tr>
        <td><a href="?id=2">2</a></td><td>2024-04-01</td><td>2024-04-01</td>
        <td>2024-06-30</td><td>www.example.com</td>
        <td>C=US, O=Let's Encrypt, CN=R3</td>
      </tr>
      <tr>
        <td><a href="?id=3">3</a></td><td>2024-03-01</td><td>2024-03-01</td>
        <td>2024-05-30</td><td>cdn.other.net</td>
        <td>C=US, O=Let's Encrypt, CN=R3</td>
      </tr>
    </table>
  </td></tr>
</table>
</body>
</html>"#;

fn config_for(server: &MockServer) -> ExtractConfig {
    ExtractConfig::default()
        .with_search_url(format!("{}/", server.uri()))
        .with_timeout(Duration::from_secs(5))
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_extracts_subdomains_from_results_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let domains = extract_subdomains("example.com", &config_for(&server))
        .await
        .unwrap();

    assert_eq!(domains, set(&["example.com", "www.example.com"]));
}

#[tokio::test]
async fn test_sends_browser_like_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let result = SubdomainExtractor::with_config(&config_for(&server))
        .unwrap()
        .extract("example.com")
        .await
        .unwrap();

    assert_eq!(result.subdomains.len(), 2);
    assert!(result.report.results_table_present);
    assert_eq!(result.report.rows_inspected(), 3);

    // Compare raw values; these headers contain commas
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let headers = &requests[0].headers;
    assert_eq!(headers["accept-encoding"], ACCEPT_ENCODING);
    assert_eq!(headers["accept-language"], ACCEPT_LANGUAGE);
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string(RESULTS_PAGE))
        .mount(&server)
        .await;

    let err = extract_subdomains("example.com", &config_for(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::FetchError { .. }));
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(RESULTS_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).with_timeout(Duration::from_millis(200));
    let err = extract_subdomains("example.com", &config).await.unwrap_err();

    assert!(err.is_timeout(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_page_without_tables_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Certificate not found</body></html>"),
        )
        .mount(&server)
        .await;

    let domains = extract_subdomains("example.com", &config_for(&server))
        .await
        .unwrap();
    assert!(domains.is_empty());
}

#[tokio::test]
async fn test_invalid_input_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let err = extract_subdomains("", &config_for(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_fetch_error() {
    // Port 9 (discard) is not expected to be listening
    let config = ExtractConfig::default()
        .with_search_url("http://127.0.0.1:9/")
        .with_timeout(Duration::from_secs(2));

    let err = extract_subdomains("example.com", &config).await.unwrap_err();
    assert!(matches!(err, ExtractError::FetchError { .. }));
}

#[tokio::test]
async fn test_connection_dropped_mid_body_is_fetch_error() {
    // Promise 5000 bytes, send a handful, then hang up
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 5000\r\n\r\n")
            .unwrap();
        stream.write_all(b"<html><table>").unwrap();
        stream.flush().unwrap();
    });

    let config = ExtractConfig::default()
        .with_search_url(format!("http://{}/", addr))
        .with_timeout(Duration::from_secs(5));
    let err = extract_subdomains("example.com", &config).await.unwrap_err();
    handle.join().unwrap();

    assert!(
        matches!(err, ExtractError::FetchError { .. }),
        "unexpected error: {:?}",
        err
    );
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_requests_go_through_proxy() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&proxy)
        .await;

    // crt.invalid never resolves, so only the proxy can answer
    let config = ExtractConfig::default()
        .with_search_url("http://crt.invalid/")
        .with_proxy(proxy.uri())
        .with_timeout(Duration::from_secs(5));
    let domains = extract_subdomains("example.com", &config).await.unwrap();

    assert_eq!(domains, set(&["example.com", "www.example.com"]));
    let requests = proxy.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers["host"], "crt.invalid");
}

#[tokio::test]
async fn test_result_serializes_to_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .mount(&server)
        .await;

    let result = SubdomainExtractor::with_config(&config_for(&server))
        .unwrap()
        .extract("example.com")
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["parent_domain"], "example.com");
    assert_eq!(json["subdomains"].as_array().unwrap().len(), 2);
    assert_eq!(json["report"]["tables_found"], 3);
}
