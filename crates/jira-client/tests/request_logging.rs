//! The client writes every call to the request log file.

use jira_client::api::LinkRequest;
use jira_client::{JiraClient, JiraConfig};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ATATT3xFfGF0-very-secret";

async fn logging_client(server: &MockServer, dir: &TempDir) -> (JiraClient, std::path::PathBuf) {
    let log_path = dir.path().join("logs").join("jira.log");
    let mut config = JiraConfig::new(&server.uri(), "dev@acme.io", TOKEN).unwrap();
    config.log_file = Some(log_path.clone());
    let client = JiraClient::connect(&config).await.unwrap();
    (client, log_path)
}

#[tokio::test]
async fn test_request_and_response_are_logged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "displayName": "Dana Ops",
            "sessionToken": "should-not-appear"
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let (client, log_path) = logging_client(&server, &dir).await;

    client.myself().await.unwrap();

    let content = tokio::fs::read_to_string(&log_path).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2, "{content}");

    assert!(lines[0].contains(" REQUEST id=1 method=GET "));
    assert!(lines[0].contains("/rest/api/2/myself"));
    assert!(lines[1].contains(" RESPONSE id=1 status=200 "));
    assert!(lines[1].contains("Dana Ops"));

    assert!(!content.contains(TOKEN));
    assert!(!content.contains("should-not-appear"));
    assert!(!content.contains("Basic "));
}

#[tokio::test]
async fn test_failed_response_is_logged_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issueLink"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"errorMessages": ["Issue does not exist"]})),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let (client, log_path) = logging_client(&server, &dir).await;

    let request = LinkRequest {
        link_type: "Blocks".into(),
        inward_issue: "OPS-1".into(),
        outward_issue: "OPS-999".into(),
        comment: None,
    };
    assert!(client.link_issues(&request).await.is_err());

    let content = tokio::fs::read_to_string(&log_path).await.unwrap();
    assert!(content.contains(" REQUEST id=1 method=POST "));
    assert!(content.contains("OPS-999"));
    assert!(content.contains(" RESPONSE id=1 status=404 "));
    assert!(content.contains("Issue does not exist"));
}

#[tokio::test]
async fn test_connection_failure_logs_error_entry() {
    // Bind and drop a listener to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let uri = format!("http://127.0.0.1:{port}");
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("jira.log");
    let mut config = JiraConfig::new(&uri, "dev@acme.io", TOKEN).unwrap();
    config.log_file = Some(log_path.clone());
    let client = JiraClient::connect(&config).await.unwrap();

    let err = client.myself().await.unwrap_err();
    assert_eq!(err.kind(), "transport");

    let content = tokio::fs::read_to_string(&log_path).await.unwrap();
    assert!(content.contains(" REQUEST id=1 "));
    assert!(content.contains(" ERROR id=1 "));
}
