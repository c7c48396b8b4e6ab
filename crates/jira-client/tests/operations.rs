//! Integration tests for Jira operations against a mock Jira server.
//!
//! These tests exercise the full request path:
//! - URL, query and body construction
//! - Basic-Auth and JSON headers
//! - Status classification into error kinds
//! - The transition/comment two-step
//! - Concurrent link creation

use std::time::Duration;

use jira_client::api::{
    CommentQuery, CreateFieldsQuery, IssueUpdate, LinkDirection, LinkRequest, NewIssue, NewLink,
    SearchQuery, TransitionRequest,
};
use jira_client::{Error, ErrorKind, JiraClient, JiraConfig, basic_auth_header};
use jira_log::RequestLog;
use rstest::rstest;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod helpers {
    use super::*;

    pub const EMAIL: &str = "dev@acme.io";
    pub const TOKEN: &str = "secret-token-1234";

    pub fn config(server: &MockServer) -> JiraConfig {
        JiraConfig::new(&server.uri(), EMAIL, TOKEN).expect("valid config")
    }

    pub fn client(server: &MockServer) -> JiraClient {
        JiraClient::with_log(&config(server), RequestLog::disabled()).expect("client builds")
    }

    pub fn client_with_default_project(server: &MockServer, project: &str) -> JiraClient {
        let mut config = config(server);
        config.default_project = Some(project.to_string());
        JiraClient::with_log(&config, RequestLog::disabled()).expect("client builds")
    }

    pub async fn mock_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    pub async fn request_bodies(server: &MockServer, route: &str) -> Vec<Value> {
        server
            .received_requests()
            .await
            .expect("request recording enabled")
            .into_iter()
            .filter(|r| r.url.path() == route)
            .map(|r| r.body_json::<Value>().expect("JSON body"))
            .collect()
    }

    pub fn api_kind(err: &Error) -> ErrorKind {
        match err {
            Error::Api(api) => api.kind,
            other => panic!("expected API error, got {other:?}"),
        }
    }
}

use helpers::*;

// ========== Request Helper ==========

#[tokio::test]
async fn test_sends_basic_auth_and_json_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .and(header("authorization", basic_auth_header(EMAIL, TOKEN).as_str()))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "5b10ac8d82e05b22cc7d4ef5",
            "displayName": "Dana Ops",
            "emailAddress": EMAIL,
            "active": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server).myself().await.unwrap();

    assert_eq!(user.display_name.as_deref(), Some("Dana Ops"));
    assert_eq!(user.account_id.as_deref(), Some("5b10ac8d82e05b22cc7d4ef5"));
}

#[rstest]
#[case::bad_request(400, ErrorKind::Validation)]
#[case::unauthorized(401, ErrorKind::Authentication)]
#[case::forbidden(403, ErrorKind::Permission)]
#[case::not_found(404, ErrorKind::NotFound)]
#[case::conflict(409, ErrorKind::Conflict)]
#[case::unprocessable(422, ErrorKind::Validation)]
#[case::rate_limited(429, ErrorKind::RateLimit)]
#[case::server_error(500, ErrorKind::Api)]
#[tokio::test]
async fn test_status_classification(#[case] status: u16, #[case] expected: ErrorKind) {
    let server = MockServer::start().await;
    mock_json(&server, "GET", "/rest/api/2/myself", status, json!({"errorMessages": ["nope"]})).await;

    let err = client(&server).myself().await.unwrap_err();

    assert_eq!(api_kind(&err), expected);
    assert_eq!(err.status(), Some(status));
}

#[tokio::test]
async fn test_error_body_fields_and_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "17")
                .set_body_json(json!({"errorMessages": ["Rate limit exceeded"]})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .search_issues(&SearchQuery::new("project = OPS"))
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    let payload = err.to_payload();
    assert_eq!(payload["error"]["kind"], "rate_limit");
    assert_eq!(payload["error"]["retry_after_secs"], 17);
    assert_eq!(payload["error"]["message"], "Rate limit exceeded");
}

#[tokio::test]
async fn test_non_json_error_body_kept_as_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/priority"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server).list_priorities().await.unwrap_err();
    let Error::Api(api) = err else {
        panic!("expected API error");
    };
    assert_eq!(api.kind, ErrorKind::Api);
    assert_eq!(api.messages, vec!["<html>Bad Gateway</html>"]);
}

#[tokio::test]
async fn test_unexpected_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server).myself().await.unwrap_err();
    assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn test_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.timeout = Duration::from_millis(200);
    let client = JiraClient::with_log(&config, RequestLog::disabled()).unwrap();

    let err = client.myself().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got {err:?}");
    assert_eq!(err.to_payload()["error"]["kind"], "timeout");
}

// ========== Read Operations ==========

#[tokio::test]
async fn test_search_builds_query_and_reshapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param("jql", "project = OPS AND status = \"In Progress\""))
        .and(query_param("startAt", "10"))
        .and(query_param("maxResults", "5"))
        .and(query_param("fields", "summary,status,issuetype,priority,assignee,updated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 10,
            "maxResults": 5,
            "total": 11,
            "issues": [{
                "id": "10001",
                "key": "OPS-7",
                "fields": {
                    "summary": "Disk full",
                    "status": {"name": "In Progress"},
                    "assignee": {"displayName": "Dana Ops"}
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery::new("project = OPS AND status = \"In Progress\"").page(10, 5);
    let result = client(&server).search_issues(&query).await.unwrap();

    assert_eq!(result.total, 11);
    assert_eq!(result.start_at, 10);
    assert_eq!(result.issues.len(), 1);
    let issue = &result.issues[0];
    assert_eq!(issue.key, "OPS-7");
    assert_eq!(issue.assignee.as_deref(), Some("Dana Ops"));
    assert_eq!(issue.url, format!("{}/browse/OPS-7", server.uri()));
}

#[tokio::test]
async fn test_invalid_search_sends_nothing() {
    let server = MockServer::start().await;

    let err = client(&server)
        .search_issues(&SearchQuery::new(" ").page(0, 500))
        .await
        .unwrap_err();

    let Error::Validation(fields) = err else {
        panic!("expected validation error");
    };
    assert_eq!(fields.len(), 2);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_issue_not_found() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/rest/api/2/issue/OPS-404",
        404,
        json!({"errorMessages": ["Issue does not exist or you do not have permission to see it."], "errors": {}}),
    )
    .await;

    let err = client(&server).get_issue("ops-404", None).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        err.to_payload()["error"]["message"],
        "Issue does not exist or you do not have permission to see it."
    );
}

#[tokio::test]
async fn test_get_issue_passes_expand() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/OPS-7"))
        .and(query_param("expand", "changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "10001",
            "key": "OPS-7",
            "fields": {"summary": "Disk full", "labels": ["infra"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let issue = client(&server).get_issue("OPS-7", Some("changelog")).await.unwrap();
    assert_eq!(issue.labels, vec!["infra"]);
}

#[tokio::test]
async fn test_get_comments_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/OPS-7/comment"))
        .and(query_param("startAt", "2"))
        .and(query_param("maxResults", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 2, "maxResults": 2, "total": 3,
            "comments": [{"id": "100", "author": {"displayName": "Dana Ops"}, "body": "Restarted"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .get_comments("OPS-7", CommentQuery { start_at: 2, max_results: 2 })
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.comments[0].author.as_deref(), Some("Dana Ops"));
    assert_eq!(page.comments[0].body, "Restarted");
}

// ========== Create / Update ==========

#[tokio::test]
async fn test_create_issue_with_links() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(body_json(json!({"fields": {
            "project": {"key": "OPS"},
            "summary": "Rotate TLS certs",
            "issuetype": {"name": "Task"},
            "labels": ["security"]
        }})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "10050", "key": "OPS-50", "self": "ignored"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issueLink"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let issue = NewIssue {
        summary: "Rotate TLS certs".into(),
        issue_type: "Task".into(),
        labels: vec!["security".into()],
        links: vec![
            NewLink {
                link_type: "Blocks".into(),
                issue_key: "OPS-3".into(),
                direction: LinkDirection::Outward,
            },
            NewLink {
                link_type: "Relates".into(),
                issue_key: "web-9".into(),
                direction: LinkDirection::Inward,
            },
        ],
        ..NewIssue::default()
    };
    let created = client_with_default_project(&server, "OPS")
        .create_issue(&issue)
        .await
        .unwrap();

    assert_eq!(created.key, "OPS-50");
    assert_eq!(created.url, format!("{}/browse/OPS-50", server.uri()));
    assert_eq!(created.links.len(), 2);

    let mut bodies = request_bodies(&server, "/rest/api/2/issueLink").await;
    bodies.sort_by_key(|b| b["type"]["name"].as_str().unwrap_or_default().to_string());
    assert_eq!(
        bodies,
        vec![
            json!({"type": {"name": "Blocks"}, "inwardIssue": {"key": "OPS-3"}, "outwardIssue": {"key": "OPS-50"}}),
            json!({"type": {"name": "Relates"}, "inwardIssue": {"key": "OPS-50"}, "outwardIssue": {"key": "WEB-9"}}),
        ]
    );
}

#[tokio::test]
async fn test_create_issue_propagates_link_failure() {
    let server = MockServer::start().await;
    mock_json(&server, "POST", "/rest/api/2/issue", 201, json!({"id": "1", "key": "OPS-51"})).await;
    mock_json(
        &server,
        "POST",
        "/rest/api/2/issueLink",
        404,
        json!({"errorMessages": ["No issue link type with name 'Blockz' found."]}),
    )
    .await;

    let issue = NewIssue {
        project_key: Some("OPS".into()),
        summary: "Broken link".into(),
        issue_type: "Bug".into(),
        links: vec![NewLink {
            link_type: "Blockz".into(),
            issue_key: "OPS-3".into(),
            direction: LinkDirection::Outward,
        }],
        ..NewIssue::default()
    };
    let err = client(&server).create_issue(&issue).await.unwrap_err();

    assert_eq!(api_kind(&err), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_issue_requires_project() {
    let server = MockServer::start().await;

    let issue = NewIssue {
        summary: "No project".into(),
        issue_type: "Task".into(),
        ..NewIssue::default()
    };
    let err = client(&server).create_issue(&issue).await.unwrap_err();

    let Error::Validation(fields) = err else {
        panic!("expected validation error");
    };
    assert!(fields.get("project_key").is_some());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_issue_put_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/OPS-7"))
        .and(body_json(json!({"fields": {"summary": "Disk full on db-1", "assignee": null}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let update = IssueUpdate {
        summary: Some("Disk full on db-1".into()),
        assignee: Some(None),
        ..IssueUpdate::default()
    };
    let updated = client(&server).update_issue("OPS-7", &update).await.unwrap();

    assert_eq!(updated.issue_key, "OPS-7");
    assert_eq!(updated.updated_fields, vec!["assignee", "summary"]);
}

#[tokio::test]
async fn test_update_issue_requires_a_field() {
    let server = MockServer::start().await;

    let err = client(&server)
        .update_issue("OPS-7", &IssueUpdate::default())
        .await
        .unwrap_err();

    let Error::Validation(fields) = err else {
        panic!("expected validation error");
    };
    assert!(fields.get("fields").is_some());
}

// ========== Transitions ==========

#[tokio::test]
async fn test_transition_then_comment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/OPS-7/transitions"))
        .and(body_json(json!({"transition": {"id": "31"}, "fields": {"resolution": {"name": "Done"}}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/OPS-7/comment"))
        .and(body_json(json!({"body": "Fixed in 1.4.2"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "10100", "body": "Fixed in 1.4.2"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = TransitionRequest {
        issue_key: "OPS-7".into(),
        transition_id: "31".into(),
        resolution: Some("Done".into()),
        comment: Some("Fixed in 1.4.2".into()),
        ..TransitionRequest::default()
    };
    let outcome = client(&server).transition_issue(&request).await.unwrap();

    assert!(outcome.transitioned);
    assert!(outcome.comment.added);
    assert_eq!(outcome.comment.id.as_deref(), Some("10100"));
}

#[tokio::test]
async fn test_comment_failure_does_not_fail_transition() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/OPS-7/transitions"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mock_json(
        &server,
        "POST",
        "/rest/api/2/issue/OPS-7/comment",
        403,
        json!({"errorMessages": ["You do not have permission to comment"]}),
    )
    .await;

    let request = TransitionRequest {
        issue_key: "OPS-7".into(),
        transition_id: "31".into(),
        comment: Some("Closing".into()),
        ..TransitionRequest::default()
    };
    let outcome = client(&server).transition_issue(&request).await.unwrap();

    assert!(outcome.transitioned);
    assert!(!outcome.comment.added);
    let error = outcome.comment.error.expect("comment error recorded");
    assert_eq!(error["kind"], "permission");
    assert_eq!(error["status"], 403);

    let transition_bodies = request_bodies(&server, "/rest/api/2/issue/OPS-7/transitions").await;
    assert_eq!(transition_bodies, vec![json!({"transition": {"id": "31"}})]);
}

#[tokio::test]
async fn test_failed_transition_posts_no_comment() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "POST",
        "/rest/api/2/issue/OPS-7/transitions",
        400,
        json!({"errorMessages": [], "errors": {"resolution": "Resolution is required."}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/OPS-7/comment"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let request = TransitionRequest {
        issue_key: "OPS-7".into(),
        transition_id: "31".into(),
        comment: Some("Closing".into()),
        ..TransitionRequest::default()
    };
    let err = client(&server).transition_issue(&request).await.unwrap_err();

    let Error::Api(api) = err else {
        panic!("expected API error");
    };
    assert_eq!(api.kind, ErrorKind::Validation);
    assert_eq!(api.field_errors["resolution"], "Resolution is required.");
}

#[tokio::test]
async fn test_get_transitions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/OPS-7/transitions"))
        .and(query_param("expand", "transitions.fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"transitions": [
            {"id": "21", "name": "Start", "to": {"name": "In Progress"}},
            {"id": "31", "name": "Done", "to": {"name": "Done"}, "hasScreen": true,
             "fields": {"resolution": {"required": true}}}
        ]})))
        .mount(&server)
        .await;

    let transitions = client(&server).get_transitions("OPS-7").await.unwrap();

    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[1].required_fields, vec!["resolution"]);
}

// ========== Links & Metadata ==========

#[tokio::test]
async fn test_link_issues_with_comment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issueLink"))
        .and(body_json(json!({
            "type": {"name": "Blocks"},
            "inwardIssue": {"key": "OPS-1"},
            "outwardIssue": {"key": "OPS-2"},
            "comment": {"body": "Found while triaging"}
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let request = LinkRequest {
        link_type: "Blocks".into(),
        inward_issue: "ops-1".into(),
        outward_issue: "OPS-2".into(),
        comment: Some("Found while triaging".into()),
    };
    let link = client(&server).link_issues(&request).await.unwrap();
    assert_eq!(link.inward_issue, "OPS-1");
}

#[tokio::test]
async fn test_issue_types_for_default_project() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/rest/api/2/project/OPS",
        200,
        json!({"id": "1", "key": "OPS", "name": "Operations",
               "issueTypes": [{"id": "3", "name": "Task"}, {"id": "5", "name": "Sub-task", "subtask": true}]}),
    )
    .await;

    let types = client_with_default_project(&server, "OPS")
        .list_issue_types(None)
        .await
        .unwrap();

    assert_eq!(types.len(), 2);
    assert!(types[1].subtask);
}

#[tokio::test]
async fn test_issue_types_site_wide() {
    let server = MockServer::start().await;
    mock_json(&server, "GET", "/rest/api/2/issuetype", 200, json!([{"id": "1", "name": "Bug"}])).await;

    let types = client(&server).list_issue_types(None).await.unwrap();
    assert_eq!(types[0].name, "Bug");
}

#[tokio::test]
async fn test_create_fields_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/createmeta"))
        .and(query_param("projectKeys", "OPS"))
        .and(query_param("issuetypeNames", "Bug"))
        .and(query_param("expand", "projects.issuetypes.fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": [{
            "key": "OPS",
            "issuetypes": [{"name": "Bug", "fields": {
                "labels": {"name": "Labels", "required": false, "schema": {"type": "array", "items": "string"}},
                "summary": {"name": "Summary", "required": true, "schema": {"type": "string"}}
            }}]
        }]})))
        .expect(1)
        .mount(&server)
        .await;

    let query = CreateFieldsQuery {
        project_key: Some("ops".into()),
        issue_type: Some("Bug".into()),
    };
    let types = client(&server).get_create_fields(&query).await.unwrap();

    assert_eq!(types.len(), 1);
    assert_eq!(types[0].fields[0].id, "summary");
    assert!(types[0].fields[0].required);
    assert_eq!(types[0].fields[1].schema_type.as_deref(), Some("array<string>"));
}

#[tokio::test]
async fn test_list_components_and_link_types() {
    let server = MockServer::start().await;
    mock_json(
        &server,
        "GET",
        "/rest/api/2/project/OPS/components",
        200,
        json!([{"id": "10", "name": "Database", "lead": {"displayName": "Dana Ops"}}]),
    )
    .await;
    mock_json(
        &server,
        "GET",
        "/rest/api/2/issueLinkType",
        200,
        json!({"issueLinkTypes": [{"id": "1", "name": "Blocks", "inward": "is blocked by", "outward": "blocks"}]}),
    )
    .await;

    let client = client(&server);
    let components = client.list_components(Some("OPS")).await.unwrap();
    let link_types = client.list_link_types().await.unwrap();

    assert_eq!(components[0].lead.as_deref(), Some("Dana Ops"));
    assert_eq!(link_types[0].outward, "blocks");
}
