use super::*;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::with_api_base("ghp_test_token", "Example-University", &server.uri())
        .expect("client builds")
}

#[tokio::test]
async fn grant_team_permission_puts_the_team_repo_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(
            "/orgs/Example-University/teams/course-admins/repos/Example-University/cmps383-2026-g01",
        ))
        .and(header("authorization", "Bearer ghp_test_token"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .and(body_partial_json(json!({"permission": "admin"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .grant_team_permission("course-admins", "cmps383-2026-g01", "admin")
        .await
        .expect("permission grant succeeds");
}

#[tokio::test]
async fn protect_branch_sends_the_course_protection_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(
            "/repos/Example-University/cmps383-2026-g01/branches/master/protection",
        ))
        .and(body_partial_json(json!({
            "required_status_checks": {
                "strict": true,
                "contexts": ["coursebot"]
            },
            "restrictions": null,
            "allow_force_pushes": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "..."})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .protect_branch("cmps383-2026-g01", "master", "coursebot")
        .await
        .expect("branch protection succeeds");
}

#[tokio::test]
async fn restrict_merge_strategies_patches_the_repository() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/repos/Example-University/cmps383-2026-g01"))
        .and(body_partial_json(json!({
            "allow_squash_merge": false,
            "allow_rebase_merge": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "cmps383-2026-g01"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .restrict_merge_strategies("cmps383-2026-g01")
        .await
        .expect("merge restriction succeeds");
}

#[tokio::test]
async fn create_commit_status_posts_to_the_sha() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/repos/Example-University/cmps383-2026-g01/statuses/abc123",
        ))
        .and(body_partial_json(json!({
            "state": "success",
            "description": "Check Suite: success",
            "context": "coursebot"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .create_commit_status(
            "cmps383-2026-g01",
            "abc123",
            "success",
            "Check Suite: success",
            "coursebot",
        )
        .await
        .expect("commit status succeeds");
}

#[tokio::test]
async fn rename_team_patches_the_team_slug() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/orgs/Example-University/teams/g01"))
        .and(body_partial_json(json!({
            "name": "cmps383-2026-g01",
            "privacy": "closed"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"slug": "g01"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .rename_team("g01", "cmps383-2026-g01", None, Some("closed"))
        .await
        .expect("team rename succeeds");
}

#[tokio::test]
async fn rejection_carries_status_and_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "Must have admin rights"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let error = client
        .grant_team_permission("course-admins", "cmps383-2026-g01", "admin")
        .await
        .expect_err("403 surfaces as an error");

    assert_eq!(error.status, Some(403));
    assert!(error.detail.contains("Must have admin rights"));
    assert!(error.to_string().contains("with status 403"));
}

#[tokio::test]
async fn transport_failure_has_no_status() {
    // Nothing listens on this port.
    let client = GitHubClient::with_api_base("ghp_test_token", "Example-University", "http://127.0.0.1:1")
        .expect("client builds");

    let error = client
        .restrict_merge_strategies("cmps383-2026-g01")
        .await
        .expect_err("connection failure surfaces as an error");

    assert_eq!(error.status, None);
    assert!(!error.detail.is_empty());
}

#[test]
fn trailing_slash_on_api_base_is_tolerated() {
    let client = GitHubClient::with_api_base("t", "org", "http://localhost:8080/")
        .expect("client builds");
    assert_eq!(client.api_base, "http://localhost:8080");
}
