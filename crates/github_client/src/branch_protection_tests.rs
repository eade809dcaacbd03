use super::*;
use serde_json::{json, to_value};

#[test]
fn course_default_requires_the_given_status_context() {
    let protection = BranchProtection::course_default("coursebot");

    assert!(protection.required_status_checks.strict);
    assert_eq!(protection.required_status_checks.contexts, ["coursebot"]);
    assert!(protection.restrictions.is_none());
    assert!(!protection.allow_force_pushes);
    assert!(!protection.allow_deletions);
}

#[test]
fn course_default_serializes_the_full_endpoint_body() {
    let value = to_value(BranchProtection::course_default("coursebot"))
        .expect("Failed to serialize BranchProtection");

    assert_eq!(
        value,
        json!({
            "required_status_checks": {
                "strict": true,
                "contexts": ["coursebot"]
            },
            "enforce_admins": false,
            "required_pull_request_reviews": {
                "dismissal_restrictions": {},
                "dismiss_stale_reviews": false,
                "require_code_owner_reviews": false,
                "required_approving_review_count": 0,
                "bypass_pull_request_allowances": {}
            },
            "restrictions": null,
            "required_linear_history": false,
            "allow_force_pushes": false,
            "allow_deletions": false,
            "block_creations": false,
            "required_conversation_resolution": false
        })
    );
}

#[test]
fn restrictions_round_trip() {
    let json_str = r#"{
        "users": ["octocat"],
        "teams": ["g01"],
        "apps": []
    }"#;

    let restrictions: Restrictions =
        serde_json::from_str(json_str).expect("Failed to deserialize Restrictions");

    assert_eq!(restrictions.users, ["octocat"]);
    assert_eq!(restrictions.teams, ["g01"]);
    assert!(restrictions.apps.is_empty());
}
