use super::*;
use crate::error::ErrorKind;
use crate::registry::memory::{Call, MemoryRegistry, Operation};

const MANIFEST: &str = r#"{"schemaVersion":2,"layers":[]}"#;
const OLD_MANIFEST: &str = r#"{"schemaVersion":2,"layers":["old"]}"#;

fn seeded() -> (TagReassigner<MemoryRegistry>, String) {
    let registry = MemoryRegistry::new();
    let digest = registry.push("app", "build-123", MANIFEST, None).unwrap();
    (TagReassigner::new(registry), digest)
}

fn puts(calls: &[Call]) -> usize {
    calls.iter().filter(|c| c.operation() == Operation::Put).count()
}

#[test]
fn test_plan_rejects_missing_inputs() {
    let err = ReassignmentPlan::new("", " ", "stable", ["app"]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("source-tag"));
    assert!(err.to_string().contains("target-tag"));
    assert!(!err.to_string().contains("current-tag"));
}

#[test]
fn test_plan_rejects_empty_repository_list() {
    let err = ReassignmentPlan::new("b", "t", "c", [" ", ""]).unwrap_err();
    assert!(err.to_string().contains("repositories"));
}

#[test]
fn test_plan_requests_follow_list_order() {
    let plan = ReassignmentPlan::new("build-123", "v2.0.0", "stable", ["app-a", "app-b"]).unwrap();
    let requests: Vec<_> = plan.requests().collect();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].repository, "app-a");
    assert_eq!(requests[1].repository, "app-b");
    assert!(requests.iter().all(|r| r.source_tag == "build-123"
        && r.target_tag == "v2.0.0"
        && r.current_tag == "stable"));
}

#[test]
fn test_step_display() {
    assert_eq!(Step::Promote.to_string(), "promote");
    assert_eq!(Step::Repoint.to_string(), "repoint");
}

#[tokio::test]
async fn test_promote_binds_target_to_source_digest() {
    let (reassigner, digest) = seeded();

    let image = reassigner.promote_tag("app", "build-123", "v2.0.0").await.unwrap();

    assert_eq!(image.digest, digest);
    assert_eq!(reassigner.client().resolve("app", "v2.0.0"), Some(digest));
}

#[tokio::test]
async fn test_promote_overwrites_existing_target() {
    let (reassigner, digest) = seeded();
    reassigner
        .client()
        .push("app", "v2.0.0", OLD_MANIFEST, None)
        .unwrap();

    reassigner.promote_tag("app", "build-123", "v2.0.0").await.unwrap();

    assert_eq!(reassigner.client().resolve("app", "v2.0.0"), Some(digest));
}

#[tokio::test]
async fn test_promote_call_sequence() {
    let (reassigner, digest) = seeded();

    reassigner.promote_tag("app", "build-123", "v2.0.0").await.unwrap();

    assert_eq!(
        reassigner.client().calls(),
        vec![
            Call::Fetch {
                repository: "app".to_string(),
                tag: "build-123".to_string(),
            },
            Call::Put {
                repository: "app".to_string(),
                tag: "v2.0.0".to_string(),
                digest,
            },
        ]
    );
}

#[tokio::test]
async fn test_repoint_replaces_previous_binding() {
    let (reassigner, digest) = seeded();
    let old = reassigner
        .client()
        .push("app", "stable", OLD_MANIFEST, None)
        .unwrap();
    assert_ne!(old, digest);

    let repointed = reassigner
        .repoint_current("app", "build-123", "stable")
        .await
        .unwrap();

    assert_eq!(repointed.previous, DeleteOutcome::Deleted);
    assert_eq!(repointed.image.digest, digest);
    assert_eq!(reassigner.client().resolve("app", "stable"), Some(digest));
}

#[tokio::test]
async fn test_repoint_without_previous_binding() {
    let (reassigner, digest) = seeded();

    let repointed = reassigner
        .repoint_current("app", "build-123", "stable")
        .await
        .unwrap();

    assert_eq!(repointed.previous, DeleteOutcome::Absent);
    assert_eq!(reassigner.client().resolve("app", "stable"), Some(digest));
}

#[tokio::test]
async fn test_repoint_deletes_before_fetching() {
    let (reassigner, _) = seeded();

    reassigner
        .repoint_current("app", "build-123", "stable")
        .await
        .unwrap();

    let operations: Vec<_> = reassigner
        .client()
        .calls()
        .iter()
        .map(Call::operation)
        .collect();
    assert_eq!(
        operations,
        vec![Operation::Delete, Operation::Fetch, Operation::Put]
    );
}

#[tokio::test]
async fn test_missing_source_fails_without_writes() {
    let registry = MemoryRegistry::new();
    registry.push("app", "stable", OLD_MANIFEST, None).unwrap();
    let reassigner = TagReassigner::new(registry);

    let promote = reassigner.promote_tag("app", "build-123", "v2.0.0").await;
    let repoint = reassigner.repoint_current("app", "build-123", "stable").await;

    assert_eq!(promote.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(repoint.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(puts(&reassigner.client().calls()), 0);
    assert_eq!(reassigner.client().resolve("app", "v2.0.0"), None);
}

#[tokio::test]
async fn test_delete_failure_aborts_repoint() {
    let (reassigner, _) = seeded();
    reassigner
        .client()
        .fail_on(Operation::Delete, "app", "stable");

    let err = reassigner
        .repoint_current("app", "build-123", "stable")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Registry);
    assert_eq!(reassigner.client().calls().len(), 1);
}

#[tokio::test]
async fn test_write_failure_is_propagated_unchanged() {
    let (reassigner, _) = seeded();
    reassigner.client().fail_on(Operation::Put, "app", "v2.0.0");

    let err = reassigner
        .promote_tag("app", "build-123", "v2.0.0")
        .await
        .unwrap_err();

    assert!(matches!(err, RetagError::Server { status_code: 500, .. }));
}

#[test]
fn test_custom_accepted_media_types() {
    let reassigner = TagReassigner::new(MemoryRegistry::new())
        .with_accepted_media_types(["application/vnd.oci.image.manifest.v1+json"]);

    assert_eq!(
        reassigner.accepted_media_types(),
        ["application/vnd.oci.image.manifest.v1+json"]
    );
}
