use super::memory::{Call, MemoryRegistry, Operation};
use super::*;
use crate::error::RetagError;

fn accepted() -> Vec<String> {
    DEFAULT_ACCEPTED_MEDIA_TYPES
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn image(manifest: &str, media_type: Option<&str>) -> Image {
    Image {
        digest: "sha256:unused".to_string(),
        manifest: manifest.as_bytes().to_vec(),
        media_type: media_type.map(str::to_string),
    }
}

#[test]
fn test_default_media_types_include_docker_types() {
    assert!(DEFAULT_ACCEPTED_MEDIA_TYPES.contains(&DOCKER_CONTAINER_IMAGE));
    assert!(DEFAULT_ACCEPTED_MEDIA_TYPES.contains(&DOCKER_MANIFEST));
}

#[test]
fn test_content_type_prefers_reported_media_type() {
    let img = image(r#"{"mediaType":"x/from-body"}"#, Some(DOCKER_MANIFEST));
    assert_eq!(img.content_type(), DOCKER_MANIFEST);
}

#[test]
fn test_content_type_reads_manifest_field() {
    let img = image(
        r#"{"schemaVersion":2,"mediaType":"application/vnd.oci.image.index.v1+json"}"#,
        None,
    );
    assert_eq!(img.content_type(), OCI_INDEX);
}

#[test]
fn test_content_type_falls_back_to_oci_manifest() {
    assert_eq!(image("not json", None).content_type(), OCI_MANIFEST);
    assert_eq!(image(r#"{"schemaVersion":2}"#, Some("")).content_type(), OCI_MANIFEST);
}

#[tokio::test]
async fn test_memory_fetch_returns_pushed_image() {
    let registry = MemoryRegistry::new();
    let digest = registry
        .push("app", "build-1", r#"{"layers":[]}"#, Some(OCI_MANIFEST))
        .unwrap();

    let fetched = registry.fetch_image("app", "build-1", &accepted()).await.unwrap();

    assert_eq!(fetched.digest, digest);
    assert_eq!(fetched.manifest, br#"{"layers":[]}"#.to_vec());
    assert_eq!(fetched.media_type.as_deref(), Some(OCI_MANIFEST));
}

#[tokio::test]
async fn test_memory_fetch_missing_tag_is_not_found() {
    let registry = MemoryRegistry::new();
    registry.push("app", "build-1", "m", None).unwrap();

    let missing_tag = registry.fetch_image("app", "nope", &accepted()).await;
    let missing_repo = registry.fetch_image("other", "build-1", &accepted()).await;

    assert!(matches!(missing_tag, Err(RetagError::NotFound { .. })));
    assert!(matches!(missing_repo, Err(RetagError::NotFound { .. })));
}

#[tokio::test]
async fn test_memory_delete_reports_absence() {
    let registry = MemoryRegistry::new();
    registry.push("app", "stable", "m", None).unwrap();

    let first = registry.delete_tag("app", "stable").await.unwrap();
    let second = registry.delete_tag("app", "stable").await.unwrap();

    assert_eq!(first, DeleteOutcome::Deleted);
    assert_eq!(second, DeleteOutcome::Absent);
    assert_eq!(registry.resolve("app", "stable"), None);
}

#[tokio::test]
async fn test_memory_put_stores_digest_of_bytes() {
    let registry = MemoryRegistry::new();
    let digest = registry.push("app", "build-1", "manifest", None).unwrap();

    registry
        .put_manifest("app", "v1", &image("manifest", None))
        .await
        .unwrap();

    assert_eq!(registry.resolve("app", "v1"), Some(digest.clone()));
    assert_eq!(registry.manifest("app", &digest), Some(b"manifest".to_vec()));
}

#[tokio::test]
async fn test_memory_records_calls_and_injects_failures() {
    let registry = MemoryRegistry::new();
    registry.fail_on(Operation::Delete, "app", "stable");

    let result = registry.delete_tag("app", "stable").await;

    assert!(matches!(result, Err(RetagError::Server { status_code: 500, .. })));
    assert_eq!(
        registry.calls(),
        vec![Call::Delete {
            repository: "app".to_string(),
            tag: "stable".to_string(),
        }]
    );
}
