//! Registry capability contract.
//!
//! The reassignment core only needs three operations from a registry: fetch
//! the image a tag points at, delete a tag, and write a manifest under a tag.
//! [`RegistryClient`] captures exactly that. [`crate::client::Client`] speaks
//! the OCI Distribution API; [`memory::MemoryRegistry`] keeps everything in
//! process.

use crate::client::Client;
use crate::error::Result;
use serde::Deserialize;
use std::future::Future;

pub mod memory;

#[cfg(test)]
mod tests;

/// OCI image manifest.
pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
/// OCI image index (multi-platform).
pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
/// Docker image manifest, schema 2.
pub const DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";
/// Docker manifest list (multi-platform).
pub const DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";
/// Docker container image config.
pub const DOCKER_CONTAINER_IMAGE: &str = "application/vnd.docker.container.image.v1+json";

/// Media types requested when fetching the source image.
pub const DEFAULT_ACCEPTED_MEDIA_TYPES: &[&str] = &[
    DOCKER_CONTAINER_IMAGE,
    DOCKER_MANIFEST,
    DOCKER_MANIFEST_LIST,
    OCI_MANIFEST,
    OCI_INDEX,
];

/// An image as seen through one of its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Registry-assigned content digest (e.g. `sha256:...`).
    pub digest: String,
    /// Raw manifest bytes, copied verbatim between tags.
    pub manifest: Vec<u8>,
    /// Media type reported by the registry, if any.
    pub media_type: Option<String>,
}

#[derive(Deserialize)]
struct MediaTypeField {
    #[serde(rename = "mediaType")]
    media_type: Option<String>,
}

impl Image {
    /// Returns the media type to send when writing this manifest.
    ///
    /// Falls back to the manifest's own `mediaType` field, then to the OCI
    /// manifest type.
    pub fn content_type(&self) -> String {
        if let Some(media_type) = self.media_type.as_deref().filter(|m| !m.is_empty()) {
            return media_type.to_string();
        }

        serde_json::from_slice::<MediaTypeField>(&self.manifest)
            .ok()
            .and_then(|field| field.media_type)
            .unwrap_or_else(|| OCI_MANIFEST.to_string())
    }
}

/// Result of deleting a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteOutcome {
    /// The tag existed and was removed.
    Deleted,
    /// The tag did not exist. Not an error.
    Absent,
}

/// Operations the reassignment core needs from a registry.
///
/// Implementations report an unresolvable tag as
/// [`RetagError::NotFound`](crate::error::RetagError::NotFound) and a missing
/// delete target as [`DeleteOutcome::Absent`].
pub trait RegistryClient {
    /// Fetches the image currently bound to `tag`.
    fn fetch_image(
        &self,
        repository: &str,
        tag: &str,
        accepted_media_types: &[String],
    ) -> impl Future<Output = Result<Image>> + Send;

    /// Removes the binding of `tag`, tolerating its absence.
    fn delete_tag(
        &self,
        repository: &str,
        tag: &str,
    ) -> impl Future<Output = Result<DeleteOutcome>> + Send;

    /// Writes `image`'s manifest under `tag`, overwriting any existing binding.
    ///
    /// `image.digest` is a hint; the registry is the source of truth for the
    /// digest of what it stores.
    fn put_manifest(
        &self,
        repository: &str,
        tag: &str,
        image: &Image,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl RegistryClient for Client {
    async fn fetch_image(
        &self,
        repository: &str,
        tag: &str,
        accepted_media_types: &[String],
    ) -> Result<Image> {
        let accept: Vec<&str> = accepted_media_types.iter().map(String::as_str).collect();
        let response = self.fetch_manifest(repository, tag, &accept).await?;

        Ok(Image {
            digest: response.digest,
            manifest: response.bytes,
            media_type: response.media_type,
        })
    }

    async fn delete_tag(&self, repository: &str, tag: &str) -> Result<DeleteOutcome> {
        self.delete_manifest(repository, tag).await
    }

    async fn put_manifest(&self, repository: &str, tag: &str, image: &Image) -> Result<()> {
        let stored = Client::put_manifest(
            self,
            repository,
            tag,
            &image.manifest,
            &image.content_type(),
        )
        .await?;

        if let Some(stored) = stored
            && stored != image.digest
        {
            tracing::warn!(
                repository,
                tag,
                expected = %image.digest,
                stored = %stored,
                "registry stored manifest under a different digest"
            );
        }

        Ok(())
    }
}
