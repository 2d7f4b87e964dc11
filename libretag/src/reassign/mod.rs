//! Tag promotion and floating-tag reassignment.
//!
//! Two operations run against a single repository:
//!
//! - [`TagReassigner::promote_tag`] copies the manifest behind the source tag
//!   to the target tag.
//! - [`TagReassigner::repoint_current`] deletes the floating tag, then binds it
//!   to the source tag's image. Between the delete and the write the floating
//!   tag does not exist; a concurrent writer in that window loses to the
//!   final write.
//!
//! Every remote call is awaited before the next one is issued.

use crate::error::{Result, RetagError};
use crate::registry::{DEFAULT_ACCEPTED_MEDIA_TYPES, DeleteOutcome, Image, RegistryClient};
use serde::Serialize;
use std::fmt;

#[cfg(test)]
mod tests;

/// The step of a reassignment that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Promote,
    Repoint,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Promote => f.write_str("promote"),
            Step::Repoint => f.write_str("repoint"),
        }
    }
}

/// One unit of work: the three tag roles applied to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentRequest {
    pub repository: String,
    pub source_tag: String,
    pub target_tag: String,
    pub current_tag: String,
}

/// Validated inputs for a run: the tag roles plus the repositories to
/// replay them against, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentPlan {
    source_tag: String,
    target_tag: String,
    current_tag: String,
    repositories: Vec<String>,
}

impl ReassignmentPlan {
    /// Builds a plan, rejecting empty tag roles or an empty repository list.
    ///
    /// Values are trimmed; blank repository names are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use libretag::reassign::ReassignmentPlan;
    ///
    /// let plan = ReassignmentPlan::new("build-1", "v1.0.0", "stable", ["api", " web "]).unwrap();
    /// assert_eq!(plan.repositories(), ["api", "web"]);
    ///
    /// assert!(ReassignmentPlan::new("", "v1.0.0", "stable", ["api"]).is_err());
    /// ```
    pub fn new<I, S>(
        source_tag: &str,
        target_tag: &str,
        current_tag: &str,
        repositories: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let repositories: Vec<String> = repositories
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        let mut missing = Vec::new();
        for (name, value) in [
            ("source-tag", source_tag),
            ("target-tag", target_tag),
            ("current-tag", current_tag),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if repositories.is_empty() {
            missing.push("repositories");
        }

        if !missing.is_empty() {
            return Err(RetagError::configuration(format!(
                "Required inputs are not set: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            source_tag: source_tag.trim().to_string(),
            target_tag: target_tag.trim().to_string(),
            current_tag: current_tag.trim().to_string(),
            repositories,
        })
    }

    pub fn source_tag(&self) -> &str {
        &self.source_tag
    }

    pub fn target_tag(&self) -> &str {
        &self.target_tag
    }

    pub fn current_tag(&self) -> &str {
        &self.current_tag
    }

    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    /// One request per repository, in list order.
    pub fn requests(&self) -> impl Iterator<Item = ReassignmentRequest> + '_ {
        self.repositories.iter().map(|repository| ReassignmentRequest {
            repository: repository.clone(),
            source_tag: self.source_tag.clone(),
            target_tag: self.target_tag.clone(),
            current_tag: self.current_tag.clone(),
        })
    }
}

/// Outcome of [`TagReassigner::repoint_current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repointed {
    /// The image the floating tag now points at.
    pub image: Image,
    /// Whether the floating tag existed before the call.
    pub previous: DeleteOutcome,
}

/// Moves tags within one repository through a [`RegistryClient`].
#[derive(Debug)]
pub struct TagReassigner<C> {
    client: C,
    accepted_media_types: Vec<String>,
}

impl<C: RegistryClient> TagReassigner<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            accepted_media_types: DEFAULT_ACCEPTED_MEDIA_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    /// Replaces the media types requested when fetching the source image.
    pub fn with_accepted_media_types<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_media_types = media_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn accepted_media_types(&self) -> &[String] {
        &self.accepted_media_types
    }

    async fn fetch_source(&self, repository: &str, source_tag: &str) -> Result<Image> {
        self.client
            .fetch_image(repository, source_tag, &self.accepted_media_types)
            .await
    }

    /// Copies the manifest behind `source_tag` to `target_tag`.
    ///
    /// An existing `target_tag` is overwritten. Returns the promoted image.
    ///
    /// # Errors
    ///
    /// [`RetagError::NotFound`] when `source_tag` does not resolve, in which
    /// case nothing is written. Registry failures are returned unchanged.
    pub async fn promote_tag(
        &self,
        repository: &str,
        source_tag: &str,
        target_tag: &str,
    ) -> Result<Image> {
        let image = self.fetch_source(repository, source_tag).await?;
        self.client.put_manifest(repository, target_tag, &image).await?;

        tracing::info!(
            repository,
            source_tag,
            target_tag,
            digest = %image.digest,
            "tag added to image"
        );
        Ok(image)
    }

    /// Points `current_tag` at the image behind `source_tag`.
    ///
    /// Deletes `current_tag` first (a missing tag is fine), then fetches the
    /// source image and writes it under `current_tag`.
    ///
    /// # Errors
    ///
    /// [`RetagError::NotFound`] when `source_tag` does not resolve; the
    /// floating tag has already been removed at that point and is not
    /// restored. Any registry failure during the delete aborts the operation.
    pub async fn repoint_current(
        &self,
        repository: &str,
        source_tag: &str,
        current_tag: &str,
    ) -> Result<Repointed> {
        let previous = self.client.delete_tag(repository, current_tag).await?;
        if previous == DeleteOutcome::Absent {
            tracing::debug!(repository, current_tag, "current tag did not exist");
        }

        let image = self.fetch_source(repository, source_tag).await?;
        self.client
            .put_manifest(repository, current_tag, &image)
            .await?;

        tracing::info!(
            repository,
            source_tag,
            current_tag,
            digest = %image.digest,
            "current tag repointed"
        );
        Ok(Repointed { image, previous })
    }
}
