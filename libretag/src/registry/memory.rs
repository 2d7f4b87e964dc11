//! In-process registry.
//!
//! `MemoryRegistry` keeps repositories, tags and manifests in a map and logs
//! every call it receives, in order. Failures can be injected per
//! (operation, repository, tag) to exercise error paths.

use super::{DeleteOutcome, Image, RegistryClient};
use crate::digest::Digest;
use crate::error::{Result, RetagError};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Registry operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Delete,
    Put,
}

/// A recorded registry call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch { repository: String, tag: String },
    Delete { repository: String, tag: String },
    Put { repository: String, tag: String, digest: String },
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Fetch { .. } => Operation::Fetch,
            Self::Delete { .. } => Operation::Delete,
            Self::Put { .. } => Operation::Put,
        }
    }

    pub fn repository(&self) -> &str {
        match self {
            Self::Fetch { repository, .. }
            | Self::Delete { repository, .. }
            | Self::Put { repository, .. } => repository,
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Fetch { tag, .. } | Self::Delete { tag, .. } | Self::Put { tag, .. } => tag,
        }
    }
}

#[derive(Debug, Default)]
struct Repository {
    /// digest -> image
    images: HashMap<String, Image>,
    /// tag -> digest
    tags: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct State {
    repositories: HashMap<String, Repository>,
    calls: Vec<Call>,
    failures: HashSet<(Operation, String, String)>,
}

/// A registry held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    state: Mutex<State>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a manifest and binds `tag` to it, returning its digest.
    ///
    /// This models an external push and is not recorded as a call.
    pub fn push(
        &self,
        repository: &str,
        tag: &str,
        manifest: impl Into<Vec<u8>>,
        media_type: Option<&str>,
    ) -> Result<String> {
        let manifest = manifest.into();
        let digest = Digest::sha256_of(&manifest)?.to_string();
        let image = Image {
            digest: digest.clone(),
            manifest,
            media_type: media_type.map(str::to_string),
        };

        let mut state = self.state();
        let repo = state.repositories.entry(repository.to_string()).or_default();
        repo.images.insert(digest.clone(), image);
        repo.tags.insert(tag.to_string(), digest.clone());

        Ok(digest)
    }

    /// Returns the digest `tag` currently resolves to.
    pub fn resolve(&self, repository: &str, tag: &str) -> Option<String> {
        self.state()
            .repositories
            .get(repository)
            .and_then(|repo| repo.tags.get(tag))
            .cloned()
    }

    /// Returns the stored manifest bytes for `digest`.
    pub fn manifest(&self, repository: &str, digest: &str) -> Option<Vec<u8>> {
        self.state()
            .repositories
            .get(repository)
            .and_then(|repo| repo.images.get(digest))
            .map(|image| image.manifest.clone())
    }

    /// Returns every call received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Makes `operation` on `repository`/`tag` fail with a server error.
    pub fn fail_on(&self, operation: Operation, repository: &str, tag: &str) {
        self.state()
            .failures
            .insert((operation, repository.to_string(), tag.to_string()));
    }

    fn record(&self, call: Call, tag: &str) -> Result<MutexGuard<'_, State>> {
        let mut state = self.state();
        let key = (call.operation(), call.repository().to_string(), tag.to_string());
        state.calls.push(call);

        if state.failures.contains(&key) {
            return Err(RetagError::server(
                format!("injected {:?} failure for {}:{}", key.0, key.1, key.2),
                500,
            ));
        }

        Ok(state)
    }
}

impl RegistryClient for MemoryRegistry {
    async fn fetch_image(
        &self,
        repository: &str,
        tag: &str,
        _accepted_media_types: &[String],
    ) -> Result<Image> {
        let call = Call::Fetch {
            repository: repository.to_string(),
            tag: tag.to_string(),
        };
        let state = self.record(call, tag)?;

        state
            .repositories
            .get(repository)
            .and_then(|repo| repo.tags.get(tag).and_then(|digest| repo.images.get(digest)))
            .cloned()
            .ok_or_else(|| RetagError::not_found("tag", format!("{}:{}", repository, tag)))
    }

    async fn delete_tag(&self, repository: &str, tag: &str) -> Result<DeleteOutcome> {
        let call = Call::Delete {
            repository: repository.to_string(),
            tag: tag.to_string(),
        };
        let mut state = self.record(call, tag)?;

        let removed = state
            .repositories
            .get_mut(repository)
            .and_then(|repo| repo.tags.remove(tag));

        Ok(match removed {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::Absent,
        })
    }

    async fn put_manifest(&self, repository: &str, tag: &str, image: &Image) -> Result<()> {
        let call = Call::Put {
            repository: repository.to_string(),
            tag: tag.to_string(),
            digest: image.digest.clone(),
        };
        let mut state = self.record(call, tag)?;

        // The stored digest is derived from the bytes, not from the hint.
        let digest = Digest::sha256_of(&image.manifest)?.to_string();
        let repo = state.repositories.entry(repository.to_string()).or_default();
        repo.images.insert(
            digest.clone(),
            Image {
                digest: digest.clone(),
                manifest: image.manifest.clone(),
                media_type: image.media_type.clone(),
            },
        );
        repo.tags.insert(tag.to_string(), digest);

        Ok(())
    }
}
