//! Retag - container image tag promotion library
//!
//! Retag copies an image's manifest from a source tag to a release tag and
//! moves a floating tag (such as `stable` or `current`) onto the same image,
//! across a list of repositories in one registry.
//!
//! # Quick Start
//!
//! ```no_run
//! use libretag::{BatchProcessor, Client, Credentials, ReassignmentPlan, TagReassigner};
//!
//! # async fn run() -> libretag::Result<()> {
//! let client = Client::new(
//!     "123456789012.dkr.ecr.eu-west-1.amazonaws.com",
//!     Some(Credentials::basic("AWS", "login-password")),
//! )?;
//! let plan = ReassignmentPlan::new("build-123", "v2.0.0", "stable", ["api", "web"])?;
//!
//! let processor = BatchProcessor::new(TagReassigner::new(client));
//! let report = processor.run(&plan).await?;
//! assert!(report.is_complete());
//! # Ok(())
//! # }
//! ```
//!
//! # Main Types
//!
//! - [`TagReassigner`] - promote a tag and repoint the floating tag in one repository
//! - [`BatchProcessor`] - apply both operations to every repository, in order
//! - [`RegistryClient`] - the registry operations the core depends on
//! - [`Client`] - OCI Distribution API implementation of [`RegistryClient`]
//! - [`Settings`] - layered configuration producing a [`ReassignmentPlan`]

#![warn(clippy::all)]

/// Returns the libretag crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use auth::Credentials;
pub use batch::{BatchProcessor, BatchReport, RepositoryReport, RepositoryState};
pub use client::{Client, ClientConfig};
pub use crate::config::Settings;
pub use digest::Digest;
pub use error::{ErrorKind, Result, RetagError};
pub use reassign::{ReassignmentPlan, ReassignmentRequest, Repointed, Step, TagReassigner};
pub use registry::{DeleteOutcome, Image, RegistryClient};

pub mod auth;
pub mod batch;
pub mod client;
pub mod config;
pub mod digest;
pub mod error;
pub mod reassign;
pub mod registry;
