//! HTTP client for OCI registry communication.
//!
//! This module provides a thin HTTP client built on reqwest for the manifest
//! endpoints of the OCI Distribution Specification v2 API: read, write and
//! delete a manifest by tag.

use crate::auth::Credentials;
use crate::digest::Digest;
use crate::error::{Result, RetagError};
use crate::registry::DeleteOutcome;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use std::str::FromStr;
use std::time::Duration;


const DOCKER_CONTENT_DIGEST: &str = "Docker-Content-Digest";

/// Version information returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryVersion {
    /// The Docker-Distribution-API-Version header value, if present.
    pub api_version: Option<String>,
}

/// A manifest as returned by `GET /v2/<name>/manifests/<reference>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestResponse {
    /// Raw manifest bytes.
    pub bytes: Vec<u8>,
    /// Value of the `Content-Type` header, if present.
    pub media_type: Option<String>,
    /// Digest from `Docker-Content-Digest`, or computed from the bytes.
    pub digest: String,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libretag::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_max_idle_per_host(20);
/// assert_eq!(config.timeout_seconds, 60);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }
}

/// HTTP client for OCI registry operations.
#[derive(Debug, Clone)]
pub struct Client {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    /// Base registry URL (e.g., "https://123456789012.dkr.ecr.eu-west-1.amazonaws.com")
    registry_url: String,
    /// Credentials sent with every request
    credentials: Credentials,
    /// Request timeout, kept for error messages
    timeout_seconds: u64,
}

impl Client {
    /// Creates a new client for the specified registry URL with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libretag::client::Client;
    ///
    /// let client = Client::new("registry.example.com", None).unwrap();
    /// assert_eq!(client.registry_url(), "https://registry.example.com");
    /// ```
    pub fn new(registry_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        Self::with_config(registry_url, ClientConfig::default(), credentials)
    }

    /// Creates a new client for the specified registry URL with custom configuration.
    pub fn with_config(
        registry_url: &str,
        config: ClientConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let normalized_url = Self::normalize_url(registry_url)?;

        let http_client = ReqwestClient::builder()
            .user_agent(concat!("retag/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| RetagError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url: normalized_url,
            credentials: credentials.unwrap_or_default(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Normalizes a registry URL by ensuring it has a scheme and removing trailing slashes.
    ///
    /// A bare host gets `https://`; plain-HTTP registries must say so explicitly.
    fn normalize_url(url: &str) -> Result<String> {
        let url = url.trim();

        if url.is_empty() {
            return Err(RetagError::validation("Registry URL cannot be empty"));
        }

        let url = if !url.starts_with("http://") && !url.starts_with("https://") {
            format!("https://{}", url)
        } else {
            url.to_string()
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    /// Returns the base registry URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    fn manifest_url(&self, repository: &str, reference: &str) -> String {
        format!(
            "{}/v2/{}/manifests/{}",
            self.registry_url, repository, reference
        )
    }

    /// Starts a request with the Authorization header applied.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.http_client.request(method, url);
        match self.credentials.to_header_value() {
            Some(auth_header) => request.header(AUTHORIZATION, auth_header),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))
    }

    /// Checks that the registry speaks the OCI Distribution API (`GET /v2/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unreachable or rejects the
    /// configured credentials.
    pub async fn check_version(&self) -> Result<RegistryVersion> {
        let url = format!("{}/v2/", self.registry_url);
        let response = self.send(self.request(Method::GET, &url)).await?;

        let api_version = response
            .headers()
            .get("Docker-Distribution-API-Version")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Self::check_response_status(response).await?;

        Ok(RegistryVersion { api_version })
    }

    /// Fetches the manifest for `reference` (a tag or a digest).
    ///
    /// # Errors
    ///
    /// Returns [`RetagError::NotFound`] when the repository or reference does
    /// not exist, and a registry error for any other failure.
    pub async fn fetch_manifest(
        &self,
        repository: &str,
        reference: &str,
        accept: &[&str],
    ) -> Result<ManifestResponse> {
        let url = self.manifest_url(repository, reference);
        tracing::debug!(repository, reference, "GET manifest");

        let mut request = self.request(Method::GET, &url);
        if !accept.is_empty() {
            request = request.header(ACCEPT, accept.join(", "));
        }
        let response = self.send(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RetagError::not_found(
                "tag",
                format!("{}:{}", repository, reference),
            ));
        }

        // Extract headers before consuming the response
        let header_digest = Self::header_digest(response.headers())?;
        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let response = Self::check_response_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RetagError::network_with_source("Failed to read manifest response", e))?
            .to_vec();

        let digest = match header_digest {
            Some(digest) => digest,
            None => Digest::sha256_of(&bytes)?.to_string(),
        };

        Ok(ManifestResponse {
            bytes,
            media_type,
            digest,
        })
    }

    /// Writes a manifest under `reference`, returning the digest the registry
    /// reports for it (if it reports one).
    pub async fn put_manifest(
        &self,
        repository: &str,
        reference: &str,
        manifest: &[u8],
        media_type: &str,
    ) -> Result<Option<String>> {
        let url = self.manifest_url(repository, reference);
        tracing::debug!(repository, reference, media_type, "PUT manifest");

        let request = self
            .request(Method::PUT, &url)
            .header(CONTENT_TYPE, media_type)
            .body(manifest.to_vec());
        let response = self.send(request).await?;

        let digest = Self::header_digest(response.headers())?;
        Self::check_response_status(response).await?;

        Ok(digest)
    }

    /// Deletes the manifest binding for `reference`.
    ///
    /// A 404 means there was nothing to delete and yields
    /// [`DeleteOutcome::Absent`].
    pub async fn delete_manifest(&self, repository: &str, reference: &str) -> Result<DeleteOutcome> {
        let url = self.manifest_url(repository, reference);
        tracing::debug!(repository, reference, "DELETE manifest");

        let response = self.send(self.request(Method::DELETE, &url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::Absent);
        }

        Self::check_response_status(response).await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Reads and validates the Docker-Content-Digest header, if present.
    fn header_digest(headers: &HeaderMap) -> Result<Option<String>> {
        let Some(value) = headers.get(DOCKER_CONTENT_DIGEST) else {
            return Ok(None);
        };

        let value = value
            .to_str()
            .map_err(|e| RetagError::validation_with_source("Malformed Docker-Content-Digest header", e))?;

        Ok(Some(Digest::from_str(value)?.to_string()))
    }

    /// Translates a reqwest error into a RetagError.
    fn translate_reqwest_error(&self, error: reqwest::Error) -> RetagError {
        if error.is_timeout() {
            RetagError::network(format!(
                "Request to {} timed out after {} seconds",
                self.registry_url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            RetagError::network_with_source(
                format!("Failed to connect to registry at {}", self.registry_url),
                error,
            )
        } else if error.is_request() {
            RetagError::network_with_source(
                format!("Failed to send request to {}", self.registry_url),
                error,
            )
        } else {
            RetagError::network_with_source(
                format!("Network error communicating with {}", self.registry_url),
                error,
            )
        }
    }

    /// Parses a Retry-After header given in seconds.
    fn retry_after(headers: &HeaderMap) -> Option<u64> {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    /// Checks the HTTP response status and translates errors to RetagError.
    async fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let retry_after = Self::retry_after(response.headers());
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(RetagError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(RetagError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            // Only a manifest fetch gives 404 the meaning of a missing tag.
            StatusCode::NOT_FOUND => Err(RetagError::network(format!(
                "HTTP 404 from {}: {}",
                url, error_body
            ))),
            StatusCode::TOO_MANY_REQUESTS => Err(RetagError::rate_limit(
                format!("Rate limit exceeded for {}", url),
                retry_after,
            )),
            StatusCode::METHOD_NOT_ALLOWED => Err(RetagError::unsupported(
                format!("{} is not allowed by the registry: {}", url, error_body),
                405,
            )),
            StatusCode::BAD_REQUEST if error_body.contains("UNSUPPORTED") => {
                Err(RetagError::unsupported(
                    format!("Registry does not support this operation on {}: {}", url, error_body),
                    400,
                ))
            }
            s if s.is_server_error() => Err(RetagError::server(
                format!("Server error from {}: {}", url, error_body),
                status.as_u16(),
            )),
            _ => Err(RetagError::network(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                url,
                error_body
            ))),
        }
    }
}
