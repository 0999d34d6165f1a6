// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Remote README storage.
///
/// [`ReadmeRepository`] is the seam between the updater and GitHub. The
/// production implementation, [`GitHubClient`], talks to the REST API through
/// `octocrab`; tests substitute an in-memory fake. Calls are issued exactly
/// once: nothing is cached and nothing is retried.
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{config::Config, context::RepositoryRef, error::Error};

/// README as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteReadme {
    /// Git blob sha of the current content.
    pub sha:     String,
    /// Repository relative path, usually `README.md`.
    pub path:    String,
    /// Base64 encoded body.
    pub content: String
}

/// Conditional README update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeUpdate {
    /// Repository relative path of the README.
    pub path:    String,
    /// Blob sha the update is based on.
    pub sha:     String,
    /// Base64 encoded new body.
    pub content: String,
    /// Commit message.
    pub message: String
}

/// Commit created by a README update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Sha of the new commit.
    pub sha: String
}

/// Operations the updater needs from the remote repository.
#[async_trait]
pub trait ReadmeRepository {
    /// Reads the README of `repository.branch`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the branch has no README, [`Error::Auth`] for
    /// rejected credentials and [`Error::Transient`] otherwise.
    async fn read_readme(&self, repository: &RepositoryRef) -> Result<RemoteReadme, Error>;

    /// Stores `content` as a blob and returns its sha without touching any
    /// branch.
    ///
    /// # Errors
    ///
    /// [`Error::Auth`] or [`Error::Transient`].
    async fn create_blob(&self, repository: &RepositoryRef, content: &str)
    -> Result<String, Error>;

    /// Replaces the README, guarded by the sha it was read at.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] when the remote README moved past `update.sha`,
    /// [`Error::Auth`] or [`Error::Transient`].
    async fn write_readme(
        &self,
        repository: &RepositoryRef,
        update: &ReadmeUpdate
    ) -> Result<CommitSummary, Error>;
}

/// [`ReadmeRepository`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    octocrab: Octocrab
}

#[derive(Serialize)]
struct ReadmeQuery<'a> {
    #[serde(rename = "ref")]
    reference: &'a str
}

#[derive(Serialize)]
struct BlobRequest<'a> {
    content:  &'a str,
    encoding: &'static str
}

#[derive(Deserialize)]
struct BlobResponse {
    sha: String
}

#[derive(Serialize)]
struct ContentsRequest<'a> {
    message: &'a str,
    content: &'a str,
    branch:  &'a str,
    sha:     &'a str
}

#[derive(Deserialize)]
struct ContentsResponse {
    commit: CommitResponse
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String
}

impl GitHubClient {
    /// Builds an authenticated client from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unusable API URL and
    /// [`Error::Auth`] when the client cannot be initialized.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut builder = Octocrab::builder().personal_token(config.token.clone());
        if let Some(api_url) = config.api_url.as_deref() {
            builder = builder
                .base_uri(api_url)
                .map_err(|e| Error::validation(format!("invalid API URL '{api_url}': {e}")))?;
        }

        let octocrab = builder
            .build()
            .map_err(|e| Error::auth(format!("failed to initialize GitHub client: {e}")))?;

        Ok(Self {
            octocrab
        })
    }

    /// Wraps an existing `octocrab` instance.
    pub fn new(octocrab: Octocrab) -> Self {
        Self {
            octocrab
        }
    }
}

#[async_trait]
impl ReadmeRepository for GitHubClient {
    async fn read_readme(&self, repository: &RepositoryRef) -> Result<RemoteReadme, Error> {
        let route = format!("/repos/{}/{}/readme", repository.owner, repository.name);
        debug!("Fetching README of {}", repository);

        let readme: RemoteReadme = self
            .octocrab
            .get(
                route,
                Some(&ReadmeQuery {
                    reference: &repository.branch
                })
            )
            .await
            .map_err(|e| api_error(&format!("read README of {repository}"), e))?;

        info!("Fetched {} at {} ({})", readme.path, repository, readme.sha);
        Ok(readme)
    }

    async fn create_blob(
        &self,
        repository: &RepositoryRef,
        content: &str
    ) -> Result<String, Error> {
        let route = format!("/repos/{}/{}/git/blobs", repository.owner, repository.name);

        let blob: BlobResponse = self
            .octocrab
            .post(
                route,
                Some(&BlobRequest {
                    content,
                    encoding: "base64"
                })
            )
            .await
            .map_err(|e| api_error(&format!("create candidate blob in {repository}"), e))?;

        debug!("Candidate blob sha for {} is {}", repository, blob.sha);
        Ok(blob.sha)
    }

    async fn write_readme(
        &self,
        repository: &RepositoryRef,
        update: &ReadmeUpdate
    ) -> Result<CommitSummary, Error> {
        let route = format!(
            "/repos/{}/{}/contents/{}",
            repository.owner, repository.name, update.path
        );

        let response: ContentsResponse = self
            .octocrab
            .put(
                route,
                Some(&ContentsRequest {
                    message: &update.message,
                    content: &update.content,
                    branch:  &repository.branch,
                    sha:     &update.sha
                })
            )
            .await
            .map_err(|e| api_error(&format!("update {} in {repository}", update.path), e))?;

        info!("Committed {} to {} as {}", update.path, repository, response.commit.sha);
        Ok(CommitSummary {
            sha: response.commit.sha
        })
    }
}

fn api_error(operation: &str, error: octocrab::Error) -> Error {
    match &error {
        octocrab::Error::GitHub {
            source, ..
        } => error_for_status(source.status_code.as_u16(), operation, &source.message),
        _ => Error::transient(format!("failed to {operation}: {error}"))
    }
}

/// Maps an HTTP status returned by the API onto the error taxonomy.
///
/// | Status      | Variant                |
/// |-------------|------------------------|
/// | 401, 403    | [`Error::Auth`]        |
/// | 404         | [`Error::NotFound`]    |
/// | 409, 412    | [`Error::Conflict`]    |
/// | anything else | [`Error::Transient`] |
pub fn error_for_status(status: u16, operation: &str, message: &str) -> Error {
    let detail = format!("failed to {operation}: {message} (HTTP {status})");
    match status {
        401 | 403 => Error::auth(detail),
        404 => Error::not_found(detail),
        409 | 412 => Error::conflict(detail),
        _ => Error::transient(detail)
    }
}
