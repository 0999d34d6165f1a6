// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Sequencing of a single badge refresh.
///
/// The updater reads the README, patches the first heading, submits the
/// candidate content as a blob to learn its sha and writes the README back
/// only when that sha differs from the one it read. Every step is awaited
/// before the next starts and every error is returned to the caller
/// unchanged.
use tracing::{info, warn};

use crate::{
    badge::render_badges,
    client::{ReadmeRepository, ReadmeUpdate},
    config::Config,
    context::RepositoryRef,
    encoding::{decode, encode},
    error::Error,
    readme::patch_readme
};

/// README with its content decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeDocument {
    /// Blob sha the content was read at.
    pub sha:     String,
    /// Repository relative path.
    pub path:    String,
    /// Plain text body.
    pub content: String
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// None of the requested identifiers is a known badge; nothing was read.
    NoBadges,
    /// The patched README hashes to the current blob.
    Unchanged,
    /// Dry run: the patched README that would have been written.
    DryRun {
        /// Patched README body.
        content: String
    },
    /// The README was committed.
    Updated {
        /// Sha of the created commit.
        commit_sha: String
    }
}

/// Refreshes the README badges of one repository.
#[derive(Debug)]
pub struct BadgeUpdater<R> {
    config:     Config,
    repository: RepositoryRef,
    client:     R
}

impl<R> BadgeUpdater<R>
where
    R: ReadmeRepository
{
    /// Creates an updater for `repository` using `client` for remote calls.
    pub fn new(config: Config, repository: RepositoryRef, client: R) -> Self {
        Self {
            config,
            repository,
            client
        }
    }

    /// Runs the read, patch, compare and write sequence once.
    ///
    /// # Errors
    ///
    /// Propagates client, decoding and [`Error::DocumentStructure`] errors.
    /// A structure error is raised before any write is attempted.
    pub async fn run(&self) -> Result<UpdateOutcome, Error> {
        let badges = render_badges(&self.config.badges, &self.repository, self.config.style);
        if badges.is_empty() {
            warn!(
                "None of the requested badges {:?} is known, leaving README untouched",
                self.config.badges
            );
            return Ok(UpdateOutcome::NoBadges);
        }

        let remote = self.client.read_readme(&self.repository).await?;
        let document = ReadmeDocument {
            content: decode(&remote.content)?,
            sha:     remote.sha,
            path:    remote.path
        };

        let patched = patch_readme(&document.content, &badges)?;
        let encoded = encode(&patched);

        let candidate_sha = self.client.create_blob(&self.repository, &encoded).await?;
        if candidate_sha == document.sha {
            info!("README of {} already up to date ({})", self.repository, document.sha);
            return Ok(UpdateOutcome::Unchanged);
        }

        if self.config.dry_run {
            info!(
                "Dry run: README of {} would change from {} to {}",
                self.repository, document.sha, candidate_sha
            );
            return Ok(UpdateOutcome::DryRun {
                content: patched
            });
        }

        let update = ReadmeUpdate {
            path:    document.path,
            sha:     document.sha,
            content: encoded,
            message: self.config.commit_message.clone()
        };
        let commit = self.client.write_readme(&self.repository, &update).await?;

        Ok(UpdateOutcome::Updated {
            commit_sha: commit.sha
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::hash_map::DefaultHasher,
        hash::{Hash, Hasher},
        sync::Mutex
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        client::{CommitSummary, RemoteReadme},
        config::BadgeStyle
    };

    /// In-memory repository whose blob shas are content hashes.
    struct FakeRepository {
        readme:      Result<RemoteReadme, fn() -> Error>,
        write_error: Option<fn() -> Error>,
        blobs:       Mutex<Vec<String>>,
        writes:      Mutex<Vec<ReadmeUpdate>>
    }

    impl FakeRepository {
        fn with_readme(content: &str) -> Self {
            let encoded = encode(content);
            Self {
                readme:      Ok(RemoteReadme {
                    sha:     token_for(&encoded),
                    path:    "README.md".to_owned(),
                    content: encoded
                }),
                write_error: None,
                blobs:       Mutex::new(Vec::new()),
                writes:      Mutex::new(Vec::new())
            }
        }

        fn failing_read(error: fn() -> Error) -> Self {
            Self {
                readme:      Err(error),
                write_error: None,
                blobs:       Mutex::new(Vec::new()),
                writes:      Mutex::new(Vec::new())
            }
        }

        fn writes(&self) -> Vec<ReadmeUpdate> {
            self.writes.lock().expect("writes lock").clone()
        }
    }

    fn token_for(encoded: &str) -> String {
        let mut hasher = DefaultHasher::new();
        encoded.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    #[async_trait]
    impl ReadmeRepository for FakeRepository {
        async fn read_readme(&self, _repository: &RepositoryRef) -> Result<RemoteReadme, Error> {
            self.readme.clone().map_err(|make| make())
        }

        async fn create_blob(
            &self,
            _repository: &RepositoryRef,
            content: &str
        ) -> Result<String, Error> {
            self.blobs.lock().expect("blobs lock").push(content.to_owned());
            Ok(token_for(content))
        }

        async fn write_readme(
            &self,
            _repository: &RepositoryRef,
            update: &ReadmeUpdate
        ) -> Result<CommitSummary, Error> {
            if let Some(make) = self.write_error {
                return Err(make());
            }
            self.writes.lock().expect("writes lock").push(update.clone());
            Ok(CommitSummary {
                sha: "commit-1".to_owned()
            })
        }
    }

    fn repository() -> RepositoryRef {
        RepositoryRef {
            owner:  "octocat".to_owned(),
            name:   "hello-world".to_owned(),
            branch: "main".to_owned(),
            sha:    "abc123".to_owned()
        }
    }

    fn config(badges: &str) -> Config {
        Config::from_inputs("token", badges, "flat").expect("valid config")
    }

    #[tokio::test]
    async fn writes_patched_readme_when_content_changes() {
        let client = FakeRepository::with_readme("# My Project\n\nSome text");
        let original_sha = client.readme.clone().expect("readme").sha;
        let updater = BadgeUpdater::new(config("stars"), repository(), client);

        let outcome = updater.run().await.expect("run should succeed");
        assert_eq!(outcome, UpdateOutcome::Updated {
            commit_sha: "commit-1".to_owned()
        });

        let writes = updater.client.writes();
        assert_eq!(writes.len(), 1);
        let update = &writes[0];
        assert_eq!(update.path, "README.md");
        assert_eq!(update.sha, original_sha);
        assert_eq!(update.message, "chore: add badges :unicorn:");

        let written = decode(&update.content).expect("valid transport content");
        assert!(written.starts_with("# My Project [![GitHub stars]"));
        assert!(written.ends_with("\n\nSome text"));
    }

    #[tokio::test]
    async fn equal_tokens_skip_the_write() {
        let badges = render_badges(&["stars"], &repository(), BadgeStyle::Flat);
        let patched = patch_readme("# Title\n", &badges).expect("patch");

        // Remote token already matches the content the patch produces.
        let mut client = FakeRepository::with_readme("# Title\n");
        if let Ok(readme) = client.readme.as_mut() {
            readme.sha = token_for(&encode(&patched));
        }
        let updater = BadgeUpdater::new(config("stars"), repository(), client);

        let outcome = updater.run().await.expect("run should succeed");
        assert_eq!(outcome, UpdateOutcome::Unchanged);
        assert!(updater.client.writes().is_empty());
        assert_eq!(updater.client.blobs.lock().expect("blobs lock").len(), 1);
    }

    #[tokio::test]
    async fn missing_heading_fails_without_remote_write() {
        let client = FakeRepository::with_readme("no heading here\n\n## Section\n");
        let updater = BadgeUpdater::new(config("issues"), repository(), client);

        let error = updater.run().await.expect_err("expected structure error");
        assert!(matches!(error, Error::DocumentStructure { .. }));
        assert!(updater.client.writes().is_empty());
        assert!(updater.client.blobs.lock().expect("blobs lock").is_empty());
    }

    #[tokio::test]
    async fn unknown_badges_skip_all_remote_calls() {
        let client = FakeRepository::failing_read(|| Error::transient("must not be called"));
        let updater = BadgeUpdater::new(config("coverage"), repository(), client);

        let outcome = updater.run().await.expect("run should succeed");
        assert_eq!(outcome, UpdateOutcome::NoBadges);
    }

    #[tokio::test]
    async fn read_errors_propagate() {
        let client = FakeRepository::failing_read(|| Error::not_found("no README on main"));
        let updater = BadgeUpdater::new(config("issues"), repository(), client);

        let error = updater.run().await.expect_err("expected not found");
        assert!(matches!(error, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn conflicts_on_write_propagate() {
        let mut client = FakeRepository::with_readme("<h1>Title</h1>");
        client.write_error = Some(|| Error::conflict("README.md does not match sha"));
        let updater = BadgeUpdater::new(config("issues"), repository(), client);

        let error = updater.run().await.expect_err("expected conflict");
        assert!(matches!(error, Error::Conflict { .. }));
    }

    #[tokio::test]
    async fn dry_run_returns_content_without_writing() {
        let client = FakeRepository::with_readme("<h1>Title</h1><p>Body</p>");
        let updater =
            BadgeUpdater::new(config("license").with_dry_run(true), repository(), client);

        let outcome = updater.run().await.expect("run should succeed");
        match outcome {
            UpdateOutcome::DryRun {
                content
            } => {
                assert!(content.starts_with("<h1>Title <a href="));
                assert!(content.ends_with("</a></h1><p>Body</p>"));
            }
            other => panic!("unexpected outcome: {other:?}")
        }
        assert!(updater.client.writes().is_empty());
    }

    #[tokio::test]
    async fn malformed_transport_content_is_a_decode_error() {
        let mut client = FakeRepository::with_readme("");
        if let Ok(readme) = client.readme.as_mut() {
            readme.content = "%%%".to_owned();
        }
        let updater = BadgeUpdater::new(config("issues"), repository(), client);

        let error = updater.run().await.expect_err("expected decode error");
        assert!(matches!(error, Error::Decode { .. }));
    }
}
