// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Triggering context supplied by the workflow runner.
//!
//! GitHub Actions describes the run through `GITHUB_*` environment variables
//! and an optional webhook payload file. The values are read exactly once
//! and frozen into an [`EventContext`]. Manual invocations may override the
//! repository and branch through [`ContextOverrides`].

use std::{fmt, fs, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Repository the badges are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// Account or organization owning the repository.
    pub owner:  String,
    /// Repository name.
    pub name:   String,
    /// Branch whose README is read and updated.
    pub branch: String,
    /// Commit that triggered the run. Empty for manual runs.
    pub sha:    String
}

impl RepositoryRef {
    /// Returns the `owner/name` pair.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.name, self.branch)
    }
}

/// Read-only description of the event that triggered the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// Target repository and branch.
    pub repository: RepositoryRef,
    /// Name of the workflow event, e.g. `push`.
    pub event_name: Option<String>,
    /// Activity type carried by the webhook payload, e.g. `opened`.
    pub action:     Option<String>
}

/// Values supplied on the command line that take precedence over the
/// runner environment.
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    /// Repository in `owner/name` form.
    pub repository: Option<String>,
    /// Branch name without the `refs/heads/` prefix.
    pub branch:     Option<String>
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    action: Option<String>
}

impl EventContext {
    /// Resolves the context from the process environment.
    ///
    /// # Errors
    ///
    /// See [`EventContext::from_lookup`].
    pub fn from_env(overrides: &ContextOverrides) -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Resolves the context through an arbitrary variable lookup.
    ///
    /// `GITHUB_REPOSITORY` and `GITHUB_REF` are required unless overridden.
    /// `GITHUB_SHA`, `GITHUB_EVENT_NAME` and `GITHUB_EVENT_PATH` are
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the repository is not in
    /// `owner/name` form, when the ref does not name a branch, or when the
    /// event payload cannot be read.
    pub fn from_lookup<F>(lookup: F, overrides: &ContextOverrides) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>
    {
        let slug = match overrides.repository.clone() {
            Some(value) => value,
            None => non_empty(lookup("GITHUB_REPOSITORY"))
                .ok_or_else(|| Error::validation("GITHUB_REPOSITORY is not set"))?
        };
        let (owner, name) = parse_repository_slug(&slug)?;

        let branch = match overrides.branch.clone() {
            Some(value) => value,
            None => {
                let reference = non_empty(lookup("GITHUB_REF"))
                    .ok_or_else(|| Error::validation("GITHUB_REF is not set"))?;
                branch_from_ref(&reference)?
            }
        };

        let action = match non_empty(lookup("GITHUB_EVENT_PATH")) {
            Some(path) => read_event_action(Path::new(&path))?,
            None => None
        };

        let context = Self {
            repository: RepositoryRef {
                owner,
                name,
                branch,
                sha: lookup("GITHUB_SHA").unwrap_or_default()
            },
            event_name: non_empty(lookup("GITHUB_EVENT_NAME")),
            action
        };
        debug!(
            "Resolved event context for {} (event: {:?}, action: {:?})",
            context.repository, context.event_name, context.action
        );

        Ok(context)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|candidate| !candidate.trim().is_empty())
}

/// Splits an `owner/name` pair.
///
/// # Errors
///
/// Returns [`Error::Validation`] when either half is empty or the value
/// contains more than one separator.
pub fn parse_repository_slug(slug: &str) -> Result<(String, String), Error> {
    let trimmed = slug.trim();
    match trimmed.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner.to_owned(), name.to_owned()))
        }
        _ => Err(Error::validation(format!(
            "repository '{trimmed}' must be in owner/name form"
        )))
    }
}

/// Extracts the branch name from a fully qualified git ref.
///
/// # Errors
///
/// Returns [`Error::Validation`] for tag and pull request refs, which cannot
/// receive a README commit.
pub fn branch_from_ref(reference: &str) -> Result<String, Error> {
    reference
        .strip_prefix(BRANCH_REF_PREFIX)
        .filter(|branch| !branch.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::validation(format!("ref '{reference}' does not name a branch")))
}

fn read_event_action(path: &Path) -> Result<Option<String>, Error> {
    let raw = fs::read_to_string(path).map_err(|e| {
        Error::validation(format!(
            "failed to read event payload at {}: {e}",
            path.display()
        ))
    })?;
    let payload: EventPayload = serde_json::from_str(&raw)
        .map_err(|e| Error::validation(format!("failed to parse event payload: {e}")))?;
    Ok(payload.action)
}
