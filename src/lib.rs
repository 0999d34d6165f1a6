//! Keeps a row of status badges next to a repository's README title.
//!
//! The library fetches the README through the GitHub API, appends shields.io
//! badge markup to the first top-level heading (HTML or markdown), and writes
//! the result back only when the content actually changed. The binary wraps
//! [`BadgeUpdater`] for use as a GitHub Actions step or from a terminal.

mod badge;
mod client;
mod config;
mod context;
mod document;
mod encoding;
mod error;
mod markdown;
mod readme;
mod report;
mod updater;

pub use badge::{Badge, BadgeKind, parse_badge_list, render_badges};
pub use client::{
    CommitSummary, GitHubClient, ReadmeRepository, ReadmeUpdate, RemoteReadme, error_for_status
};
pub use config::{BadgeStyle, Config, DEFAULT_COMMIT_MESSAGE};
pub use context::{
    ContextOverrides, EventContext, RepositoryRef, branch_from_ref, parse_repository_slug
};
pub use document::{Document, Element, Node};
pub use encoding::{decode, encode};
pub use error::Error;
pub use markdown::{first_heading_range, heading_to_markdown, normalize_separators, render_html};
pub use readme::{Flavor, detect_flavor, patch_readme};
pub use report::failure_command;
pub use updater::{BadgeUpdater, ReadmeDocument, UpdateOutcome};
