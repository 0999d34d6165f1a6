// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge markup generation.
//!
//! Badges are shields.io images wrapped in a link to the matching GitHub
//! page. Rendering is pure templating over the repository owner, name and
//! the requested [`BadgeStyle`]; no network calls are made.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::{config::BadgeStyle, context::RepositoryRef};

const SHIELDS_ROOT: &str = "https://img.shields.io/github";
const GITHUB_ROOT: &str = "https://github.com";

/// Badges known to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    /// Open issue count.
    Issues,
    /// Open pull request count.
    PullRequests,
    /// Date of the latest commit.
    LastCommit,
    /// SPDX license identifier.
    License,
    /// Stargazer count.
    Stars,
    /// Fork count.
    Forks,
    /// Watcher count.
    Watchers,
    /// Contributor count.
    Contributors,
    /// Latest release tag.
    Release,
    /// Total release asset downloads.
    Downloads,
    /// Repository size on disk.
    RepoSize,
    /// Size of the source code.
    CodeSize,
    /// Most used language.
    TopLanguage,
    /// Number of languages.
    LanguageCount,
    /// Monthly commit activity.
    CommitActivity
}

impl BadgeKind {
    /// Resolves a badge identifier.
    ///
    /// Matching ignores case and surrounding whitespace, and `_` is accepted
    /// in place of `-`. Returns `None` for unknown identifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use readme_badges::BadgeKind;
    ///
    /// assert_eq!(BadgeKind::from_identifier("Last_Commit"), Some(BadgeKind::LastCommit));
    /// assert_eq!(BadgeKind::from_identifier("coverage"), None);
    /// ```
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let normalized = identifier.trim().to_ascii_lowercase().replace('_', "-");
        let kind = match normalized.as_str() {
            "issues" => Self::Issues,
            "pull-requests" | "prs" => Self::PullRequests,
            "last-commit" => Self::LastCommit,
            "license" => Self::License,
            "stars" => Self::Stars,
            "forks" => Self::Forks,
            "watchers" => Self::Watchers,
            "contributors" => Self::Contributors,
            "release" => Self::Release,
            "downloads" => Self::Downloads,
            "repo-size" => Self::RepoSize,
            "code-size" => Self::CodeSize,
            "top-language" => Self::TopLanguage,
            "language-count" => Self::LanguageCount,
            "commit-activity" => Self::CommitActivity,
            _ => return None
        };
        Some(kind)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Issues => "GitHub issues",
            Self::PullRequests => "GitHub pull requests",
            Self::LastCommit => "GitHub last commit",
            Self::License => "GitHub license",
            Self::Stars => "GitHub stars",
            Self::Forks => "GitHub forks",
            Self::Watchers => "GitHub watchers",
            Self::Contributors => "GitHub contributors",
            Self::Release => "GitHub release",
            Self::Downloads => "GitHub downloads",
            Self::RepoSize => "GitHub repo size",
            Self::CodeSize => "GitHub code size",
            Self::TopLanguage => "GitHub top language",
            Self::LanguageCount => "GitHub language count",
            Self::CommitActivity => "GitHub commit activity"
        }
    }

    fn image_path(self, owner: &str, name: &str) -> String {
        match self {
            Self::Issues => format!("issues/{owner}/{name}"),
            Self::PullRequests => format!("issues-pr/{owner}/{name}"),
            Self::LastCommit => format!("last-commit/{owner}/{name}"),
            Self::License => format!("license/{owner}/{name}"),
            Self::Stars => format!("stars/{owner}/{name}"),
            Self::Forks => format!("forks/{owner}/{name}"),
            Self::Watchers => format!("watchers/{owner}/{name}"),
            Self::Contributors => format!("contributors/{owner}/{name}"),
            Self::Release => format!("v/release/{owner}/{name}"),
            Self::Downloads => format!("downloads/{owner}/{name}/total"),
            Self::RepoSize => format!("repo-size/{owner}/{name}"),
            Self::CodeSize => format!("languages/code-size/{owner}/{name}"),
            Self::TopLanguage => format!("languages/top/{owner}/{name}"),
            Self::LanguageCount => format!("languages/count/{owner}/{name}"),
            Self::CommitActivity => format!("commit-activity/m/{owner}/{name}")
        }
    }

    fn link_suffix(self) -> &'static str {
        match self {
            Self::Issues => "/issues",
            Self::PullRequests => "/pulls",
            Self::LastCommit => "/commits",
            Self::License
            | Self::RepoSize
            | Self::CodeSize
            | Self::TopLanguage
            | Self::LanguageCount => "",
            Self::Stars => "/stargazers",
            Self::Forks => "/network/members",
            Self::Watchers => "/watchers",
            Self::Contributors => "/graphs/contributors",
            Self::Release | Self::Downloads => "/releases",
            Self::CommitActivity => "/graphs/commit-activity"
        }
    }
}

/// A badge resolved against a repository and style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge<'a> {
    /// Badge type.
    pub kind:       BadgeKind,
    /// Repository the badge describes.
    pub repository: &'a RepositoryRef,
    /// Visual preset.
    pub style:      BadgeStyle
}

impl Badge<'_> {
    /// Renders the HTML fragment for this badge.
    ///
    /// # Examples
    ///
    /// ```
    /// use readme_badges::{Badge, BadgeKind, BadgeStyle, RepositoryRef};
    ///
    /// let repository = RepositoryRef {
    ///     owner:  "octocat".to_owned(),
    ///     name:   "hello-world".to_owned(),
    ///     branch: "main".to_owned(),
    ///     sha:    String::new(),
    /// };
    /// let badge = Badge { kind: BadgeKind::Stars, repository: &repository, style: BadgeStyle::Flat };
    /// assert_eq!(
    ///     badge.render(),
    ///     "<a href=\"https://github.com/octocat/hello-world/stargazers\"><img alt=\"GitHub stars\" \
    ///      src=\"https://img.shields.io/github/stars/octocat/hello-world?style=flat\"></a>"
    /// );
    /// ```
    pub fn render(&self) -> String {
        let owner = self.repository.owner.as_str();
        let name = self.repository.name.as_str();
        let image = format!(
            "{SHIELDS_ROOT}/{}?style={}",
            self.kind.image_path(owner, name),
            self.style.as_str()
        );
        let link = format!("{GITHUB_ROOT}/{owner}/{name}{}", self.kind.link_suffix());

        format!(
            "<a href=\"{}\"><img alt=\"{}\" src=\"{}\"></a>",
            escape_html(&link),
            escape_html(self.kind.label()),
            escape_html(&image)
        )
    }
}

/// Splits the raw `badges` input into an ordered identifier list.
///
/// Items may be separated by commas or newlines. Blank items are dropped and
/// the original order is preserved.
///
/// # Examples
///
/// ```
/// use readme_badges::parse_badge_list;
///
/// assert_eq!(parse_badge_list("issues,\n stars ,,license"), vec!["issues", "stars", "license"]);
/// ```
pub fn parse_badge_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Renders badge markup for every recognised identifier, in input order.
///
/// Fragments are joined by a single space. Unknown identifiers are skipped
/// and reported through `tracing`; an input without any recognised
/// identifier yields an empty string.
pub fn render_badges<S>(identifiers: &[S], repository: &RepositoryRef, style: BadgeStyle) -> String
where
    S: AsRef<str>
{
    let mut fragments = Vec::with_capacity(identifiers.len());

    for identifier in identifiers {
        let identifier = identifier.as_ref();
        match BadgeKind::from_identifier(identifier) {
            Some(kind) => {
                debug!("Rendering {:?} badge for {}", kind, repository.full_name());
                fragments.push(
                    Badge {
                        kind,
                        repository,
                        style
                    }
                    .render()
                );
            }
            None => warn!("Skipping unknown badge identifier '{}'", identifier)
        }
    }

    fragments.join(" ")
}

pub(crate) fn escape_html(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#x27;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}
