//! Run configuration for the badge updater.
//!
//! The binary assembles a [`Config`] from CLI arguments or the `INPUT_*`
//! variables GitHub Actions exports for `with:` inputs. The value is built
//! once at startup and passed explicitly to the updater, so tests construct
//! it directly without touching the environment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{badge::parse_badge_list, error::Error};

/// Commit message used when none is configured.
pub const DEFAULT_COMMIT_MESSAGE: &str = "chore: add badges :unicorn:";

/// Visual themes supported by the shields.io badge service.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeStyle {
    /// Rounded gradient preset.
    Plastic,
    /// Flat preset, the service default.
    #[default]
    Flat,
    /// Flat preset with square corners.
    FlatSquare,
    /// Large uppercase preset.
    ForTheBadge,
    /// GitHub social button preset.
    Social
}

impl BadgeStyle {
    /// Parses a user supplied style, falling back to [`BadgeStyle::Flat`]
    /// when the value is empty or unrecognised.
    ///
    /// # Examples
    ///
    /// ```
    /// use readme_badges::BadgeStyle;
    ///
    /// assert_eq!(BadgeStyle::parse_or_default("for-the-badge"), BadgeStyle::ForTheBadge);
    /// assert_eq!(BadgeStyle::parse_or_default(""), BadgeStyle::Flat);
    /// assert_eq!(BadgeStyle::parse_or_default("neon"), BadgeStyle::Flat);
    /// ```
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "plastic" => Self::Plastic,
            "flat-square" => Self::FlatSquare,
            "for-the-badge" => Self::ForTheBadge,
            "social" => Self::Social,
            _ => Self::Flat
        }
    }

    /// Returns the value of the `style` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plastic => "plastic",
            Self::Flat => "flat",
            Self::FlatSquare => "flat-square",
            Self::ForTheBadge => "for-the-badge",
            Self::Social => "social"
        }
    }
}

/// Immutable settings for a single run.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Bearer credential used for every API call.
    pub token:          String,
    /// Requested badge identifiers in display order.
    pub badges:         Vec<String>,
    /// Style applied to every badge.
    pub style:          BadgeStyle,
    /// Message of the commit that updates the README.
    pub commit_message: String,
    /// Alternative API root, e.g. for GitHub Enterprise Server.
    pub api_url:        Option<String>,
    /// Compute the patched README without writing it back.
    pub dry_run:        bool
}

impl Config {
    /// Builds a configuration from raw action inputs.
    ///
    /// `badges` is a comma or newline separated list; `style` falls back to
    /// the provider default when empty or unknown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the token is blank and
    /// [`Error::Validation`] when no badge identifiers were supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use readme_badges::{BadgeStyle, Config};
    ///
    /// let config = Config::from_inputs("ghp_token", "issues, license", "flat-square")?;
    /// assert_eq!(config.badges, vec!["issues".to_owned(), "license".to_owned()]);
    /// assert_eq!(config.style, BadgeStyle::FlatSquare);
    /// # Ok::<(), readme_badges::Error>(())
    /// ```
    pub fn from_inputs(token: &str, badges: &str, style: &str) -> Result<Self, Error> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::auth("a GitHub token is required"));
        }

        let badges = parse_badge_list(badges);
        if badges.is_empty() {
            return Err(Error::validation("at least one badge identifier is required"));
        }

        Ok(Self {
            token: token.to_owned(),
            badges,
            style: BadgeStyle::parse_or_default(style),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_owned(),
            api_url: None,
            dry_run: false
        })
    }

    /// Replaces the commit message, ignoring blank values.
    pub fn with_commit_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message.map(str::trim).filter(|value| !value.is_empty()) {
            self.commit_message = message.to_owned();
        }
        self
    }

    /// Sets an alternative API root, ignoring blank values.
    pub fn with_api_url(mut self, api_url: Option<&str>) -> Self {
        self.api_url = api_url
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        self
    }

    /// Enables or disables dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("badges", &self.badges)
            .field("style", &self.style)
            .field("commit_message", &self.commit_message)
            .field("api_url", &self.api_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_parsing_accepts_known_presets() {
        assert_eq!(BadgeStyle::parse_or_default("plastic"), BadgeStyle::Plastic);
        assert_eq!(BadgeStyle::parse_or_default(" FLAT_SQUARE "), BadgeStyle::FlatSquare);
        assert_eq!(BadgeStyle::parse_or_default("social"), BadgeStyle::Social);
    }

    #[test]
    fn style_round_trips_through_query_value() {
        for style in [
            BadgeStyle::Plastic,
            BadgeStyle::Flat,
            BadgeStyle::FlatSquare,
            BadgeStyle::ForTheBadge,
            BadgeStyle::Social
        ] {
            assert_eq!(BadgeStyle::parse_or_default(style.as_str()), style);
        }
    }

    #[test]
    fn style_deserializes_from_kebab_case() {
        let style: BadgeStyle =
            serde_json::from_str("\"for-the-badge\"").expect("valid style literal");
        assert_eq!(style, BadgeStyle::ForTheBadge);
    }

    #[test]
    fn blank_token_is_rejected() {
        let error = Config::from_inputs("  ", "issues", "").expect_err("expected auth error");
        assert!(matches!(error, Error::Auth { .. }));
    }

    #[test]
    fn empty_badge_list_is_rejected() {
        let error = Config::from_inputs("token", " , ", "").expect_err("expected validation");
        match error {
            Error::Validation {
                message
            } => assert_eq!(message, "at least one badge identifier is required"),
            other => panic!("unexpected error variant: {other:?}")
        }
    }

    #[test]
    fn builders_ignore_blank_overrides() {
        let config = Config::from_inputs("token", "stars", "")
            .expect("valid config")
            .with_commit_message(Some("   "))
            .with_api_url(Some(""))
            .with_dry_run(true);

        assert_eq!(config.commit_message, DEFAULT_COMMIT_MESSAGE);
        assert!(config.api_url.is_none());
        assert!(config.dry_run);
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = Config::from_inputs("ghp_secret", "stars", "").expect("valid config");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
