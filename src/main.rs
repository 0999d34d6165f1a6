//! Command-line entry point for the README badge updater.
//!
//! Inputs come from flags or from the `INPUT_*` variables GitHub Actions
//! exports for the step's `with:` block; the target repository comes from the
//! runner's `GITHUB_*` variables. Any failure is reported once, as an
//! `::error::` workflow command followed by exit status 1.

use std::{io, process};

use clap::{ArgAction, Parser, error::ErrorKind};
use readme_badges::{
    BadgeUpdater, Config, ContextOverrides, Error, EventContext, GitHubClient, UpdateOutcome,
    failure_command
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command line interface for refreshing README badges.
#[derive(Debug, Parser)]
#[command(
    name = "readme-badges",
    version,
    about = "Insert or refresh status badges next to the first README heading"
)]
struct Cli {
    /// Token used to read and commit the README. Falls back to GITHUB_TOKEN.
    #[arg(long = "token", env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Comma or newline separated badge identifiers, e.g. "issues,license".
    #[arg(long = "badges", env = "INPUT_BADGES", default_value = "")]
    badges: String,

    /// Badge style: plastic, flat, flat-square, for-the-badge or social.
    #[arg(long = "badge-style", env = "INPUT_BADGE-STYLE", default_value = "")]
    badge_style: String,

    /// Message of the commit that updates the README.
    #[arg(long = "commit-message", env = "INPUT_COMMIT-MESSAGE")]
    commit_message: Option<String>,

    /// API root, for GitHub Enterprise Server.
    #[arg(long = "api-url", env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Repository to update instead of GITHUB_REPOSITORY.
    #[arg(long = "repository", value_name = "OWNER/NAME")]
    repository: Option<String>,

    /// Branch to update instead of the one named by GITHUB_REF.
    #[arg(long = "branch", value_name = "BRANCH")]
    branch: Option<String>,

    /// Print the patched README instead of committing it.
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool
}

impl Cli {
    fn overrides(&self) -> ContextOverrides {
        ContextOverrides {
            repository: self.repository.clone(),
            branch:     self.branch.clone()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(error) = run().await {
        error!("{}", error.to_display_string());
        println!("{}", failure_command(&error));
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Parses inputs, resolves the event context and runs the updater once.
///
/// # Errors
///
/// Propagates configuration, context, client and patching errors.
async fn run() -> Result<(), Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            error.exit()
        }
        Err(error) => return Err(Error::validation(error.to_string()))
    };

    let config = build_config(&cli, |key| std::env::var(key).ok())?;
    let context = EventContext::from_env(&cli.overrides())?;
    info!(
        "Refreshing badges {:?} on {} (event: {})",
        config.badges,
        context.repository,
        context.event_name.as_deref().unwrap_or("manual")
    );

    let client = GitHubClient::from_config(&config)?;
    let updater = BadgeUpdater::new(config, context.repository, client);
    let outcome = updater.run().await?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_outcome(&mut handle, &outcome)
}

fn build_config<F>(cli: &Cli, lookup: F) -> Result<Config, Error>
where
    F: Fn(&str) -> Option<String>
{
    let token = cli
        .token
        .clone()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| lookup("GITHUB_TOKEN"))
        .unwrap_or_default();

    Ok(Config::from_inputs(&token, &cli.badges, &cli.badge_style)?
        .with_commit_message(cli.commit_message.as_deref())
        .with_api_url(cli.api_url.as_deref())
        .with_dry_run(cli.dry_run))
}

fn write_outcome<W: io::Write>(writer: &mut W, outcome: &UpdateOutcome) -> Result<(), Error> {
    match outcome {
        UpdateOutcome::NoBadges => info!("No known badges requested"),
        UpdateOutcome::Unchanged => info!("README already contains the requested badges"),
        UpdateOutcome::Updated {
            commit_sha
        } => info!("README updated in commit {}", commit_sha),
        UpdateOutcome::DryRun {
            content
        } => {
            writer
                .write_all(content.as_bytes())
                .and_then(|()| writer.flush())
                .map_err(|e| Error::transient(format!("failed to write patched README: {e}")))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use clap::Parser;
    use readme_badges::{BadgeStyle, DEFAULT_COMMIT_MESSAGE};

    use super::{Cli, UpdateOutcome, build_config, write_outcome};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn cli_accepts_manual_invocation() {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--token",
            "ghp_token",
            "--badges",
            "issues,stars",
            "--badge-style",
            "flat-square",
            "--repository",
            "octocat/hello-world",
            "--branch",
            "main",
            "--dry-run"
        ])
        .expect("failed to parse CLI");

        let overrides = cli.overrides();
        assert_eq!(overrides.repository.as_deref(), Some("octocat/hello-world"));
        assert_eq!(overrides.branch.as_deref(), Some("main"));

        let config = build_config(&cli, no_env).expect("valid config");
        assert_eq!(config.badges, vec!["issues".to_owned(), "stars".to_owned()]);
        assert_eq!(config.style, BadgeStyle::FlatSquare);
        assert_eq!(config.commit_message, DEFAULT_COMMIT_MESSAGE);
        assert!(config.dry_run);
    }

    #[test]
    fn token_falls_back_to_github_token() {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "--token", "", "--badges", "stars"])
            .expect("failed to parse CLI");

        let config = build_config(&cli, |key| {
            (key == "GITHUB_TOKEN").then(|| "ghs_fallback".to_owned())
        })
        .expect("valid config");
        assert_eq!(config.token, "ghs_fallback");
    }

    #[test]
    fn missing_token_is_an_auth_error() {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "--token", "", "--badges", "stars"])
            .expect("failed to parse CLI");

        let error = build_config(&cli, no_env).expect_err("expected auth error");
        assert!(matches!(error, readme_badges::Error::Auth { .. }));
    }

    #[test]
    fn custom_commit_message_is_used() {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--token",
            "t",
            "--badges",
            "stars",
            "--commit-message",
            "docs: badges"
        ])
        .expect("failed to parse CLI");

        let config = build_config(&cli, no_env).expect("valid config");
        assert_eq!(config.commit_message, "docs: badges");
    }

    #[test]
    fn dry_run_outcome_prints_content() {
        let mut buffer = Cursor::new(Vec::new());
        let outcome = UpdateOutcome::DryRun {
            content: "# Title [badge]\n".to_owned()
        };
        write_outcome(&mut buffer, &outcome).expect("write should succeed");

        let output = String::from_utf8(buffer.into_inner()).expect("invalid UTF-8");
        assert_eq!(output, "# Title [badge]\n");
    }

    #[test]
    fn other_outcomes_print_nothing() {
        let mut buffer = Cursor::new(Vec::new());
        write_outcome(&mut buffer, &UpdateOutcome::Unchanged).expect("write should succeed");
        assert!(buffer.into_inner().is_empty());
    }
}
