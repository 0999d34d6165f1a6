// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Failure reporting for the workflow runner.
//!
//! A failed run is surfaced as an `::error::` workflow command on stdout
//! followed by a non-zero exit status, which marks the step as failed and
//! attaches the message to the run summary.

use crate::error::Error;

/// Formats `error` as a GitHub Actions `error` workflow command.
///
/// # Examples
///
/// ```
/// use readme_badges::{Error, failure_command};
///
/// let command = failure_command(&Error::not_found("no README on main"));
/// assert_eq!(command, "::error::not found: no README on main");
/// ```
pub fn failure_command(error: &Error) -> String {
    format!("::error::{}", escape_command_data(&error.to_display_string()))
}

fn escape_command_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
