#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the badge updater crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Every fallible operation in the crate returns [`Error`]. Nothing is
//! recovered locally: the binary converts whatever reaches `main` into a
//! single failure report.

/// Unified error type returned by the repository client, the README patcher
/// and the CLI.
///
/// Variants carry a human readable message but never the credential used to
/// talk to the API.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// The credential was missing, invalid or lacked the required scope.
    #[error("authentication failed: {message}")]
    Auth {
        /// Description returned by the API or produced locally.
        message: String
    },
    /// The repository has no README on the requested branch.
    #[error("not found: {message}")]
    NotFound {
        /// Description of the missing resource.
        message: String
    },
    /// The README changed remotely between read and write.
    #[error("conflicting update: {message}")]
    Conflict {
        /// Description returned by the API.
        message: String
    },
    /// The document does not contain a heading that can carry badges.
    #[error("document structure error: {message}")]
    DocumentStructure {
        /// Description of the structural problem.
        message: String
    },
    /// Network faults and server side errors.
    #[error("transient service error: {message}")]
    Transient {
        /// Description of the failed request.
        message: String
    },
    /// Wraps base64 errors raised while decoding README content.
    #[error("failed to decode README content: {source}")]
    Decode {
        /// Underlying decoding error.
        source: base64::DecodeError
    },
    /// Returned when decoded README bytes are not valid UTF-8.
    #[error("README content is not valid UTF-8: {source}")]
    NotUtf8 {
        /// Underlying conversion error.
        source: std::string::FromUtf8Error
    },
    /// Returned when configuration or event context violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    }
}

impl Error {
    /// Constructs an authentication error.
    pub fn auth<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Auth {
            message: message.into()
        }
    }

    /// Constructs a not-found error.
    pub fn not_found<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::NotFound {
            message: message.into()
        }
    }

    /// Constructs a conflict error raised by a stale integrity token.
    pub fn conflict<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Conflict {
            message: message.into()
        }
    }

    /// Constructs a document structure error.
    ///
    /// # Parameters
    ///
    /// * `message` - Description of what the patcher could not locate.
    pub fn document_structure<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::DocumentStructure {
            message: message.into()
        }
    }

    /// Constructs a transient service error.
    pub fn transient<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Transient {
            message: message.into()
        }
    }

    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation
    /// and is what ends up in the workflow failure annotation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<base64::DecodeError> for Error {
    fn from(source: base64::DecodeError) -> Self {
        Self::Decode {
            source
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(source: std::string::FromUtf8Error) -> Self {
        Self::NotUtf8 {
            source
        }
    }
}
