//! Error types for cluekit operations.
//!
//! This module provides the error hierarchy using `thiserror` for every
//! user action: hint requests, session persistence, controller transitions,
//! file I/O and CLI commands.
//!
//! Every error that ends a user action exposes a short [`Error::user_message`]
//! for display, while the full `Display` text goes to the log channel.

use thiserror::Error;

/// Result type alias for cluekit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Hint request errors.
    #[error("hint error: {0}")]
    Hint(#[from] HintError),

    /// Session persistence errors.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Controller transition errors.
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Returns the short message shown to the user for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Hint(e) => e.user_message(),
            Self::Controller(e) => e.user_message(),
            Self::Session(_) => "Could not access the saved session.".to_string(),
            Self::Io(e) => e.to_string(),
            Self::Command(e) => e.to_string(),
            Self::Config { message } => format!("Invalid configuration: {message}"),
        }
    }
}

/// Errors raised while requesting a hint from the text-generation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HintError {
    /// The problem text was empty; no request was issued.
    #[error("problem text is empty")]
    Validation,

    /// The service answered with a non-success status.
    #[error("remote service returned {status}: {message}")]
    RemoteService {
        /// HTTP status code returned upstream.
        status: u16,
        /// Upstream error message, or the raw body when none was given.
        message: String,
    },

    /// The service answered successfully but not with the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Network-level failure (timeout, DNS, connection reset).
    #[error("transport error: {0}")]
    Transport(String),
}

impl HintError {
    /// Returns the short message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation => "Please enter a problem description to get a clue.".to_string(),
            Self::RemoteService { message, .. } => format!(
                "Error: {message}. Please check your network or try again."
            ),
            Self::MalformedResponse(_) => {
                "Could not get a clue. The API response was unexpected.".to_string()
            }
            Self::Transport(reason) => format!(
                "Network error or problem with API call: {reason}. Please check your internet connection."
            ),
        }
    }
}

/// Session persistence errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Store schema has not been created.
    #[error("session store not initialized")]
    NotInitialized,

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A hint was saved without the problem it answers.
    #[error("cannot save a hint without a problem")]
    HintWithoutProblem,
}

/// Controller transition errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// None of the supported page layouts produced any text.
    #[error("no problem description found on this page")]
    ExtractionEmpty,

    /// Another action is still in flight.
    #[error("an action is already in progress ({phase})")]
    Busy {
        /// Phase the controller was in when the action was issued.
        phase: String,
    },

    /// Copy was requested but no hint is shown.
    #[error("no hint to copy")]
    NothingToCopy,

    /// The hint request failed.
    #[error(transparent)]
    Hint(#[from] HintError),

    /// Persisting or restoring the session failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ControllerError {
    /// Returns the short message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ExtractionEmpty => "No problem description found on this page. \
                Please ensure you are on a LeetCode or CodeChef problem page."
                .to_string(),
            Self::Busy { .. } => "Please wait for the current action to finish.".to_string(),
            Self::NothingToCopy => "There is no clue to copy yet.".to_string(),
            Self::Hint(e) => e.user_message(),
            Self::Session(_) => "Could not access the saved session.".to_string(),
        }
    }
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Requested feature was not compiled in.
    #[error("feature not enabled: {0}")]
    FeatureDisabled(String),
}

// Implement From traits for library errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Session(SessionError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for HintError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Transport(format!("unable to reach the service: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}
