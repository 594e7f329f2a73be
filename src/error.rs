// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the meomeokno shell
//!
//! Nothing in here ever crosses the bridge into the hosted page. Errors are
//! logged by whoever catches them and the page only ever sees a callback or
//! silence.

use thiserror::Error;

/// Result type alias for shell operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the shell
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP method could not be parsed
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// JavaScript evaluation failed inside the page
    #[error("JavaScript error: {message}")]
    JavaScript {
        message: String,
        source_label: Option<String>,
    },

    /// Network interception error
    #[error("Network error: {0}")]
    Network(String),

    /// Platform service (permissions, location) failed
    #[error("Platform error: {0}")]
    Platform(String),

    /// The page host thread has shut down
    #[error("Page host has been closed")]
    PageClosed,

    /// The UI loop is no longer receiving events
    #[error("Shell has been shut down")]
    ShellClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new JavaScript error
    pub fn js<S: Into<String>>(msg: S) -> Self {
        Error::JavaScript {
            message: msg.into(),
            source_label: None,
        }
    }

    /// Create a JavaScript error tagged with the script it came from
    pub fn js_in<S: Into<String>>(msg: S, source_label: impl Into<String>) -> Self {
        Error::JavaScript {
            message: msg.into(),
            source_label: Some(source_label.into()),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a new platform error
    pub fn platform<S: Into<String>>(msg: S) -> Self {
        Error::Platform(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if the host side of a channel went away
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::PageClosed | Error::ShellClosed)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
