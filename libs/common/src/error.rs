//! Custom error types for the common library
//!
//! This module defines the error type shared by every stage of the song
//! generation pipeline.

use std::time::Duration;

use thiserror::Error;

/// Custom error type for the song generation pipeline
#[derive(Error, Debug)]
pub enum SunoError {
    /// Sign-in or OTP verification failed for a phone number
    #[error("Authentication failed for {phone}: {reason}")]
    Authentication { phone: String, reason: String },

    /// The account behind the session has no credits left
    #[error("Insufficient credits for {phone}")]
    InsufficientCredits { phone: String },

    /// Generation was rejected for a reason other than credits
    #[error("Song generation failed: {0}")]
    Generation(String),

    /// Transport-level or unexpected HTTP failure
    #[error("Network error: {0}")]
    Network(String),

    /// Fetching or saving the audio of a completed song failed
    #[error("Download of song {song_id} failed: {reason}")]
    Download { song_id: String, reason: String },

    /// Every phone number in the registry was tried without success
    #[error("All {attempted} sessions failed to generate songs")]
    ExhaustedSessions { attempted: usize },

    /// Songs did not reach a terminal state in time
    #[error("Timed out after {waited:?} waiting for songs: {}", .pending.join(", "))]
    PollTimeout {
        pending: Vec<String>,
        waited: Duration,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid operator input
    #[error("Invalid input: {0}")]
    Input(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SunoError {
    /// Whether the session fallback loop should move on to the next phone number
    pub fn advances_fallback(&self) -> bool {
        matches!(
            self,
            SunoError::Authentication { .. } | SunoError::InsufficientCredits { .. }
        )
    }
}

impl From<reqwest::Error> for SunoError {
    fn from(err: reqwest::Error) -> Self {
        SunoError::Network(err.to_string())
    }
}

impl From<config::ConfigError> for SunoError {
    fn from(err: config::ConfigError) -> Self {
        SunoError::Configuration(err.to_string())
    }
}

/// Type alias for Result with SunoError
pub type SunoResult<T> = Result<T, SunoError>;
