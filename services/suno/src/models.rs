//! Wire models for the Clerk identity provider and the Suno studio API

use serde::{Deserialize, Serialize};
use std::fmt;

/// First-factor strategy that texts a one-time code
pub const PHONE_CODE_STRATEGY: &str = "phone_code";

/// Clerk wraps every client resource in a `response` field
#[derive(Debug, Clone, Deserialize)]
pub struct ClerkEnvelope<T> {
    pub response: T,
}

/// Sign-in attempt created for a phone number
#[derive(Debug, Clone, Deserialize)]
pub struct SignInAttempt {
    pub id: String,
    #[serde(default)]
    pub supported_first_factors: Vec<FirstFactor>,
    /// Phone number the attempt was created for
    #[serde(skip)]
    pub phone: String,
    /// Client token returned in the `Authorization` response header
    #[serde(skip)]
    pub client_token: Option<String>,
}

impl SignInAttempt {
    /// Phone number id of the first `phone_code` factor
    pub fn phone_number_id(&self) -> Option<&str> {
        self.supported_first_factors
            .iter()
            .filter(|factor| factor.strategy.as_deref() == Some(PHONE_CODE_STRATEGY))
            .find_map(|factor| factor.phone_number_id.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirstFactor {
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub phone_number_id: Option<String>,
}

/// Outcome of submitting the OTP code
#[derive(Debug, Clone, Deserialize)]
pub struct SignInCompletion {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_session_id: Option<String>,
}

/// Session token issued by Clerk
#[derive(Debug, Clone, Deserialize)]
pub struct SessionToken {
    pub jwt: String,
}

/// Body of a generation request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateRequest {
    pub make_instrumental: bool,
    pub mv: String,
    pub prompt: String,
    pub gpt_description_prompt: String,
}

impl GenerateRequest {
    /// Build a request; in custom mode the prompt is sent as lyrics
    pub fn new(prompt: &str, model: &str, make_instrumental: bool, custom_mode: bool) -> Self {
        let (prompt, description) = if custom_mode {
            (prompt.to_string(), String::new())
        } else {
            (String::new(), prompt.to_string())
        };

        Self {
            make_instrumental,
            mv: model.to_string(),
            prompt,
            gpt_description_prompt: description,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub clips: Vec<Clip>,
}

/// Error body returned by the studio API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// `detail` is a string for most errors but a list for validation failures
    pub fn detail_text(&self) -> String {
        match &self.detail {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

/// One generated song as reported by the studio API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Clip {
    pub id: String,
    #[serde(default)]
    pub status: SongStatus,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Song status vocabulary of the studio API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SongStatus {
    #[default]
    Queued,
    Streaming,
    Complete,
    Failed,
    Unknown(String),
}

impl SongStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SongStatus::Complete | SongStatus::Failed)
    }
}

impl From<String> for SongStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "submitted" | "queued" => SongStatus::Queued,
            "streaming" => SongStatus::Streaming,
            "complete" => SongStatus::Complete,
            "error" | "failed" => SongStatus::Failed,
            _ => SongStatus::Unknown(value),
        }
    }
}

impl From<&str> for SongStatus {
    fn from(value: &str) -> Self {
        SongStatus::from(value.to_string())
    }
}

impl fmt::Display for SongStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongStatus::Queued => f.write_str("queued"),
            SongStatus::Streaming => f.write_str("streaming"),
            SongStatus::Complete => f.write_str("complete"),
            SongStatus::Failed => f.write_str("failed"),
            SongStatus::Unknown(other) => f.write_str(other),
        }
    }
}
