//! Configuration module for the Suno song generator
//!
//! Settings come from `SUNO_*` environment variables layered over built-in
//! defaults that point at the public Suno endpoints.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;
use tracing::info;

use crate::error::{SunoError, SunoResult};

/// Longest token lifetime accepted; Clerk JWTs live about a minute
pub const MAX_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Runtime configuration for the generator
#[derive(Debug, Clone, Deserialize)]
pub struct SunoConfig {
    /// Base URL of the Clerk identity provider
    pub clerk_base_url: String,
    /// Base URL of the Suno studio API
    pub studio_base_url: String,
    /// Value sent as `_clerk_js_version` on every Clerk call
    pub clerk_js_version: String,
    /// Model name sent as `mv` in generation requests
    pub model: String,
    /// Ask for instrumental tracks only
    pub make_instrumental: bool,
    /// Send the prompt as lyrics instead of a description
    pub custom_mode: bool,
    /// Seconds between two status checks
    pub poll_interval_secs: u64,
    /// Maximum seconds to wait for all songs to finish
    pub poll_timeout_secs: u64,
    /// Lifetime assumed for a session JWT before it is renewed
    pub token_ttl_secs: u64,
    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
    /// Directory the downloaded MP3 files are written to
    pub output_dir: PathBuf,
}

impl SunoConfig {
    /// Create a new SunoConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SUNO_CLERK_BASE_URL` (default: "https://clerk.suno.com")
    /// - `SUNO_STUDIO_BASE_URL` (default: "https://studio-api.suno.ai")
    /// - `SUNO_CLERK_JS_VERSION` (default: "5.26.3")
    /// - `SUNO_MODEL` (default: "chirp-v3-5")
    /// - `SUNO_MAKE_INSTRUMENTAL` (default: false)
    /// - `SUNO_CUSTOM_MODE` (default: false)
    /// - `SUNO_POLL_INTERVAL_SECS` (default: 5)
    /// - `SUNO_POLL_TIMEOUT_SECS` (default: 600)
    /// - `SUNO_TOKEN_TTL_SECS` (default: 60)
    /// - `SUNO_HTTP_TIMEOUT_SECS` (default: 30)
    /// - `SUNO_OUTPUT_DIR` (default: ".")
    pub fn from_env() -> SunoResult<Self> {
        let defaults = SunoConfig::default();
        let settings = Config::builder()
            .set_default("clerk_base_url", defaults.clerk_base_url)?
            .set_default("studio_base_url", defaults.studio_base_url)?
            .set_default("clerk_js_version", defaults.clerk_js_version)?
            .set_default("model", defaults.model)?
            .set_default("make_instrumental", defaults.make_instrumental)?
            .set_default("custom_mode", defaults.custom_mode)?
            .set_default("poll_interval_secs", defaults.poll_interval_secs as i64)?
            .set_default("poll_timeout_secs", defaults.poll_timeout_secs as i64)?
            .set_default("token_ttl_secs", defaults.token_ttl_secs as i64)?
            .set_default("http_timeout_secs", defaults.http_timeout_secs as i64)?
            .set_default(
                "output_dir",
                defaults.output_dir.to_string_lossy().into_owned(),
            )?
            .add_source(Environment::with_prefix("SUNO").try_parsing(true))
            .build()?;

        let config: SunoConfig = settings.try_deserialize()?;
        config.validate()?;

        info!(
            "Loaded configuration: studio={}, model={}, poll every {}s for up to {}s",
            config.studio_base_url,
            config.model,
            config.poll_interval_secs,
            config.poll_timeout_secs
        );

        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> SunoResult<()> {
        for (name, url) in [
            ("clerk_base_url", &self.clerk_base_url),
            ("studio_base_url", &self.studio_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SunoError::Configuration(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }

        if self.poll_interval_secs == 0 {
            return Err(SunoError::Configuration(
                "poll_interval_secs must be positive".to_string(),
            ));
        }

        if self.poll_timeout_secs < self.poll_interval_secs {
            return Err(SunoError::Configuration(format!(
                "poll_timeout_secs ({}) must be at least poll_interval_secs ({})",
                self.poll_timeout_secs, self.poll_interval_secs
            )));
        }

        if self.token_ttl_secs == 0 || self.http_timeout_secs == 0 {
            return Err(SunoError::Configuration(
                "token_ttl_secs and http_timeout_secs must be positive".to_string(),
            ));
        }

        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(SunoError::Configuration(format!(
                "token_ttl_secs ({}) must not exceed {}",
                self.token_ttl_secs, MAX_TOKEN_TTL_SECS
            )));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

impl Default for SunoConfig {
    fn default() -> Self {
        Self {
            clerk_base_url: "https://clerk.suno.com".to_string(),
            studio_base_url: "https://studio-api.suno.ai".to_string(),
            clerk_js_version: "5.26.3".to_string(),
            model: "chirp-v3-5".to_string(),
            make_instrumental: false,
            custom_mode: false,
            poll_interval_secs: 5,
            poll_timeout_secs: 600,
            token_ttl_secs: 60,
            http_timeout_secs: 30,
            output_dir: PathBuf::from("."),
        }
    }
}
