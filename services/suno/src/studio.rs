//! Suno studio API integration
//!
//! Generation, status feed and audio download endpoints.

use std::path::Path;

use async_trait::async_trait;
use common::{SunoConfig, SunoError, SunoResult};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::clerk::BROWSER_USER_AGENT;
use crate::models::{ApiErrorBody, Clip, GenerateRequest, GenerateResponse};
use crate::session::Session;

/// Marker the studio puts in `detail` when the account is out of credits
const INSUFFICIENT_CREDITS: &str = "Insufficient credits";

/// Operations of the studio API used by the pipeline
#[async_trait]
pub trait StudioApi: Send + Sync {
    /// Submit a prompt and return the clips created for it
    async fn generate(&self, session: &Session, request: &GenerateRequest)
    -> SunoResult<Vec<Clip>>;

    /// Current state of the given clips
    async fn feed(&self, session: &Session, song_ids: &[String]) -> SunoResult<Vec<Clip>>;

    /// Stream an audio file to `destination`, returning the bytes written
    async fn download_audio(&self, audio_url: &str, destination: &Path) -> SunoResult<u64>;
}

/// Studio HTTP client
#[derive(Clone)]
pub struct StudioClient {
    client: Client,
    base_url: String,
}

impl StudioClient {
    pub fn new(config: &SunoConfig) -> SunoResult<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.studio_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate/v2/", self.base_url)
    }

    fn feed_url(&self, song_ids: &[String]) -> String {
        format!("{}/api/feed/?ids={}", self.base_url, song_ids.join(","))
    }

    async fn stream_to_file(&self, audio_url: &str, destination: &Path) -> SunoResult<u64> {
        let mut response = self
            .client
            .get(audio_url)
            .send()
            .await?
            .error_for_status()?;

        let mut file = File::create(destination).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

/// Classify a rejected generation request
fn generation_error(session: &Session, status: u16, body: &str) -> SunoError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.detail_text())
        .unwrap_or_default();

    if detail.contains(INSUFFICIENT_CREDITS) || body.contains(INSUFFICIENT_CREDITS) {
        return SunoError::InsufficientCredits {
            phone: session.phone().to_string(),
        };
    }

    let message = if detail.is_empty() { body } else { detail.as_str() };
    SunoError::Generation(format!("HTTP {}: {}", status, message))
}

#[async_trait]
impl StudioApi for StudioClient {
    async fn generate(
        &self,
        session: &Session,
        request: &GenerateRequest,
    ) -> SunoResult<Vec<Clip>> {
        debug!("Submitting generation request: {:?}", request);

        let response = self
            .client
            .post(self.generate_url())
            .bearer_auth(session.jwt())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(generation_error(session, status.as_u16(), &body));
        }

        let generated: GenerateResponse = response.json().await?;
        Ok(generated.clips)
    }

    async fn feed(&self, session: &Session, song_ids: &[String]) -> SunoResult<Vec<Clip>> {
        let response = self
            .client
            .get(self.feed_url(song_ids))
            .bearer_auth(session.jwt())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SunoError::Network(format!(
                "status check returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        Ok(response.json().await?)
    }

    async fn download_audio(&self, audio_url: &str, destination: &Path) -> SunoResult<u64> {
        match self.stream_to_file(audio_url, destination).await {
            Ok(written) => {
                info!("Wrote {} bytes to {}", written, destination.display());
                Ok(written)
            }
            Err(e) => {
                if tokio::fs::remove_file(destination).await.is_ok() {
                    warn!("Removed partial download {}", destination.display());
                }
                Err(e)
            }
        }
    }
}
