//! End-to-end run: fallback loop, polling, download

use std::path::PathBuf;
use std::sync::Arc;

use common::{SunoConfig, SunoError, SunoResult};
use tracing::{error, info, warn};

use crate::authenticator::Authenticator;
use crate::clerk::IdentityProvider;
use crate::downloader::Downloader;
use crate::fallback::{SessionFallback, SkippedSession};
use crate::generator::Generator;
use crate::otp::OtpProvider;
use crate::poller::Poller;
use crate::session::SessionRegistry;
use crate::studio::StudioApi;
use crate::validation::validate_prompt;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Phone number whose session generated the songs
    pub phone: String,
    pub song_ids: Vec<String>,
    /// Files written, in song order
    pub files: Vec<PathBuf>,
    /// Songs the studio reported as failed
    pub failed_song_ids: Vec<String>,
    pub skipped: Vec<SkippedSession>,
}

impl RunReport {
    /// True when every song failed to render, so no file was written
    pub fn nothing_saved(&self) -> bool {
        self.files.is_empty()
    }
}

/// The generator pipeline wired to its external services
#[derive(Clone)]
pub struct Pipeline {
    fallback: SessionFallback,
    poller: Poller,
    downloader: Downloader,
}

impl Pipeline {
    pub fn new(
        config: &SunoConfig,
        identity: Arc<dyn IdentityProvider>,
        studio: Arc<dyn StudioApi>,
        otp: Arc<dyn OtpProvider>,
    ) -> Self {
        let authenticator = Authenticator::new(identity.clone(), otp, config.token_ttl());
        let generator = Generator::new(studio.clone(), identity.clone(), config);

        Self {
            fallback: SessionFallback::new(authenticator, generator),
            poller: Poller::from_config(studio.clone(), identity.clone(), config),
            downloader: Downloader::new(studio, identity, config.output_dir.clone()),
        }
    }

    /// Generate songs for `prompt` and download every one that completes
    ///
    /// All completed songs are attempted; if any download fails the first
    /// failure is returned once the rest have been tried.
    pub async fn run(&self, registry: &SessionRegistry, prompt: &str) -> SunoResult<RunReport> {
        validate_prompt(prompt).map_err(SunoError::Input)?;

        let generated = self.fallback.generate(registry, prompt).await?;
        let mut session = generated.session;

        let outcome = self
            .poller
            .wait_for(&mut session, &generated.song_ids)
            .await?;

        for clip in &outcome.failed {
            warn!("Song {} failed and will not be downloaded", clip.id);
        }

        info!(
            "Starting the download process into {}",
            self.downloader.output_dir().display()
        );

        let mut files = Vec::with_capacity(outcome.completed.len());
        let mut first_failure: Option<SunoError> = None;

        for clip in &outcome.completed {
            match self.downloader.download(&mut session, clip).await {
                Ok(path) => files.push(path),
                Err(e) => {
                    error!("❌ {}", e);
                    first_failure.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_failure {
            return Err(e);
        }

        Ok(RunReport {
            phone: session.phone().to_string(),
            song_ids: generated.song_ids,
            files,
            failed_song_ids: outcome.failed.into_iter().map(|clip| clip.id).collect(),
            skipped: generated.skipped,
        })
    }
}
