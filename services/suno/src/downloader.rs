//! Audio download for completed songs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{SunoError, SunoResult};
use tracing::{error, info};

use crate::clerk::IdentityProvider;
use crate::models::Clip;
use crate::session::Session;
use crate::studio::StudioApi;

/// File name a song is saved under
pub fn file_name_for(song_id: &str) -> String {
    format!("SunoMusic-{}.mp3", song_id)
}

/// Saves completed songs as MP3 files
#[derive(Clone)]
pub struct Downloader {
    studio: Arc<dyn StudioApi>,
    identity: Arc<dyn IdentityProvider>,
    output_dir: PathBuf,
}

impl Downloader {
    pub fn new(
        studio: Arc<dyn StudioApi>,
        identity: Arc<dyn IdentityProvider>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            studio,
            identity,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download one completed song, returning the path written
    ///
    /// The session token is renewed first. Every failure is reported as
    /// [`SunoError::Download`] for that song.
    pub async fn download(&self, session: &mut Session, clip: &Clip) -> SunoResult<PathBuf> {
        self.try_download(session, clip)
            .await
            .map_err(|e| match e {
                SunoError::Download { .. } => e,
                other => SunoError::Download {
                    song_id: clip.id.clone(),
                    reason: other.to_string(),
                },
            })
    }

    async fn try_download(&self, session: &mut Session, clip: &Clip) -> SunoResult<PathBuf> {
        session.renew(self.identity.as_ref()).await?;

        let audio_url = match &clip.audio_url {
            Some(url) => url.clone(),
            None => self.lookup_audio_url(session, &clip.id).await?,
        };

        let destination = self.output_dir.join(file_name_for(&clip.id));
        self.studio.download_audio(&audio_url, &destination).await?;

        info!("Downloaded song: {}", destination.display());
        Ok(destination)
    }

    async fn lookup_audio_url(&self, session: &Session, song_id: &str) -> SunoResult<String> {
        let clips = self.studio.feed(session, &[song_id.to_string()]).await?;

        clips
            .into_iter()
            .find(|clip| clip.id == song_id)
            .and_then(|clip| clip.audio_url)
            .ok_or_else(|| {
                error!("No audio URL found for song ID {}", song_id);
                SunoError::Download {
                    song_id: song_id.to_string(),
                    reason: "no audio URL found".to_string(),
                }
            })
    }
}
