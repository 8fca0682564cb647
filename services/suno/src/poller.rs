//! Fixed-interval status polling

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use common::{SunoConfig, SunoError, SunoResult};
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::clerk::IdentityProvider;
use crate::models::{Clip, SongStatus};
use crate::session::Session;
use crate::studio::StudioApi;

/// Terminal state of every polled song, in submission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOutcome {
    pub completed: Vec<Clip>,
    pub failed: Vec<Clip>,
}

/// Polls the studio feed until all songs are complete or failed
#[derive(Clone)]
pub struct Poller {
    studio: Arc<dyn StudioApi>,
    identity: Arc<dyn IdentityProvider>,
    interval: Duration,
    timeout: Duration,
}

impl Poller {
    pub fn new(
        studio: Arc<dyn StudioApi>,
        identity: Arc<dyn IdentityProvider>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            studio,
            identity,
            interval,
            timeout,
        }
    }

    pub fn from_config(
        studio: Arc<dyn StudioApi>,
        identity: Arc<dyn IdentityProvider>,
        config: &SunoConfig,
    ) -> Self {
        Self::new(
            studio,
            identity,
            config.poll_interval(),
            config.poll_timeout(),
        )
    }

    /// Wait for every song to reach a terminal state
    ///
    /// A failed song is reported once and polling carries on for the others.
    /// Gives up with [`SunoError::PollTimeout`] once the timeout has elapsed.
    pub async fn wait_for(
        &self,
        session: &mut Session,
        song_ids: &[String],
    ) -> SunoResult<PollOutcome> {
        let started = Instant::now();
        let mut finished: HashMap<String, Clip> = HashMap::new();
        let mut cycle = 0u32;

        info!("Checking if the songs are ready for download...");

        loop {
            let pending: Vec<String> = song_ids
                .iter()
                .filter(|id| !finished.contains_key(*id))
                .cloned()
                .collect();

            if pending.is_empty() {
                break;
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(SunoError::PollTimeout { pending, waited });
            }

            // Last check lands on the deadline
            sleep(self.interval.min(self.timeout - waited)).await;
            cycle += 1;

            session.ensure_fresh(self.identity.as_ref()).await?;
            let clips = self.studio.feed(session, &pending).await?;

            let wanted: HashSet<&String> = pending.iter().collect();
            for clip in clips {
                if !wanted.contains(&clip.id) {
                    continue;
                }

                info!("Song ID: {}, Status: {}", clip.id, clip.status);
                match clip.status {
                    SongStatus::Failed => {
                        warn!(
                            "Song {} failed: {}",
                            clip.id,
                            clip.error_message.as_deref().unwrap_or("no reason given")
                        );
                        finished.insert(clip.id.clone(), clip);
                    }
                    SongStatus::Complete => {
                        finished.insert(clip.id.clone(), clip);
                    }
                    _ => {}
                }
            }

            if finished.len() < song_ids.len() {
                info!("⏳ Some songs are still not ready (check {}). Checking again...", cycle);
            }
        }

        info!("🎶 All songs reached a final state after {} checks", cycle);

        let mut outcome = PollOutcome::default();
        for id in song_ids {
            if let Some(clip) = finished.remove(id) {
                if clip.status == SongStatus::Complete {
                    outcome.completed.push(clip);
                } else {
                    outcome.failed.push(clip);
                }
            }
        }

        Ok(outcome)
    }
}
