//! Session fallback across phone numbers
//!
//! Phone numbers are tried strictly in registry order. An authentication
//! failure or an out-of-credits account moves on to the next number; any
//! other error ends the run.

use common::{SunoError, SunoResult};
use tracing::{error, info, warn};

use crate::authenticator::Authenticator;
use crate::generator::Generator;
use crate::session::{Session, SessionRegistry, mask_phone};

/// A phone number that was passed over, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSession {
    pub phone: String,
    pub reason: String,
}

/// Songs requested through the first session that worked
#[derive(Debug)]
pub struct GeneratedSongs {
    pub session: Session,
    pub song_ids: Vec<String>,
    pub skipped: Vec<SkippedSession>,
}

/// Runs Authenticator then Generator for each registry entry until one succeeds
#[derive(Clone)]
pub struct SessionFallback {
    authenticator: Authenticator,
    generator: Generator,
}

impl SessionFallback {
    pub fn new(authenticator: Authenticator, generator: Generator) -> Self {
        Self {
            authenticator,
            generator,
        }
    }

    pub async fn generate(
        &self,
        registry: &SessionRegistry,
        prompt: &str,
    ) -> SunoResult<GeneratedSongs> {
        let mut skipped: Vec<SkippedSession> = Vec::new();

        for phone in registry.iter() {
            info!(
                "Attempting to generate song using phone number: {}",
                mask_phone(phone)
            );

            let attempt = match self.authenticator.authenticate(phone).await {
                Ok(mut session) => self
                    .generator
                    .generate(&mut session, prompt)
                    .await
                    .map(|song_ids| (session, song_ids)),
                Err(e) => Err(e),
            };

            match attempt {
                Ok((session, song_ids)) => {
                    info!(
                        "🎶 Song generated successfully for {}! 🎶",
                        mask_phone(phone)
                    );
                    return Ok(GeneratedSongs {
                        session,
                        song_ids,
                        skipped,
                    });
                }
                Err(e) if e.advances_fallback() => {
                    warn!("{}. Trying next session...", e);
                    skipped.push(SkippedSession {
                        phone: phone.to_string(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!("Unexpected error for session {}: {}", mask_phone(phone), e);
                    return Err(e);
                }
            }
        }

        error!("All sessions failed to generate songs");
        Err(SunoError::ExhaustedSessions {
            attempted: skipped.len(),
        })
    }
}
