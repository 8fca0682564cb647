//! Prompt submission

use std::sync::Arc;

use common::{SunoConfig, SunoError, SunoResult};
use tracing::info;

use crate::clerk::IdentityProvider;
use crate::models::GenerateRequest;
use crate::session::Session;
use crate::studio::StudioApi;
use crate::validation::validate_prompt;

/// Submits prompts to the studio on behalf of a session
#[derive(Clone)]
pub struct Generator {
    studio: Arc<dyn StudioApi>,
    identity: Arc<dyn IdentityProvider>,
    model: String,
    make_instrumental: bool,
    custom_mode: bool,
}

impl Generator {
    pub fn new(
        studio: Arc<dyn StudioApi>,
        identity: Arc<dyn IdentityProvider>,
        config: &SunoConfig,
    ) -> Self {
        Self {
            studio,
            identity,
            model: config.model.clone(),
            make_instrumental: config.make_instrumental,
            custom_mode: config.custom_mode,
        }
    }

    /// Request songs for `prompt` and return their ids
    ///
    /// Fails with [`SunoError::InsufficientCredits`] when the account is out
    /// of quota. Nothing is retried here.
    pub async fn generate(&self, session: &mut Session, prompt: &str) -> SunoResult<Vec<String>> {
        validate_prompt(prompt).map_err(SunoError::Input)?;
        session.ensure_fresh(self.identity.as_ref()).await?;

        let request = GenerateRequest::new(
            prompt,
            &self.model,
            self.make_instrumental,
            self.custom_mode,
        );
        let clips = self.studio.generate(session, &request).await?;

        if clips.is_empty() {
            return Err(SunoError::Generation(
                "the studio returned no clips".to_string(),
            ));
        }

        let song_ids: Vec<String> = clips.into_iter().map(|clip| clip.id).collect();
        info!(
            "Generated song IDs for {}: {:?}",
            session.masked_phone(),
            song_ids
        );

        Ok(song_ids)
    }
}
