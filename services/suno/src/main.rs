use std::sync::Arc;

use anyhow::Result;
use common::SunoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use suno::{ClerkClient, ConsoleOtpProvider, Pipeline, SessionRegistry, StudioClient, prompt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🎵 Welcome to the Suno Music Generator! 🎵");

    let config = SunoConfig::from_env()?;

    let phone_numbers = prompt::ask(
        "Please enter your phone numbers (comma-separated, including country code): ",
    )
    .await?;
    let registry = SessionRegistry::from_csv(&phone_numbers)?;
    info!("Loaded {} phone number(s)", registry.len());

    let song_prompt = prompt::ask("Enter a creative prompt for the song: ").await?;

    let pipeline = Pipeline::new(
        &config,
        Arc::new(ClerkClient::new(&config)?),
        Arc::new(StudioClient::new(&config)?),
        Arc::new(ConsoleOtpProvider),
    );

    match pipeline.run(&registry, &song_prompt).await {
        Ok(report) => {
            for file in &report.files {
                info!("Saved {}", file.display());
            }
            if !report.failed_song_ids.is_empty() {
                info!(
                    "Songs that failed to render: {}",
                    report.failed_song_ids.join(", ")
                );
            }
            if report.nothing_saved() {
                warn!("No songs were saved");
            } else {
                println!("🎉 Enjoy your new music! 🎉");
            }
            Ok(())
        }
        Err(e) => {
            error!("Song generation failed: {}", e);
            Err(e.into())
        }
    }
}
