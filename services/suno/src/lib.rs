//! Suno song generator
//!
//! Signs in to Suno with a phone number and one-time code, submits a prompt,
//! polls until the songs are rendered and saves each one as an MP3. Phone
//! numbers are tried in order until one of them can generate.

pub mod authenticator;
pub mod clerk;
pub mod downloader;
pub mod fallback;
pub mod generator;
pub mod models;
pub mod otp;
pub mod pipeline;
pub mod poller;
pub mod prompt;
pub mod session;
pub mod studio;
pub mod validation;

#[cfg(test)]
mod testing;

pub use authenticator::Authenticator;
pub use clerk::{ClerkClient, IdentityProvider};
pub use downloader::{Downloader, file_name_for};
pub use fallback::{GeneratedSongs, SessionFallback, SkippedSession};
pub use generator::Generator;
pub use models::{Clip, GenerateRequest, SongStatus};
pub use otp::{ConsoleOtpProvider, OtpProvider};
pub use pipeline::{Pipeline, RunReport};
pub use poller::{PollOutcome, Poller};
pub use session::{Session, SessionRegistry};
pub use studio::{StudioApi, StudioClient};
