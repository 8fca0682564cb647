//! Phone number sign-in with OTP verification

use std::sync::Arc;
use std::time::Duration;

use common::{SunoError, SunoResult};
use tracing::info;

use crate::clerk::IdentityProvider;
use crate::otp::OtpProvider;
use crate::session::{Session, mask_phone};

/// Turns a phone number into an authenticated [`Session`]
#[derive(Clone)]
pub struct Authenticator {
    identity: Arc<dyn IdentityProvider>,
    otp: Arc<dyn OtpProvider>,
    token_ttl: Duration,
}

impl Authenticator {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        otp: Arc<dyn OtpProvider>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            identity,
            otp,
            token_ttl,
        }
    }

    /// Run sign-in, OTP challenge and verification for one phone number
    ///
    /// The OTP is asked for exactly once; a wrong or expired code fails with
    /// [`SunoError::Authentication`].
    pub async fn authenticate(&self, phone: &str) -> SunoResult<Session> {
        info!("Signing in with {}", mask_phone(phone));

        let attempt = self.identity.create_sign_in(phone).await?;
        self.identity.prepare_phone_code(&attempt).await?;

        let code = self.otp.otp_for(phone).await?;
        let code = code.trim();
        if code.is_empty() {
            return Err(SunoError::Authentication {
                phone: phone.to_string(),
                reason: "no OTP code entered".to_string(),
            });
        }

        let completion = self.identity.attempt_phone_code(&attempt, code).await?;
        let session_id = completion
            .created_session_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SunoError::Authentication {
                phone: phone.to_string(),
                reason: format!(
                    "no session created (sign-in status: {})",
                    completion.status.as_deref().unwrap_or("unknown")
                ),
            })?;

        let mut session = Session::new(
            phone,
            attempt.client_token.clone(),
            session_id,
            self.token_ttl,
        );
        session.renew(self.identity.as_ref()).await?;

        info!("Session established for {}", session.masked_phone());
        Ok(session)
    }
}
