//! Clerk identity provider integration
//!
//! Suno signs users in through Clerk's frontend API: a sign-in attempt is
//! created for the phone number, an SMS code is requested and verified, and
//! the resulting session id is exchanged for short-lived JWTs.

use async_trait::async_trait;
use common::{SunoConfig, SunoError, SunoResult};
use reqwest::header::{AUTHORIZATION, ORIGIN, REFERER};
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info};

use crate::models::{
    ClerkEnvelope, PHONE_CODE_STRATEGY, SessionToken, SignInAttempt, SignInCompletion,
};
use crate::session::{Session, mask_phone};

/// Clerk rejects requests that do not look like they come from a browser
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";

/// Phone sign-in operations of the identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Start a sign-in attempt for a phone number
    async fn create_sign_in(&self, phone: &str) -> SunoResult<SignInAttempt>;

    /// Ask the provider to text a one-time code to the number
    async fn prepare_phone_code(&self, attempt: &SignInAttempt) -> SunoResult<()>;

    /// Submit the one-time code
    async fn attempt_phone_code(
        &self,
        attempt: &SignInAttempt,
        code: &str,
    ) -> SunoResult<SignInCompletion>;

    /// Exchange an established session for a fresh JWT
    async fn session_token(&self, session: &Session) -> SunoResult<SessionToken>;
}

/// Clerk HTTP client
#[derive(Clone)]
pub struct ClerkClient {
    client: Client,
    base_url: String,
    js_version: String,
}

impl ClerkClient {
    pub fn new(config: &SunoConfig) -> SunoResult<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.clerk_base_url.trim_end_matches('/').to_string(),
            js_version: config.clerk_js_version.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/v1/client/{}?_clerk_js_version={}",
            self.base_url, path, self.js_version
        )
    }

    fn post(&self, path: &str, client_token: Option<&str>) -> RequestBuilder {
        let mut request = self
            .client
            .post(self.url(path))
            .header(ORIGIN, &self.base_url)
            .header(REFERER, &self.base_url);

        if let Some(token) = client_token {
            request = request.header(AUTHORIZATION, token);
        }

        request
    }
}

/// Turn a non-success Clerk response into an authentication failure
async fn reject(response: Response, phone: &str, step: &str) -> SunoError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!("Clerk {} response body: {}", step, body);

    SunoError::Authentication {
        phone: phone.to_string(),
        reason: format!("{} returned HTTP {}", step, status.as_u16()),
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn create_sign_in(&self, phone: &str) -> SunoResult<SignInAttempt> {
        let response = self
            .post("sign_ins", None)
            .form(&[("identifier", phone)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, phone, "sign-in").await);
        }

        let client_token = response
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut attempt = response
            .json::<ClerkEnvelope<SignInAttempt>>()
            .await?
            .response;
        attempt.phone = phone.to_string();
        attempt.client_token = client_token;

        info!("Sign-in attempt created for {}", mask_phone(phone));
        Ok(attempt)
    }

    async fn prepare_phone_code(&self, attempt: &SignInAttempt) -> SunoResult<()> {
        let phone_number_id =
            attempt
                .phone_number_id()
                .ok_or_else(|| SunoError::Authentication {
                    phone: attempt.phone.clone(),
                    reason: "no phone code factor offered".to_string(),
                })?;

        let response = self
            .post(
                &format!("sign_ins/{}/prepare_first_factor", attempt.id),
                attempt.client_token.as_deref(),
            )
            .form(&[
                ("phone_number_id", phone_number_id),
                ("strategy", PHONE_CODE_STRATEGY),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, &attempt.phone, "OTP request").await);
        }

        info!("OTP sent to {}", mask_phone(&attempt.phone));
        Ok(())
    }

    async fn attempt_phone_code(
        &self,
        attempt: &SignInAttempt,
        code: &str,
    ) -> SunoResult<SignInCompletion> {
        let response = self
            .post(
                &format!("sign_ins/{}/attempt_first_factor", attempt.id),
                attempt.client_token.as_deref(),
            )
            .form(&[("strategy", PHONE_CODE_STRATEGY), ("code", code)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, &attempt.phone, "OTP verification").await);
        }

        let completion = response
            .json::<ClerkEnvelope<SignInCompletion>>()
            .await?
            .response;

        info!("OTP verified for {}", mask_phone(&attempt.phone));
        Ok(completion)
    }

    async fn session_token(&self, session: &Session) -> SunoResult<SessionToken> {
        let response = self
            .post(
                &format!("sessions/{}/tokens", session.session_id()),
                session.client_token(),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, session.phone(), "token renewal").await);
        }

        Ok(response.json::<SessionToken>().await?)
    }
}
