//! Session state and the registry of phone numbers to try

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use common::{SunoError, SunoResult};
use tracing::{debug, info};

use crate::clerk::IdentityProvider;
use crate::validation::normalize_phone_number;

/// Tokens are renewed this long before their assumed expiry
const RENEWAL_MARGIN_SECS: i64 = 5;

/// Authenticated context bound to one phone number
///
/// A session starts without a JWT; [`Session::renew`] exchanges the Clerk
/// session id for one and sets the expiry.
#[derive(Debug, Clone)]
pub struct Session {
    phone: String,
    client_token: Option<String>,
    session_id: String,
    jwt: String,
    expires_at: DateTime<Utc>,
    token_ttl: Duration,
}

impl Session {
    pub fn new(
        phone: impl Into<String>,
        client_token: Option<String>,
        session_id: impl Into<String>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            phone: phone.into(),
            client_token,
            session_id: session_id.into(),
            jwt: String::new(),
            expires_at: DateTime::<Utc>::MIN_UTC,
            token_ttl,
        }
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Phone number with everything but the last four digits hidden
    pub fn masked_phone(&self) -> String {
        mask_phone(&self.phone)
    }

    /// Clerk client token used as `Authorization` on identity calls
    pub fn client_token(&self) -> Option<&str> {
        self.client_token.as_deref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Bearer token for studio API calls
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.jwt.is_empty() || Utc::now() + TimeDelta::seconds(RENEWAL_MARGIN_SECS) >= self.expires_at
    }

    /// Fetch a fresh JWT for this session
    pub async fn renew(&mut self, identity: &dyn IdentityProvider) -> SunoResult<()> {
        info!("Renewing session token for {}", self.masked_phone());

        let ttl = TimeDelta::from_std(self.token_ttl)
            .map_err(|e| SunoError::Configuration(format!("Invalid token TTL: {}", e)))?;
        let token = identity.session_token(self).await?;

        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            SunoError::Configuration(format!("Token TTL {:?} is out of range", self.token_ttl))
        })?;

        self.jwt = token.jwt;
        self.expires_at = expires_at;
        debug!("Session token valid until {}", self.expires_at);

        Ok(())
    }

    /// Renew the JWT only if it is missing or about to expire
    pub async fn ensure_fresh(&mut self, identity: &dyn IdentityProvider) -> SunoResult<()> {
        if self.is_expired() {
            self.renew(identity).await?;
        }
        Ok(())
    }
}

/// Hide all but the last four digits of a phone number for logging
pub fn mask_phone(phone: &str) -> String {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits <= 4 {
        return phone.to_string();
    }

    let mut remaining = digits - 4;
    phone
        .chars()
        .map(|c| {
            if c.is_ascii_digit() && remaining > 0 {
                remaining -= 1;
                '*'
            } else {
                c
            }
        })
        .collect()
}

/// Ordered, de-duplicated list of phone numbers to attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRegistry {
    phone_numbers: Vec<String>,
}

impl SessionRegistry {
    /// Build a registry from operator-supplied numbers
    ///
    /// Blank entries are dropped and duplicates keep their first position.
    pub fn new<I, S>(phone_numbers: I) -> SunoResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();

        for raw in phone_numbers {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }

            let phone = normalize_phone_number(raw).map_err(SunoError::Input)?;
            if !unique.contains(&phone) {
                unique.push(phone);
            }
        }

        if unique.is_empty() {
            return Err(SunoError::Input(
                "At least one phone number is required".to_string(),
            ));
        }

        Ok(Self {
            phone_numbers: unique,
        })
    }

    /// Parse the comma-separated list typed at the prompt
    pub fn from_csv(input: &str) -> SunoResult<Self> {
        Self::new(input.split(','))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phone_numbers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phone_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phone_numbers.is_empty()
    }
}
