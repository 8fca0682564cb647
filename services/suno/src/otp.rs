//! One-time passcode sources

use async_trait::async_trait;
use common::SunoResult;

use crate::prompt::ask;

/// Supplies the OTP code texted to a phone number
#[async_trait]
pub trait OtpProvider: Send + Sync {
    async fn otp_for(&self, phone: &str) -> SunoResult<String>;
}

/// Asks the operator to type the code
#[derive(Debug, Clone, Default)]
pub struct ConsoleOtpProvider;

#[async_trait]
impl OtpProvider for ConsoleOtpProvider {
    async fn otp_for(&self, phone: &str) -> SunoResult<String> {
        ask(&format!("🔑 Enter the OTP you received for {}: ", phone)).await
    }
}
