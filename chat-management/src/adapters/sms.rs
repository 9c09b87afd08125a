//! SMS dispatch adapters. `LogOnlySmsProvider` is the local-dev default -
//! it never contacts a vendor, only logs - mirroring the teacher's
//! `EmailService`'s dev-mode console fallback. `VendorSmsProvider` is a
//! placeholder satisfying the port; the spec treats the vendor integration
//! itself as out of scope.

use crate::domain::PhoneNumber;
use crate::ports::SmsProvider;
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct LogOnlySmsProvider;

#[async_trait]
impl SmsProvider for LogOnlySmsProvider {
    async fn send_otp(&self, phone_number: &str, code: &str) -> anyhow::Result<()> {
        let masked = PhoneNumber::parse(phone_number)
            .map(|p| p.masked())
            .unwrap_or_else(|_| "<unparseable>".to_string());
        tracing::info!(phone = %masked, code, "dispatching otp (log-only provider)");
        Ok(())
    }
}

/// Placeholder vendor client. Configuring `SMS_PROVIDER=vendor` without a
/// real backing integration will fail every dispatch; wiring a genuine
/// vendor SDK here is left for a follow-up.
#[derive(Debug, Default)]
pub struct VendorSmsProvider;

#[async_trait]
impl SmsProvider for VendorSmsProvider {
    async fn send_otp(&self, _phone_number: &str, _code: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(
            "vendor sms provider is not configured; no vendor SDK is wired in"
        ))
    }
}
