use async_trait::async_trait;

/// Side-effect-only SMS dispatch. Implementations must tolerate being
/// called from a detached task whose context does not observe the
/// originating request's cancellation.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send_otp(&self, phone_number: &str, code: &str) -> anyhow::Result<()>;
}
