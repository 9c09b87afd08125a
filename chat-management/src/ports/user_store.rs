use crate::models::UserRecord;
use async_trait::async_trait;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, user_id: &str) -> anyhow::Result<Option<UserRecord>>;

    async fn find_by_phone(&self, phone_number: &str) -> anyhow::Result<Option<UserRecord>>;
}
