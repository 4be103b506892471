use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserPrivilegeService: Send + Sync {
    async fn is_admin(&self, user: Uuid) -> anyhow::Result<bool>;
}
