use async_trait::async_trait;

use crate::model::vo::ApprovalMessage;

/// Delivers approval messages. Must not block the caller on delivery.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, msg: ApprovalMessage) -> anyhow::Result<()>;
}
