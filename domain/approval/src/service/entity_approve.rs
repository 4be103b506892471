use async_trait::async_trait;
use uuid::Uuid;

use crate::model::vo::ApprovalState;

/// Per entity kind hook run when an instance reaches a final state.
#[async_trait]
pub trait EntityApproveService: Send + Sync {
    async fn approve(
        &self,
        record_id: Uuid,
        state: ApprovalState,
        acting_user: Option<Uuid>,
    ) -> anyhow::Result<()>;
}
