use std::sync::Arc;

use async_trait::async_trait;
use domain_approval::{
    model::{entity::DbApprovalRecord, vo::ApprovalState},
    repository::{ApprovalRecordRepo, DbField},
    service::EntityApproveService,
};
use uuid::Uuid;

/// Approve capability for entity kinds without their own hook: writes the final state and the
/// acting user onto the record.
#[derive(typed_builder::TypedBuilder)]
pub struct DefaultEntityApproveServiceImpl {
    record_repo: Arc<dyn ApprovalRecordRepo>,
}

#[async_trait]
impl EntityApproveService for DefaultEntityApproveServiceImpl {
    async fn approve(
        &self,
        record_id: Uuid,
        state: ApprovalState,
        acting_user: Option<Uuid>,
    ) -> anyhow::Result<()> {
        self.record_repo
            .update(DbApprovalRecord {
                id: DbField::Unchanged(record_id),
                approval_state: DbField::Set(state),
                approval_last_user: match acting_user {
                    Some(user) => DbField::Set(Some(user)),
                    None => DbField::NotSet,
                },
                ..Default::default()
            })
            .await?;
        self.record_repo.save_changed().await?;
        tracing::info!("Record: {record_id} finalized as {state}");
        Ok(())
    }
}
