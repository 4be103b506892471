use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use domain_approval::{
    model::{
        entity::{ApprovalRecord, DbApprovalRecord},
        vo::{ApprovalState, RecordEdit},
    },
    repository::{ApprovalRecordRepo, DbField, UpdateMode},
    service::{EntityApproveService, RecordMutatorService},
};
use uuid::Uuid;

#[derive(typed_builder::TypedBuilder)]
pub struct RecordMutatorServiceImpl {
    record_repo: Arc<dyn ApprovalRecordRepo>,
    /// Approve capabilities keyed by entity kind.
    #[builder(default)]
    approve_services: HashMap<String, Arc<dyn EntityApproveService>>,
    default_approve_service: Arc<dyn EntityApproveService>,
}

impl RecordMutatorServiceImpl {
    async fn write(&self, patch: DbApprovalRecord) -> anyhow::Result<()> {
        self.record_repo.update(patch).await?;
        self.record_repo.save_changed().await?;
        Ok(())
    }
}

#[async_trait]
impl RecordMutatorService for RecordMutatorServiceImpl {
    async fn get_record(&self, record_id: Uuid) -> anyhow::Result<ApprovalRecord> {
        self.record_repo.get_by_id(record_id).await
    }

    async fn set_processing(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<()> {
        self.write(DbApprovalRecord {
            id: DbField::Unchanged(record_id),
            approval_state: DbField::Set(ApprovalState::Processing),
            approval_id: DbField::Set(Some(approval_id)),
            approval_step_node: DbField::Set(Some(node)),
            ..Default::default()
        })
        .await
    }

    async fn advance_node(
        &self,
        record_id: Uuid,
        node: String,
        last_user: Uuid,
    ) -> anyhow::Result<()> {
        self.write(DbApprovalRecord {
            id: DbField::Unchanged(record_id),
            approval_step_node: DbField::Set(Some(node)),
            approval_last_user: DbField::Set(Some(last_user)),
            ..Default::default()
        })
        .await
    }

    async fn mark_state(
        &self,
        record_id: Uuid,
        state: ApprovalState,
        last_user: Option<Uuid>,
    ) -> anyhow::Result<()> {
        self.write(DbApprovalRecord {
            id: DbField::Unchanged(record_id),
            approval_state: DbField::Set(state),
            approval_last_user: last_user.map_or(DbField::NotSet, |u| DbField::Set(Some(u))),
            ..Default::default()
        })
        .await
    }

    async fn bind_instance(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<()> {
        self.write(DbApprovalRecord {
            id: DbField::Unchanged(record_id),
            approval_id: DbField::Set(Some(approval_id)),
            approval_step_node: DbField::Set(Some(node)),
            ..Default::default()
        })
        .await
    }

    async fn approve(
        &self,
        record_id: Uuid,
        state: ApprovalState,
        acting_user: Option<Uuid>,
    ) -> anyhow::Result<()> {
        let record = self.record_repo.get_by_id(record_id).await?;
        let service = self
            .approve_services
            .get(&record.entity)
            .unwrap_or(&self.default_approve_service);
        service.approve(record_id, state, acting_user).await
    }

    async fn apply_edit(&self, edit: RecordEdit, mode: UpdateMode) -> anyhow::Result<()> {
        if edit.is_empty() {
            return Ok(());
        }
        let record_id = edit.record_id;
        self.record_repo.update_fields(edit, mode).await?;
        self.record_repo.save_changed().await?;
        tracing::debug!("Applied field edit on record: {record_id}");
        Ok(())
    }
}
