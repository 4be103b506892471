use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    model::{
        entity::ApprovalRecord,
        vo::{ApprovalState, RecordEdit},
    },
    repository::UpdateMode,
};

/// Writes approval state and node onto business records.
#[async_trait]
pub trait RecordMutatorService: Send + Sync {
    async fn get_record(&self, record_id: Uuid) -> anyhow::Result<ApprovalRecord>;

    /// Bind the record to a fresh instance sitting on `node`.
    async fn set_processing(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<()>;

    async fn advance_node(&self, record_id: Uuid, node: String, last_user: Uuid)
        -> anyhow::Result<()>;

    async fn mark_state(
        &self,
        record_id: Uuid,
        state: ApprovalState,
        last_user: Option<Uuid>,
    ) -> anyhow::Result<()>;

    /// Point the record at an instance and node without touching its state.
    async fn bind_instance(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<()>;

    /// Finalize through the entity kind's approve capability.
    async fn approve(
        &self,
        record_id: Uuid,
        state: ApprovalState,
        acting_user: Option<Uuid>,
    ) -> anyhow::Result<()>;

    async fn apply_edit(&self, edit: RecordEdit, mode: UpdateMode) -> anyhow::Result<()>;
}
