use anyhow::{bail, Context};
use async_trait::async_trait;
use domain_approval::{
    model::{
        entity::{ApprovalRecord, DbApprovalRecord},
        vo::{ApprovalState, RecordEdit},
    },
    repository::{
        ApprovalRecordRepo, DBRepository, MutableRepository, ReadOnlyRepository, UpdateMode,
    },
};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::APPROVAL_COLUMNS;
use crate::MemoryRepo;

#[async_trait]
impl ApprovalRecordRepo for MemoryRepo {
    async fn update_fields(&self, edit: RecordEdit, mode: UpdateMode) -> anyhow::Result<()> {
        let mut stored = self
            .records
            .get_mut(&edit.record_id)
            .with_context(|| format!("No such record: {}", edit.record_id))?;
        let state = stored.record.approval_state;
        if mode == UpdateMode::Normal
            && matches!(state, ApprovalState::Processing | ApprovalState::Approved)
        {
            bail!("Record: {} is {state} and can't be edited", edit.record_id);
        }
        if let Some(column) = edit.fields.keys().find(|k| APPROVAL_COLUMNS.contains(&k.as_str())) {
            bail!("Field: {column} is owned by the approval engine");
        }
        stored.fields.extend(edit.fields);
        Ok(())
    }

    async fn get_fields(&self, record_id: Uuid) -> anyhow::Result<Map<String, Value>> {
        self.records
            .get(&record_id)
            .map(|stored| stored.fields.clone())
            .with_context(|| format!("No such record: {record_id}"))
    }
}

#[async_trait]
impl ReadOnlyRepository<ApprovalRecord> for MemoryRepo {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<ApprovalRecord> {
        self.records
            .get(&id)
            .map(|stored| stored.record.clone())
            .with_context(|| format!("No such record: {id}"))
    }
}

#[async_trait]
impl MutableRepository<ApprovalRecord> for MemoryRepo {
    async fn update(&self, entity: DbApprovalRecord) -> anyhow::Result<()> {
        let id = *entity.id.value().context("Record update without id")?;
        let mut stored = self
            .records
            .get_mut(&id)
            .with_context(|| format!("No such record: {id}"))?;
        let has_last_user = stored.has_last_user;
        let record = &mut stored.record;
        if let Some(state) = entity.approval_state.into_set() {
            record.approval_state = state;
        }
        if let Some(approval_id) = entity.approval_id.into_set() {
            record.approval_id = approval_id;
        }
        if let Some(node) = entity.approval_step_node.into_set() {
            record.approval_step_node = node;
        }
        // Entity kinds without the column silently drop it.
        if let Some(last_user) = entity.approval_last_user.into_set().filter(|_| has_last_user) {
            record.approval_last_user = last_user;
        }
        Ok(())
    }
}

impl DBRepository<ApprovalRecord> for MemoryRepo {}
