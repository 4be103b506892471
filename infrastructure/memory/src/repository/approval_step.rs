use anyhow::Context;
use async_trait::async_trait;
use domain_approval::{
    model::entity::{ApprovalStep, DbApprovalStep},
    repository::{
        ApprovalStepRepo, DBRepository, MutableRepository, ReadOnlyRepository, StepFilter,
        StepKey, UniqueViolation,
    },
};
use uuid::Uuid;

use crate::MemoryRepo;

#[async_trait]
impl ApprovalStepRepo for MemoryRepo {
    async fn find_alive_step(&self, key: StepKey) -> anyhow::Result<Option<ApprovalStep>> {
        let steps = self.steps.read().await;
        Ok(steps
            .iter()
            .find(|s| s.is_alive() && StepKey::of(s) == key)
            .cloned())
    }

    async fn get_alive_steps(&self, filter: StepFilter) -> anyhow::Result<Vec<ApprovalStep>> {
        let steps = self.steps.read().await;
        Ok(steps.iter().filter(|s| filter.matches(s)).cloned().collect())
    }

    async fn get_first_alive_step(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
    ) -> anyhow::Result<Option<ApprovalStep>> {
        let steps = self.steps.read().await;
        Ok(steps
            .iter()
            .filter(|s| s.is_alive() && s.record_id == record_id && s.approval_id == approval_id)
            .min_by_key(|s| s.created_on)
            .cloned())
    }

    async fn get_record_steps(&self, record_id: Uuid) -> anyhow::Result<Vec<ApprovalStep>> {
        let steps = self.steps.read().await;
        Ok(steps.iter().filter(|s| s.record_id == record_id).cloned().collect())
    }
}

#[async_trait]
impl ReadOnlyRepository<ApprovalStep> for MemoryRepo {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<ApprovalStep> {
        let steps = self.steps.read().await;
        steps
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .with_context(|| format!("No such approval step: {id}"))
    }
}

#[async_trait]
impl MutableRepository<ApprovalStep> for MemoryRepo {
    async fn update(&self, entity: DbApprovalStep) -> anyhow::Result<()> {
        let id = *entity.id.value().context("Approval step update without id")?;
        let mut steps = self.steps.write().await;
        let step = steps
            .iter_mut()
            .find(|s| s.id == id)
            .with_context(|| format!("No such approval step: {id}"))?;
        if let Some(state) = entity.state.into_set() {
            step.state = state;
        }
        if let Some(is_waiting) = entity.is_waiting.into_set() {
            step.is_waiting = is_waiting;
        }
        if let Some(is_canceled) = entity.is_canceled.into_set() {
            step.is_canceled = is_canceled;
        }
        if let Some(remark) = entity.remark.into_set() {
            step.remark = remark;
        }
        if let Some(approved_on) = entity.approved_on.into_set() {
            step.approved_on = approved_on;
        }
        Ok(())
    }

    /// The alive-key check and the push happen under one write lock.
    async fn insert(&self, entity: &ApprovalStep) -> anyhow::Result<Uuid> {
        let key = StepKey::of(entity);
        let mut steps = self.steps.write().await;
        if entity.is_alive() && steps.iter().any(|s| s.is_alive() && StepKey::of(s) == key) {
            return Err(UniqueViolation { key }.into());
        }
        steps.push(entity.clone());
        Ok(entity.id)
    }
}

impl DBRepository<ApprovalStep> for MemoryRepo {}
