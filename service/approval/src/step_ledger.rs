use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain_approval::{
    command::{CancelStepsCommand, CreateStepCommand},
    exception::ApprovalException,
    model::{
        entity::{ApprovalStep, DbApprovalStep},
        vo::ApprovalState,
    },
    repository::{ApprovalStepRepo, DbField, StepFilter, StepKey, UniqueViolation},
    service::{StepLedgerService, SubmitterCacheService},
};
use uuid::Uuid;

#[derive(typed_builder::TypedBuilder)]
pub struct StepLedgerServiceImpl {
    step_repo: Arc<dyn ApprovalStepRepo>,
    submitter_cache: Arc<dyn SubmitterCacheService>,
}

impl StepLedgerServiceImpl {
    fn new_step(cmd: CreateStepCommand) -> ApprovalStep {
        let mut step = ApprovalStep::new_draft(
            cmd.record_id,
            cmd.approval_id,
            cmd.node,
            cmd.approver,
            cmd.created_by,
        );
        step.is_waiting = cmd.is_waiting;
        step.prev_node = cmd.prev_node;
        step
    }
}

#[async_trait]
impl StepLedgerService for StepLedgerServiceImpl {
    async fn create_step_if_needed(&self, cmd: CreateStepCommand) -> anyhow::Result<Option<Uuid>> {
        let key = StepKey {
            record_id: cmd.record_id,
            approval_id: cmd.approval_id,
            node: cmd.node.to_owned(),
            approver: cmd.approver,
        };
        if self.step_repo.find_alive_step(key).await?.is_some() {
            return Ok(None);
        }

        let step = Self::new_step(cmd);
        match self.step_repo.insert(&step).await {
            Ok(id) => {
                self.step_repo.save_changed().await?;
                Ok(Some(id))
            }
            // Lost the race against a concurrent creation of the same key.
            Err(e) => match e.downcast_ref::<UniqueViolation>() {
                Some(violation) => {
                    tracing::warn!("Skip duplicated approval step, {}", violation.key);
                    Ok(None)
                }
                None => Err(e),
            },
        }
    }

    async fn create_settled_step(
        &self,
        cmd: CreateStepCommand,
        state: ApprovalState,
        remark: Option<String>,
    ) -> anyhow::Result<Uuid> {
        let mut step = Self::new_step(cmd);
        step.state = state;
        step.remark = remark;
        step.approved_on = Some(Utc::now());
        let id = self.step_repo.insert(&step).await?;
        self.step_repo.save_changed().await?;
        Ok(id)
    }

    async fn cancel_alive_steps(&self, cmd: CancelStepsCommand) -> anyhow::Result<usize> {
        let filter = StepFilter::record(cmd.record_id)
            .approval(cmd.approval_id)
            .node(cmd.node)
            .only_draft(cmd.only_draft);
        let steps = self.step_repo.get_alive_steps(filter).await?;

        let mut canceled = 0;
        for step in steps.iter().filter(|s| cmd.exclude_step != Some(s.id)) {
            self.step_repo
                .update(DbApprovalStep {
                    id: DbField::Unchanged(step.id),
                    is_canceled: DbField::Set(true),
                    ..Default::default()
                })
                .await?;
            canceled += 1;
        }
        if canceled > 0 {
            self.step_repo.save_changed().await?;
        }
        tracing::debug!("Canceled {canceled} steps of record: {}", cmd.record_id);
        Ok(canceled)
    }

    async fn decide(
        &self,
        step_id: Uuid,
        state: ApprovalState,
        remark: Option<String>,
    ) -> anyhow::Result<()> {
        self.step_repo
            .update(DbApprovalStep {
                id: DbField::Unchanged(step_id),
                state: DbField::Set(state),
                remark: DbField::Set(remark),
                approved_on: DbField::Set(Some(Utc::now())),
                ..Default::default()
            })
            .await?;
        self.step_repo.save_changed().await?;
        Ok(())
    }

    async fn release_waiting_steps(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<Vec<ApprovalStep>> {
        let filter = StepFilter::record(record_id)
            .approval(Some(approval_id))
            .node(Some(node))
            .waiting(true);
        let mut steps = self.step_repo.get_alive_steps(filter).await?;
        for step in steps.iter_mut() {
            self.step_repo
                .update(DbApprovalStep {
                    id: DbField::Unchanged(step.id),
                    is_waiting: DbField::Set(false),
                    ..Default::default()
                })
                .await?;
            step.is_waiting = false;
        }
        if !steps.is_empty() {
            self.step_repo.save_changed().await?;
        }
        Ok(steps)
    }

    async fn get_step(&self, step_id: Uuid) -> anyhow::Result<ApprovalStep> {
        self.step_repo.get_by_id(step_id).await
    }

    async fn get_node_steps(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<Vec<ApprovalStep>> {
        self.step_repo
            .get_alive_steps(StepFilter::record(record_id).approval(Some(approval_id)).node(Some(node)))
            .await
    }

    async fn get_submitter(&self, record_id: Uuid, approval_id: Uuid) -> anyhow::Result<Uuid> {
        if let Some(submitter) = self.submitter_cache.get(record_id, approval_id) {
            return Ok(submitter);
        }
        let first = self
            .step_repo
            .get_first_alive_step(record_id, approval_id)
            .await?
            .ok_or(ApprovalException::NoSubmitter {
                record_id,
                approval_id,
            })?;
        self.submitter_cache.put(record_id, approval_id, first.created_by);
        Ok(first.created_by)
    }

    fn evict_submitter(&self, record_id: Uuid, approval_id: Uuid) {
        self.submitter_cache.evict(record_id, approval_id);
    }

    async fn get_record_steps(&self, record_id: Uuid) -> anyhow::Result<Vec<ApprovalStep>> {
        self.step_repo.get_record_steps(record_id).await
    }
}
