use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    command::{CancelStepsCommand, CreateStepCommand},
    model::{entity::ApprovalStep, vo::ApprovalState},
};

/// # Step ledger
///
/// Owns the step table: idempotent creation, cancellation sweeps and state reads.
/// Knows nothing of the flow topology.
#[async_trait]
pub trait StepLedgerService: Send + Sync {
    /// Returns the new step id, or `None` when an alive step already holds the key.
    async fn create_step_if_needed(&self, cmd: CreateStepCommand) -> anyhow::Result<Option<Uuid>>;

    /// Write a step that is already settled, such as a cancel marker or an auto approval.
    async fn create_settled_step(
        &self,
        cmd: CreateStepCommand,
        state: ApprovalState,
        remark: Option<String>,
    ) -> anyhow::Result<Uuid>;

    /// Returns how many steps were canceled.
    async fn cancel_alive_steps(&self, cmd: CancelStepsCommand) -> anyhow::Result<usize>;

    /// Persist an approver's decision on a step.
    async fn decide(
        &self,
        step_id: Uuid,
        state: ApprovalState,
        remark: Option<String>,
    ) -> anyhow::Result<()>;

    /// Make the waiting steps of a node actionable and return them.
    async fn release_waiting_steps(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<Vec<ApprovalStep>>;

    async fn get_step(&self, step_id: Uuid) -> anyhow::Result<ApprovalStep>;

    /// Alive steps of one node of an instance.
    async fn get_node_steps(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<Vec<ApprovalStep>>;

    /// Creator of the earliest alive step of the instance.
    async fn get_submitter(&self, record_id: Uuid, approval_id: Uuid) -> anyhow::Result<Uuid>;

    fn evict_submitter(&self, record_id: Uuid, approval_id: Uuid);

    async fn get_record_steps(&self, record_id: Uuid) -> anyhow::Result<Vec<ApprovalStep>>;
}
