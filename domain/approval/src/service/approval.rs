use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    command::{
        ApproveCommand, AutoApproveCommand, CancelCommand, DecideCommand, StartCommand,
        SubmitCommand,
    },
    exception::ApprovalResult,
    model::vo::{
        ApprovalStatusView, CurrentStep, FlowDefinitionRef, NextNodeCandidates, WorkedSteps,
    },
};

/// # Approval processor
///
/// Drives one instance per record through
/// `DRAFT -> PROCESSING -> {APPROVED | REJECTED | CANCELED | REVOKED}`.
#[async_trait]
pub trait ApprovalService: Send + Sync {
    async fn submit(&self, cmd: SubmitCommand) -> ApprovalResult<()>;

    async fn start(&self, cmd: StartCommand) -> ApprovalResult<()>;

    async fn approve(&self, cmd: ApproveCommand) -> ApprovalResult<()>;

    async fn decide(&self, cmd: DecideCommand) -> ApprovalResult<()>;

    async fn cancel(&self, cmd: CancelCommand) -> ApprovalResult<()>;

    async fn revoke(&self, cmd: CancelCommand) -> ApprovalResult<()>;

    /// Returns `false` when the record is already processing or approved.
    async fn auto_approve(&self, cmd: AutoApproveCommand) -> ApprovalResult<bool>;

    async fn get_current_step(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
    ) -> ApprovalResult<Vec<CurrentStep>>;

    /// Sorted by name.
    async fn get_workable_definitions(
        &self,
        record_id: Uuid,
        user: Uuid,
    ) -> ApprovalResult<Vec<FlowDefinitionRef>>;

    async fn get_next_node_candidates(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        user: Uuid,
    ) -> ApprovalResult<NextNodeCandidates>;

    async fn get_approval_status(
        &self,
        record_id: Uuid,
        user: Uuid,
    ) -> ApprovalResult<ApprovalStatusView>;

    async fn get_worked_steps(&self, record_id: Uuid) -> ApprovalResult<WorkedSteps>;
}
