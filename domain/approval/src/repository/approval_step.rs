use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use super::DBRepository;
use crate::model::{entity::ApprovalStep, vo::ApprovalState};

/// The deduplication key of alive steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepKey {
    pub record_id: Uuid,
    pub approval_id: Uuid,
    pub node: String,
    pub approver: Uuid,
}

impl StepKey {
    pub fn of(step: &ApprovalStep) -> Self {
        Self {
            record_id: step.record_id,
            approval_id: step.approval_id,
            node: step.node.to_owned(),
            approver: step.approver,
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record: {}, approval: {}, node: {}, approver: {}",
            self.record_id, self.approval_id, self.node, self.approver
        )
    }
}

/// Raised by a store when an insert would create a second alive step for the same key.
#[derive(Debug, thiserror::Error)]
#[error("An alive approval step already exists for {key}.")]
pub struct UniqueViolation {
    pub key: StepKey,
}

/// Predicate over alive steps. Unset filters do not narrow the match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepFilter {
    pub record_id: Uuid,
    pub approval_id: Option<Uuid>,
    pub node: Option<String>,
    pub is_waiting: Option<bool>,
    pub only_draft: bool,
}

impl StepFilter {
    pub fn record(record_id: Uuid) -> Self {
        Self {
            record_id,
            ..Default::default()
        }
    }

    pub fn approval(mut self, approval_id: Option<Uuid>) -> Self {
        self.approval_id = approval_id;
        self
    }

    pub fn node(mut self, node: Option<String>) -> Self {
        self.node = node;
        self
    }

    pub fn waiting(mut self, is_waiting: bool) -> Self {
        self.is_waiting = Some(is_waiting);
        self
    }

    pub fn only_draft(mut self, only_draft: bool) -> Self {
        self.only_draft = only_draft;
        self
    }

    pub fn matches(&self, step: &ApprovalStep) -> bool {
        step.is_alive()
            && step.record_id == self.record_id
            && self.approval_id.map_or(true, |id| step.approval_id == id)
            && self.node.as_ref().map_or(true, |node| step.node.eq(node))
            && self.is_waiting.map_or(true, |w| step.is_waiting == w)
            && (!self.only_draft || step.state == ApprovalState::Draft)
    }
}

#[async_trait]
pub trait ApprovalStepRepo: DBRepository<ApprovalStep> + Send + Sync {
    /// The alive step holding this key, if any.
    async fn find_alive_step(&self, key: StepKey) -> anyhow::Result<Option<ApprovalStep>>;

    /// Alive steps matching the filter, in creation order.
    async fn get_alive_steps(&self, filter: StepFilter) -> anyhow::Result<Vec<ApprovalStep>>;

    /// The earliest created alive step of an instance.
    async fn get_first_alive_step(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
    ) -> anyhow::Result<Option<ApprovalStep>>;

    /// Every step ever written for the record, canceled ones included, in creation order.
    async fn get_record_steps(&self, record_id: Uuid) -> anyhow::Result<Vec<ApprovalStep>>;
}
