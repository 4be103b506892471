use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::vo::ApprovalState,
    repository::{AggregateRoot, DbField},
};

/// # Approval step
///
/// The atomic unit of progress. Steps are never deleted; superseded ones are flagged
/// `is_canceled` and stay in the table as audit history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStep {
    pub id: Uuid,
    pub record_id: Uuid,
    pub approval_id: Uuid,
    pub node: String,
    pub prev_node: Option<String>,
    /// User assigned to act on this step.
    pub approver: Uuid,
    pub state: ApprovalState,
    /// Exists but cannot be acted on until the unanimous group before it closes.
    pub is_waiting: bool,
    /// Superseded by an or-sign resolution, a rejection or a new instance.
    pub is_canceled: bool,
    pub remark: Option<String>,
    pub created_by: Uuid,
    pub created_on: DateTime<Utc>,
    pub approved_on: Option<DateTime<Utc>>,
}

impl ApprovalStep {
    pub fn new_draft(
        record_id: Uuid,
        approval_id: Uuid,
        node: impl Into<String>,
        approver: Uuid,
        created_by: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            record_id,
            approval_id,
            node: node.into(),
            prev_node: None,
            approver,
            state: ApprovalState::Draft,
            is_waiting: false,
            is_canceled: false,
            remark: None,
            created_by,
            created_on: Utc::now(),
            approved_on: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.is_canceled
    }

    /// Alive, not held behind a unanimous group, and not decided yet.
    pub fn is_actionable(&self) -> bool {
        self.is_alive() && !self.is_waiting && self.state == ApprovalState::Draft
    }
}

/// Column patch of an approval step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbApprovalStep {
    pub id: DbField<Uuid>,
    pub state: DbField<ApprovalState>,
    pub is_waiting: DbField<bool>,
    pub is_canceled: DbField<bool>,
    pub remark: DbField<Option<String>>,
    pub approved_on: DbField<Option<DateTime<Utc>>>,
}

impl AggregateRoot for ApprovalStep {
    type UpdateEntity = DbApprovalStep;
}
