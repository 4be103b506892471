use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApprovalState, SignMode};
use crate::model::entity::ApprovalStep;

/// One approver's position on the node a record currently sits on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStep {
    pub step_id: Uuid,
    pub approver: Uuid,
    pub state: ApprovalState,
    pub is_waiting: bool,
}

impl From<&ApprovalStep> for CurrentStep {
    fn from(step: &ApprovalStep) -> Self {
        Self {
            step_id: step.id,
            approver: step.approver,
            state: step.state,
            is_waiting: step.is_waiting,
        }
    }
}

/// What the acting user may pick when closing the current node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNodeCandidates {
    pub approvers: Vec<Uuid>,
    pub cc_users: Vec<Uuid>,
    pub approver_self_selecting: bool,
    pub cc_self_selecting: bool,
    pub sign_mode: SignMode,
    pub is_last_step: bool,
    pub flow_group_id: String,
    pub editable_fields: Vec<String>,
}

/// Approval panel of a record as seen by one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStatusView {
    pub state: ApprovalState,
    pub approval_id: Option<Uuid>,
    /// Only filled while the instance is before approval.
    pub current_step: Vec<CurrentStep>,
    pub im_approver: bool,
    pub im_approve_state: Option<ApprovalState>,
    pub can_cancel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub step_id: Uuid,
    pub approver: Uuid,
    pub state: ApprovalState,
    pub remark: Option<String>,
    pub is_waiting: bool,
    pub created_on: DateTime<Utc>,
    pub approved_on: Option<DateTime<Utc>>,
}

impl From<&ApprovalStep> for StepView {
    fn from(step: &ApprovalStep) -> Self {
        Self {
            step_id: step.id,
            approver: step.approver,
            state: step.state,
            remark: step.remark.clone(),
            is_waiting: step.is_waiting,
            created_on: step.created_on,
            approved_on: step.approved_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkedNode {
    pub node: String,
    pub steps: Vec<StepView>,
}

/// Audit history of the record's current instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkedSteps {
    pub approval_state: ApprovalState,
    pub submitter: Option<Uuid>,
    pub submitted_on: Option<DateTime<Utc>>,
    /// Nodes in the order their first step was created.
    pub nodes: Vec<WorkedNode>,
}
