//! Inputs of the approval services.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::vo::{ApprovalState, RecordEdit, SignMode};

/// Create a step unless an alive one already holds the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateStepCommand {
    pub record_id: Uuid,
    pub approval_id: Uuid,
    pub node: String,
    pub approver: Uuid,
    pub is_waiting: bool,
    pub prev_node: Option<String>,
    pub created_by: Uuid,
}

/// Flag alive steps as canceled. Unset filters do not narrow the sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CancelStepsCommand {
    pub record_id: Uuid,
    pub approval_id: Option<Uuid>,
    pub node: Option<String>,
    pub exclude_step: Option<Uuid>,
    pub only_draft: bool,
}

/// Start an instance with approvers already resolved by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCommand {
    pub record_id: Uuid,
    pub approval_id: Uuid,
    pub submitter: Uuid,
    /// First node after root.
    pub node: String,
    pub approvers: Vec<Uuid>,
    #[serde(default)]
    pub cc_users: Vec<Uuid>,
}

/// Start an instance, resolving the first node through the flow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCommand {
    pub record_id: Uuid,
    pub approval_id: Uuid,
    pub submitter: Uuid,
    #[serde(default)]
    pub selected_approvers: Vec<Uuid>,
    #[serde(default)]
    pub selected_cc_users: Vec<Uuid>,
}

/// Decide a step with the next node already resolved by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproveCommand {
    pub step_id: Uuid,
    /// The acting approver.
    pub approver: Uuid,
    pub state: ApprovalState,
    pub remark: Option<String>,
    /// Sign mode of the step's node.
    pub sign_mode: SignMode,
    pub cc_users: Vec<Uuid>,
    pub next_approvers: Vec<Uuid>,
    pub next_node: Option<String>,
    pub edited: Option<RecordEdit>,
    /// Group the approver saw when deciding; checked again after `edited` is applied.
    pub expected_group_id: Option<String>,
}

/// Decide the acting user's current step, resolving the next node through the flow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideCommand {
    pub record_id: Uuid,
    pub approver: Uuid,
    pub state: ApprovalState,
    pub remark: Option<String>,
    #[serde(default)]
    pub selected_approvers: Vec<Uuid>,
    #[serde(default)]
    pub selected_cc_users: Vec<Uuid>,
    pub edited: Option<RecordEdit>,
    pub use_group: Option<String>,
}

/// Cancel or revoke an instance. Unset ids fall back to the record's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelCommand {
    pub record_id: Uuid,
    pub approval_id: Option<Uuid>,
    pub current_node: Option<String>,
    pub actor: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoApproveCommand {
    pub record_id: Uuid,
    pub acting_user: Option<Uuid>,
    pub approval_id: Option<Uuid>,
}
