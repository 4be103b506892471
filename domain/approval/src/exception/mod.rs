use thiserror::Error;
use uuid::Uuid;

use crate::model::vo::ApprovalState;

pub type ApprovalResult<T> = Result<T, ApprovalException>;

#[derive(Error, Debug)]
pub enum ApprovalException {
    #[error("No approver can be resolved for the next node, please select approvers or ask an administrator to fix the flow.")]
    NoApprovers,

    #[error("There is no usable approval flow with id: {approval_id}.")]
    NoSuchFlow { approval_id: Uuid },

    #[error("Record: {record_id} is in approval state: {state}, which doesn't allow this operation.")]
    InvalidState {
        record_id: Uuid,
        state: ApprovalState,
    },

    #[error("Approval step: {step_id} is canceled, waiting or already decided.")]
    StepNotActionable { step_id: Uuid },

    #[error("{state} is not an approval decision.")]
    InvalidDecision { state: ApprovalState },

    #[error("User: {user} has no pending step on record: {record_id}.")]
    NotApprover { record_id: Uuid, user: Uuid },

    #[error("The flow changed because of the edited data, you need to approve again.")]
    FlowChanged { expected: String, resolved: String },

    #[error("Only the submitter or an administrator can cancel the approval of record: {record_id}.")]
    CancelDenied { record_id: Uuid, user: Uuid },

    #[error("Only an administrator can revoke an approval, user: {user} is not.")]
    RevokeDenied { user: Uuid },

    #[error("Only an administrator can auto approve record: {record_id}, user: {user} is not.")]
    AutoApproveDenied { record_id: Uuid, user: Uuid },

    #[error("Approval: {approval_id} of record: {record_id} has no alive step to tell its submitter.")]
    NoSubmitter { record_id: Uuid, approval_id: Uuid },

    #[error("Approval internal error: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl ApprovalException {
    /// Stable code reported to API callers.
    pub fn code(&self) -> u16 {
        match self {
            Self::NoApprovers => 300,
            Self::NoSuchFlow { .. } => 301,
            Self::InvalidState { .. } => 302,
            Self::StepNotActionable { .. } => 303,
            Self::InvalidDecision { .. } => 304,
            Self::NotApprover { .. } => 305,
            Self::FlowChanged { .. } => 306,
            Self::CancelDenied { .. } => 307,
            Self::RevokeDenied { .. } => 308,
            Self::NoSubmitter { .. } => 309,
            Self::AutoApproveDenied { .. } => 310,
            Self::InternalError { .. } => 500,
        }
    }

    /// Whether the writes made before the failure are meant to stay.
    pub fn is_no_rollback(&self) -> bool {
        matches!(self, Self::FlowChanged { .. })
    }
}

impl From<anyhow::Error> for ApprovalException {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<ApprovalException>() {
            Ok(inner) => inner,
            Err(source) => ApprovalException::InternalError { source },
        }
    }
}
