use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a user is being told about an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// The user has a step to act on.
    Approve,
    /// The user is copied on a submission or decision.
    Cc,
    /// The submitter's instance was rejected.
    Rejected,
}

/// Message handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalMessage {
    pub to: Uuid,
    pub record_id: Uuid,
    pub kind: MessageKind,
    pub content: String,
}

impl ApprovalMessage {
    pub fn approve(to: Uuid, record_id: Uuid, entity: &str) -> Self {
        Self {
            to,
            record_id,
            kind: MessageKind::Approve,
            content: format!("A {entity} record is waiting for your approval"),
        }
    }

    pub fn submitted_cc(to: Uuid, record_id: Uuid, entity: &str, submitter: Uuid) -> Self {
        Self {
            to,
            record_id,
            kind: MessageKind::Cc,
            content: format!("User @{submitter} submitted a {entity} approval, for your information"),
        }
    }

    pub fn decided_cc(
        to: Uuid,
        record_id: Uuid,
        entity: &str,
        submitter: Uuid,
        approver: Uuid,
        decision: &str,
    ) -> Self {
        Self {
            to,
            record_id,
            kind: MessageKind::Cc,
            content: format!(
                "The {entity} approval submitted by @{submitter} was {decision} by @{approver}, for your information"
            ),
        }
    }

    pub fn rejected(to: Uuid, record_id: Uuid, entity: &str, approver: Uuid) -> Self {
        Self {
            to,
            record_id,
            kind: MessageKind::Rejected,
            content: format!("@{approver} rejected your {entity} approval"),
        }
    }
}
