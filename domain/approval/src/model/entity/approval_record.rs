use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::vo::ApprovalState,
    repository::{AggregateRoot, DbField},
};

/// The approval columns of a business record.
///
/// The record itself belongs to the entity store; the engine only reads and writes these.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    pub id: Uuid,
    /// Entity kind, also used as the label in messages.
    pub entity: String,
    pub approval_state: ApprovalState,
    pub approval_id: Option<Uuid>,
    pub approval_step_node: Option<String>,
    /// Only present on entity kinds that carry the column.
    pub approval_last_user: Option<Uuid>,
}

/// Column patch of a business record's approval fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbApprovalRecord {
    pub id: DbField<Uuid>,
    pub approval_state: DbField<ApprovalState>,
    pub approval_id: DbField<Option<Uuid>>,
    pub approval_step_node: DbField<Option<String>>,
    /// Dropped by the store for entity kinds without the column.
    pub approval_last_user: DbField<Option<Uuid>>,
}

impl AggregateRoot for ApprovalRecord {
    type UpdateEntity = DbApprovalRecord;
}
