use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::DBRepository;
use crate::model::{entity::ApprovalRecord, vo::RecordEdit};

/// How a field edit treats the record's approval guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Refuse edits while the record is processing or approved.
    #[default]
    Normal,
    /// Bypass the guard, for edits an approver makes mid-approval.
    Force,
}

#[async_trait]
pub trait ApprovalRecordRepo: DBRepository<ApprovalRecord> + Send + Sync {
    /// Write business field values onto the record.
    async fn update_fields(&self, edit: RecordEdit, mode: UpdateMode) -> anyhow::Result<()>;

    async fn get_fields(&self, record_id: Uuid) -> anyhow::Result<Map<String, Value>>;
}
