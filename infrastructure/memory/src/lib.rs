//! In-process store for approval steps and the approval columns of business records.

mod repository;

use dashmap::DashMap;
use domain_approval::model::entity::{ApprovalRecord, ApprovalStep};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A business record as the store holds it.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub record: ApprovalRecord,
    /// Business fields, editable through `ApprovalRecordRepo::update_fields`.
    pub fields: Map<String, Value>,
    /// Whether the entity kind carries the `approvalLastUser` column.
    pub has_last_user: bool,
}

/// Steps are kept in insertion order, which is their creation order.
#[derive(Default)]
pub struct MemoryRepo {
    steps: RwLock<Vec<ApprovalStep>>,
    records: DashMap<Uuid, StoredRecord>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a business record known to the store, in DRAFT state.
    pub fn register_record(
        &self,
        id: Uuid,
        entity: impl Into<String>,
        has_last_user: bool,
        fields: Map<String, Value>,
    ) -> ApprovalRecord {
        let record = ApprovalRecord {
            id,
            entity: entity.into(),
            ..Default::default()
        };
        self.records.insert(
            id,
            StoredRecord {
                record: record.clone(),
                fields,
                has_last_user,
            },
        );
        tracing::debug!("Registered record: {id} of entity: {}", record.entity);
        record
    }
}
