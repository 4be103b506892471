use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field values an approver changes on the business record while approving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEdit {
    pub record_id: Uuid,
    pub fields: Map<String, Value>,
}

impl RecordEdit {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
