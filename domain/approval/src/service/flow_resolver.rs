use async_trait::async_trait;
use uuid::Uuid;

use crate::model::vo::{FlowDefinitionRef, FlowNodeGroup, FlowNodeInfo};

/// Reads the flow graph. Lives outside the engine; the graph may change while instances run.
#[async_trait]
pub trait FlowDefinitionResolver: Send + Sync {
    /// Flows the user may submit the record into.
    async fn get_workable_definitions(
        &self,
        record_id: Uuid,
        user: Uuid,
    ) -> anyhow::Result<Vec<FlowDefinitionRef>>;

    async fn get_current_node(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<FlowNodeInfo>;

    /// Successor group of `node`, with approvers resolved for `user`.
    async fn get_next_nodes(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
        user: Uuid,
    ) -> anyhow::Result<FlowNodeGroup>;
}
