use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use anyhow::{bail, Context};
use async_trait::async_trait;
use domain_approval::{
    exception::ApprovalException,
    model::vo::{
        FlowDefinitionRef, FlowNodeGroup, FlowNodeInfo, SignMode, NODE_AUTOAPPROVAL,
        NODE_CANCELED, NODE_REVOKED, NODE_ROOT,
    },
    repository::ApprovalRecordRepo,
    service::FlowDefinitionResolver,
};
use uuid::Uuid;

use crate::infrastructure::config::{FlowConfig, FlowNodeConfig};

/// Resolves flows declared in configuration. Every flow is a chain of nodes after `ROOT`.
pub struct ConfigFlowResolver {
    flows: HashMap<Uuid, FlowConfig>,
    records: Arc<dyn ApprovalRecordRepo>,
}

impl ConfigFlowResolver {
    /// Node names must be unique within a flow and must not shadow the marker nodes.
    pub fn new(flows: &[FlowConfig], records: Arc<dyn ApprovalRecordRepo>) -> anyhow::Result<Self> {
        const RESERVED: [&str; 4] = [NODE_ROOT, NODE_CANCELED, NODE_REVOKED, NODE_AUTOAPPROVAL];
        for flow in flows {
            let mut seen = HashSet::new();
            for node in flow.nodes() {
                if RESERVED.contains(&node.name().as_str()) || !seen.insert(node.name()) {
                    bail!("Flow: {} has a reserved or repeated node: {}", flow.id(), node.name());
                }
            }
        }
        Ok(Self {
            flows: flows.iter().map(|f| (*f.id(), f.clone())).collect(),
            records,
        })
    }

    fn flow(&self, approval_id: Uuid) -> anyhow::Result<&FlowConfig> {
        Ok(self
            .flows
            .get(&approval_id)
            .ok_or(ApprovalException::NoSuchFlow { approval_id })?)
    }

    fn position(flow: &FlowConfig, node: &str) -> anyhow::Result<usize> {
        flow.nodes()
            .iter()
            .position(|n| n.name() == node)
            .with_context(|| format!("Node: {node} is not part of flow: {}", flow.id()))
    }
}

fn group_of(flow: &FlowConfig, index: usize, next: &FlowNodeConfig) -> FlowNodeGroup {
    FlowNodeGroup {
        group_id: format!("{}:{}", flow.id(), next.name()),
        node: Some(next.name().to_owned()),
        sign_mode: SignMode::from(next.sign_mode().as_str()),
        approvers: next.approvers().to_owned(),
        cc_users: next.cc_users().to_owned(),
        allow_self_selecting_approver: *next.allow_self_selecting_approver(),
        allow_self_selecting_cc: *next.allow_self_selecting_cc(),
        is_last_step: index + 1 == flow.nodes().len(),
    }
}

#[async_trait]
impl FlowDefinitionResolver for ConfigFlowResolver {
    async fn get_workable_definitions(
        &self,
        record_id: Uuid,
        _user: Uuid,
    ) -> anyhow::Result<Vec<FlowDefinitionRef>> {
        let record = self.records.get_by_id(record_id).await?;
        Ok(self
            .flows
            .values()
            .filter(|f| f.entity() == &record.entity && !f.nodes().is_empty())
            .map(|f| FlowDefinitionRef {
                id: *f.id(),
                name: f.name().to_owned(),
            })
            .collect())
    }

    async fn get_current_node(
        &self,
        _record_id: Uuid,
        approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<FlowNodeInfo> {
        let flow = self.flow(approval_id)?;
        let current = &flow.nodes()[Self::position(flow, &node)?];
        Ok(FlowNodeInfo {
            sign_mode: SignMode::from(current.sign_mode().as_str()),
            editable_fields: current.editable_fields().to_owned(),
            node,
        })
    }

    async fn get_next_nodes(
        &self,
        _record_id: Uuid,
        approval_id: Uuid,
        node: String,
        _user: Uuid,
    ) -> anyhow::Result<FlowNodeGroup> {
        let flow = self.flow(approval_id)?;
        let index = if node == NODE_ROOT {
            0
        } else {
            Self::position(flow, &node)? + 1
        };
        Ok(match flow.nodes().get(index) {
            Some(next) => group_of(flow, index, next),
            None => FlowNodeGroup::default(),
        })
    }
}
