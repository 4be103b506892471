#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domain_approval::{
    model::{
        entity::ApprovalRecord,
        vo::{
            ApprovalMessage, FlowDefinitionRef, FlowNodeGroup, FlowNodeInfo, SignMode, NODE_ROOT,
        },
    },
    repository::{ApprovalRecordRepo, ApprovalStepRepo},
    service::{FlowDefinitionResolver, NotificationSink, UserPrivilegeService},
};
use infrastructure_memory::MemoryRepo;
use serde_json::Map;
use service_approval::{
    ApprovalServiceImpl, DefaultEntityApproveServiceImpl, RecordMutatorServiceImpl,
    StepLedgerServiceImpl, SubmitterCacheServiceImpl,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct Node {
    pub name: &'static str,
    pub sign_mode: SignMode,
    pub approvers: Vec<Uuid>,
}

impl Node {
    pub fn new(name: &'static str, sign_mode: SignMode, approvers: &[Uuid]) -> Self {
        Self {
            name,
            sign_mode,
            approvers: approvers.to_vec(),
        }
    }
}

/// Linear flow. Records whose `amount` field exceeds 1000 get `finance` appended as the last node.
pub struct LinearFlow {
    pub nodes: Vec<Node>,
    pub finance: Option<Node>,
    pub records: Arc<dyn ApprovalRecordRepo>,
}

impl LinearFlow {
    async fn route(&self, record_id: Uuid) -> anyhow::Result<Vec<Node>> {
        let mut nodes = self.nodes.clone();
        if let Some(finance) = &self.finance {
            let fields = self.records.get_fields(record_id).await?;
            if fields.get("amount").and_then(|v| v.as_i64()).unwrap_or(0) > 1000 {
                nodes.push(finance.clone());
            }
        }
        Ok(nodes)
    }
}

#[async_trait]
impl FlowDefinitionResolver for LinearFlow {
    async fn get_workable_definitions(
        &self,
        _record_id: Uuid,
        _user: Uuid,
    ) -> anyhow::Result<Vec<FlowDefinitionRef>> {
        Ok(vec![])
    }

    async fn get_current_node(
        &self,
        record_id: Uuid,
        _approval_id: Uuid,
        node: String,
    ) -> anyhow::Result<FlowNodeInfo> {
        let nodes = self.route(record_id).await?;
        let found = nodes
            .iter()
            .find(|n| n.name == node)
            .ok_or(anyhow::anyhow!("Unknown node: {node}"))?;
        Ok(FlowNodeInfo {
            node,
            sign_mode: found.sign_mode,
            editable_fields: vec!["amount".to_string()],
        })
    }

    async fn get_next_nodes(
        &self,
        record_id: Uuid,
        approval_id: Uuid,
        node: String,
        _user: Uuid,
    ) -> anyhow::Result<FlowNodeGroup> {
        let nodes = self.route(record_id).await?;
        let index = if node == NODE_ROOT {
            0
        } else {
            nodes.iter().position(|n| n.name == node).map_or(nodes.len(), |i| i + 1)
        };
        Ok(match nodes.get(index) {
            Some(next) => FlowNodeGroup {
                group_id: format!("{approval_id}:{}", next.name),
                node: Some(next.name.to_string()),
                sign_mode: next.sign_mode,
                approvers: next.approvers.clone(),
                is_last_step: index + 1 == nodes.len(),
                ..Default::default()
            },
            None => FlowNodeGroup::default(),
        })
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<ApprovalMessage>>,
}

impl RecordingSink {
    pub fn drain(&self) -> Vec<ApprovalMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, msg: ApprovalMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}

pub struct Admins(pub Vec<Uuid>);

#[async_trait]
impl UserPrivilegeService for Admins {
    async fn is_admin(&self, user: Uuid) -> anyhow::Result<bool> {
        Ok(self.0.contains(&user))
    }
}

pub struct Harness {
    pub store: Arc<MemoryRepo>,
    pub steps: Arc<dyn ApprovalStepRepo>,
    pub records: Arc<dyn ApprovalRecordRepo>,
    pub ledger: Arc<StepLedgerServiceImpl>,
    pub sink: Arc<RecordingSink>,
    pub service: ApprovalServiceImpl,
    pub admin: Uuid,
}

impl Harness {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self::with_finance(nodes, None)
    }

    pub fn with_finance(nodes: Vec<Node>, finance: Option<Node>) -> Self {
        let store = Arc::new(MemoryRepo::new());
        let steps: Arc<dyn ApprovalStepRepo> = store.clone();
        let records: Arc<dyn ApprovalRecordRepo> = store.clone();
        let ledger = Arc::new(
            StepLedgerServiceImpl::builder()
                .step_repo(steps.clone())
                .submitter_cache(Arc::new(SubmitterCacheServiceImpl::new()))
                .build(),
        );
        let record_mutator = Arc::new(
            RecordMutatorServiceImpl::builder()
                .record_repo(records.clone())
                .default_approve_service(Arc::new(
                    DefaultEntityApproveServiceImpl::builder()
                        .record_repo(records.clone())
                        .build(),
                ))
                .build(),
        );
        let sink = Arc::new(RecordingSink::default());
        let admin = Uuid::new_v4();
        let service = ApprovalServiceImpl::builder()
            .ledger(ledger.clone())
            .record_mutator(record_mutator)
            .flow_resolver(Arc::new(LinearFlow {
                nodes,
                finance,
                records: records.clone(),
            }))
            .notification_sink(sink.clone())
            .privilege_service(Arc::new(Admins(vec![admin])))
            .build();
        Self {
            store,
            steps,
            records,
            ledger,
            sink,
            service,
            admin,
        }
    }

    pub fn new_record(&self) -> ApprovalRecord {
        self.store
            .register_record(Uuid::new_v4(), "Contract", true, Map::new())
    }

    pub async fn record(&self, record_id: Uuid) -> ApprovalRecord {
        self.records.get_by_id(record_id).await.unwrap()
    }
}
