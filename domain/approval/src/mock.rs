use async_trait::async_trait;
use mockall::mock;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    command::{CancelStepsCommand, CreateStepCommand},
    model::{
        entity::{ApprovalRecord, ApprovalStep, DbApprovalRecord, DbApprovalStep},
        vo::{
            ApprovalMessage, ApprovalState, FlowDefinitionRef, FlowNodeGroup, FlowNodeInfo,
            RecordEdit,
        },
    },
    repository::{
        ApprovalRecordRepo, ApprovalStepRepo, DBRepository, MutableRepository,
        ReadOnlyRepository, StepFilter, StepKey, UpdateMode,
    },
    service::{
        EntityApproveService, FlowDefinitionResolver, NotificationSink, RecordMutatorService,
        StepLedgerService, SubmitterCacheService, UserPrivilegeService,
    },
};

mock! {
    pub ApprovalStepRepo {}
    #[async_trait]
    impl ApprovalStepRepo for ApprovalStepRepo {
        async fn find_alive_step(&self, key: StepKey) -> anyhow::Result<Option<ApprovalStep>>;
        async fn get_alive_steps(&self, filter: StepFilter) -> anyhow::Result<Vec<ApprovalStep>>;
        async fn get_first_alive_step(
            &self,
            record_id: Uuid,
            approval_id: Uuid,
        ) -> anyhow::Result<Option<ApprovalStep>>;
        async fn get_record_steps(&self, record_id: Uuid) -> anyhow::Result<Vec<ApprovalStep>>;
    }
    #[async_trait]
    impl ReadOnlyRepository<ApprovalStep> for ApprovalStepRepo {
        async fn get_by_id(&self, id: Uuid) -> anyhow::Result<ApprovalStep>;
    }
    #[async_trait]
    impl MutableRepository<ApprovalStep> for ApprovalStepRepo {
        async fn update(&self, entity: DbApprovalStep) -> anyhow::Result<()>;
        async fn insert(&self, entity: &ApprovalStep) -> anyhow::Result<Uuid>;
        async fn save_changed(&self) -> anyhow::Result<bool>;
    }
    impl DBRepository<ApprovalStep> for ApprovalStepRepo {}
}

mock! {
    pub ApprovalRecordRepo {}
    #[async_trait]
    impl ApprovalRecordRepo for ApprovalRecordRepo {
        async fn update_fields(&self, edit: RecordEdit, mode: UpdateMode) -> anyhow::Result<()>;
        async fn get_fields(&self, record_id: Uuid) -> anyhow::Result<Map<String, Value>>;
    }
    #[async_trait]
    impl ReadOnlyRepository<ApprovalRecord> for ApprovalRecordRepo {
        async fn get_by_id(&self, id: Uuid) -> anyhow::Result<ApprovalRecord>;
    }
    #[async_trait]
    impl MutableRepository<ApprovalRecord> for ApprovalRecordRepo {
        async fn update(&self, entity: DbApprovalRecord) -> anyhow::Result<()>;
        async fn save_changed(&self) -> anyhow::Result<bool>;
    }
    impl DBRepository<ApprovalRecord> for ApprovalRecordRepo {}
}

mock! {
    pub SubmitterCacheService {}
    impl SubmitterCacheService for SubmitterCacheService {
        fn get(&self, record_id: Uuid, approval_id: Uuid) -> Option<Uuid>;
        fn put(&self, record_id: Uuid, approval_id: Uuid, submitter: Uuid);
        fn evict(&self, record_id: Uuid, approval_id: Uuid);
    }
}

mock! {
    pub StepLedgerService {}
    #[async_trait]
    impl StepLedgerService for StepLedgerService {
        async fn create_step_if_needed(&self, cmd: CreateStepCommand) -> anyhow::Result<Option<Uuid>>;
        async fn create_settled_step(
            &self,
            cmd: CreateStepCommand,
            state: ApprovalState,
            remark: Option<String>,
        ) -> anyhow::Result<Uuid>;
        async fn cancel_alive_steps(&self, cmd: CancelStepsCommand) -> anyhow::Result<usize>;
        async fn decide(
            &self,
            step_id: Uuid,
            state: ApprovalState,
            remark: Option<String>,
        ) -> anyhow::Result<()>;
        async fn release_waiting_steps(
            &self,
            record_id: Uuid,
            approval_id: Uuid,
            node: String,
        ) -> anyhow::Result<Vec<ApprovalStep>>;
        async fn get_step(&self, step_id: Uuid) -> anyhow::Result<ApprovalStep>;
        async fn get_node_steps(
            &self,
            record_id: Uuid,
            approval_id: Uuid,
            node: String,
        ) -> anyhow::Result<Vec<ApprovalStep>>;
        async fn get_submitter(&self, record_id: Uuid, approval_id: Uuid) -> anyhow::Result<Uuid>;
        fn evict_submitter(&self, record_id: Uuid, approval_id: Uuid);
        async fn get_record_steps(&self, record_id: Uuid) -> anyhow::Result<Vec<ApprovalStep>>;
    }
}

mock! {
    pub RecordMutatorService {}
    #[async_trait]
    impl RecordMutatorService for RecordMutatorService {
        async fn get_record(&self, record_id: Uuid) -> anyhow::Result<ApprovalRecord>;
        async fn set_processing(
            &self,
            record_id: Uuid,
            approval_id: Uuid,
            node: String,
        ) -> anyhow::Result<()>;
        async fn advance_node(&self, record_id: Uuid, node: String, last_user: Uuid)
            -> anyhow::Result<()>;
        async fn mark_state(
            &self,
            record_id: Uuid,
            state: ApprovalState,
            last_user: Option<Uuid>,
        ) -> anyhow::Result<()>;
        async fn bind_instance(
            &self,
            record_id: Uuid,
            approval_id: Uuid,
            node: String,
        ) -> anyhow::Result<()>;
        async fn approve(
            &self,
            record_id: Uuid,
            state: ApprovalState,
            acting_user: Option<Uuid>,
        ) -> anyhow::Result<()>;
        async fn apply_edit(&self, edit: RecordEdit, mode: UpdateMode) -> anyhow::Result<()>;
    }
}

mock! {
    pub EntityApproveService {}
    #[async_trait]
    impl EntityApproveService for EntityApproveService {
        async fn approve(
            &self,
            record_id: Uuid,
            state: ApprovalState,
            acting_user: Option<Uuid>,
        ) -> anyhow::Result<()>;
    }
}

mock! {
    pub FlowDefinitionResolver {}
    #[async_trait]
    impl FlowDefinitionResolver for FlowDefinitionResolver {
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
        async fn get_next_nodes(
            &self,
            record_id: Uuid,
            approval_id: Uuid,
            node: String,
            user: Uuid,
        ) -> anyhow::Result<FlowNodeGroup>;
    }
}

mock! {
    pub NotificationSink {}
    #[async_trait]
    impl NotificationSink for NotificationSink {
        async fn send(&self, msg: ApprovalMessage) -> anyhow::Result<()>;
    }
}

mock! {
    pub UserPrivilegeService {}
    #[async_trait]
    impl UserPrivilegeService for UserPrivilegeService {
        async fn is_admin(&self, user: Uuid) -> anyhow::Result<bool>;
    }
}
