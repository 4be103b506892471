use std::sync::Arc;

use domain_approval::{
    repository::{ApprovalRecordRepo, ApprovalStepRepo},
    service::{ApprovalService, NotificationSink, UserPrivilegeService},
};
use infrastructure_memory::MemoryRepo;
use service_approval::{
    ApprovalServiceImpl, DefaultEntityApproveServiceImpl, RecordMutatorServiceImpl,
    StepLedgerServiceImpl, SubmitterCacheServiceImpl,
};

use super::{
    config::ApprovalConfig,
    service::{flow_resolver::ConfigFlowResolver, privilege::ConfigPrivilegeService},
};

/// Wires the store, the services and the host capabilities together.
pub struct ServiceProvider {
    config: ApprovalConfig,
    store: Arc<MemoryRepo>,
    approval_service: Arc<dyn ApprovalService>,
    privilege_service: Arc<dyn UserPrivilegeService>,
}

impl ServiceProvider {
    pub fn build(
        config: ApprovalConfig,
        notification_sink: Arc<dyn NotificationSink>,
    ) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryRepo::new());
        for seed in config.records() {
            store.register_record(
                *seed.id(),
                seed.entity().to_owned(),
                *seed.has_last_user(),
                seed.fields().to_owned(),
            );
        }
        let step_repo: Arc<dyn ApprovalStepRepo> = store.clone();
        let record_repo: Arc<dyn ApprovalRecordRepo> = store.clone();

        let ledger = StepLedgerServiceImpl::builder()
            .step_repo(step_repo)
            .submitter_cache(Arc::new(SubmitterCacheServiceImpl::new()))
            .build();
        let record_mutator = RecordMutatorServiceImpl::builder()
            .record_repo(record_repo.clone())
            .default_approve_service(Arc::new(
                DefaultEntityApproveServiceImpl::builder()
                    .record_repo(record_repo.clone())
                    .build(),
            ))
            .build();
        let privilege_service: Arc<dyn UserPrivilegeService> =
            Arc::new(ConfigPrivilegeService::new(config.admins()));
        let approval_service = ApprovalServiceImpl::builder()
            .ledger(Arc::new(ledger))
            .record_mutator(Arc::new(record_mutator))
            .flow_resolver(Arc::new(ConfigFlowResolver::new(
                config.flows(),
                record_repo,
            )?))
            .notification_sink(notification_sink)
            .privilege_service(privilege_service.clone())
            .build();

        tracing::info!(
            "Loaded {} flows and {} records.",
            config.flows().len(),
            config.records().len()
        );
        Ok(Self {
            config,
            store,
            approval_service: Arc::new(approval_service),
            privilege_service,
        })
    }

    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<MemoryRepo> {
        self.store.clone()
    }

    pub fn approval_service(&self) -> Arc<dyn ApprovalService> {
        self.approval_service.clone()
    }

    pub fn privilege_service(&self) -> Arc<dyn UserPrivilegeService> {
        self.privilege_service.clone()
    }
}
