mod approval;
mod entity_approve;
mod flow_resolver;
mod notification;
mod privilege;
mod record_mutator;
mod step_ledger;
mod submitter_cache;

#[rustfmt::skip]
pub use {
    approval::ApprovalService,
    entity_approve::EntityApproveService,
    flow_resolver::FlowDefinitionResolver,
    notification::NotificationSink,
    privilege::UserPrivilegeService,
    record_mutator::RecordMutatorService,
    step_ledger::StepLedgerService,
    submitter_cache::SubmitterCacheService,
};
