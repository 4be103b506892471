mod approval;
mod entity_approve;
mod record_mutator;
mod step_ledger;
mod submitter_cache;

#[rustfmt::skip]
pub use {
    approval::ApprovalServiceImpl,
    entity_approve::DefaultEntityApproveServiceImpl,
    record_mutator::RecordMutatorServiceImpl,
    step_ledger::StepLedgerServiceImpl,
    submitter_cache::SubmitterCacheServiceImpl,
};
