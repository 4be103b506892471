mod approval_record;
mod approval_step;
mod base;

#[rustfmt::skip]
pub use {
    approval_record::{ApprovalRecordRepo, UpdateMode},
    approval_step::{ApprovalStepRepo, StepFilter, StepKey, UniqueViolation},
    base::{AggregateRoot, DBRepository, DbField, MutableRepository, ReadOnlyRepository},
};
