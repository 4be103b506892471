pub mod approval_record;
pub mod approval_step;

#[rustfmt::skip]
pub use {
    approval_record::{ApprovalRecord, DbApprovalRecord},
    approval_step::{ApprovalStep, DbApprovalStep},
};
