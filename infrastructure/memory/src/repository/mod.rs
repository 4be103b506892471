mod approval_record;
mod approval_step;

/// Field names that belong to the engine and never go through a field edit.
pub(crate) const APPROVAL_COLUMNS: [&str; 4] = [
    "approvalState",
    "approvalId",
    "approvalStepNode",
    "approvalLastUser",
];
