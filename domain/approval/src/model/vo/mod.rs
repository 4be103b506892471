pub mod flow;
pub mod msg;
pub mod node;
pub mod record_edit;
pub mod sign_mode;
pub mod state;
pub mod view;

#[rustfmt::skip]
pub use {
    flow::{FlowDefinitionRef, FlowNodeGroup, FlowNodeInfo},
    msg::{ApprovalMessage, MessageKind},
    node::{APPROVAL_NOID, NODE_AUTOAPPROVAL, NODE_CANCELED, NODE_REVOKED, NODE_ROOT, SYSTEM_USER},
    record_edit::RecordEdit,
    sign_mode::SignMode,
    state::ApprovalState,
    view::*,
};
