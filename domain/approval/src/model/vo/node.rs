use uuid::Uuid;

/// Virtual starting node of every flow.
pub const NODE_ROOT: &str = "ROOT";
/// Marker node of a step written by a submitter cancel.
pub const NODE_CANCELED: &str = "CANCELED";
/// Marker node of a step written by an administrator revoke.
pub const NODE_REVOKED: &str = "REVOKED";
/// Marker node of the single step written by auto approval.
pub const NODE_AUTOAPPROVAL: &str = "AUTOAPPROVAL";

/// Approval id used when a step belongs to no configured flow.
pub const APPROVAL_NOID: Uuid = Uuid::nil();

/// The engine itself, for record updates it performs on its own behalf.
pub const SYSTEM_USER: Uuid = Uuid::from_u128(1);
