use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SignMode;

/// A flow definition the user may submit a record into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDefinitionRef {
    pub id: Uuid,
    pub name: String,
}

/// The node a record currently sits on, as the flow definition describes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeInfo {
    pub node: String,
    pub sign_mode: SignMode,
    /// Record fields the approvers of this node may change.
    pub editable_fields: Vec<String>,
}

/// The successor group of a node.
///
/// An empty group (no `node`) means the current node is the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeGroup {
    /// Identity of the resolved group, compared after mid-approval edits.
    pub group_id: String,
    pub node: Option<String>,
    pub sign_mode: SignMode,
    pub approvers: Vec<Uuid>,
    pub cc_users: Vec<Uuid>,
    pub allow_self_selecting_approver: bool,
    pub allow_self_selecting_cc: bool,
    pub is_last_step: bool,
}

impl FlowNodeGroup {
    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// Configured approvers plus the user's own picks when the group allows picking.
    pub fn approvers_with(&self, selected: &[Uuid]) -> Vec<Uuid> {
        merge_users(&self.approvers, selected, self.allow_self_selecting_approver)
    }

    pub fn cc_users_with(&self, selected: &[Uuid]) -> Vec<Uuid> {
        merge_users(&self.cc_users, selected, self.allow_self_selecting_cc)
    }
}

fn merge_users(configured: &[Uuid], selected: &[Uuid], allow_selected: bool) -> Vec<Uuid> {
    let mut users = configured.to_vec();
    if allow_selected {
        for user in selected {
            if !users.contains(user) {
                users.push(*user);
            }
        }
    }
    users
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_users_only_merge_when_allowed() {
        let configured = Uuid::new_v4();
        let picked = Uuid::new_v4();
        let mut group = FlowNodeGroup {
            node: Some("N1".to_string()),
            approvers: vec![configured],
            ..Default::default()
        };
        assert_eq!(group.approvers_with(&[picked]), vec![configured]);

        group.allow_self_selecting_approver = true;
        assert_eq!(group.approvers_with(&[picked, configured]), vec![configured, picked]);
    }
}
