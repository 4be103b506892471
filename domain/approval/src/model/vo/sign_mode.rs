use serde::{Deserialize, Serialize};

/// How a node with several approvers is closed.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub enum SignMode {
    /// Any one approver decides for the whole node.
    #[serde(rename = "OR")]
    Or,
    /// Every approver must approve before the node closes.
    #[default]
    #[serde(rename = "AND")]
    And,
}

impl From<&str> for SignMode {
    /// Anything that is not `OR` counts as unanimous.
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("OR") {
            Self::Or
        } else {
            Self::And
        }
    }
}
