use std::fmt;

use anyhow::anyhow;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

/// # Approval state
///
/// Used both for a single step and for the whole instance as mirrored on the business record.
/// The persisted form is the integer code.
#[derive(
    FromPrimitive,
    ToPrimitive,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalState {
    /// # Draft
    /// Record never submitted, or a step still awaiting its approver.
    #[default]
    Draft = 1,
    /// # Processing
    /// The only non-terminal instance state.
    Processing = 2,
    /// # Approved
    Approved = 10,
    /// # Rejected
    Rejected = 11,
    /// # Canceled
    /// Withdrawn by the submitter.
    Canceled = 12,
    /// # Revoked
    /// An approved instance undone by an administrator.
    Revoked = 13,
}

impl ApprovalState {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> anyhow::Result<Self> {
        Self::from_i32(code).ok_or(anyhow!("Wrong approval state code: {code}"))
    }

    /// The single ordering comparison the engine needs: is the instance still short of approval.
    pub fn is_before_approval(self) -> bool {
        self.code() < Self::Approved.code()
    }

    /// Whether an approver may put a step into this state.
    pub fn is_decision(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Processing => "processing",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
