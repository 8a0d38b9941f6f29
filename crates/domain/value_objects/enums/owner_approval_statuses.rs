use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OwnerApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl OwnerApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerApprovalStatus::Pending => "pending",
            OwnerApprovalStatus::Approved => "approved",
            OwnerApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OwnerApprovalStatus::Pending),
            "approved" => Some(OwnerApprovalStatus::Approved),
            "rejected" => Some(OwnerApprovalStatus::Rejected),
            _ => None,
        }
    }
}

impl Display for OwnerApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
