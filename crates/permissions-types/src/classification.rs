//! Controller taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved category of ultimate control for an address.
///
/// Serialized with the labels used in permission reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ControllerClassification {
    #[serde(rename = "Not owned")]
    Unowned,
    #[serde(rename = "Governance")]
    Governance,
    #[serde(rename = "Multi-sig")]
    MultiSig,
    /// Governance of a permission-limited (white-label) deployment.
    #[serde(rename = "PPC Multi-sig")]
    RestrictedMultiSig,
    #[serde(rename = "Steward")]
    Steward,
    #[serde(rename = "External Contract")]
    External,
}

impl ControllerClassification {
    pub fn label(&self) -> &'static str {
        match self {
            ControllerClassification::Unowned => "Not owned",
            ControllerClassification::Governance => "Governance",
            ControllerClassification::MultiSig => "Multi-sig",
            ControllerClassification::RestrictedMultiSig => "PPC Multi-sig",
            ControllerClassification::Steward => "Steward",
            ControllerClassification::External => "External Contract",
        }
    }

    /// Governance classification for a pool, honoring restricted deployments.
    pub fn governance(restricted: bool) -> Self {
        if restricted {
            ControllerClassification::RestrictedMultiSig
        } else {
            ControllerClassification::Governance
        }
    }
}

impl fmt::Display for ControllerClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
