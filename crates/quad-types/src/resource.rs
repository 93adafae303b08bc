use std::fmt;

use serde::{Deserialize, Serialize};

/// The two resource kinds that share the unlock contract.
///
/// Both hide a contact identity behind a payment: an item report hides the
/// poster's contact, an application hides the applicant's contact. One generic
/// orchestrator serves both; the kind is part of the unlock triple everywhere
/// (ledger rows, gateway order notes, the HTTP surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ItemContact,
    ApplicationContact,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ItemContact => "item_contact",
            ResourceKind::ApplicationContact => "application_contact",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item_contact" => Ok(ResourceKind::ItemContact),
            "application_contact" => Ok(ResourceKind::ApplicationContact),
            other => Err(anyhow::anyhow!("unknown resource kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for kind in [ResourceKind::ItemContact, ResourceKind::ApplicationContact] {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("book_contact".parse::<ResourceKind>().is_err());
        assert!(serde_json::from_str::<ResourceKind>("\"item\"").is_err());
    }
}
