//! Narrow contracts the unlock orchestrator depends on.
//!
//! Canonical definitions live here in quad-types so quad-db and quad-payments
//! can implement them without depending on the orchestrator crate, and so
//! orchestrator tests can inject in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, LedgerError, StoreError};
use crate::resource::ResourceKind;

// -- Payment gateway --

/// A pending order created at the gateway. Nothing is persisted locally for
/// it; until confirmation the order exists only on the gateway's side.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

/// Authoritative payment state as reported by the gateway.
#[derive(Debug, Clone)]
pub struct GatewayPayment {
    pub id: String,
    pub order_id: String,
    pub status: PaymentStatus,
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Authorized,
    Captured,
    Refunded,
    Failed,
    /// A status string this build does not know. Never treated as captured.
    #[serde(other)]
    Unknown,
}

/// Metadata attached to a gateway order at creation so a later confirm call
/// can be cross-checked against what was actually requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNotes {
    pub resource_id: String,
    pub resource_type: ResourceKind,
    pub payer_id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for `amount` minor units. Implementations must not
    /// retry internally: a duplicate request would create a second order.
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
        notes: &OrderNotes,
    ) -> Result<GatewayOrder, GatewayError>;

    /// Look up a payment by gateway payment id. A pure read; implementations
    /// may retry a bounded number of times with backoff.
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}

// -- Unlock ledger --

/// An unlock record about to be appended. Rows are append-only: created once
/// when a captured payment is confirmed, never updated or deleted.
#[derive(Debug, Clone)]
pub struct NewUnlockRecord {
    pub payer_id: String,
    pub resource_id: String,
    pub resource_type: ResourceKind,
    pub amount: u64,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
}

/// Source of truth for "already unlocked". Presence of a row for the
/// (payer, resource, kind) triple is the sole definition.
#[async_trait]
pub trait UnlockLedger: Send + Sync {
    async fn exists(
        &self,
        payer_id: &str,
        resource_id: &str,
        kind: ResourceKind,
    ) -> Result<bool, LedgerError>;

    /// Append must fail with [`LedgerError::Duplicate`] if the uniqueness
    /// constraint on the triple is violated. That constraint, not the
    /// `exists` pre-check, is what prevents double-unlocking under a race.
    async fn append(&self, record: NewUnlockRecord) -> Result<(), LedgerError>;
}

// -- Resource store --

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Resolve the protected contact identity of a resource, or None if the
    /// (kind, id) pair does not exist.
    async fn protected_identity(
        &self,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Best-effort post-unlock bookkeeping: flip the denormalized status
    /// field where the kind carries one, write the service audit row. The
    /// ledger stays authoritative if this drifts.
    async fn set_unlocked_status(
        &self,
        kind: ResourceKind,
        resource_id: &str,
        payer_id: &str,
        amount: u64,
    ) -> Result<(), StoreError>;
}

// -- Identity directory --

/// Resolves a payer id to their contact identity, used for the self-dealing
/// check against the resource's protected identity.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn contact_identity(&self, user_id: &str) -> Result<Option<String>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_parses_gateway_strings() {
        let s: PaymentStatus = serde_json::from_str("\"captured\"").unwrap();
        assert_eq!(s, PaymentStatus::Captured);
        let s: PaymentStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(s, PaymentStatus::Refunded);
    }

    #[test]
    fn unknown_payment_status_is_never_captured() {
        let s: PaymentStatus = serde_json::from_str("\"disputed\"").unwrap();
        assert_eq!(s, PaymentStatus::Unknown);
        assert_ne!(s, PaymentStatus::Captured);
    }
}
