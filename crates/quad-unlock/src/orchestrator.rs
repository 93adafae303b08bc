//! The unlock orchestrator.
//!
//! Composes the gateway, ledger, store and identity contracts into the two
//! operations of the protocol. Handlers are stateless; all durable state
//! lives behind the contracts, and the ledger's uniqueness constraint on
//! (payer, resource, kind) is the safety mechanism under concurrency.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use quad_payments::signature;
use quad_types::contracts::{
    GatewayOrder, IdentityDirectory, NewUnlockRecord, OrderNotes, PaymentGateway, PaymentStatus,
    ResourceStore, UnlockLedger,
};
use quad_types::error::{LedgerError, StoreError, UnlockError};
use quad_types::resource::ResourceKind;

use crate::config::UnlockConfig;

/// Inputs to a confirm call: the gateway callback payload plus the triple the
/// client claims it paid for.
#[derive(Debug, Clone)]
pub struct UnlockConfirmation {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
    pub payer_id: String,
    pub resource_type: ResourceKind,
    pub resource_id: String,
}

pub struct UnlockOrchestrator {
    config: UnlockConfig,
    gateway: Arc<dyn PaymentGateway>,
    ledger: Arc<dyn UnlockLedger>,
    store: Arc<dyn ResourceStore>,
    identities: Arc<dyn IdentityDirectory>,
}

impl UnlockOrchestrator {
    pub fn new(
        config: UnlockConfig,
        gateway: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn UnlockLedger>,
        store: Arc<dyn ResourceStore>,
        identities: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            config,
            gateway,
            ledger,
            store,
            identities,
        }
    }

    /// Check eligibility and create a gateway order for the unlock fee.
    ///
    /// Nothing is persisted locally; until confirmation the pending order
    /// exists only on the gateway's side, so an abandoned flow has no side
    /// effect. Two racing initiates for one triple can both create orders —
    /// a known, accepted race; the ledger constraint prevents a later
    /// double-unlock.
    pub async fn initiate_unlock(
        &self,
        payer_id: &str,
        kind: ResourceKind,
        resource_id: &str,
        amount: u64,
    ) -> Result<GatewayOrder, UnlockError> {
        let protected = self
            .store
            .protected_identity(kind, resource_id)
            .await
            .map_err(store_internal)?
            .ok_or(UnlockError::NotFound)?;

        // Fast-fail only; the append constraint is the real guard.
        if self
            .ledger
            .exists(payer_id, resource_id, kind)
            .await
            .map_err(ledger_internal)?
        {
            return Err(UnlockError::AlreadyUnlocked);
        }

        self.ensure_not_self_dealing(payer_id, &protected).await?;

        let notes = OrderNotes {
            resource_id: resource_id.to_string(),
            resource_type: kind,
            payer_id: payer_id.to_string(),
        };
        let receipt = format!("unlock_{}", Uuid::new_v4().simple());

        let order = self
            .gateway
            .create_order(amount, &self.config.currency, &receipt, &notes)
            .await
            .map_err(|e| {
                warn!(payer_id, resource_id, "gateway order creation failed: {e}");
                UnlockError::PaymentServiceUnavailable
            })?;

        info!(
            order_id = %order.id,
            payer_id,
            resource_id,
            kind = %kind,
            amount = order.amount,
            "unlock order created"
        );
        Ok(order)
    }

    /// Verify a completed payment and make the unlock permanent.
    ///
    /// Gates, in order: signature, authoritative capture, re-checked
    /// preconditions, ledger append. The append is the durability point:
    /// once that row lands the caller is told the unlock succeeded no matter
    /// what the trailing bookkeeping does — the money has already moved.
    pub async fn confirm_unlock(&self, req: &UnlockConfirmation) -> Result<(), UnlockError> {
        // Gate 1: the client must present the gateway's own signature over
        // the (order, payment) pair. Rejections are security-relevant.
        if !signature::verify_payment_signature(
            &self.config.signature_secret,
            &req.gateway_order_id,
            &req.gateway_payment_id,
            &req.signature,
        ) {
            warn!(
                payer_id = %req.payer_id,
                order_id = %req.gateway_order_id,
                "unlock confirmation with invalid signature"
            );
            return Err(UnlockError::InvalidSignature);
        }

        // Gate 2: the gateway, not the client, says whether money moved.
        let payment = self
            .gateway
            .fetch_payment(&req.gateway_payment_id)
            .await
            .map_err(|e| {
                warn!(payment_id = %req.gateway_payment_id, "payment lookup failed: {e}");
                UnlockError::PaymentServiceUnavailable
            })?;

        if payment.status != PaymentStatus::Captured {
            info!(
                payment_id = %payment.id,
                status = ?payment.status,
                "confirm rejected: payment not captured"
            );
            return Err(UnlockError::PaymentNotCaptured);
        }
        if payment.order_id != req.gateway_order_id {
            warn!(
                payment_id = %payment.id,
                claimed_order = %req.gateway_order_id,
                actual_order = %payment.order_id,
                "confirm rejected: payment belongs to a different order"
            );
            return Err(UnlockError::PaymentNotCaptured);
        }

        // Gate 3: re-check preconditions; a confirm can race a duplicate
        // initiate or arrive for a stale order.
        let protected = self
            .store
            .protected_identity(req.resource_type, &req.resource_id)
            .await
            .map_err(store_internal)?
            .ok_or(UnlockError::NotFound)?;
        self.ensure_not_self_dealing(&req.payer_id, &protected).await?;

        if self
            .ledger
            .exists(&req.payer_id, &req.resource_id, req.resource_type)
            .await
            .map_err(ledger_internal)?
        {
            // The payment truly happened; erroring here would tell the
            // client to pay again.
            return Ok(());
        }

        // Gate 4: durability point. Amount comes from the gateway's view of
        // the payment, not the client's claim.
        let record = NewUnlockRecord {
            payer_id: req.payer_id.clone(),
            resource_id: req.resource_id.clone(),
            resource_type: req.resource_type,
            amount: payment.amount,
            gateway_order_id: req.gateway_order_id.clone(),
            gateway_payment_id: req.gateway_payment_id.clone(),
        };
        match self.ledger.append(record).await {
            Ok(()) => {}
            Err(LedgerError::Duplicate) => {
                // Lost a confirm race; the winner's row stands.
                info!(
                    payer_id = %req.payer_id,
                    resource_id = %req.resource_id,
                    "unlock record already present, treating confirm as success"
                );
                return Ok(());
            }
            Err(LedgerError::Storage(e)) => return Err(UnlockError::Internal(e)),
        }

        info!(
            payer_id = %req.payer_id,
            resource_id = %req.resource_id,
            kind = %req.resource_type,
            payment_id = %req.gateway_payment_id,
            "unlock recorded"
        );

        // Step 5: best-effort bookkeeping. A failure is logged for the
        // reconciliation pass and never surfaced — the unlock record exists
        // and the money has moved.
        if let Err(e) = self
            .store
            .set_unlocked_status(
                req.resource_type,
                &req.resource_id,
                &req.payer_id,
                payment.amount,
            )
            .await
        {
            error!(
                payer_id = %req.payer_id,
                resource_id = %req.resource_id,
                kind = %req.resource_type,
                "post-unlock bookkeeping failed, ledger remains authoritative: {e}"
            );
        }

        Ok(())
    }

    /// Is the triple unlocked? Straight ledger read.
    pub async fn unlock_status(
        &self,
        payer_id: &str,
        kind: ResourceKind,
        resource_id: &str,
    ) -> Result<bool, UnlockError> {
        self.ledger
            .exists(payer_id, resource_id, kind)
            .await
            .map_err(ledger_internal)
    }

    /// A payer whose contact identity is the protected identity is paying to
    /// reveal their own details. Identities are emails; compare
    /// case-insensitively. An unresolvable payer is treated as NotFound.
    async fn ensure_not_self_dealing(
        &self,
        payer_id: &str,
        protected_identity: &str,
    ) -> Result<(), UnlockError> {
        let payer_identity = self
            .identities
            .contact_identity(payer_id)
            .await
            .map_err(store_internal)?
            .ok_or(UnlockError::NotFound)?;

        if payer_identity.eq_ignore_ascii_case(protected_identity) {
            return Err(UnlockError::SelfDealingForbidden);
        }
        Ok(())
    }
}

fn store_internal(e: StoreError) -> UnlockError {
    UnlockError::Internal(anyhow::Error::new(e))
}

fn ledger_internal(e: LedgerError) -> UnlockError {
    UnlockError::Internal(anyhow::Error::new(e))
}
