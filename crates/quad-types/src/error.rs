use thiserror::Error;

/// Error taxonomy of the unlock protocol. All variants are terminal for the
/// current call; the orchestrator never retries on its own.
#[derive(Debug, Error)]
pub enum UnlockError {
    /// The (resource_id, resource_type) pair does not resolve to a resource.
    #[error("resource not found")]
    NotFound,

    /// Soft error: the triple is already unlocked. Initiate surfaces it so
    /// the caller does not create a pointless gateway order; confirm treats
    /// the same condition as success, because the payment really happened.
    #[error("contact already unlocked")]
    AlreadyUnlocked,

    /// The payer's own contact identity is the protected identity.
    #[error("cannot pay to unlock your own contact details")]
    SelfDealingForbidden,

    /// Gateway unreachable, timed out, or returned garbage. Safe to retry
    /// with backoff from the caller's side.
    #[error("payment service unavailable")]
    PaymentServiceUnavailable,

    /// Client-submitted confirmation signature did not verify. Logged as a
    /// security-relevant event at the rejection site.
    #[error("payment signature verification failed")]
    InvalidSignature,

    /// The gateway does not report the payment as captured (or the payment
    /// belongs to a different order than the one presented).
    #[error("payment not captured")]
    PaymentNotCaptured,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Errors out of the unlock ledger contract.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The UNIQUE(payer_id, resource_id, resource_type) constraint fired:
    /// a record for the triple already exists. Under a confirm race this is
    /// the losing side, and it must be treated as idempotent success.
    #[error("unlock record already exists for this triple")]
    Duplicate,

    #[error("ledger storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Errors out of the resource store / identity directory contracts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resource store error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Errors out of the payment gateway client. Everything the gateway can do
/// wrong (transport, timeout, non-2xx, unparseable body) collapses into
/// Unavailable: the protocol fails closed on any gateway doubt.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}
