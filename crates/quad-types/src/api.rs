use serde::{Deserialize, Serialize};

use crate::resource::ResourceKind;

// -- Initiate --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitiateUnlockRequest {
    pub resource_id: String,
    pub resource_type: ResourceKind,
    pub payer_id: String,
    /// Unlock fee in minor currency units (paise).
    pub amount: u64,
}

#[derive(Debug, Serialize)]
pub struct InitiateUnlockResponse {
    pub gateway_order_id: String,
    pub amount: u64,
    pub currency: String,
}

// -- Confirm --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfirmUnlockRequest {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    /// Hex HMAC-SHA256 over "{order_id}|{payment_id}" from the gateway's
    /// checkout callback.
    pub signature: String,
    pub resource_id: String,
    pub resource_type: ResourceKind,
    pub payer_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConfirmUnlockResponse {
    pub unlocked: bool,
}

// -- Status --

#[derive(Debug, Deserialize)]
pub struct UnlockStatusQuery {
    pub payer_id: String,
    pub resource_id: String,
    pub resource_type: ResourceKind,
}

#[derive(Debug, Serialize)]
pub struct UnlockStatusResponse {
    pub unlocked: bool,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}
