use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use quad_types::api::{
    ConfirmUnlockRequest, ConfirmUnlockResponse, InitiateUnlockRequest, InitiateUnlockResponse,
    UnlockStatusQuery, UnlockStatusResponse,
};
use quad_unlock::UnlockConfirmation;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn initiate_unlock(
    State(state): State<AppState>,
    Json(req): Json<InitiateUnlockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .orchestrator
        .initiate_unlock(&req.payer_id, req.resource_type, &req.resource_id, req.amount)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InitiateUnlockResponse {
            gateway_order_id: order.id,
            amount: order.amount,
            currency: order.currency,
        }),
    ))
}

pub async fn confirm_unlock(
    State(state): State<AppState>,
    Json(req): Json<ConfirmUnlockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .orchestrator
        .confirm_unlock(&UnlockConfirmation {
            gateway_order_id: req.gateway_order_id,
            gateway_payment_id: req.gateway_payment_id,
            signature: req.signature,
            payer_id: req.payer_id,
            resource_type: req.resource_type,
            resource_id: req.resource_id,
        })
        .await?;

    Ok(Json(ConfirmUnlockResponse { unlocked: true }))
}

pub async fn unlock_status(
    State(state): State<AppState>,
    Query(query): Query<UnlockStatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let unlocked = state
        .orchestrator
        .unlock_status(&query.payer_id, query.resource_type, &query.resource_id)
        .await?;

    Ok(Json(UnlockStatusResponse { unlocked }))
}
