//! REST client for the Razorpay-style payment gateway.
//!
//! This is the only module that knows the gateway's wire payloads. Every
//! transport or protocol failure collapses into `GatewayError::Unavailable`:
//! the unlock protocol fails closed on any gateway doubt.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use quad_types::contracts::{GatewayOrder, GatewayPayment, OrderNotes, PaymentGateway, PaymentStatus};
use quad_types::error::GatewayError;

/// Gateway calls fail closed after this long.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// fetch_payment is a pure read, so a bounded retry is safe. create_order is
/// never retried: a duplicate request would create a second gateway order.
const FETCH_ATTEMPTS: u32 = 3;
const FETCH_BACKOFF: Duration = Duration::from_millis(250);

pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(base_url: &str, key_id: &str, key_secret: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
        })
    }

    async fn try_fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);
        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GatewayError::Unavailable(format!(
                "payment lookup returned {}",
                resp.status()
            )));
        }

        let body: PaymentBody = resp
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("bad payment body: {e}")))?;

        Ok(GatewayPayment {
            id: body.id,
            order_id: body.order_id,
            status: body.status,
            amount: body.amount,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
        notes: &OrderNotes,
    ) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.base_url);
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount,
                currency,
                receipt,
                notes,
            })
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GatewayError::Unavailable(format!(
                "order create returned {}",
                resp.status()
            )));
        }

        let body: OrderBody = resp
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("bad order body: {e}")))?;

        Ok(GatewayOrder {
            id: body.id,
            amount: body.amount,
            currency: body.currency,
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let mut delay = FETCH_BACKOFF;
        let mut last = None;
        for attempt in 1..=FETCH_ATTEMPTS {
            match self.try_fetch_payment(payment_id).await {
                Ok(payment) => return Ok(payment),
                Err(e) => {
                    warn!(payment_id, attempt, "payment lookup failed: {e}");
                    last = Some(e);
                }
            }
            if attempt < FETCH_ATTEMPTS {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
        Err(last.unwrap_or_else(|| GatewayError::Unavailable("payment lookup failed".into())))
    }
}

// -- Wire payloads --

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a OrderNotes,
}

#[derive(Deserialize)]
struct OrderBody {
    id: String,
    amount: u64,
    currency: String,
}

#[derive(Deserialize)]
struct PaymentBody {
    id: String,
    order_id: String,
    status: PaymentStatus,
    amount: u64,
}
