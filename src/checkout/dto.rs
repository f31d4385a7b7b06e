use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payload::LineItem;
use crate::orders::{CustomerInfo, OrderSelection};

/// Body of `POST /api/create-payment` and `POST /api/quote`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// What the page displayed. Checked against the computed total, never charged.
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub customer_info: CustomerInfo,
    pub order_details: OrderSelection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub redirect_url: String,
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub total: Decimal,
    pub total_cents: i64,
    pub line_items: Vec<LineItem>,
    pub note: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatusResponse {
    pub ok: bool,
    pub locations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
