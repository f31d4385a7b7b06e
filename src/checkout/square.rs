//! Square payment-link API: wire types, the HTTP client and response
//! interpretation.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::payload::CheckoutRequest;
use crate::config::{CheckoutConfig, SquareConfig};
use crate::error::CheckoutError;

const CURRENCY: &str = "USD";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Money {
    pub amount: i64,
    pub currency: String,
}

impl Money {
    fn usd(amount: i64) -> Self {
        Self {
            amount,
            currency: CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquareLineItem {
    pub name: String,
    pub quantity: String,
    pub base_price_money: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquareOrder {
    pub location_id: String,
    pub line_items: Vec<SquareLineItem>,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOptions {
    pub redirect_url: String,
    pub merchant_support_email: String,
    pub ask_for_shipping_address: bool,
    pub allow_tipping: bool,
    pub enable_coupon: bool,
    pub enable_loyalty: bool,
    pub app_fee_money: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line_1: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrePopulatedData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_address: Option<BuyerAddress>,
}

/// Body of `POST /online-checkout/payment-links`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentLinkRequest {
    pub idempotency_key: Uuid,
    pub description: String,
    pub order: SquareOrder,
    pub checkout_options: CheckoutOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_populated_data: Option<PrePopulatedData>,
}

impl CreatePaymentLinkRequest {
    /// Each call mints a fresh idempotency key, so every user click is its
    /// own attempt as far as the provider is concerned.
    pub fn from_checkout(
        request: &CheckoutRequest,
        location_id: &str,
        cfg: &CheckoutConfig,
    ) -> Self {
        let line_items = request
            .line_items
            .iter()
            .map(|item| SquareLineItem {
                name: item.name.clone(),
                quantity: item.quantity.to_string(),
                base_price_money: Money::usd(item.unit_price_cents),
            })
            .collect();

        let mut description = format!("{} Order", cfg.store_name);
        if request.customer.special_requests.is_some() {
            description.push_str(" (Special Requests)");
        }

        let customer = &request.customer;
        let buyer_address = (customer.name.is_some() || customer.address.is_some()).then(|| {
            BuyerAddress {
                first_name: customer.name.clone(),
                address_line_1: customer.address.clone(),
            }
        });
        let prefill = PrePopulatedData {
            buyer_email: customer.email.clone(),
            buyer_phone_number: customer.phone.clone(),
            buyer_address,
        };
        let has_prefill = prefill.buyer_email.is_some()
            || prefill.buyer_phone_number.is_some()
            || prefill.buyer_address.is_some();

        Self {
            idempotency_key: Uuid::new_v4(),
            description,
            order: SquareOrder {
                location_id: location_id.to_string(),
                line_items,
                note: request.note.clone(),
            },
            checkout_options: CheckoutOptions {
                redirect_url: cfg.success_url(),
                merchant_support_email: cfg.support_email.clone(),
                ask_for_shipping_address: true,
                allow_tipping: false,
                enable_coupon: false,
                enable_loyalty: false,
                app_fee_money: Money::usd(0),
            },
            pre_populated_data: has_prefill.then_some(prefill),
        }
    }
}

/// Status and body exactly as the provider sent them.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

/// A usable hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub redirect_url: String,
    pub order_id: Option<String>,
}

pub type CheckoutResult = Result<CheckoutSession, CheckoutError>;

#[derive(Debug, Default, Deserialize)]
struct PaymentLinkEnvelope {
    #[serde(default)]
    payment_link: Option<PaymentLink>,
    #[serde(default)]
    related_resources: Option<RelatedResources>,
}

#[derive(Debug, Default, Deserialize)]
struct PaymentLink {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RelatedResources {
    #[serde(default)]
    orders: Vec<RelatedOrder>,
}

#[derive(Debug, Deserialize)]
struct RelatedOrder {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Maps a raw provider reply onto a checkout outcome. Never panics on odd
/// payloads; anything without a usable link is a failure.
pub fn interpret_response(raw: &ProviderResponse) -> CheckoutResult {
    if !(200..300).contains(&raw.status) {
        return Err(CheckoutError::ProviderRejection {
            status: raw.status,
            detail: rejection_detail(&raw.body),
        });
    }

    let envelope: PaymentLinkEnvelope = serde_json::from_str(&raw.body).map_err(|e| {
        CheckoutError::MalformedProviderResponse {
            reason: format!("body is not a payment link object: {e}"),
        }
    })?;
    let link = envelope.payment_link.unwrap_or_default();

    let url = link
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CheckoutError::MalformedProviderResponse {
            reason: "missing payment_link.url".into(),
        })?;
    let parsed = Url::parse(&url).map_err(|e| CheckoutError::MalformedProviderResponse {
        reason: format!("payment_link.url is not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
        return Err(CheckoutError::MalformedProviderResponse {
            reason: format!("payment_link.url is not an absolute web URL: {url}"),
        });
    }

    let order_id = link.order_id.filter(|id| !id.is_empty()).or_else(|| {
        envelope
            .related_resources
            .and_then(|r| r.orders.into_iter().next())
            .map(|o| o.id)
    });

    Ok(CheckoutSession {
        redirect_url: url,
        order_id,
    })
}

fn rejection_detail(body: &str) -> String {
    let details: Vec<String> = serde_json::from_str::<ErrorEnvelope>(body)
        .unwrap_or_default()
        .errors
        .into_iter()
        .filter_map(|e| e.detail.or(e.code))
        .collect();
    if details.is_empty() {
        "The payment provider declined the request.".to_string()
    } else {
        details.join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationsEnvelope {
    #[serde(default)]
    locations: Vec<LocationSummary>,
}

/// The external checkout collaborator.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// One attempt, no retry. Transport failures become `ProviderRequest`;
    /// any HTTP reply is handed back untouched.
    async fn create_payment_link(
        &self,
        request: &CreatePaymentLinkRequest,
    ) -> Result<ProviderResponse, CheckoutError>;

    /// Confirms the credentials work by listing merchant locations.
    async fn check_credentials(&self) -> anyhow::Result<Vec<LocationSummary>>;
}

#[derive(Clone)]
pub struct SquareClient {
    http: Client,
    base_url: String,
    access_token: String,
    api_version: String,
}

impl SquareClient {
    pub fn new(cfg: &SquareConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .context("build payment provider http client")?;
        Ok(Self {
            http,
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            access_token: cfg.access_token.clone(),
            api_version: cfg.api_version.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
            .header("Square-Version", &self.api_version)
            .header(header::CONTENT_TYPE, "application/json")
    }
}

#[async_trait]
impl PaymentProvider for SquareClient {
    #[instrument(skip(self, request), fields(idempotency_key = %request.idempotency_key))]
    async fn create_payment_link(
        &self,
        request: &CreatePaymentLinkRequest,
    ) -> Result<ProviderResponse, CheckoutError> {
        debug!(
            line_items = request.order.line_items.len(),
            "sending payment link request"
        );
        let res = self
            .request(reqwest::Method::POST, "/online-checkout/payment-links")
            .json(request)
            .send()
            .await
            .map_err(|e| CheckoutError::ProviderRequest {
                reason: e.to_string(),
            })?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| CheckoutError::ProviderRequest {
            reason: format!("reading response body: {e}"),
        })?;
        info!(status, "payment provider responded");
        Ok(ProviderResponse { status, body })
    }

    async fn check_credentials(&self) -> anyhow::Result<Vec<LocationSummary>> {
        let res = self
            .request(reqwest::Method::GET, "/locations")
            .send()
            .await
            .context("request /locations")?;
        let status = res.status();
        let body = res.text().await.context("read /locations body")?;
        if !status.is_success() {
            anyhow::bail!("provider rejected credentials ({status}): {}", rejection_detail(&body));
        }
        let envelope: LocationsEnvelope =
            serde_json::from_str(&body).context("parse /locations response")?;
        Ok(envelope.locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::payload::build_checkout_request;
    use crate::menu::MainCourse;
    use crate::orders::{BoxOrder, CustomerInfo, Order, SaladOrder};

    fn ok(body: &str) -> ProviderResponse {
        ProviderResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    fn cfg() -> CheckoutConfig {
        CheckoutConfig {
            store_name: "Simchas Gourmet".into(),
            support_email: "support@simchasgourmet.com".into(),
            redirect_base_url: "https://simchas-gourmet.netlify.app".into(),
        }
    }

    #[test]
    fn empty_object_is_malformed() {
        let err = interpret_response(&ok("{}")).unwrap_err();
        assert!(matches!(err, CheckoutError::MalformedProviderResponse { .. }));
    }

    #[test]
    fn non_json_success_is_malformed() {
        let err = interpret_response(&ok("<html>gateway</html>")).unwrap_err();
        assert!(matches!(err, CheckoutError::MalformedProviderResponse { .. }));
    }

    #[test]
    fn empty_or_relative_url_is_malformed() {
        for body in [
            r#"{"payment_link":{"url":""}}"#,
            r#"{"payment_link":{"url":"/checkout/abc"}}"#,
            r#"{"payment_link":{"url":"mailto:someone@example.com"}}"#,
        ] {
            let err = interpret_response(&ok(body)).unwrap_err();
            assert!(matches!(err, CheckoutError::MalformedProviderResponse { .. }), "{body}");
        }
    }

    #[test]
    fn success_yields_url_and_order_id() {
        let session = interpret_response(&ok(
            r#"{"payment_link":{"id":"PL1","url":"https://square.link/u/abc","order_id":"ORD9"}}"#,
        ))
        .unwrap();
        assert_eq!(session.redirect_url, "https://square.link/u/abc");
        assert_eq!(session.order_id.as_deref(), Some("ORD9"));
    }

    #[test]
    fn order_id_falls_back_to_related_resources() {
        let session = interpret_response(&ok(
            r#"{"payment_link":{"url":"https://square.link/u/abc"},
                "related_resources":{"orders":[{"id":"ORD7","location_id":"L1"}]}}"#,
        ))
        .unwrap();
        assert_eq!(session.order_id.as_deref(), Some("ORD7"));
    }

    #[test]
    fn rejection_joins_provider_details() {
        let err = interpret_response(&ProviderResponse {
            status: 400,
            body: r#"{"errors":[
                {"category":"INVALID_REQUEST_ERROR","code":"INVALID_VALUE","detail":"Invalid location"},
                {"category":"INVALID_REQUEST_ERROR","code":"MISSING_REQUIRED_PARAMETER"}
            ]}"#
            .into(),
        })
        .unwrap_err();
        match err {
            CheckoutError::ProviderRejection { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Invalid location; MISSING_REQUIRED_PARAMETER");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejection_without_json_uses_generic_text() {
        let err = interpret_response(&ProviderResponse {
            status: 503,
            body: "upstream unavailable".into(),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "The payment provider declined the request.");
    }

    #[test]
    fn wire_request_shape() {
        let mut order = BoxOrder {
            customer_name: "Rivka Stein".into(),
            customer_phone: "7186834352".into(),
            customer_address: "12 Main St".into(),
            ..BoxOrder::default()
        };
        order.select_variant(MainCourse::Capons, true);
        let checkout =
            build_checkout_request(&Order::ShabbosBox(order), &CustomerInfo::default()).unwrap();
        let req = CreatePaymentLinkRequest::from_checkout(&checkout, "L987", &cfg());
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["order"]["location_id"], "L987");
        assert_eq!(json["order"]["line_items"][0]["quantity"], "1");
        assert_eq!(json["order"]["line_items"][0]["base_price_money"]["amount"], 9900);
        assert_eq!(json["order"]["line_items"][0]["base_price_money"]["currency"], "USD");
        assert_eq!(json["order"]["line_items"][1]["name"], "Bakery Package");
        assert_eq!(
            json["checkout_options"]["redirect_url"],
            "https://simchas-gourmet.netlify.app/order-success"
        );
        assert_eq!(json["checkout_options"]["ask_for_shipping_address"], true);
        assert_eq!(json["checkout_options"]["allow_tipping"], false);
        assert_eq!(json["checkout_options"]["app_fee_money"]["amount"], 0);
        assert_eq!(json["description"], "Simchas Gourmet Order");
        assert_eq!(json["pre_populated_data"]["buyer_phone_number"], "+17186834352");
        assert_eq!(json["pre_populated_data"]["buyer_address"]["first_name"], "Rivka Stein");
        assert!(json["pre_populated_data"].get("buyer_email").is_none());
    }

    #[test]
    fn prefill_omitted_without_contact_and_title_flags_requests() {
        let mut salad = SaladOrder::new();
        salad.toggle_topping("Pickles").unwrap();
        salad.select_dressing("Caesar").unwrap();
        salad.set_special_requests(Some("extra crunchy"));
        let checkout =
            build_checkout_request(&Order::Salad(salad), &CustomerInfo::default()).unwrap();
        let req = CreatePaymentLinkRequest::from_checkout(&checkout, "L987", &cfg());
        assert!(req.pre_populated_data.is_none());
        assert_eq!(req.description, "Simchas Gourmet Order (Special Requests)");
    }

    #[test]
    fn idempotency_keys_are_fresh_v4_uuids() {
        let checkout =
            build_checkout_request(&Order::ShabbosBox(BoxOrder::default()), &CustomerInfo::default())
                .unwrap();
        let a = CreatePaymentLinkRequest::from_checkout(&checkout, "L", &cfg());
        let b = CreatePaymentLinkRequest::from_checkout(&checkout, "L", &cfg());
        assert_ne!(a.idempotency_key, b.idempotency_key);

        let bytes = a.idempotency_key.as_bytes();
        assert_eq!(bytes[6] >> 4, 4);
        assert_eq!(bytes[8] >> 6, 0b10);
    }
}
