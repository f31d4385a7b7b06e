use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::orders::ValidationError;

/// Every way a checkout attempt can fail. The order itself is never touched,
/// so each of these can be resubmitted.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not reach the payment provider. Please try again.")]
    ProviderRequest { reason: String },

    #[error("{detail}")]
    ProviderRejection { status: u16, detail: String },

    #[error("The payment provider did not return a checkout link. Please try again.")]
    MalformedProviderResponse { reason: String },
}

impl CheckoutError {
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::Validation(_) => "validation",
            CheckoutError::ProviderRequest { .. } => "provider_request",
            CheckoutError::ProviderRejection { .. } => "provider_rejection",
            CheckoutError::MalformedProviderResponse { .. } => "malformed_provider_response",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    fn headline(&self) -> &'static str {
        match self {
            CheckoutError::Validation(_) => "Invalid order",
            CheckoutError::MalformedProviderResponse { .. } => "Invalid response from payment provider",
            _ => "Failed to create checkout",
        }
    }
}

impl From<JsonRejection> for CheckoutError {
    fn from(rejection: JsonRejection) -> Self {
        CheckoutError::Validation(ValidationError::MalformedRequest(rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        match &self {
            CheckoutError::Validation(e) => warn!(error = %e, "order rejected"),
            CheckoutError::ProviderRequest { reason } => {
                error!(kind = self.kind(), %reason, "checkout failed")
            }
            CheckoutError::ProviderRejection { status, detail } => {
                error!(kind = self.kind(), status, %detail, "checkout failed")
            }
            CheckoutError::MalformedProviderResponse { reason } => {
                error!(kind = self.kind(), %reason, "checkout failed")
            }
        }
        let body = ErrorBody {
            error: self.headline().to_string(),
            details: Some(self.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: CheckoutError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_maps_to_bad_request() {
        let (status, body) = render(ValidationError::MissingDressing.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid order");
        assert_eq!(body["details"], "Please select a dressing");
    }

    #[tokio::test]
    async fn malformed_order_is_a_validation_error() {
        let err: CheckoutError =
            ValidationError::MalformedRequest("missing field `kind`".into()).into();
        assert_eq!(err.kind(), "validation");
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], "Order could not be read: missing field `kind`");
    }

    #[tokio::test]
    async fn rejection_carries_provider_detail() {
        let (status, body) = render(CheckoutError::ProviderRejection {
            status: 400,
            detail: "Invalid location id".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["details"], "Invalid location id");
    }

    #[tokio::test]
    async fn transport_failure_hides_reason() {
        let (status, body) = render(CheckoutError::ProviderRequest {
            reason: "dns error: connect.squareup.com".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let details = body["details"].as_str().unwrap();
        assert!(details.contains("try again"));
        assert!(!details.contains("dns"));
    }
}
