use tracing::{debug, info, instrument, warn};

use super::dto::{CreatePaymentRequest, QuoteResponse};
use super::payload::{build_checkout_request, build_line_items, format_order_note, CheckoutRequest};
use super::square::{interpret_response, CheckoutResult, CreatePaymentLinkRequest};
use super::submission::{Stage, Submission};
use crate::orders::money::{round_money, to_cents};
use crate::orders::{Order, ValidationError};
use crate::state::AppState;

/// Turns the submitted form into a validated, priced checkout request.
/// Pure; nothing here touches the network.
pub fn prepare_checkout(body: &CreatePaymentRequest) -> Result<CheckoutRequest, ValidationError> {
    let order = Order::from_selection(&body.order_details, &body.customer_info)?;
    order.validate_for_submission()?;

    let computed = order.compute_total();
    debug!(kind = order.kind(), total = %computed, "order priced");
    if let Some(submitted) = body.amount {
        if round_money(submitted) != computed {
            return Err(ValidationError::AmountMismatch {
                submitted,
                computed,
            });
        }
    }
    build_checkout_request(&order, &body.customer_info)
}

/// Prices the current selections for display. Incomplete orders are fine
/// here; only the selection rules apply.
pub fn quote(body: &CreatePaymentRequest) -> Result<QuoteResponse, ValidationError> {
    let order = Order::from_selection(&body.order_details, &body.customer_info)?;
    let total = order.compute_total();
    Ok(QuoteResponse {
        total,
        total_cents: to_cents(total)?,
        line_items: build_line_items(&order)?,
        note: format_order_note(&order),
    })
}

/// Runs one checkout attempt end to end: build, one provider call, interpret.
#[instrument(skip(state, body))]
pub async fn submit_checkout(state: &AppState, body: &CreatePaymentRequest) -> CheckoutResult {
    let mut submission = Submission::new();
    enter(&mut submission, Stage::Building);

    let checkout = match prepare_checkout(body) {
        Ok(checkout) => checkout,
        Err(e) => {
            submission.fail();
            return Err(e.into());
        }
    };
    let request = CreatePaymentLinkRequest::from_checkout(
        &checkout,
        &state.config.square.location_id,
        &state.config.checkout,
    );

    enter(&mut submission, Stage::AwaitingProvider);
    let outcome = match state.provider.create_payment_link(&request).await {
        Ok(raw) => interpret_response(&raw),
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(session) => {
            enter(&mut submission, Stage::Redirecting);
            info!(
                submission = %submission.id(),
                order_id = session.order_id.as_deref().unwrap_or("-"),
                amount = %checkout.amount,
                "checkout link created"
            );
        }
        Err(e) => {
            submission.fail();
            warn!(
                submission = %submission.id(),
                stage = %submission.stage(),
                kind = e.kind(),
                "checkout attempt failed"
            );
        }
    }
    outcome
}

fn enter(submission: &mut Submission, stage: Stage) {
    if let Err(e) = submission.advance(stage) {
        warn!(error = %e, "unexpected submission transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::menu::MainCourse;
    use crate::orders::{CustomerInfo, OrderSelection};
    use crate::state::testing::StubProvider;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn salad_body(amount: Option<i64>) -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount: amount.map(|a| Decimal::new(a, 0)),
            customer_info: CustomerInfo::default(),
            order_details: OrderSelection::Salad {
                toppings: vec!["Pickles".into(), "Cucumbers".into()],
                dressing: Some("Caesar".into()),
                protein: Some("Grilled Chicken".into()),
            },
        }
    }

    #[test]
    fn prepare_rejects_stale_client_total() {
        let err = prepare_checkout(&salad_body(Some(12))).unwrap_err();
        assert!(matches!(err, ValidationError::AmountMismatch { .. }));
        assert!(prepare_checkout(&salad_body(Some(18))).is_ok());
        assert!(prepare_checkout(&salad_body(None)).is_ok());
    }

    #[test]
    fn quote_allows_incomplete_orders() {
        let body = CreatePaymentRequest {
            amount: None,
            customer_info: CustomerInfo::default(),
            order_details: OrderSelection::ShabbosBox {
                main_course: MainCourse::Capons,
                bakery_package: true,
            },
        };
        let quote = quote(&body).unwrap();
        assert_eq!(quote.total, Decimal::new(124, 0));
        assert_eq!(quote.total_cents, 12400);
        assert_eq!(quote.line_items.len(), 2);
    }

    #[tokio::test]
    async fn submit_sends_one_request_and_returns_link() {
        let stub = Arc::new(StubProvider::replying(
            200,
            r#"{"payment_link":{"url":"https://square.link/u/xyz","order_id":"ORD1"}}"#,
        ));
        let state = AppState::fake(stub.clone());

        let session = submit_checkout(&state, &salad_body(Some(18))).await.unwrap();
        assert_eq!(session.redirect_url, "https://square.link/u/xyz");
        assert_eq!(session.order_id.as_deref(), Some("ORD1"));

        let sent = stub.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].order.line_items[0].base_price_money.amount, 1800);
        assert_eq!(sent[0].order.location_id, state.config.square.location_id);
    }

    #[tokio::test]
    async fn validation_failure_never_calls_provider() {
        let stub = Arc::new(StubProvider::replying(200, "{}"));
        let state = AppState::fake(stub.clone());
        let mut body = salad_body(None);
        body.order_details = OrderSelection::Salad {
            toppings: vec!["Pickles".into()],
            dressing: None,
            protein: None,
        };

        let err = submit_checkout(&state, &body).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::MissingDressing)
        ));
        assert!(stub.sent().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_surfaced_without_retry() {
        let stub = Arc::new(StubProvider::unreachable());
        let state = AppState::fake(stub.clone());
        let err = submit_checkout(&state, &salad_body(None)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::ProviderRequest { .. }));
        assert_eq!(stub.sent().len(), 1);
    }

    #[tokio::test]
    async fn each_attempt_uses_a_new_idempotency_key() {
        let stub = Arc::new(StubProvider::replying(500, r#"{"errors":[{"detail":"boom"}]}"#));
        let state = AppState::fake(stub.clone());
        for _ in 0..2 {
            let err = submit_checkout(&state, &salad_body(None)).await.unwrap_err();
            assert!(matches!(err, CheckoutError::ProviderRejection { status: 500, .. }));
        }
        let sent = stub.sent();
        assert_ne!(sent[0].idempotency_key, sent[1].idempotency_key);
    }
}
