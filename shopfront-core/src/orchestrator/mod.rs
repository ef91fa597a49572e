//! Order placement over the wallet and hosted-payment protocols.
//!
//! # Flow
//!
//! 1. `place_order` validates the session and picks the protocol.
//! 2. Wallet: the order is created right away.
//! 3. Hosted: payment is initialized and a [`PaymentHandoff`] opened. The
//!    callback, an overlay close or a return redirect then lead to a
//!    verification that confirms the order at most once per reference.

mod draft;
mod handoff;

pub use handoff::{CallbackListener, HandoffState, PaymentHandoff};

use std::sync::Arc;

use serde::Serialize;
use shopfront_sdk::objects::{InitializePayment, PaymentMethod};
use time::Date;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::checkout::{PlacementSnapshot, SessionHandle};
use crate::config::{CheckoutConfig, ConfigStore};
use crate::errors::{CheckoutError, GatewayError, ValidationIssue};
use crate::events::{CheckoutNotice, NoticeKind, NoticeSender};
use crate::gateway::{OrderService, PaymentProvider};
use draft::build_draft;

/// Result of a `place_order` call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PlacementOutcome {
    /// Wallet order created; the session is on the confirmation step.
    #[serde(rename_all = "camelCase")]
    Confirmed {
        order_id: String,
        slot_at_capacity: bool,
    },
    /// The chosen slot is full. Ask the shopper, then retry with `force`.
    #[serde(rename_all = "camelCase")]
    CapacityConfirmationRequired { date: Date, time_slot: String },
    /// Hosted payment opened; send the shopper to `authorization_url`.
    #[serde(rename_all = "camelCase")]
    AwaitingPayment {
        reference: String,
        authorization_url: Url,
        access_code: Option<String>,
    },
    /// Another placement for this session is still running.
    AlreadyInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum VerificationOutcome {
    #[serde(rename_all = "camelCase")]
    Confirmed {
        order_id: Option<String>,
        slot_at_capacity: bool,
    },
    /// Not settled yet; the cart is untouched.
    Pending { reference: String },
    /// This session already verified the reference.
    AlreadyProcessed,
}

/// What asked for a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationTrigger {
    Callback,
    OverlayClosed,
    ReturnRedirect,
}

/// Drives order placement for checkout sessions.
#[derive(Clone)]
pub struct OrderPlacementOrchestrator {
    orders: Arc<dyn OrderService>,
    payments: Arc<dyn PaymentProvider>,
    notices: NoticeSender,
    config: ConfigStore<CheckoutConfig>,
}

impl OrderPlacementOrchestrator {
    pub fn new(
        orders: Arc<dyn OrderService>,
        payments: Arc<dyn PaymentProvider>,
        notices: NoticeSender,
        config: ConfigStore<CheckoutConfig>,
    ) -> Self {
        Self {
            orders,
            payments,
            notices,
            config,
        }
    }

    async fn notify(&self, checkout_id: Uuid, kind: NoticeKind) {
        if let Err(e) = self.notices.send(CheckoutNotice::new(checkout_id, kind)).await {
            warn!(%checkout_id, error = %e, "Failed to send checkout notice");
        }
    }

    /// Place the order for a session on the payment step.
    ///
    /// `force` accepts a full delivery slot. `callback_url` is where the
    /// hosted payment page sends the shopper back to.
    pub async fn place_order(
        &self,
        handle: &SessionHandle,
        force: bool,
        callback_url: Option<Url>,
    ) -> Result<PlacementOutcome, CheckoutError> {
        let snapshot = {
            let mut session = handle.lock().await;
            if session.is_in_flight() {
                debug!(checkout_id = %session.id(), "Placement already in flight, ignoring");
                return Ok(PlacementOutcome::AlreadyInFlight);
            }
            if let Some(reference) = session.pending_reference() {
                debug!(
                    checkout_id = %session.id(),
                    reference,
                    "Hosted payment still open, ignoring placement"
                );
                return Ok(PlacementOutcome::AlreadyInFlight);
            }
            let snapshot = session.placement_snapshot()?;
            if snapshot.slot.at_capacity && !force {
                return Ok(PlacementOutcome::CapacityConfirmationRequired {
                    date: snapshot.slot.date,
                    time_slot: snapshot.slot.time_slot.to_string(),
                });
            }
            session.set_in_flight(true);
            snapshot
        };

        let checkout_id = snapshot.checkout_id;
        info!(
            %checkout_id,
            payment_method = %snapshot.payment_method,
            slot_at_capacity = snapshot.slot.at_capacity,
            "Placing order"
        );

        // Once a collaborator call starts it runs to completion even if the
        // caller goes away, so the in-flight flag is always reset.
        let this = self.clone();
        let task_handle = Arc::clone(handle);
        let joined = tokio::spawn(async move {
            let result = match snapshot.payment_method {
                PaymentMethod::Wallet => this.place_with_wallet(&task_handle, &snapshot).await,
                PaymentMethod::Paystack => {
                    this.start_hosted_payment(&task_handle, &snapshot, callback_url)
                        .await
                }
            };
            task_handle.lock().await.set_in_flight(false);
            result
        })
        .await;

        joined.unwrap_or_else(|e| {
            error!(%checkout_id, error = %e, "Placement task failed");
            Err(CheckoutError::OrderCreationFailed(GatewayError::Unavailable(
                e.to_string(),
            )))
        })
    }

    async fn place_with_wallet(
        &self,
        handle: &SessionHandle,
        snapshot: &PlacementSnapshot,
    ) -> Result<PlacementOutcome, CheckoutError> {
        let checkout_id = snapshot.checkout_id;
        let required = snapshot.totals(true).gross_total;
        if snapshot.wallet_balance < required {
            info!(
                %checkout_id,
                available = %snapshot.wallet_balance,
                %required,
                "Insufficient wallet balance"
            );
            self.notify(
                checkout_id,
                NoticeKind::InsufficientFunds {
                    available: snapshot.wallet_balance,
                    required,
                },
            )
            .await;
            return Err(CheckoutError::InsufficientFunds {
                available: snapshot.wallet_balance,
                required,
            });
        }

        let draft = build_draft(snapshot, true, false);
        match self.orders.create_order(&draft).await {
            Ok(created) => {
                let slot_at_capacity = created.slot_at_capacity || draft.slot_at_capacity;
                let newly_confirmed = handle
                    .lock()
                    .await
                    .confirm(Some(created.order_id.clone()));
                info!(%checkout_id, order_id = %created.order_id, "Wallet order created");
                if newly_confirmed {
                    self.notify(
                        checkout_id,
                        NoticeKind::OrderPlaced {
                            order_id: Some(created.order_id.clone()),
                            next_day_delivery: slot_at_capacity,
                        },
                    )
                    .await;
                }
                Ok(PlacementOutcome::Confirmed {
                    order_id: created.order_id,
                    slot_at_capacity,
                })
            }
            Err(e) => {
                error!(%checkout_id, error = %e, "Failed to create wallet order");
                self.notify(
                    checkout_id,
                    NoticeKind::OrderFailed {
                        reason: e.to_string(),
                    },
                )
                .await;
                Err(CheckoutError::OrderCreationFailed(e))
            }
        }
    }

    async fn start_hosted_payment(
        &self,
        handle: &SessionHandle,
        snapshot: &PlacementSnapshot,
        callback_url: Option<Url>,
    ) -> Result<PlacementOutcome, CheckoutError> {
        let checkout_id = snapshot.checkout_id;
        let draft = build_draft(snapshot, snapshot.use_wallet, true);
        if draft.amount_due.is_zero() {
            return Err(ValidationIssue::NothingToCharge.into());
        }

        let request = InitializePayment {
            amount: draft.amount_due,
            order_data: Some(draft),
            order_id: None,
            payment_method: PaymentMethod::Paystack,
            callback_url,
        };
        match self.payments.initialize(&request).await {
            Ok(init) => {
                info!(
                    %checkout_id,
                    reference = %init.reference,
                    amount = %request.amount,
                    "Hosted payment opened"
                );
                handle
                    .lock()
                    .await
                    .open_handoff(PaymentHandoff::new(init.reference.clone()));
                Ok(PlacementOutcome::AwaitingPayment {
                    reference: init.reference,
                    authorization_url: init.authorization_url,
                    access_code: init.access_code,
                })
            }
            Err(e) => {
                error!(%checkout_id, error = %e, "Failed to initialize payment");
                self.notify(
                    checkout_id,
                    NoticeKind::PaymentInitFailed {
                        reason: e.to_string(),
                    },
                )
                .await;
                Err(CheckoutError::PaymentInitFailed(e))
            }
        }
    }

    /// The payment provider reported success for `reference`.
    pub async fn payment_callback(
        &self,
        handle: &SessionHandle,
        reference: &str,
    ) -> Result<VerificationOutcome, CheckoutError> {
        {
            let session = handle.lock().await;
            if let Some(handoff) = session.handoff().filter(|h| h.reference() == reference) {
                handoff.record_callback();
            }
        }
        self.verify(handle, reference, VerificationTrigger::Callback)
            .await
    }

    /// The shopper closed the payment overlay without a callback.
    ///
    /// Schedules one verification after the configured delay unless the
    /// callback shows up first. Returns `false` if there was nothing to
    /// schedule.
    pub async fn overlay_closed(&self, handle: &SessionHandle, reference: &str) -> bool {
        let (checkout_id, listener) = {
            let session = handle.lock().await;
            let listener = session
                .handoff()
                .filter(|h| h.reference() == reference)
                .and_then(PaymentHandoff::record_close);
            (session.id(), listener)
        };
        let Some(listener) = listener else {
            debug!(%checkout_id, reference, "No open handoff to close");
            return false;
        };

        let delay = self.config.snapshot().verification_delay;
        debug!(%checkout_id, reference, ?delay, "Overlay closed, scheduling verification");

        let this = self.clone();
        let handle = Arc::clone(handle);
        let reference = reference.to_owned();
        tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = listener.callback_received() => {
                    debug!(
                        %checkout_id,
                        %reference,
                        "Callback arrived before delayed verification"
                    );
                }

                _ = tokio::time::sleep(delay) => {
                    if let Err(e) = this
                        .verify(&handle, &reference, VerificationTrigger::OverlayClosed)
                        .await
                    {
                        debug!(
                            %checkout_id,
                            %reference,
                            error = %e,
                            "Delayed verification did not confirm"
                        );
                    }
                }
            }
        });
        true
    }

    /// The shopper came back from the hosted payment page.
    pub async fn handle_return(
        &self,
        handle: &SessionHandle,
        reference: &str,
    ) -> Result<VerificationOutcome, CheckoutError> {
        self.verify(handle, reference, VerificationTrigger::ReturnRedirect)
            .await
    }

    /// Verify `reference` at most once for this session.
    ///
    /// Only references this session's own payment initializations returned
    /// are verified. Runs on its own task so a dropped caller cannot cut it
    /// short.
    pub async fn verify(
        &self,
        handle: &SessionHandle,
        reference: &str,
        trigger: VerificationTrigger,
    ) -> Result<VerificationOutcome, CheckoutError> {
        let this = self.clone();
        let task_handle = Arc::clone(handle);
        let task_reference = reference.to_owned();
        tokio::spawn(async move {
            this.run_verification(&task_handle, &task_reference, trigger)
                .await
        })
        .await
        .unwrap_or_else(|e| {
            Err(CheckoutError::PaymentVerificationFailed {
                reference: reference.to_owned(),
                reason: e.to_string(),
                likely_cancelled: false,
            })
        })
    }

    async fn run_verification(
        &self,
        handle: &SessionHandle,
        reference: &str,
        trigger: VerificationTrigger,
    ) -> Result<VerificationOutcome, CheckoutError> {
        let checkout_id = {
            let mut session = handle.lock().await;
            if !session.issued_reference(reference) {
                warn!(checkout_id = %session.id(), reference, "Refusing reference not issued here");
                return Err(CheckoutError::PaymentVerificationFailed {
                    reference: reference.to_owned(),
                    reason: "reference was not issued for this checkout".to_string(),
                    likely_cancelled: false,
                });
            }
            if !session.claim_reference(reference) {
                debug!(checkout_id = %session.id(), reference, "Reference already processed");
                return Ok(VerificationOutcome::AlreadyProcessed);
            }
            session.id()
        };
        debug!(%checkout_id, reference, ?trigger, "Verifying payment");

        let reason = match self.payments.verify(reference).await {
            Ok(verification) if verification.is_completed() => {
                let newly_confirmed = handle
                    .lock()
                    .await
                    .confirm(verification.order_id.clone());
                if newly_confirmed {
                    info!(
                        %checkout_id,
                        reference,
                        order_id = verification.order_id.as_deref().unwrap_or_default(),
                        "Payment verified, order confirmed"
                    );
                    self.notify(
                        checkout_id,
                        NoticeKind::OrderPlaced {
                            order_id: verification.order_id.clone(),
                            next_day_delivery: verification.slot_at_capacity,
                        },
                    )
                    .await;
                }
                return Ok(VerificationOutcome::Confirmed {
                    order_id: verification.order_id,
                    slot_at_capacity: verification.slot_at_capacity,
                });
            }
            Ok(verification) if verification.is_pending() => {
                // A later settlement of the same reference must still confirm.
                handle.lock().await.release_reference(reference);
                info!(%checkout_id, reference, "Payment pending");
                self.notify(
                    checkout_id,
                    NoticeKind::PaymentPending {
                        reference: reference.to_owned(),
                    },
                )
                .await;
                return Ok(VerificationOutcome::Pending {
                    reference: reference.to_owned(),
                });
            }
            Ok(verification) => {
                handle.lock().await.close_handoff(reference);
                verification
                    .message
                    .unwrap_or_else(|| "payment was not completed".to_string())
            }
            Err(e) => {
                // Transport failures did not consume the reference upstream.
                handle.lock().await.release_reference(reference);
                e.to_string()
            }
        };

        let likely_cancelled = trigger == VerificationTrigger::OverlayClosed;
        warn!(
            %checkout_id,
            reference,
            %reason,
            likely_cancelled,
            "Payment verification failed"
        );
        let kind = if likely_cancelled {
            NoticeKind::PaymentLikelyCancelled {
                reference: reference.to_owned(),
            }
        } else {
            NoticeKind::PaymentFailed {
                reference: reference.to_owned(),
                reason: reason.clone(),
            }
        };
        self.notify(checkout_id, kind).await;

        Err(CheckoutError::PaymentVerificationFailed {
            reference: reference.to_owned(),
            reason,
            likely_cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use shopfront_sdk::objects::{PaymentVerification, VerificationStatus};
    use time::macros::date;

    use crate::checkout::CheckoutStep;
    use crate::events::{NoticeReceiver, notice_channel};
    use crate::settings::DeliverySettings;
    use crate::test_support::{
        FakeOrders, FakePayments, cart_item, payment_session, verification,
    };

    struct Harness {
        orchestrator: OrderPlacementOrchestrator,
        orders: Arc<FakeOrders>,
        payments: Arc<FakePayments>,
        notices: NoticeReceiver,
    }

    fn harness(orders: FakeOrders, payments: FakePayments) -> Harness {
        let orders = Arc::new(orders);
        let payments = Arc::new(payments);
        let (tx, rx) = notice_channel();
        let orchestrator = OrderPlacementOrchestrator::new(
            orders.clone(),
            payments.clone(),
            tx,
            ConfigStore::new(CheckoutConfig::default()),
        );
        Harness {
            orchestrator,
            orders,
            payments,
            notices: rx,
        }
    }

    fn drain(rx: &mut NoticeReceiver) -> Vec<NoticeKind> {
        let mut kinds = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            kinds.push(notice.kind);
        }
        kinds
    }

    fn eight_thousand_cart() -> Vec<shopfront_sdk::objects::CartItem> {
        // 6000 subtotal + 2000 tier-1 fee
        vec![cart_item("rice", "6000", 1, Decimal::from(10))]
    }

    #[tokio::test]
    async fn test_wallet_insufficient_funds_creates_nothing() {
        let mut h = harness(FakeOrders::succeeding("ord_1"), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            5000,
            PaymentMethod::Wallet,
            0,
        );

        let result = h.orchestrator.place_order(&handle, false, None).await;
        match result {
            Err(CheckoutError::InsufficientFunds {
                available,
                required,
            }) => {
                assert_eq!(available, Decimal::from(5000));
                assert_eq!(required, Decimal::from(8000));
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
        assert_eq!(h.orders.calls(), 0);
        let session = handle.lock().await;
        assert_eq!(session.step(), CheckoutStep::Payment);
        assert!(!session.is_in_flight());
        assert_eq!(session.cart_items().len(), 1);
        drop(session);
        assert!(matches!(
            drain(&mut h.notices).as_slice(),
            [NoticeKind::InsufficientFunds { .. }]
        ));
    }

    #[tokio::test]
    async fn test_wallet_order_confirms_and_clears_cart() {
        let mut h = harness(FakeOrders::succeeding("ord_7"), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            9000,
            PaymentMethod::Wallet,
            0,
        );

        let outcome = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        assert_eq!(
            outcome,
            PlacementOutcome::Confirmed {
                order_id: "ord_7".into(),
                slot_at_capacity: false,
            }
        );

        let draft = h.orders.last_draft().unwrap();
        assert!(draft.use_wallet);
        assert_eq!(draft.wallet_deduction, Decimal::from(8000));
        assert_eq!(draft.total, Decimal::from(8000));
        assert_eq!(draft.amount_due, Decimal::ZERO);
        assert!(!draft.defer_creation);

        let session = handle.lock().await;
        assert_eq!(session.step(), CheckoutStep::Confirmation);
        assert_eq!(session.order_id(), Some("ord_7"));
        assert!(session.cart_items().is_empty());
        drop(session);
        assert_eq!(
            drain(&mut h.notices),
            vec![NoticeKind::OrderPlaced {
                order_id: Some("ord_7".into()),
                next_day_delivery: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_order_failure_keeps_cart_and_step() {
        let h = harness(FakeOrders::failing(), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            9000,
            PaymentMethod::Wallet,
            0,
        );

        let result = h.orchestrator.place_order(&handle, false, None).await;
        assert!(matches!(result, Err(CheckoutError::OrderCreationFailed(_))));

        let session = handle.lock().await;
        assert_eq!(session.step(), CheckoutStep::Payment);
        assert_eq!(session.cart_items().len(), 1);
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn test_full_slot_needs_confirmation_then_force() {
        let h = harness(FakeOrders::succeeding("ord_2"), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            9000,
            PaymentMethod::Wallet,
            10,
        );

        let outcome = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        assert_eq!(
            outcome,
            PlacementOutcome::CapacityConfirmationRequired {
                date: date!(2025 - 01 - 15),
                time_slot: "09:00-12:00".into(),
            }
        );
        assert_eq!(h.orders.calls(), 0);

        let outcome = h.orchestrator.place_order(&handle, true, None).await.unwrap();
        assert!(matches!(
            outcome,
            PlacementOutcome::Confirmed {
                slot_at_capacity: true,
                ..
            }
        ));
        assert!(h.orders.last_draft().unwrap().slot_at_capacity);
    }

    #[tokio::test]
    async fn test_in_flight_placement_is_ignored() {
        let h = harness(FakeOrders::succeeding("ord_3"), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            9000,
            PaymentMethod::Wallet,
            0,
        );
        handle.lock().await.set_in_flight(true);

        let outcome = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        assert_eq!(outcome, PlacementOutcome::AlreadyInFlight);
        assert_eq!(h.orders.calls(), 0);
    }

    #[tokio::test]
    async fn test_hosted_payment_sends_deferred_draft() {
        let h = harness(FakeOrders::succeeding("unused"), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            3000,
            PaymentMethod::Paystack,
            0,
        );
        handle
            .lock()
            .await
            .set_payment_method(PaymentMethod::Paystack, true)
            .unwrap();

        let outcome = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        let PlacementOutcome::AwaitingPayment { reference, .. } = outcome else {
            panic!("expected AwaitingPayment, got {outcome:?}");
        };
        assert_eq!(reference, "ref_1");

        let request = h.payments.last_initialize().unwrap();
        assert_eq!(request.amount, Decimal::from(5000));
        let draft = request.order_data.unwrap();
        assert!(draft.defer_creation);
        assert_eq!(draft.wallet_deduction, Decimal::from(3000));
        assert_eq!(h.orders.calls(), 0);

        let session = handle.lock().await;
        assert_eq!(session.pending_reference(), Some("ref_1"));
        assert_eq!(session.step(), CheckoutStep::Payment);
    }

    #[tokio::test]
    async fn test_hosted_payment_with_nothing_to_charge() {
        let h = harness(FakeOrders::succeeding("unused"), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            10000,
            PaymentMethod::Paystack,
            0,
        );
        handle
            .lock()
            .await
            .set_payment_method(PaymentMethod::Paystack, true)
            .unwrap();

        let result = h.orchestrator.place_order(&handle, false, None).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationIssue::NothingToCharge))
        ));
        assert_eq!(h.payments.initialize_calls(), 0);
    }

    #[tokio::test]
    async fn test_payment_init_failure() {
        let mut h = harness(FakeOrders::succeeding("unused"), FakePayments::failing_init());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );

        let result = h.orchestrator.place_order(&handle, false, None).await;
        assert!(matches!(result, Err(CheckoutError::PaymentInitFailed(_))));
        assert!(!handle.lock().await.is_in_flight());
        assert!(matches!(
            drain(&mut h.notices).as_slice(),
            [NoticeKind::PaymentInitFailed { .. }]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlay_close_runs_delayed_verification_once() {
        let mut h = harness(
            FakeOrders::succeeding("unused"),
            FakePayments::verifying(verification(VerificationStatus::Completed, Some("ord_9"))),
        );
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );
        h.orchestrator.place_order(&handle, false, None).await.unwrap();

        assert!(h.orchestrator.overlay_closed(&handle, "ref_1").await);
        assert!(!h.orchestrator.overlay_closed(&handle, "ref_1").await);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(h.payments.verify_calls(), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        assert_eq!(h.payments.verify_calls(), 1);
        let session = handle.lock().await;
        assert_eq!(session.step(), CheckoutStep::Confirmation);
        assert_eq!(session.order_id(), Some("ord_9"));
        assert!(session.cart_items().is_empty());
        drop(session);

        assert_eq!(
            drain(&mut h.notices),
            vec![NoticeKind::OrderPlaced {
                order_id: Some("ord_9".into()),
                next_day_delivery: false,
            }]
        );
        assert_eq!(h.orders.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_beats_delayed_verification() {
        let mut h = harness(
            FakeOrders::succeeding("unused"),
            FakePayments::verifying(verification(VerificationStatus::Completed, Some("ord_4"))),
        );
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );
        h.orchestrator.place_order(&handle, false, None).await.unwrap();
        h.orchestrator.overlay_closed(&handle, "ref_1").await;

        let outcome = h
            .orchestrator
            .payment_callback(&handle, "ref_1")
            .await
            .unwrap();
        assert!(matches!(outcome, VerificationOutcome::Confirmed { .. }));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.payments.verify_calls(), 1);
        assert_eq!(drain(&mut h.notices).len(), 1);
    }

    #[tokio::test]
    async fn test_same_reference_verifies_once() {
        let mut h = harness(
            FakeOrders::succeeding("unused"),
            FakePayments::verifying(verification(VerificationStatus::Completed, Some("ord_5"))),
        );
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );
        h.orchestrator.place_order(&handle, false, None).await.unwrap();

        let first = h.orchestrator.handle_return(&handle, "ref_1").await.unwrap();
        let second = h.orchestrator.handle_return(&handle, "ref_1").await.unwrap();
        let third = h
            .orchestrator
            .payment_callback(&handle, "ref_1")
            .await
            .unwrap();

        assert!(matches!(first, VerificationOutcome::Confirmed { .. }));
        assert_eq!(second, VerificationOutcome::AlreadyProcessed);
        assert_eq!(third, VerificationOutcome::AlreadyProcessed);
        assert_eq!(h.payments.verify_calls(), 1);
        assert_eq!(handle.lock().await.step(), CheckoutStep::Confirmation);
        assert_eq!(drain(&mut h.notices).len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_reference_is_refused() {
        let mut h = harness(
            FakeOrders::succeeding("unused"),
            FakePayments::verifying(verification(VerificationStatus::Completed, Some("ord_6"))),
        );
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );
        h.orchestrator.place_order(&handle, false, None).await.unwrap();

        for reference in ["ref_a", "ref_b"] {
            let result = h.orchestrator.handle_return(&handle, reference).await;
            assert!(matches!(
                result,
                Err(CheckoutError::PaymentVerificationFailed {
                    likely_cancelled: false,
                    ..
                })
            ));
        }
        let result = h.orchestrator.payment_callback(&handle, "ref_a").await;
        assert!(result.is_err());
        assert_eq!(h.payments.verify_calls(), 0);

        let session = handle.lock().await;
        assert_eq!(session.step(), CheckoutStep::Payment);
        assert_eq!(session.cart_items().len(), 1);
        assert_eq!(session.pending_reference(), Some("ref_1"));
        drop(session);
        assert!(drain(&mut h.notices).is_empty());

        let outcome = h.orchestrator.handle_return(&handle, "ref_1").await.unwrap();
        assert!(matches!(outcome, VerificationOutcome::Confirmed { .. }));
    }

    #[tokio::test]
    async fn test_return_before_any_placement_is_refused() {
        let h = harness(FakeOrders::succeeding("unused"), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );

        let result = h.orchestrator.handle_return(&handle, "ref_1").await;
        assert!(result.is_err());
        assert_eq!(h.payments.verify_calls(), 0);
        assert_eq!(handle.lock().await.step(), CheckoutStep::Payment);
    }

    #[tokio::test]
    async fn test_open_handoff_blocks_second_placement() {
        let h = harness(FakeOrders::succeeding("ord_w"), FakePayments::default());
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            9000,
            PaymentMethod::Paystack,
            0,
        );

        let first = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        assert!(matches!(first, PlacementOutcome::AwaitingPayment { .. }));
        let second = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        assert_eq!(second, PlacementOutcome::AlreadyInFlight);

        handle
            .lock()
            .await
            .set_payment_method(PaymentMethod::Wallet, true)
            .unwrap();
        let wallet = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        assert_eq!(wallet, PlacementOutcome::AlreadyInFlight);

        assert_eq!(h.payments.initialize_calls(), 1);
        assert_eq!(h.orders.calls(), 0);
        assert_eq!(handle.lock().await.pending_reference(), Some("ref_1"));
    }

    #[tokio::test]
    async fn test_pending_payment_keeps_cart_then_settles() {
        let mut h = harness(
            FakeOrders::succeeding("unused"),
            FakePayments::verifying_in_turn(
                verification(VerificationStatus::Pending, None),
                verification(VerificationStatus::Completed, Some("ord_8")),
            ),
        );
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );
        h.orchestrator.place_order(&handle, false, None).await.unwrap();

        let outcome = h.orchestrator.handle_return(&handle, "ref_1").await.unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::Pending {
                reference: "ref_1".into()
            }
        );
        let session = handle.lock().await;
        assert_eq!(session.step(), CheckoutStep::Payment);
        assert_eq!(session.cart_items().len(), 1);
        assert_eq!(session.pending_reference(), Some("ref_1"));
        drop(session);

        let again = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        assert_eq!(again, PlacementOutcome::AlreadyInFlight);

        let settled = h
            .orchestrator
            .payment_callback(&handle, "ref_1")
            .await
            .unwrap();
        assert_eq!(
            settled,
            VerificationOutcome::Confirmed {
                order_id: Some("ord_8".into()),
                slot_at_capacity: false,
            }
        );
        assert_eq!(h.payments.verify_calls(), 2);
        assert_eq!(handle.lock().await.step(), CheckoutStep::Confirmation);
        assert!(matches!(
            drain(&mut h.notices).as_slice(),
            [
                NoticeKind::PaymentPending { .. },
                NoticeKind::OrderPlaced { .. }
            ]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delayed_verification_is_likely_cancelled() {
        let mut h = harness(
            FakeOrders::succeeding("unused"),
            FakePayments::verifying(PaymentVerification {
                success: false,
                ..verification(VerificationStatus::Failed, None)
            }),
        );
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );
        h.orchestrator.place_order(&handle, false, None).await.unwrap();
        h.orchestrator.overlay_closed(&handle, "ref_1").await;

        tokio::time::sleep(Duration::from_secs(4)).await;
        tokio::task::yield_now().await;

        assert_eq!(h.payments.verify_calls(), 1);
        let session = handle.lock().await;
        assert_eq!(session.step(), CheckoutStep::Payment);
        assert_eq!(session.pending_reference(), None);
        drop(session);
        assert!(matches!(
            drain(&mut h.notices).as_slice(),
            [NoticeKind::PaymentLikelyCancelled { .. }]
        ));
    }

    #[tokio::test]
    async fn test_failed_return_verification_is_hard_failure() {
        let h = harness(
            FakeOrders::succeeding("unused"),
            FakePayments::verifying(PaymentVerification {
                success: false,
                message: Some("Declined".into()),
                ..verification(VerificationStatus::Failed, None)
            }),
        );
        let handle = payment_session(
            eight_thousand_cart(),
            DeliverySettings::default(),
            0,
            PaymentMethod::Paystack,
            0,
        );
        h.orchestrator.place_order(&handle, false, None).await.unwrap();

        let result = h.orchestrator.handle_return(&handle, "ref_1").await;
        match result {
            Err(CheckoutError::PaymentVerificationFailed {
                reason,
                likely_cancelled,
                ..
            }) => {
                assert_eq!(reason, "Declined");
                assert!(!likely_cancelled);
            }
            other => panic!("expected PaymentVerificationFailed, got {other:?}"),
        }

        // The failed handoff is closed, so the shopper can pay again.
        let retry = h.orchestrator.place_order(&handle, false, None).await.unwrap();
        assert!(matches!(retry, PlacementOutcome::AwaitingPayment { .. }));
        assert_eq!(h.payments.initialize_calls(), 2);
    }
}
