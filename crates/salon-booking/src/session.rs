//! # Booking Session
//!
//! One customer's booking flow, shared between the screens and the submit
//! button.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         BookingSession                                  │
//! │                                                                         │
//! │   screens ──► step ops ──┐                                              │
//! │                          ▼                                              │
//! │              Arc<Mutex<SessionState>>   (flow + last computed slots     │
//! │                          ▲               + in-flight flag)              │
//! │   "Book now" ──► submit ─┤  payload ──► gateway (retry/backoff)         │
//! │                          │                      │                       │
//! │                          └── mark_submitted ◄───┘ on success            │
//! │                                                                         │
//! │   In-flight flag: one submit at a time, no edits meanwhile              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutex is never held across an `.await`. The in-flight flag lives
//! under the same mutex as the flow, so an edit either lands before the
//! payload is built or is refused.

use std::sync::{Arc, Mutex, PoisonError};

use backoff::backoff::Backoff;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use salon_core::pricing;
use salon_core::slots::{business_hours_for, compute_slots, still_bookable};
use salon_core::{
    Address, BookingDraft, BookingFlow, BookingPayload, BookingReview, BookingStep, BusinessHours,
    CardDetails, CoreResult, DeliveryOption, PaymentMethod, Service, TimeSlot,
};

use crate::config::BookingConfig;
use crate::error::{BookingError, BookingResult};
use crate::gateway::{BookingConfirmation, BookingGateway, GatewayError};

// =============================================================================
// Totals Summary
// =============================================================================

/// Running total shown under the service list, in display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsSummary {
    pub lines: Vec<SummaryLine>,
    pub total: String,
    pub total_cents: i64,
    pub total_duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub name: String,
    pub price: String,
}

// =============================================================================
// Session State
// =============================================================================

#[derive(Debug)]
struct SessionState {
    flow: BookingFlow,
    /// Slots last offered for the draft's date; slot choices are checked
    /// against these.
    slots: Vec<TimeSlot>,
    /// True while a submit is waiting on the gateway.
    submitting: bool,
}

impl SessionState {
    fn new(today: NaiveDate) -> Self {
        SessionState {
            flow: BookingFlow::new(today),
            slots: Vec::new(),
            submitting: false,
        }
    }

    fn ensure_idle(&self) -> BookingResult<()> {
        if self.submitting {
            return Err(BookingError::SubmissionInFlight);
        }
        Ok(())
    }
}

/// Clears the in-flight flag when a submit ends, however it ends.
struct InFlightGuard<'a>(&'a Mutex<SessionState>);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        // Runs during unwinding too, so a poisoned lock is still cleared.
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        state.submitting = false;
    }
}

// =============================================================================
// Booking Session
// =============================================================================

/// Shared handle to one booking flow. Clones share the same flow.
#[derive(Clone)]
pub struct BookingSession {
    config: BookingConfig,
    gateway: Arc<dyn BookingGateway>,
    state: Arc<Mutex<SessionState>>,
}

impl BookingSession {
    /// Starts a session with an empty draft dated `today`.
    pub fn new(config: BookingConfig, gateway: Arc<dyn BookingGateway>, today: NaiveDate) -> Self {
        BookingSession {
            config,
            gateway,
            state: Arc::new(Mutex::new(SessionState::new(today))),
        }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let state = self.state.lock().expect("Booking session mutex poisoned");
        f(&state)
    }

    fn with_state_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut state = self.state.lock().expect("Booking session mutex poisoned");
        f(&mut state)
    }

    /// Like `with_state_mut`, but refuses to run while a submit is in flight.
    fn with_idle_state<F, R>(&self, f: F) -> BookingResult<R>
    where
        F: FnOnce(&mut SessionState) -> BookingResult<R>,
    {
        self.with_state_mut(|state| {
            state.ensure_idle()?;
            f(state)
        })
    }

    /// Returns true while a submission is running.
    pub fn is_submitting(&self) -> bool {
        self.with_state(|state| state.submitting)
    }

    /// Runs one step operation and reports the step the flow landed on.
    fn apply_step<F>(&self, action: &str, f: F) -> BookingResult<BookingStep>
    where
        F: FnOnce(&mut SessionState) -> CoreResult<()>,
    {
        self.with_idle_state(|state| match f(state) {
            Ok(()) => {
                let step = state.flow.step();
                debug!(action, ?step, "Booking step completed");
                Ok(step)
            }
            Err(e) => {
                debug!(action, step = ?state.flow.step(), error = %e, "Booking step rejected");
                Err(e.into())
            }
        })
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn step(&self) -> BookingStep {
        self.with_state(|state| state.flow.step())
    }

    /// Snapshot of the current draft.
    pub fn draft(&self) -> BookingDraft {
        self.with_state(|state| state.flow.draft().clone())
    }

    pub fn review(&self) -> BookingResult<BookingReview> {
        self.with_state(|state| state.flow.review()).map_err(Into::into)
    }

    /// Line items and total of the current selection in display currency.
    pub fn totals_summary(&self) -> BookingResult<TotalsSummary> {
        let lines = self.with_state(|state| pricing::price_breakdown(state.flow.draft().selected_services()))?;

        let (total, total_duration_minutes) = pricing::line_totals(&lines)?;
        let lines = lines
            .into_iter()
            .map(|line| SummaryLine {
                name: match line.sub_service_name {
                    Some(option) => format!("{} ({})", line.service_name, option),
                    None => line.service_name,
                },
                price: self.config.format_currency(line.price),
            })
            .collect();

        Ok(TotalsSummary {
            lines,
            total: self.config.format_currency(total),
            total_cents: total.cents(),
            total_duration_minutes,
        })
    }

    // =========================================================================
    // Step Operations
    // =========================================================================

    pub fn select_services(&self, services: Vec<Service>) -> BookingResult<BookingStep> {
        self.apply_step("select services", |state| state.flow.select_services(services))
    }

    pub fn choose_delivery(&self, option: DeliveryOption) -> BookingResult<BookingStep> {
        self.apply_step("choose delivery", |state| state.flow.choose_delivery(option))
    }

    pub fn choose_address(&self, address: Address) -> BookingResult<BookingStep> {
        self.apply_step("choose address", |state| state.flow.choose_address(address))
    }

    /// Computes the bookable slots for `date` and records it as the draft's
    /// date. The returned slots are the ones [`Self::choose_slot`] accepts
    /// until they start.
    pub fn available_slots(
        &self,
        date: NaiveDate,
        week: &[BusinessHours],
        now: NaiveDateTime,
    ) -> BookingResult<Vec<TimeSlot>> {
        self.with_idle_state(|state| {
            let slots = compute_slots(date, business_hours_for(date, week), now)?;
            state.flow.choose_date(date, now.date())?;
            debug!(%date, count = slots.len(), "Computed available slots");
            state.slots = slots.clone();
            Ok(slots)
        })
    }

    /// Picks one of the offered slots. A slot that has started by `now` is
    /// refused even if it was offered earlier.
    pub fn choose_slot(&self, minutes: u32, now: NaiveDateTime) -> BookingResult<BookingStep> {
        self.apply_step("choose slot", |state| {
            let open = still_bookable(state.flow.draft().booking_date(), &state.slots, now);
            state.flow.choose_slot(minutes, &open)
        })
    }

    pub fn choose_payment(&self, method: PaymentMethod) -> BookingResult<BookingStep> {
        self.apply_step("choose payment", |state| state.flow.choose_payment(method))
    }

    pub fn enter_card(&self, card: CardDetails, today: NaiveDate) -> BookingResult<BookingStep> {
        self.apply_step("enter card", |state| state.flow.enter_card(card, today))
    }

    /// Re-enters an earlier step from Review.
    pub fn change(&self, step: BookingStep) -> BookingResult<BookingStep> {
        self.apply_step("change", |state| state.flow.change(step))
    }

    pub fn back(&self) -> BookingResult<BookingStep> {
        self.apply_step("back", |state| state.flow.back().map(|_| ()))
    }

    /// Drops the draft and starts over.
    pub fn abandon(&self, today: NaiveDate) -> BookingResult<()> {
        self.with_idle_state(|state| {
            info!(draft_id = %state.flow.draft().id(), "Booking draft abandoned");
            *state = SessionState::new(today);
            Ok(())
        })
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Sends the reviewed booking.
    ///
    /// ## Behavior
    /// - Only one submit runs at a time; a second call gets
    ///   `SubmissionInFlight`
    /// - Retryable gateway failures are retried with exponential backoff up
    ///   to `submission.max_attempts` attempts
    /// - On success the draft becomes read-only
    /// - On failure the draft and step are unchanged so the customer can try
    ///   again without re-entering anything
    pub async fn submit(&self) -> BookingResult<BookingConfirmation> {
        let payload = self.with_idle_state(|state| {
            let payload = state.flow.payload()?;
            state.submitting = true;
            Ok(payload)
        })?;
        let _guard = InFlightGuard(&self.state);

        info!(
            draft_id = %payload.draft_id,
            total = %payload.total,
            slot = %payload.slot_label,
            "Submitting booking"
        );

        let confirmation = self.send_with_retry(&payload).await?;

        // The booking exists on the server now; a local failure must not
        // be reported as a failed submission.
        match self.with_state_mut(|state| state.flow.mark_submitted()) {
            Ok(()) => info!(
                draft_id = %payload.draft_id,
                booking_id = %confirmation.booking_id,
                reference = %confirmation.reference,
                "Booking confirmed"
            ),
            Err(e) => error!(
                draft_id = %payload.draft_id,
                booking_id = %confirmation.booking_id,
                error = %e,
                "Booking confirmed but the draft could not be closed"
            ),
        }

        Ok(confirmation)
    }

    async fn send_with_retry(
        &self,
        payload: &BookingPayload,
    ) -> Result<BookingConfirmation, GatewayError> {
        let settings = &self.config.submission;
        let mut backoff = settings.backoff();
        let mut attempt = 1u32;

        loop {
            let result =
                match tokio::time::timeout(settings.timeout(), self.gateway.submit_booking(payload))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::Timeout(settings.timeout_secs)),
                };

            let err = match result {
                Ok(confirmation) => return Ok(confirmation),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= settings.max_attempts {
                warn!(attempt, error = %err, "Booking submission failed");
                return Err(err);
            }

            let Some(delay) = backoff.next_backoff() else {
                warn!(attempt, error = %err, "Booking submission backoff exhausted");
                return Err(err);
            };

            warn!(attempt, ?delay, error = %err, "Booking submission failed, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
