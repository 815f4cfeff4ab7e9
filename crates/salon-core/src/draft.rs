//! # Booking Draft & Flow
//!
//! The booking draft accumulates everything the customer picks across the
//! booking screens; [`BookingFlow`] walks it through those screens.
//!
//! ## Step Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Booking Flow                                    │
//! │                                                                         │
//! │  ServiceSelection                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DeliveryOptionSelection ──(HomeService)──► AddressSelection            │
//! │       │ (Salon)                                  │                      │
//! │       ▼                                          │                      │
//! │  DateSlotSelection ◄─────────────────────────────┘                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PaymentMethodSelection ──(Card)──► CardEntry                           │
//! │       │ (DigitalWallet)                 │                               │
//! │       ▼                                 │                               │
//! │  Review ◄───────────────────────────────┘                               │
//! │   │  ▲                                                                  │
//! │   │  └── change(step): re-enter an earlier step with the same draft,   │
//! │   │      come straight back once nothing is missing                    │
//! │   ▼                                                                     │
//! │  Submitted (read-only)                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Update Rules
//! - Every draft update returns a new draft; the old one is untouched.
//! - A failed validation leaves both the step and the draft as they were.
//! - Updates only add or replace fields. Switching back to `Salon` keeps the
//!   chosen address, switching to a wallet keeps the entered card; they are
//!   simply not required or submitted.
//! - Changing the date drops the slot, because a slot belongs to a date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{self, PriceLine};
use crate::slots::find_slot;
use crate::types::{Address, CardDetails, DeliveryOption, PaymentMethod, Service, TimeSlot};
use crate::validation;

// =============================================================================
// Steps
// =============================================================================

/// A screen of the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    ServiceSelection,
    DeliveryOptionSelection,
    AddressSelection,
    DateSlotSelection,
    PaymentMethodSelection,
    CardEntry,
    Review,
    Submitted,
}

impl BookingStep {
    /// Returns true for the steps `change` may re-enter from Review.
    pub fn is_editable(&self) -> bool {
        !matches!(self, BookingStep::Review | BookingStep::Submitted)
    }
}

/// Lifecycle of the draft itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    #[default]
    Open,
    Submitted,
}

// =============================================================================
// Booking Draft
// =============================================================================

/// The in-progress state of one booking.
///
/// Fields are private so a submitted draft cannot be edited behind the
/// flow's back; use the `with_*` functions to derive an updated draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    id: Uuid,
    selected_services: Vec<Service>,
    booking_date: NaiveDate,
    booking_slot: Option<TimeSlot>,
    delivery_option: DeliveryOption,
    address: Option<Address>,
    payment_method: Option<PaymentMethod>,
    card: Option<CardDetails>,
    status: DraftStatus,
}

impl BookingDraft {
    /// Creates an empty draft dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        BookingDraft {
            id: Uuid::new_v4(),
            selected_services: Vec::new(),
            booking_date: today,
            booking_slot: None,
            delivery_option: DeliveryOption::default(),
            address: None,
            payment_method: None,
            card: None,
            status: DraftStatus::Open,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn selected_services(&self) -> &[Service] {
        &self.selected_services
    }

    pub fn booking_date(&self) -> NaiveDate {
        self.booking_date
    }

    pub fn booking_slot(&self) -> Option<&TimeSlot> {
        self.booking_slot.as_ref()
    }

    pub fn delivery_option(&self) -> DeliveryOption {
        self.delivery_option
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn card(&self) -> Option<&CardDetails> {
        self.card.as_ref()
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn is_submitted(&self) -> bool {
        self.status == DraftStatus::Submitted
    }

    /// Total of the selected services.
    pub fn total_price(&self) -> CoreResult<Money> {
        pricing::total_price(&self.selected_services)
    }

    fn updated(&self, apply: impl FnOnce(&mut BookingDraft)) -> CoreResult<BookingDraft> {
        if self.is_submitted() {
            return Err(CoreError::DraftAlreadySubmitted {
                draft_id: self.id.to_string(),
            });
        }
        let mut next = self.clone();
        apply(&mut next);
        Ok(next)
    }

    /// Replaces the service selection.
    ///
    /// Services are a set keyed by id: a repeated id replaces the earlier
    /// entry in place.
    pub fn with_services(&self, services: Vec<Service>) -> CoreResult<BookingDraft> {
        let mut unique: Vec<Service> = Vec::with_capacity(services.len());
        for service in services {
            match unique.iter_mut().find(|s| s.id == service.id) {
                Some(existing) => *existing = service,
                None => unique.push(service),
            }
        }
        self.updated(|d| d.selected_services = unique)
    }

    pub fn with_delivery_option(&self, option: DeliveryOption) -> CoreResult<BookingDraft> {
        self.updated(|d| d.delivery_option = option)
    }

    pub fn with_address(&self, address: Address) -> CoreResult<BookingDraft> {
        self.updated(|d| d.address = Some(address))
    }

    /// Sets the booking date; a different date drops the chosen slot.
    pub fn with_booking_date(&self, date: NaiveDate) -> CoreResult<BookingDraft> {
        self.updated(|d| {
            if d.booking_date != date {
                d.booking_slot = None;
            }
            d.booking_date = date;
        })
    }

    pub fn with_slot(&self, slot: TimeSlot) -> CoreResult<BookingDraft> {
        self.updated(|d| d.booking_slot = Some(slot))
    }

    pub fn with_payment_method(&self, method: PaymentMethod) -> CoreResult<BookingDraft> {
        self.updated(|d| d.payment_method = Some(method))
    }

    pub fn with_card(&self, card: CardDetails) -> CoreResult<BookingDraft> {
        self.updated(|d| d.card = Some(card))
    }

    /// Lists what is still missing before the draft can be submitted.
    pub fn missing_requirements(&self) -> Vec<ValidationError> {
        let required = |field: &str| ValidationError::Required {
            field: field.to_string(),
        };
        let mut missing = Vec::new();

        if !self.selected_services.iter().any(|s| s.selected) {
            missing.push(required("service"));
        }
        if self.delivery_option.requires_address() && self.address.is_none() {
            missing.push(required("address"));
        }
        if self.booking_slot.is_none() {
            missing.push(required("slot"));
        }
        match self.payment_method {
            None => missing.push(required("payment method")),
            Some(method) if method.requires_card() && self.card.is_none() => {
                missing.push(required("card"))
            }
            Some(_) => {}
        }

        missing
    }

    /// The address that goes with the booking, if the option needs one.
    fn effective_address(&self) -> Option<&Address> {
        if self.delivery_option.requires_address() {
            self.address.as_ref()
        } else {
            None
        }
    }

    /// The card that goes with the booking, if the method needs one.
    fn effective_card(&self) -> Option<&CardDetails> {
        match self.payment_method {
            Some(method) if method.requires_card() => self.card.as_ref(),
            _ => None,
        }
    }
}

// =============================================================================
// Review & Payload
// =============================================================================

/// Everything the review screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingReview {
    pub draft_id: String,
    pub lines: Vec<PriceLine>,
    pub total: Money,
    pub total_duration_minutes: u32,
    #[ts(as = "String")]
    pub booking_date: NaiveDate,
    pub slot: TimeSlot,
    pub delivery_option: DeliveryOption,
    pub address: Option<Address>,
    pub payment_method: PaymentMethod,
    pub card_last_four: Option<String>,
}

/// One booked service in the submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookedService {
    pub service_id: String,
    pub sub_service_id: Option<String>,
}

/// What is sent to the booking endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub draft_id: String,
    pub services: Vec<BookedService>,
    #[ts(as = "String")]
    pub booking_date: NaiveDate,
    pub slot_minutes: u32,
    pub slot_label: String,
    pub delivery_option: DeliveryOption,
    pub address_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub card_last_four: Option<String>,
    pub total_cents: i64,
    /// Total with two decimals, e.g. `"105.00"`.
    pub total: String,
}

// =============================================================================
// Booking Flow
// =============================================================================

/// Threads one [`BookingDraft`] through the booking steps.
///
/// Each step method validates its input, derives the updated draft and
/// advances. On any error nothing changes and the same step stays current.
#[derive(Debug, Clone)]
pub struct BookingFlow {
    step: BookingStep,
    draft: BookingDraft,
    /// Set by `change`; the next completed step jumps back to Review when
    /// nothing else is missing.
    returning_to_review: bool,
}

impl BookingFlow {
    /// Starts a new flow with an empty draft.
    pub fn new(today: NaiveDate) -> Self {
        BookingFlow {
            step: BookingStep::ServiceSelection,
            draft: BookingDraft::new(today),
            returning_to_review: false,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    fn ensure_step(&self, expected: BookingStep, action: &str) -> CoreResult<()> {
        if self.step == BookingStep::Submitted {
            return Err(CoreError::DraftAlreadySubmitted {
                draft_id: self.draft.id.to_string(),
            });
        }
        if self.step != expected {
            return Err(CoreError::InvalidTransition {
                current: self.step,
                action: action.to_string(),
            });
        }
        Ok(())
    }

    /// The step that normally follows `step` for the current draft.
    fn next_step(&self, step: BookingStep) -> BookingStep {
        match step {
            BookingStep::ServiceSelection => BookingStep::DeliveryOptionSelection,
            BookingStep::DeliveryOptionSelection => {
                if self.draft.delivery_option.requires_address() {
                    BookingStep::AddressSelection
                } else {
                    BookingStep::DateSlotSelection
                }
            }
            BookingStep::AddressSelection => BookingStep::DateSlotSelection,
            BookingStep::DateSlotSelection => BookingStep::PaymentMethodSelection,
            BookingStep::PaymentMethodSelection => match self.draft.payment_method {
                Some(method) if method.requires_card() => BookingStep::CardEntry,
                _ => BookingStep::Review,
            },
            BookingStep::CardEntry => BookingStep::Review,
            BookingStep::Review | BookingStep::Submitted => step,
        }
    }

    /// The step before `step` on the path the current draft takes.
    fn previous_step(&self, step: BookingStep) -> Option<BookingStep> {
        match step {
            BookingStep::ServiceSelection | BookingStep::Submitted => None,
            BookingStep::DeliveryOptionSelection => Some(BookingStep::ServiceSelection),
            BookingStep::AddressSelection => Some(BookingStep::DeliveryOptionSelection),
            BookingStep::DateSlotSelection => Some(if self.draft.delivery_option.requires_address() {
                BookingStep::AddressSelection
            } else {
                BookingStep::DeliveryOptionSelection
            }),
            BookingStep::PaymentMethodSelection => Some(BookingStep::DateSlotSelection),
            BookingStep::CardEntry => Some(BookingStep::PaymentMethodSelection),
            BookingStep::Review => Some(match self.draft.payment_method {
                Some(method) if method.requires_card() => BookingStep::CardEntry,
                _ => BookingStep::PaymentMethodSelection,
            }),
        }
    }

    /// Commits an updated draft and moves past the completed step.
    fn complete(&mut self, completed: BookingStep, draft: BookingDraft) {
        self.draft = draft;
        let next = self.next_step(completed);
        self.step = if self.returning_to_review
            && next != BookingStep::AddressSelection
            && next != BookingStep::CardEntry
            && self.draft.missing_requirements().is_empty()
        {
            BookingStep::Review
        } else {
            next
        };
        if self.step == BookingStep::Review {
            self.returning_to_review = false;
        }
    }

    // -------------------------------------------------------------------------
    // Step operations
    // -------------------------------------------------------------------------

    /// Service selection screen: stores the services and their options.
    pub fn select_services(&mut self, services: Vec<Service>) -> CoreResult<()> {
        self.ensure_step(BookingStep::ServiceSelection, "select services")?;
        validation::validate_service_selection(&services)?;
        let draft = self.draft.with_services(services)?;
        pricing::total_price(draft.selected_services())?;
        pricing::total_duration(draft.selected_services())?;
        self.complete(BookingStep::ServiceSelection, draft);
        Ok(())
    }

    /// Option screen: salon visit or home service.
    pub fn choose_delivery(&mut self, option: DeliveryOption) -> CoreResult<()> {
        self.ensure_step(BookingStep::DeliveryOptionSelection, "choose a delivery option")?;
        let draft = self.draft.with_delivery_option(option)?;
        self.complete(BookingStep::DeliveryOptionSelection, draft);
        Ok(())
    }

    /// Address screen (home service only).
    pub fn choose_address(&mut self, address: Address) -> CoreResult<()> {
        self.ensure_step(BookingStep::AddressSelection, "choose an address")?;
        validation::validate_address(&address)?;
        let draft = self.draft.with_address(address)?;
        self.complete(BookingStep::AddressSelection, draft);
        Ok(())
    }

    /// Date picker on the date/slot screen. Does not advance.
    pub fn choose_date(&mut self, date: NaiveDate, today: NaiveDate) -> CoreResult<()> {
        self.ensure_step(BookingStep::DateSlotSelection, "choose a date")?;
        validation::validate_booking_date(date, today)?;
        self.draft = self.draft.with_booking_date(date)?;
        Ok(())
    }

    /// Slot button on the date/slot screen.
    ///
    /// `available` must be the slots computed for the draft's date; a slot
    /// that is not among them is rejected.
    pub fn choose_slot(&mut self, minutes: u32, available: &[TimeSlot]) -> CoreResult<()> {
        self.ensure_step(BookingStep::DateSlotSelection, "choose a slot")?;
        let slot = find_slot(available, minutes).cloned().ok_or_else(|| {
            ValidationError::SlotUnavailable {
                date: self.draft.booking_date.to_string(),
                label: crate::slots::format_slot(minutes),
            }
        })?;
        let draft = self.draft.with_slot(slot)?;
        self.complete(BookingStep::DateSlotSelection, draft);
        Ok(())
    }

    /// Payment method screen.
    pub fn choose_payment(&mut self, method: PaymentMethod) -> CoreResult<()> {
        self.ensure_step(BookingStep::PaymentMethodSelection, "choose a payment method")?;
        let draft = self.draft.with_payment_method(method)?;
        self.complete(BookingStep::PaymentMethodSelection, draft);
        Ok(())
    }

    /// Card screen (card payment only).
    pub fn enter_card(&mut self, card: CardDetails, today: NaiveDate) -> CoreResult<()> {
        self.ensure_step(BookingStep::CardEntry, "enter card details")?;
        validation::validate_card(&card, today)?;
        let draft = self.draft.with_card(card)?;
        self.complete(BookingStep::CardEntry, draft);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// "Change" on the review screen: re-enters `step` keeping the draft.
    pub fn change(&mut self, step: BookingStep) -> CoreResult<()> {
        self.ensure_step(BookingStep::Review, "change an earlier step")?;
        let applicable = match step {
            BookingStep::AddressSelection => self.draft.delivery_option.requires_address(),
            BookingStep::CardEntry => self.draft.effective_card().is_some(),
            other => other.is_editable(),
        };
        if !applicable {
            return Err(CoreError::InvalidTransition {
                current: self.step,
                action: format!("change to {:?}", step),
            });
        }
        self.step = step;
        self.returning_to_review = true;
        Ok(())
    }

    /// Back navigation: returns to the previous step, keeping the draft.
    pub fn back(&mut self) -> CoreResult<BookingStep> {
        if self.step == BookingStep::Submitted {
            return Err(CoreError::DraftAlreadySubmitted {
                draft_id: self.draft.id.to_string(),
            });
        }
        let previous = self.previous_step(self.step).ok_or_else(|| CoreError::InvalidTransition {
            current: self.step,
            action: "go back".to_string(),
        })?;
        self.step = previous;
        self.returning_to_review = false;
        Ok(previous)
    }

    // -------------------------------------------------------------------------
    // Review & submission
    // -------------------------------------------------------------------------

    /// Fails with the first missing requirement, if any.
    fn ensure_complete(&self) -> CoreResult<()> {
        match self.draft.missing_requirements().into_iter().next() {
            Some(missing) => Err(missing.into()),
            None => Ok(()),
        }
    }

    /// Builds the review screen.
    pub fn review(&self) -> CoreResult<BookingReview> {
        self.ensure_step(BookingStep::Review, "review the booking")?;
        self.ensure_complete()?;

        let draft = &self.draft;
        let lines = pricing::price_breakdown(&draft.selected_services)?;
        let (total, total_duration_minutes) = pricing::line_totals(&lines)?;

        Ok(BookingReview {
            draft_id: draft.id.to_string(),
            lines,
            total,
            total_duration_minutes,
            booking_date: draft.booking_date,
            slot: draft.booking_slot.clone().ok_or_else(|| missing("slot"))?,
            delivery_option: draft.delivery_option,
            address: draft.effective_address().cloned(),
            payment_method: draft.payment_method.ok_or_else(|| missing("payment method"))?,
            card_last_four: draft.effective_card().map(CardDetails::last_four),
        })
    }

    /// Builds the submission payload from the reviewed draft.
    pub fn payload(&self) -> CoreResult<BookingPayload> {
        let review = self.review()?;

        let services = review
            .lines
            .iter()
            .map(|line| BookedService {
                service_id: line.service_id.clone(),
                sub_service_id: line.sub_service_id.clone(),
            })
            .collect();

        Ok(BookingPayload {
            draft_id: review.draft_id,
            services,
            booking_date: review.booking_date,
            slot_minutes: review.slot.minutes_since_midnight,
            slot_label: review.slot.display_label,
            delivery_option: review.delivery_option,
            address_id: review.address.map(|a| a.id),
            payment_method: review.payment_method,
            card_last_four: review.card_last_four,
            total_cents: review.total.cents(),
            total: review.total.to_string(),
        })
    }

    /// Records a successful submission. The draft becomes read-only.
    pub fn mark_submitted(&mut self) -> CoreResult<()> {
        self.ensure_step(BookingStep::Review, "submit the booking")?;
        self.ensure_complete()?;
        self.draft.status = DraftStatus::Submitted;
        self.step = BookingStep::Submitted;
        Ok(())
    }
}

fn missing(field: &str) -> CoreError {
    ValidationError::Required {
        field: field.to_string(),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::{compute_slots, format_slot};
    use crate::types::{BusinessHours, SubService};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
    }

    fn tomorrow() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 17).unwrap()
    }

    fn manicure() -> Service {
        Service {
            id: "manicure".to_string(),
            name: "Manicure".to_string(),
            duration_minutes: 45,
            price: Money::from_cents(2500),
            selected: true,
            sub_services: vec![],
        }
    }

    fn hair_color(selected_option: &str) -> Service {
        let option = |id: &str, cents: i64, minutes: u32| SubService {
            id: id.to_string(),
            name: id.to_string(),
            duration_minutes: minutes,
            price: Money::from_cents(cents),
            selected: id == selected_option,
        };
        Service {
            id: "color".to_string(),
            name: "Hair color".to_string(),
            duration_minutes: 0,
            price: Money::zero(),
            selected: true,
            sub_services: vec![option("short", 5000, 60), option("long", 8000, 90), option("extra", 9500, 120)],
        }
    }

    fn address() -> Address {
        Address {
            id: "addr-7".to_string(),
            label: Some("Home".to_string()),
            line1: "12 Rose Street".to_string(),
            line2: None,
            city: "Springfield".to_string(),
            postal_code: Some("12345".to_string()),
        }
    }

    fn card() -> CardDetails {
        CardDetails {
            holder_name: "Dana Lee".to_string(),
            number: "4242 4242 4242 4242".to_string(),
            expiry_month: 12,
            expiry_year: 2030,
            cvv: "123".to_string(),
        }
    }

    /// Tuesday slots as seen on Monday morning.
    fn tuesday_slots() -> Vec<TimeSlot> {
        let hours = BusinessHours::open(2, "10:00", "14:00");
        compute_slots(tomorrow(), Some(&hours), today().and_hms_opt(9, 0, 0).unwrap()).unwrap()
    }

    fn flow_at_review() -> BookingFlow {
        let mut flow = BookingFlow::new(today());
        flow.select_services(vec![manicure(), hair_color("long")]).unwrap();
        flow.choose_delivery(DeliveryOption::Salon).unwrap();
        flow.choose_date(tomorrow(), today()).unwrap();
        flow.choose_slot(720, &tuesday_slots()).unwrap();
        flow.choose_payment(PaymentMethod::Card).unwrap();
        flow.enter_card(card(), today()).unwrap();
        flow
    }

    #[test]
    fn test_end_to_end_salon_card_flow() {
        let flow = flow_at_review();
        assert_eq!(flow.step(), BookingStep::Review);

        let draft = flow.draft();
        let expected = pricing::price_of(&manicure()).unwrap()
            + pricing::price_of(&hair_color("long")).unwrap();
        assert_eq!(draft.total_price().unwrap(), expected);
        assert_eq!(draft.total_price().unwrap().to_string(), "105.00");
        assert_eq!(draft.booking_slot().unwrap().display_label, format_slot(720));

        let review = flow.review().unwrap();
        assert_eq!(review.total, expected);
        assert_eq!(review.total_duration_minutes, 45 + 90);
        assert_eq!(review.slot.display_label, "12:00 PM");
        assert_eq!(review.card_last_four.as_deref(), Some("4242"));
        assert!(review.address.is_none());
    }

    #[test]
    fn test_home_service_requires_address_step() {
        let mut flow = BookingFlow::new(today());
        flow.select_services(vec![manicure()]).unwrap();
        flow.choose_delivery(DeliveryOption::HomeService).unwrap();
        assert_eq!(flow.step(), BookingStep::AddressSelection);

        flow.choose_address(address()).unwrap();
        assert_eq!(flow.step(), BookingStep::DateSlotSelection);

        flow.choose_date(tomorrow(), today()).unwrap();
        flow.choose_slot(780, &tuesday_slots()).unwrap();
        flow.choose_payment(PaymentMethod::DigitalWallet).unwrap();
        assert_eq!(flow.step(), BookingStep::Review);

        let payload = flow.payload().unwrap();
        assert_eq!(payload.address_id.as_deref(), Some("addr-7"));
        assert_eq!(payload.card_last_four, None);
        assert_eq!(payload.slot_label, "1:00 PM");
        assert_eq!(payload.total, "25.00");
    }

    #[test]
    fn test_validation_failure_keeps_step_and_draft() {
        let mut flow = BookingFlow::new(today());
        let before = flow.draft().clone();

        let err = flow.select_services(vec![]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Required { .. })));
        assert_eq!(flow.step(), BookingStep::ServiceSelection);
        assert_eq!(flow.draft(), &before);

        let err = flow.select_services(vec![hair_color("none")]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(flow.step(), BookingStep::ServiceSelection);
    }

    #[test]
    fn test_unavailable_slot_is_rejected() {
        let mut flow = BookingFlow::new(today());
        flow.select_services(vec![manicure()]).unwrap();
        flow.choose_delivery(DeliveryOption::Salon).unwrap();
        flow.choose_date(tomorrow(), today()).unwrap();

        // 14:00 is the closing hour and is not offered.
        let err = flow.choose_slot(840, &tuesday_slots()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::SlotUnavailable { .. })
        ));
        assert_eq!(flow.step(), BookingStep::DateSlotSelection);
        assert!(flow.draft().booking_slot().is_none());
    }

    #[test]
    fn test_past_date_is_rejected() {
        let mut flow = BookingFlow::new(today());
        flow.select_services(vec![manicure()]).unwrap();
        flow.choose_delivery(DeliveryOption::Salon).unwrap();
        let yesterday = today().pred_opt().unwrap();
        assert!(flow.choose_date(yesterday, today()).is_err());
        assert_eq!(flow.draft().booking_date(), today());
    }

    #[test]
    fn test_out_of_order_step_is_invalid_transition() {
        let mut flow = BookingFlow::new(today());
        let err = flow.choose_payment(PaymentMethod::Card).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                current: BookingStep::ServiceSelection,
                ..
            }
        ));
        assert!(flow.review().is_err());
    }

    #[test]
    fn test_change_from_review_merges_and_returns() {
        let mut flow = flow_at_review();
        let draft_id = flow.draft().id();

        flow.change(BookingStep::ServiceSelection).unwrap();
        assert_eq!(flow.step(), BookingStep::ServiceSelection);

        flow.select_services(vec![manicure(), hair_color("short")]).unwrap();
        assert_eq!(flow.step(), BookingStep::Review);
        assert_eq!(flow.draft().id(), draft_id);
        assert_eq!(flow.draft().booking_slot().unwrap().minutes_since_midnight, 720);
        assert_eq!(flow.review().unwrap().total.to_string(), "75.00");
    }

    #[test]
    fn test_change_delivery_to_home_goes_through_address() {
        let mut flow = flow_at_review();
        flow.change(BookingStep::DeliveryOptionSelection).unwrap();
        flow.choose_delivery(DeliveryOption::HomeService).unwrap();
        assert_eq!(flow.step(), BookingStep::AddressSelection);

        flow.choose_address(address()).unwrap();
        assert_eq!(flow.step(), BookingStep::Review);
        assert!(flow.draft().card().is_some());
    }

    #[test]
    fn test_change_date_requires_new_slot() {
        let mut flow = flow_at_review();
        flow.change(BookingStep::DateSlotSelection).unwrap();

        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
        flow.choose_date(wednesday, today()).unwrap();
        assert!(flow.draft().booking_slot().is_none());

        let hours = BusinessHours::open(3, "09:00", "12:00");
        let slots = compute_slots(wednesday, Some(&hours), today().and_hms_opt(9, 0, 0).unwrap()).unwrap();
        flow.choose_slot(600, &slots).unwrap();
        assert_eq!(flow.step(), BookingStep::Review);
        assert_eq!(flow.review().unwrap().slot.display_label, "10:00 AM");
    }

    #[test]
    fn test_change_payment_to_card_goes_through_card_entry() {
        let mut flow = BookingFlow::new(today());
        flow.select_services(vec![manicure()]).unwrap();
        flow.choose_delivery(DeliveryOption::Salon).unwrap();
        flow.choose_date(tomorrow(), today()).unwrap();
        flow.choose_slot(720, &tuesday_slots()).unwrap();
        flow.choose_payment(PaymentMethod::DigitalWallet).unwrap();
        assert_eq!(flow.step(), BookingStep::Review);

        assert!(flow.change(BookingStep::CardEntry).is_err());
        flow.change(BookingStep::PaymentMethodSelection).unwrap();
        flow.choose_payment(PaymentMethod::Card).unwrap();
        assert_eq!(flow.step(), BookingStep::CardEntry);
        flow.enter_card(card(), today()).unwrap();
        assert_eq!(flow.step(), BookingStep::Review);
    }

    #[test]
    fn test_back_keeps_draft() {
        let mut flow = BookingFlow::new(today());
        flow.select_services(vec![manicure()]).unwrap();
        flow.choose_delivery(DeliveryOption::HomeService).unwrap();
        flow.choose_address(address()).unwrap();

        assert_eq!(flow.back().unwrap(), BookingStep::AddressSelection);
        assert_eq!(flow.back().unwrap(), BookingStep::DeliveryOptionSelection);
        assert_eq!(flow.back().unwrap(), BookingStep::ServiceSelection);
        assert!(flow.back().is_err());
        assert_eq!(flow.draft().address(), Some(&address()));
    }

    #[test]
    fn test_submitted_draft_is_read_only() {
        let mut flow = flow_at_review();
        flow.mark_submitted().unwrap();
        assert_eq!(flow.step(), BookingStep::Submitted);
        assert!(flow.draft().is_submitted());

        assert!(matches!(
            flow.change(BookingStep::ServiceSelection),
            Err(CoreError::DraftAlreadySubmitted { .. })
        ));
        assert!(matches!(
            flow.draft().with_payment_method(PaymentMethod::DigitalWallet),
            Err(CoreError::DraftAlreadySubmitted { .. })
        ));
        assert!(flow.back().is_err());
    }

    #[test]
    fn test_draft_updates_return_new_drafts() {
        let draft = BookingDraft::new(today());
        let with_wallet = draft.with_payment_method(PaymentMethod::DigitalWallet).unwrap();
        assert_eq!(draft.payment_method(), None);
        assert_eq!(with_wallet.payment_method(), Some(PaymentMethod::DigitalWallet));
        assert_eq!(draft.id(), with_wallet.id());
    }

    #[test]
    fn test_overflowing_selection_is_rejected() {
        let mut first = manicure();
        first.price = Money::from_cents(i64::MAX / 2 + 1);
        let mut second = first.clone();
        second.id = "pedicure".to_string();

        let mut flow = BookingFlow::new(today());
        let err = flow.select_services(vec![first, second]).unwrap_err();
        assert!(matches!(err, CoreError::TotalOverflow { .. }));
        assert!(err.is_invariant_violation());
        assert_eq!(flow.step(), BookingStep::ServiceSelection);
        assert!(flow.draft().selected_services().is_empty());
    }

    #[test]
    fn test_services_are_a_set_by_id() {
        let draft = BookingDraft::new(today())
            .with_services(vec![hair_color("short"), manicure(), hair_color("long")])
            .unwrap();
        assert_eq!(draft.selected_services().len(), 2);
        assert_eq!(draft.selected_services()[0].id, "color");
        assert_eq!(draft.total_price().unwrap().cents(), 8000 + 2500);
    }

    #[test]
    fn test_missing_requirements() {
        let draft = BookingDraft::new(today())
            .with_delivery_option(DeliveryOption::HomeService)
            .unwrap()
            .with_payment_method(PaymentMethod::Card)
            .unwrap();
        let fields: Vec<String> = draft
            .missing_requirements()
            .into_iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(
            fields,
            vec![
                "service is required",
                "address is required",
                "slot is required",
                "card is required"
            ]
        );
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = flow_at_review().payload().unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["bookingDate"], "2025-06-17");
        assert_eq!(json["slotMinutes"], 720);
        assert_eq!(json["totalCents"], 10500);
        assert_eq!(json["total"], "105.00");
        assert_eq!(json["paymentMethod"], "card");
        assert_eq!(json["services"][1]["subServiceId"], "long");
        assert!(!json.to_string().contains("4242 4242"));
    }
}
