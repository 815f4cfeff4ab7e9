//! # Error Types
//!
//! Domain-specific error types for salon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  salon-core errors (this file)                                         │
//! │  ├── CoreError        - Invariant violations and flow errors           │
//! │  └── ValidationError  - User input not complete / not acceptable       │
//! │                                                                         │
//! │  salon-booking errors (separate crate)                                 │
//! │  ├── GatewayError     - Booking endpoint rejected / unreachable        │
//! │  ├── BookingError     - Everything a session operation can fail with   │
//! │  └── UserNotice       - What the frontend shows (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BookingError → UserNotice         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds of Failure
//! - **Validation**: the user has not finished a step. The step is blocked
//!   and re-prompted, nothing else happens.
//! - **Invariant violation**: the data handed to the core is inconsistent
//!   (a selected service without a selected option, unparseable business
//!   hours). These are bugs in the caller or in the reference data and are
//!   reported loudly instead of producing a bogus total.

use thiserror::Error;

use crate::draft::BookingStep;

// =============================================================================
// Core Error
// =============================================================================

/// Core booking logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A selected service has sub-services but none of them is selected.
    ///
    /// ## When This Occurs
    /// The radio-button invariant was broken by the caller. Summing would
    /// otherwise silently skip or corrupt the line, so pricing refuses.
    #[error("Service {service_id} is selected but none of its options is selected")]
    NoSubServiceSelected { service_id: String },

    /// More than one sub-service of the same service is selected.
    #[error("Service {service_id} has {count} options selected, expected exactly one")]
    MultipleSubServicesSelected { service_id: String, count: usize },

    /// A sub-service id does not belong to the service.
    #[error("Service {service_id} has no option {sub_service_id}")]
    SubServiceNotFound {
        service_id: String,
        sub_service_id: String,
    },

    /// Business hours for a day cannot be interpreted.
    ///
    /// ## When This Occurs
    /// - `openTime`/`closeTime` missing on an open, non-24h day
    /// - Time string is not `HH:MM`
    /// - Closing time is not after opening time
    #[error("Malformed business hours for day {day_of_week}: {reason}")]
    MalformedBusinessHours { day_of_week: u8, reason: String },

    /// A booking total does not fit the money or duration range.
    #[error("Booking {what} overflows")]
    TotalOverflow { what: String },

    /// The flow was asked to perform a step it is not currently on.
    #[error("Cannot {action} while on step {current:?}")]
    InvalidTransition {
        current: BookingStep,
        action: String,
    },

    /// The draft has been submitted and is read-only.
    #[error("Booking draft {draft_id} has already been submitted")]
    DraftAlreadySubmitted { draft_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for errors caused by inconsistent data rather than by
    /// incomplete user input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            CoreError::NoSubServiceSelected { .. }
                | CoreError::MultipleSubServicesSelected { .. }
                | CoreError::SubServiceNotFound { .. }
                | CoreError::MalformedBusinessHours { .. }
                | CoreError::TotalOverflow { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These block the forward transition of the current step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid time, non-digit card number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Booking date lies before today.
    #[error("Booking date {date} is in the past")]
    DateInPast { date: String },

    /// The chosen slot is not among the slots offered for the date.
    #[error("The {label} slot is not available on {date}")]
    SlotUnavailable { date: String, label: String },

    /// Card number fails the checksum.
    #[error("Card number is not valid")]
    CardNumberInvalid,

    /// Card expiry month lies before the current month.
    #[error("Card expired in {month:02}/{year}")]
    CardExpired { month: u32, year: i32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
