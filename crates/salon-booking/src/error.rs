//! # Booking Error Types
//!
//! Errors raised by the booking session, and the notice the app shows for
//! them.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Booking App                        │
//! │                                                                         │
//! │  Screen action                 Rust                                     │
//! │  ─────────────                 ────                                     │
//! │                                                                         │
//! │  "Next" / "Book now"                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  BookingSession operation                                        │  │
//! │  │  Result<T, BookingError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad input? ───── CoreError::Validation ──────────┐             │  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Broken data? ─── CoreError::NoSubServiceSelected ─ UserNotice ─►│  │
//! │  │         │         (logged, generic message)        ▲             │  │
//! │  │         ▼                                          │             │  │
//! │  │  Endpoint failed? ─ GatewayError ──────────────────┘             │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "VALIDATION_ERROR", "message": "city is required" }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use salon_core::CoreError;

use crate::gateway::GatewayError;

/// Result type alias for booking operations.
pub type BookingResult<T> = Result<T, BookingError>;

/// Errors from the booking session.
#[derive(Debug, Error)]
pub enum BookingError {
    // =========================================================================
    // Flow Errors
    // =========================================================================
    /// Validation, invariant or transition error from the core flow.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Submission Errors
    // =========================================================================
    /// The booking endpoint refused or could not be reached.
    #[error("Booking submission failed: {0}")]
    Submission(#[from] GatewayError),

    /// A submission for this session is already running.
    #[error("A booking submission is already in progress")]
    SubmissionInFlight,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid booking configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Payload or input could not be (de)serialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for BookingError {
    fn from(err: serde_json::Error) -> Self {
        BookingError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BookingError {
    fn from(err: std::io::Error) -> Self {
        BookingError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for BookingError {
    fn from(err: toml::de::Error) -> Self {
        BookingError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for BookingError {
    fn from(err: toml::ser::Error) -> Self {
        BookingError::ConfigSaveFailed(err.to_string())
    }
}

impl BookingError {
    /// Returns true if the same submission may succeed when tried again.
    pub fn is_retryable(&self) -> bool {
        match self {
            BookingError::Submission(e) => e.is_retryable(),
            BookingError::SubmissionInFlight => true,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BookingError::InvalidConfig(_)
                | BookingError::ConfigLoadFailed(_)
                | BookingError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// User Notice
// =============================================================================

/// What the app shows in the transient notification when an action fails.
///
/// ```json
/// {
///   "code": "SLOT_UNAVAILABLE",
///   "message": "The 12:00 PM slot is not available on 2025-06-17"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotice {
    /// Machine-readable code for the frontend
    pub code: NoticeCode,

    /// Human-readable message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeCode {
    /// Input rejected; the same step is shown again
    ValidationError,

    /// The chosen slot is gone
    SlotUnavailable,

    /// Action does not fit the current step
    InvalidStep,

    /// Booking already sent
    AlreadySubmitted,

    /// Booking endpoint failed; the draft is kept
    SubmissionFailed,

    /// Submission still running
    SubmissionPending,

    /// Bad or missing configuration
    ConfigError,

    /// Anything the customer cannot fix
    Internal,
}

impl UserNotice {
    pub fn new(code: NoticeCode, message: impl Into<String>) -> Self {
        UserNotice {
            code,
            message: message.into(),
        }
    }

    /// Generic message for failures the customer cannot act on.
    pub fn internal() -> Self {
        UserNotice::new(
            NoticeCode::Internal,
            "Something went wrong with this booking. Please try again.",
        )
    }
}

impl From<&CoreError> for UserNotice {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::Validation(e @ salon_core::ValidationError::SlotUnavailable { .. }) => {
                UserNotice::new(NoticeCode::SlotUnavailable, e.to_string())
            }
            CoreError::Validation(e) => UserNotice::new(NoticeCode::ValidationError, e.to_string()),
            CoreError::InvalidTransition { .. } => {
                tracing::warn!(error = %err, "Out-of-order booking action");
                UserNotice::new(NoticeCode::InvalidStep, err.to_string())
            }
            CoreError::DraftAlreadySubmitted { .. } => UserNotice::new(
                NoticeCode::AlreadySubmitted,
                "This booking has already been submitted",
            ),
            CoreError::NoSubServiceSelected { .. }
            | CoreError::MultipleSubServicesSelected { .. }
            | CoreError::SubServiceNotFound { .. }
            | CoreError::MalformedBusinessHours { .. }
            | CoreError::TotalOverflow { .. } => {
                // Log the actual error but show a generic message
                tracing::error!(error = %err, "Booking invariant violated");
                UserNotice::internal()
            }
        }
    }
}

impl From<&BookingError> for UserNotice {
    fn from(err: &BookingError) -> Self {
        match err {
            BookingError::Core(e) => UserNotice::from(e),
            BookingError::Submission(GatewayError::Rejected { reason }) => UserNotice::new(
                NoticeCode::SubmissionFailed,
                format!("The booking was declined: {}", reason),
            ),
            BookingError::Submission(e) => {
                tracing::warn!(error = %e, "Booking submission failed");
                UserNotice::new(
                    NoticeCode::SubmissionFailed,
                    "We could not send your booking. Your choices are saved, please try again.",
                )
            }
            BookingError::SubmissionInFlight => UserNotice::new(
                NoticeCode::SubmissionPending,
                "Your booking is being sent",
            ),
            BookingError::InvalidConfig(_)
            | BookingError::ConfigLoadFailed(_)
            | BookingError::ConfigSaveFailed(_) => {
                tracing::error!(error = %err, "Booking configuration error");
                UserNotice::new(NoticeCode::ConfigError, "The app is not configured correctly")
            }
            BookingError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                UserNotice::internal()
            }
        }
    }
}

impl From<BookingError> for UserNotice {
    fn from(err: BookingError) -> Self {
        UserNotice::from(&err)
    }
}

impl std::fmt::Display for UserNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}
