//! # Booking Gateway
//!
//! The seam between the session and whatever delivers a booking to the
//! marketplace backend.
//!
//! ```text
//! BookingSession::submit()
//!        │  &BookingPayload
//!        ▼
//! ┌───────────────────────┐        ┌────────────────────────────┐
//! │ dyn BookingGateway    │ ─────► │ booking endpoint           │
//! │ (app provides impl)   │ ◄───── │ confirmation / error       │
//! └───────────────────────┘        └────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use salon_core::BookingPayload;

/// What the endpoint returns for an accepted booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub booking_id: String,
    /// Short code shown to the customer
    pub reference: String,
    pub accepted_at: DateTime<Utc>,
}

/// Failure reported by a [`BookingGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The endpoint answered and refused the booking.
    #[error("Booking rejected: {reason}")]
    Rejected { reason: String },

    /// The endpoint is temporarily unable to take bookings.
    #[error("Booking service unavailable: {0}")]
    Unavailable(String),

    /// Network failure before an answer arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No answer within the configured timeout.
    #[error("Booking request timed out after {0} seconds")]
    Timeout(u64),
}

impl GatewayError {
    /// Returns true if sending the same payload again may succeed.
    ///
    /// A rejection is final: retrying would get the same answer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Unavailable(_) | GatewayError::Transport(_) | GatewayError::Timeout(_)
        )
    }
}

/// Delivers a finished booking.
#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Sends one booking. Called again with the same payload on retry, so
    /// implementations should treat `draft_id` as an idempotency key.
    async fn submit_booking(
        &self,
        payload: &BookingPayload,
    ) -> Result<BookingConfirmation, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(GatewayError::Unavailable("503".into()).is_retryable());
        assert!(GatewayError::Transport("connection reset".into()).is_retryable());
        assert!(GatewayError::Timeout(30).is_retryable());
        assert!(!GatewayError::Rejected {
            reason: "slot taken".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_confirmation_deserializes() {
        let json = r#"{"bookingId":"b-1","reference":"SAL-42","acceptedAt":"2025-06-16T09:00:00Z"}"#;
        let confirmation: BookingConfirmation = serde_json::from_str(json).unwrap();
        assert_eq!(confirmation.reference, "SAL-42");
    }
}
