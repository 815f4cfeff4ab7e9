//! # salon-booking: Booking Session
//!
//! Drives one booking flow from the service list to a confirmed booking.
//!
//! ## Modules
//! - [`config`] - Currency display and submission policy (TOML + env)
//! - [`session`] - Shared booking flow with a single-submit guard
//! - [`gateway`] - Trait the app implements to reach the booking endpoint
//! - [`error`] - Session errors and the notice shown to the customer
//!
//! ## Usage
//! ```rust,ignore
//! salon_booking::init_tracing();
//!
//! let config = BookingConfig::load_or_default(None);
//! let session = BookingSession::new(config, Arc::new(HttpGateway::new()), today);
//!
//! session.select_services(services)?;
//! session.choose_delivery(DeliveryOption::Salon)?;
//! let slots = session.available_slots(date, &week, now)?;
//! session.choose_slot(slots[0].minutes_since_midnight, now)?;
//! session.choose_payment(PaymentMethod::DigitalWallet)?;
//! let confirmation = session.submit().await?;
//! ```

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod gateway;
pub mod session;

pub use config::BookingConfig;
pub use error::{BookingError, BookingResult, NoticeCode, UserNotice};
pub use gateway::{BookingConfirmation, BookingGateway, GatewayError};
pub use session::{BookingSession, TotalsSummary};

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set
/// - Otherwise `info` globally and `debug` for the salon crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,salon=debug,slot_preview=debug"));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
