//! # Domain Types
//!
//! Core domain types used throughout the booking flow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  BusinessHours  │   │    Service      │   │   SubService    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  day_of_week    │   │  id, name       │   │  id, name       │       │
//! │  │  is_open        │   │  price          │◄──│  price          │       │
//! │  │  is_24_hours    │   │  selected       │   │  selected       │       │
//! │  │  open/close     │   │  sub_services[] │   │  (radio group)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TimeSlot     │   │ DeliveryOption  │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  minutes        │   │  Salon          │   │  Card           │       │
//! │  │  display_label  │   │  HomeService    │   │  DigitalWallet  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names serialize in camelCase because that is how the marketplace
//! API and the mobile frontend spell them.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Business Hours
// =============================================================================

/// Operating window of a business for one weekday.
///
/// `day_of_week` follows the frontend convention: 0 = Sunday … 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub day_of_week: u8,

    pub is_open: bool,

    /// Open around the clock; `open_time`/`close_time` are ignored.
    #[serde(rename = "is24Hours", default)]
    pub is_24_hours: bool,

    /// Opening time, `"HH:MM"`.
    #[serde(default)]
    pub open_time: Option<String>,

    /// Closing time, `"HH:MM"`. The closing hour itself is not bookable.
    #[serde(default)]
    pub close_time: Option<String>,
}

impl BusinessHours {
    /// Regular opening hours for a weekday.
    pub fn open(day_of_week: u8, open_time: &str, close_time: &str) -> Self {
        BusinessHours {
            day_of_week,
            is_open: true,
            is_24_hours: false,
            open_time: Some(open_time.to_string()),
            close_time: Some(close_time.to_string()),
        }
    }

    /// Closed all day.
    pub fn closed(day_of_week: u8) -> Self {
        BusinessHours {
            day_of_week,
            is_open: false,
            is_24_hours: false,
            open_time: None,
            close_time: None,
        }
    }

    /// Open around the clock.
    pub fn around_the_clock(day_of_week: u8) -> Self {
        BusinessHours {
            day_of_week,
            is_open: true,
            is_24_hours: true,
            open_time: None,
            close_time: None,
        }
    }
}

// =============================================================================
// Time Slot
// =============================================================================

/// A bookable start time on a given date.
///
/// Derived every time slots are computed; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Minutes since midnight, in `[0, 1440)`.
    pub minutes_since_midnight: u32,

    /// 12-hour label such as `"9:30 AM"`.
    pub display_label: String,
}

// =============================================================================
// Services
// =============================================================================

/// A priced variant of a parent service (e.g. "Short hair" / "Long hair").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SubService {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub price: Money,
    #[serde(default)]
    pub selected: bool,
}

/// A service offered by a business.
///
/// ## Selection Invariant
/// A service either has no sub-services (its own price and duration apply)
/// or has several, of which exactly one is selected while the service itself
/// is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub price: Money,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub sub_services: Vec<SubService>,
}

impl Service {
    /// Returns true if the service is priced through its sub-services.
    #[inline]
    pub fn has_options(&self) -> bool {
        !self.sub_services.is_empty()
    }

    /// Iterates over the sub-services currently marked selected.
    pub fn selected_options(&self) -> impl Iterator<Item = &SubService> {
        self.sub_services.iter().filter(|s| s.selected)
    }
}

// =============================================================================
// Delivery Option
// =============================================================================

/// Where the service is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    /// Customer visits the salon.
    #[default]
    Salon,
    /// Professional visits the customer's address.
    HomeService,
}

impl DeliveryOption {
    /// Returns true if an address must be chosen for this option.
    pub fn requires_address(&self) -> bool {
        matches!(self, DeliveryOption::HomeService)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit or debit card entered in the app.
    Card,
    /// Wallet balance / third-party wallet.
    DigitalWallet,
}

impl PaymentMethod {
    /// Returns true if card details must be entered for this method.
    pub fn requires_card(&self) -> bool {
        matches!(self, PaymentMethod::Card)
    }
}

// =============================================================================
// Address
// =============================================================================

/// A saved customer address used for home service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    /// "Home", "Work", ...
    pub label: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: Option<String>,
}

// =============================================================================
// Card Details
// =============================================================================

/// Card details entered on the card screen.
///
/// Only [`CardDetails::last_four`] ever leaves the core; `Debug` masks the
/// number and CVV so the struct can be logged safely.
#[derive(Clone, PartialEq, Eq, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub holder_name: String,
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
}

impl CardDetails {
    /// Digits of the card number with spaces and hyphens removed.
    pub fn digits(&self) -> String {
        self.number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect()
    }

    /// The last four digits, for display and for the submission payload.
    ///
    /// Counts characters, not bytes: the number may not be validated yet.
    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self.digits().chars().collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("holder_name", &self.holder_name)
            .field("number", &format_args!("**** {}", self.last_four()))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
