//! # salon-core: Pure Booking Logic
//!
//! This crate holds the deterministic part of the salon booking flow:
//! which time slots can be booked, what the selected services cost, and
//! how a booking draft is assembled step by step.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Salon Booking Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile Frontend                              │   │
//! │  │  Services ─► Option ─► Address ─► Date/Slot ─► Payment ─► Review│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    salon-booking (session)                      │   │
//! │  │        config, shared draft, submission + retry                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ salon-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌──────┐ │   │
//! │  │   │  slots  │  │ pricing │  │  draft  │  │  money  │  │valid.│ │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └─────────┘  └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO NETWORK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BusinessHours, Service, Address, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`slots`] - Bookable time slot computation
//! - [`pricing`] - Effective price and totals over the selection tree
//! - [`draft`] - Booking draft and the multi-step flow
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use salon_core::slots::{compute_slots, format_slot};
//! use salon_core::BusinessHours;
//!
//! let hours = BusinessHours::open(1, "09:00", "17:00");
//! let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
//! let now = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap().and_hms_opt(8, 0, 0).unwrap();
//!
//! let slots = compute_slots(date, Some(&hours), now).unwrap();
//! assert_eq!(slots.len(), 8);
//! assert_eq!(format_slot(570), "9:30 AM");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod money;
pub mod pricing;
pub mod slots;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use draft::{BookedService, BookingDraft, BookingFlow, BookingPayload, BookingReview, BookingStep, DraftStatus};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minutes in one calendar day. Slots live in `[0, MINUTES_PER_DAY)`.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Granularity of generated slots.
///
/// Slots are offered on hour boundaries regardless of the opening minute.
pub const SLOT_INTERVAL_MINUTES: u32 = 60;

/// Maximum number of distinct services in a single booking.
pub const MAX_SERVICES_PER_BOOKING: usize = 20;
