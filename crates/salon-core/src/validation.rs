//! # Validation Module
//!
//! Input validation for the booking steps.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                      │
//! │  ├── Disabled "Next" buttons, input masks                              │
//! │  └── Immediate feedback                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: BookingFlow step (Rust)                                      │
//! │  ├── THIS MODULE: each step validates before it advances               │
//! │  └── Failure → same step is re-prompted, draft unchanged               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Booking endpoint                                             │
//! │  └── Availability and payment checks on the server                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing;
use crate::types::{Address, CardDetails, Service};
use crate::MAX_SERVICES_PER_BOOKING;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

// =============================================================================
// Dates & Prices
// =============================================================================

/// Validates that a booking date is today or later.
pub fn validate_booking_date(date: NaiveDate, today: NaiveDate) -> ValidationResult<()> {
    if date < today {
        return Err(ValidationError::DateInPast {
            date: date.to_string(),
        });
    }
    Ok(())
}

/// Validates that a price is not negative (zero is allowed for free add-ons).
///
/// ## Example
/// ```rust
/// use salon_core::validation::validate_price;
/// use salon_core::Money;
///
/// assert!(validate_price("price", Money::from_cents(0)).is_ok());
/// assert!(validate_price("price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Service Selection
// =============================================================================

/// Validates the service selection step.
///
/// ## Rules
/// - At least one service selected
/// - At most `MAX_SERVICES_PER_BOOKING` services selected
/// - No negative prices anywhere in the tree
/// - Every selected service with options has exactly one option selected
///   (reported as `Required` so the step re-prompts for the option)
pub fn validate_service_selection(services: &[Service]) -> ValidationResult<()> {
    let selected: Vec<&Service> = services.iter().filter(|s| s.selected).collect();

    if selected.is_empty() {
        return Err(required("service"));
    }

    if selected.len() > MAX_SERVICES_PER_BOOKING {
        return Err(ValidationError::OutOfRange {
            field: "services".to_string(),
            min: 1,
            max: MAX_SERVICES_PER_BOOKING as i64,
        });
    }

    for service in &selected {
        validate_price(&format!("{} price", service.name), service.price)?;
        for option in &service.sub_services {
            validate_price(&format!("{} price", option.name), option.price)?;
        }
        if service.has_options() && pricing::price_of(service).is_err() {
            return Err(required(&format!("{} option", service.name)));
        }
    }

    Ok(())
}

// =============================================================================
// Address
// =============================================================================

/// Validates a home-service address.
///
/// ## Rules
/// - `id`, `line1` and `city` are required
/// - `line1` at most 200 characters
pub fn validate_address(address: &Address) -> ValidationResult<()> {
    if address.id.trim().is_empty() {
        return Err(required("address id"));
    }
    if address.line1.trim().is_empty() {
        return Err(required("address line"));
    }
    if address.line1.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "address line".to_string(),
            max: 200,
        });
    }
    if address.city.trim().is_empty() {
        return Err(required("city"));
    }
    Ok(())
}

// =============================================================================
// Card
// =============================================================================

/// Luhn checksum over a string of ASCII digits.
fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Validates card details entered on the card screen.
///
/// ## Rules
/// ```text
/// holder name ── required
/// number ─────── 12-19 digits (spaces/hyphens ignored), Luhn checksum
/// expiry ─────── month 1-12, not before the current month
/// cvv ────────── 3 or 4 digits
/// ```
pub fn validate_card(card: &CardDetails, today: NaiveDate) -> ValidationResult<()> {
    if card.holder_name.trim().is_empty() {
        return Err(required("card holder name"));
    }

    let digits = card.digits();
    if digits.is_empty() {
        return Err(required("card number"));
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "card number".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }
    if !(12..=19).contains(&digits.len()) {
        return Err(ValidationError::OutOfRange {
            field: "card number length".to_string(),
            min: 12,
            max: 19,
        });
    }
    if !luhn_valid(&digits) {
        return Err(ValidationError::CardNumberInvalid);
    }

    if !(1..=12).contains(&card.expiry_month) {
        return Err(ValidationError::OutOfRange {
            field: "expiry month".to_string(),
            min: 1,
            max: 12,
        });
    }
    if (card.expiry_year, card.expiry_month) < (today.year(), today.month()) {
        return Err(ValidationError::CardExpired {
            month: card.expiry_month,
            year: card.expiry_year,
        });
    }

    let cvv = card.cvv.trim();
    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "cvv".to_string(),
            reason: "must be 3 or 4 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubService;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
    }

    fn card(number: &str, month: u32, year: i32, cvv: &str) -> CardDetails {
        CardDetails {
            holder_name: "Dana Lee".to_string(),
            number: number.to_string(),
            expiry_month: month,
            expiry_year: year,
            cvv: cvv.to_string(),
        }
    }

    fn service(selected: bool, cents: i64) -> Service {
        Service {
            id: "s".to_string(),
            name: "Blowout".to_string(),
            duration_minutes: 30,
            price: Money::from_cents(cents),
            selected,
            sub_services: vec![],
        }
    }

    #[test]
    fn test_validate_booking_date() {
        assert!(validate_booking_date(today(), today()).is_ok());
        assert!(validate_booking_date(today().succ_opt().unwrap(), today()).is_ok());
        assert_eq!(
            validate_booking_date(today().pred_opt().unwrap(), today()),
            Err(ValidationError::DateInPast {
                date: "2025-06-15".to_string()
            })
        );
    }

    #[test]
    fn test_validate_service_selection() {
        assert!(validate_service_selection(&[]).is_err());
        assert!(validate_service_selection(&[service(false, 100)]).is_err());
        assert!(validate_service_selection(&[service(true, 100)]).is_ok());
        assert!(validate_service_selection(&[service(true, -100)]).is_err());

        let mut with_options = service(true, 0);
        with_options.sub_services = vec![SubService {
            id: "o".to_string(),
            name: "Long".to_string(),
            duration_minutes: 60,
            price: Money::from_cents(100),
            selected: false,
        }];
        assert_eq!(
            validate_service_selection(&[with_options]),
            Err(ValidationError::Required {
                field: "Blowout option".to_string()
            })
        );
    }

    #[test]
    fn test_validate_address() {
        let mut address = Address {
            id: "addr-1".to_string(),
            label: Some("Home".to_string()),
            line1: "12 Rose Street".to_string(),
            line2: None,
            city: "Springfield".to_string(),
            postal_code: None,
        };
        assert!(validate_address(&address).is_ok());

        address.city = "  ".to_string();
        assert!(validate_address(&address).is_err());

        address.city = "Springfield".to_string();
        address.line1 = "A".repeat(201);
        assert!(validate_address(&address).is_err());
    }

    #[test]
    fn test_validate_card() {
        assert!(validate_card(&card("4242 4242 4242 4242", 12, 2030, "123"), today()).is_ok());
        assert!(validate_card(&card("4242-4242-4242-4242", 6, 2025, "1234"), today()).is_ok());

        assert_eq!(
            validate_card(&card("4242 4242 4242 4241", 12, 2030, "123"), today()),
            Err(ValidationError::CardNumberInvalid)
        );
        assert_eq!(
            validate_card(&card("4242 4242 4242 4242", 5, 2025, "123"), today()),
            Err(ValidationError::CardExpired { month: 5, year: 2025 })
        );
        assert!(validate_card(&card("4242 4242 4242 4242", 13, 2030, "123"), today()).is_err());
        assert!(validate_card(&card("4242 4242 4242 4242", 12, 2030, "12"), today()).is_err());
        assert!(validate_card(&card("4242", 12, 2030, "123"), today()).is_err());
        assert!(validate_card(&card("4242abcd42424242", 12, 2030, "123"), today()).is_err());

        let mut nameless = card("4242 4242 4242 4242", 12, 2030, "123");
        nameless.holder_name = String::new();
        assert!(validate_card(&nameless, today()).is_err());
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("79927398713"));
        assert!(!luhn_valid("79927398710"));
        assert!(luhn_valid("5555555555554444"));
    }
}
