//! # Price Aggregation
//!
//! Resolves what each selected service costs and sums the booking total.
//!
//! ## Selection Tree
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service "Manicure" (selected, no options) ─────────► own price  25.00  │
//! │                                                                         │
//! │  Service "Hair color" (selected)                                        │
//! │   ├── ○ Short   50.00                                                  │
//! │   ├── ● Long    80.00  ◄── exactly one selected ────► option price 80.00│
//! │   └── ○ Extra   95.00                                                  │
//! │                                                                         │
//! │  Service "Massage" (not selected) ──────────────────► ignored           │
//! │                                                                         │
//! │  total_price = 25.00 + 80.00 = 105.00                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Discounts and promo codes are not applied here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Service, SubService};

/// One line of the review screen's price breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub service_id: String,
    pub service_name: String,
    pub sub_service_id: Option<String>,
    pub sub_service_name: Option<String>,
    pub price: Money,
    pub duration_minutes: u32,
}

/// Returns the one selected option of a service with options.
///
/// `Ok(None)` for a service priced on its own.
fn selected_option(service: &Service) -> CoreResult<Option<&SubService>> {
    if !service.has_options() {
        return Ok(None);
    }

    let mut selected = service.selected_options();
    match (selected.next(), selected.next()) {
        (Some(option), None) => Ok(Some(option)),
        (None, _) => Err(CoreError::NoSubServiceSelected {
            service_id: service.id.clone(),
        }),
        (Some(_), Some(_)) => Err(CoreError::MultipleSubServicesSelected {
            service_id: service.id.clone(),
            count: service.selected_options().count(),
        }),
    }
}

/// Effective price of a service.
///
/// ## Rules
/// - No sub-services: the service's own price
/// - With sub-services: the price of the selected one, whatever its
///   position in the list
///
/// ## Errors
/// `NoSubServiceSelected` / `MultipleSubServicesSelected` when the radio
/// invariant is broken.
///
/// ## Example
/// ```rust
/// use salon_core::pricing::price_of;
/// use salon_core::{Money, Service};
///
/// let nails = Service {
///     id: "nails".into(),
///     name: "Manicure".into(),
///     duration_minutes: 45,
///     price: Money::from_cents(2500),
///     selected: true,
///     sub_services: vec![],
/// };
/// assert_eq!(price_of(&nails).unwrap().to_string(), "25.00");
/// ```
pub fn price_of(service: &Service) -> CoreResult<Money> {
    Ok(match selected_option(service)? {
        Some(option) => option.price,
        None => service.price,
    })
}

/// Effective duration of a service, resolved the same way as the price.
pub fn duration_of(service: &Service) -> CoreResult<u32> {
    Ok(match selected_option(service)? {
        Some(option) => option.duration_minutes,
        None => service.duration_minutes,
    })
}

fn overflow(what: &str) -> CoreError {
    CoreError::TotalOverflow {
        what: what.to_string(),
    }
}

/// Sum of effective prices over every selected service.
///
/// Zero when nothing is selected. The order of `services` does not matter.
///
/// ## Errors
/// `TotalOverflow` when the sum leaves the `Money` range.
pub fn total_price(services: &[Service]) -> CoreResult<Money> {
    services
        .iter()
        .filter(|s| s.selected)
        .try_fold(Money::zero(), |total, service| {
            total
                .checked_add(price_of(service)?)
                .ok_or_else(|| overflow("total price"))
        })
}

/// Sum of effective durations over every selected service, in minutes.
pub fn total_duration(services: &[Service]) -> CoreResult<u32> {
    services
        .iter()
        .filter(|s| s.selected)
        .try_fold(0u32, |total, service| {
            total
                .checked_add(duration_of(service)?)
                .ok_or_else(|| overflow("total duration"))
        })
}

/// Total price and duration of already resolved line items.
pub fn line_totals(lines: &[PriceLine]) -> CoreResult<(Money, u32)> {
    let price = Money::checked_sum(lines.iter().map(|l| l.price))
        .ok_or_else(|| overflow("total price"))?;
    let duration = lines
        .iter()
        .try_fold(0u32, |total, l| total.checked_add(l.duration_minutes))
        .ok_or_else(|| overflow("total duration"))?;
    Ok((price, duration))
}

/// Line items for every selected service, in the order given.
pub fn price_breakdown(services: &[Service]) -> CoreResult<Vec<PriceLine>> {
    services
        .iter()
        .filter(|s| s.selected)
        .map(|service| {
            let option = selected_option(service)?;
            Ok(PriceLine {
                service_id: service.id.clone(),
                service_name: service.name.clone(),
                sub_service_id: option.map(|o| o.id.clone()),
                sub_service_name: option.map(|o| o.name.clone()),
                price: option.map_or(service.price, |o| o.price),
                duration_minutes: option.map_or(service.duration_minutes, |o| o.duration_minutes),
            })
        })
        .collect()
}

/// Selects one option of a service, radio-button style.
///
/// Every other option is deselected and the parent service is marked
/// selected, so the service stays consistent for [`price_of`].
pub fn select_sub_service(service: &mut Service, sub_service_id: &str) -> CoreResult<()> {
    if !service.sub_services.iter().any(|s| s.id == sub_service_id) {
        return Err(CoreError::SubServiceNotFound {
            service_id: service.id.clone(),
            sub_service_id: sub_service_id.to_string(),
        });
    }

    for option in &mut service.sub_services {
        option.selected = option.id == sub_service_id;
    }
    service.selected = true;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, cents: i64, selected: bool) -> SubService {
        SubService {
            id: id.to_string(),
            name: format!("Option {}", id),
            duration_minutes: 30,
            price: Money::from_cents(cents),
            selected,
        }
    }

    fn plain(id: &str, cents: i64, selected: bool) -> Service {
        Service {
            id: id.to_string(),
            name: format!("Service {}", id),
            duration_minutes: 45,
            price: Money::from_cents(cents),
            selected,
            sub_services: vec![],
        }
    }

    fn with_options(id: &str, options: Vec<SubService>) -> Service {
        Service {
            id: id.to_string(),
            name: format!("Service {}", id),
            duration_minutes: 0,
            price: Money::zero(),
            selected: true,
            sub_services: options,
        }
    }

    #[test]
    fn test_empty_selection_totals_zero() {
        assert_eq!(total_price(&[]).unwrap().to_string(), "0.00");
        let unselected = vec![plain("a", 1000, false), plain("b", 2000, false)];
        assert_eq!(total_price(&unselected).unwrap(), Money::zero());
    }

    #[test]
    fn test_selected_option_price_regardless_of_order() {
        let second = with_options("color", vec![option("s", 5000, false), option("l", 8000, true)]);
        assert_eq!(price_of(&second).unwrap().to_string(), "80.00");

        let first = with_options("color", vec![option("l", 8000, true), option("s", 5000, false)]);
        assert_eq!(price_of(&first).unwrap().to_string(), "80.00");
    }

    #[test]
    fn test_service_without_options_uses_own_price() {
        assert_eq!(price_of(&plain("nails", 2500, true)).unwrap().cents(), 2500);
        assert_eq!(duration_of(&plain("nails", 2500, true)).unwrap(), 45);
    }

    #[test]
    fn test_missing_option_is_invariant_violation() {
        let service = with_options("color", vec![option("s", 5000, false), option("l", 8000, false)]);
        let err = price_of(&service).unwrap_err();
        assert!(matches!(err, CoreError::NoSubServiceSelected { ref service_id } if service_id == "color"));
        assert!(err.is_invariant_violation());

        // The broken service poisons the total instead of being skipped.
        assert!(total_price(&[plain("a", 1000, true), service]).is_err());
    }

    #[test]
    fn test_two_selected_options_is_invariant_violation() {
        let service = with_options("color", vec![option("s", 5000, true), option("l", 8000, true)]);
        assert!(matches!(
            price_of(&service),
            Err(CoreError::MultipleSubServicesSelected { count: 2, .. })
        ));
    }

    #[test]
    fn test_unselected_broken_service_is_ignored() {
        let mut broken = with_options("color", vec![option("s", 5000, false)]);
        broken.selected = false;
        let total = total_price(&[plain("a", 1000, true), broken]).unwrap();
        assert_eq!(total.cents(), 1000);
    }

    #[test]
    fn test_total_is_order_invariant() {
        let services = vec![
            plain("a", 1999, true),
            with_options("b", vec![option("x", 501, false), option("y", 4550, true)]),
            plain("c", 10, true),
            plain("d", 700, false),
        ];
        let forward = total_price(&services).unwrap();
        let mut reversed = services.clone();
        reversed.reverse();
        assert_eq!(forward, total_price(&reversed).unwrap());
        assert_eq!(forward.to_string(), "65.59");
    }

    #[test]
    fn test_total_grows_as_services_are_selected() {
        let mut services = vec![plain("a", 1000, false), plain("b", 500, false)];
        let none = total_price(&services).unwrap();
        services[0].selected = true;
        let one = total_price(&services).unwrap();
        services[1].selected = true;
        let two = total_price(&services).unwrap();
        assert!(none <= one && one <= two);
        assert_eq!(two.cents(), 1500);
    }

    #[test]
    fn test_breakdown_and_duration() {
        let services = vec![
            plain("nails", 2500, true),
            with_options("color", vec![option("s", 5000, false), option("l", 8000, true)]),
        ];
        let lines = price_breakdown(&services).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].sub_service_id, None);
        assert_eq!(lines[1].sub_service_id.as_deref(), Some("l"));
        assert_eq!(lines[1].price.cents(), 8000);
        assert_eq!(total_duration(&services).unwrap(), 45 + 30);
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        let huge = i64::MAX / 2 + 1;
        let services = vec![plain("a", huge, true), plain("b", huge, true)];
        assert!(matches!(
            total_price(&services),
            Err(CoreError::TotalOverflow { .. })
        ));

        let lines = price_breakdown(&services).unwrap();
        assert!(matches!(line_totals(&lines), Err(CoreError::TotalOverflow { .. })));

        let mut long = plain("c", 100, true);
        long.duration_minutes = u32::MAX;
        assert!(total_duration(&[long.clone(), long]).is_err());
    }

    #[test]
    fn test_line_totals() {
        let services = vec![
            plain("nails", 2500, true),
            with_options("color", vec![option("s", 5000, false), option("l", 8000, true)]),
        ];
        let lines = price_breakdown(&services).unwrap();
        let (price, minutes) = line_totals(&lines).unwrap();
        assert_eq!(price, total_price(&services).unwrap());
        assert_eq!(minutes, 75);
    }

    #[test]
    fn test_select_sub_service_is_radio() {
        let mut service = with_options(
            "color",
            vec![option("s", 5000, true), option("l", 8000, false), option("x", 9500, false)],
        );
        service.selected = false;

        select_sub_service(&mut service, "x").unwrap();
        assert!(service.selected);
        assert_eq!(service.selected_options().count(), 1);
        assert_eq!(price_of(&service).unwrap().cents(), 9500);

        let err = select_sub_service(&mut service, "nope").unwrap_err();
        assert!(matches!(err, CoreError::SubServiceNotFound { .. }));
        assert_eq!(price_of(&service).unwrap().cents(), 9500);
    }
}
