//! Weekday arithmetic for delivery estimates. Holidays are not observed.

use chrono::{Datelike, Days, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Date that is `transit_days` business days after `ship_date`.
///
/// The ship date itself is never counted, so a Friday shipment with one
/// transit day arrives Monday. Zero transit days returns the ship date.
pub fn add_business_days(ship_date: NaiveDate, transit_days: u32) -> NaiveDate {
    let mut current = ship_date;
    let mut remaining = transit_days;

    while remaining > 0 {
        current = match current.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => return current,
        };
        if is_business_day(current) {
            remaining -= 1;
        }
    }

    current
}
