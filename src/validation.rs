// Validation utilities module
// Custom validator functions for request DTOs

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::calendar::EmergencyClosure;
use crate::cart::ExtraLayer;
use crate::pricing::PriceCalculator;

/// Validates that every weekend day is a weekday number 0-6 (0 = Sunday)
pub fn validate_weekend_days(days: &[i32]) -> Result<(), ValidationError> {
    if days.iter().all(|day| (0..=6).contains(day)) {
        Ok(())
    } else {
        Err(ValidationError::new("weekend_day_out_of_range"))
    }
}

/// Validates that every holiday is an ISO `YYYY-MM-DD` date
pub fn validate_holidays(holidays: &[String]) -> Result<(), ValidationError> {
    // Holidays are compared as strings, so the canonical form is required
    let all_canonical = holidays.iter().all(|holiday| {
        NaiveDate::parse_from_str(holiday, "%Y-%m-%d")
            .map(|date| date.format("%Y-%m-%d").to_string() == *holiday)
            .unwrap_or(false)
    });

    if all_canonical {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_holiday_date"))
    }
}

/// Validates that every emergency closure starts no later than it ends
pub fn validate_closures(closures: &[EmergencyClosure]) -> Result<(), ValidationError> {
    if closures.iter().all(|closure| closure.from <= closure.to) {
        Ok(())
    } else {
        Err(ValidationError::new("closure_ends_before_start"))
    }
}

/// Validates that extra layer numbers are positive and distinct
pub fn validate_distinct_layers(layers: &[ExtraLayer]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for layer in layers {
        if layer.layer < 1 || !seen.insert(layer.layer) {
            return Err(ValidationError::new("invalid_extra_layers"));
        }
    }
    Ok(())
}

/// Validates that a money amount has at most two decimals and fits a price column
pub fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if PriceCalculator::is_storable(*amount) {
        Ok(())
    } else {
        Err(ValidationError::new("amount_not_storable"))
    }
}
