use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use crate::cart::SizeClass;
use crate::validation::{validate_closures, validate_holidays, validate_weekend_days};

/// A date range the bakery is closed, both ends inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyClosure {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub reason: String,
}

impl EmergencyClosure {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// The bakery's singleton business calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendar {
    pub opening_hour: i32,
    pub closing_hour: i32,
    pub min_hours_to_prepare: i32,
    /// Weekday numbers, 0 = Sunday
    pub weekend_days: Vec<i32>,
    /// `YYYY-MM-DD` strings
    pub holidays: Vec<String>,
    pub emergency_closures: Vec<EmergencyClosure>,
    pub is_open: bool,
    pub closure_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self {
            opening_hour: DEFAULT_OPENING_HOUR,
            closing_hour: DEFAULT_CLOSING_HOUR,
            min_hours_to_prepare: DEFAULT_MIN_HOURS_TO_PREPARE,
            weekend_days: DEFAULT_WEEKEND_DAYS.to_vec(),
            holidays: Vec::new(),
            emergency_closures: Vec::new(),
            is_open: true,
            closure_message: None,
            updated_at: Utc::now(),
        }
    }
}

pub const DEFAULT_OPENING_HOUR: i32 = 9;
pub const DEFAULT_CLOSING_HOUR: i32 = 18;
pub const DEFAULT_MIN_HOURS_TO_PREPARE: i32 = 24;
pub const DEFAULT_WEEKEND_DAYS: [i32; 2] = [5, 6];

impl BusinessCalendar {
    /// Whether no delivery can land on `date`
    ///
    /// A globally closed bakery is closed on every date.
    pub fn is_closed(&self, date: NaiveDate) -> bool {
        if !self.is_open {
            return true;
        }

        let weekday = date.weekday().num_days_from_sunday() as i32;
        if self.weekend_days.contains(&weekday) {
            return true;
        }

        let iso = date.format("%Y-%m-%d").to_string();
        if self.holidays.iter().any(|holiday| *holiday == iso) {
            return true;
        }

        self.emergency_closures
            .iter()
            .any(|closure| closure.covers(date))
    }

    /// `opening_hour <= hour < closing_hour`
    pub fn is_working_hour(&self, hour: u32) -> bool {
        let hour = hour as i32;
        self.opening_hour <= hour && hour < self.closing_hour
    }
}

/// Storage layout of the calendar row
#[derive(Debug, Clone, FromRow)]
pub struct BusinessCalendarRow {
    pub opening_hour: i32,
    pub closing_hour: i32,
    pub min_hours_to_prepare: i32,
    pub weekend_days: Vec<i32>,
    pub holidays: Vec<String>,
    pub emergency_closures: Json<Vec<EmergencyClosure>>,
    pub is_open: bool,
    pub closure_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<BusinessCalendarRow> for BusinessCalendar {
    fn from(row: BusinessCalendarRow) -> Self {
        Self {
            opening_hour: row.opening_hour,
            closing_hour: row.closing_hour,
            min_hours_to_prepare: row.min_hours_to_prepare,
            weekend_days: row.weekend_days,
            holidays: row.holidays,
            emergency_closures: row.emergency_closures.0,
            is_open: row.is_open,
            closure_message: row.closure_message,
            updated_at: row.updated_at,
        }
    }
}

/// Request DTO for a partial calendar update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBusinessCalendar {
    #[validate(range(min = 0, max = 23, message = "Opening hour must be 0-23"))]
    pub opening_hour: Option<i32>,
    #[validate(range(min = 0, max = 23, message = "Closing hour must be 0-23"))]
    pub closing_hour: Option<i32>,
    #[validate(range(min = 0, message = "Minimum preparation hours cannot be negative"))]
    pub min_hours_to_prepare: Option<i32>,
    #[validate(custom = "validate_weekend_days")]
    pub weekend_days: Option<Vec<i32>>,
    #[validate(custom = "validate_holidays")]
    pub holidays: Option<Vec<String>>,
    #[validate(custom = "validate_closures")]
    pub emergency_closures: Option<Vec<EmergencyClosure>>,
    pub is_open: Option<bool>,
    /// An empty string clears the message
    pub closure_message: Option<String>,
}

impl UpdateBusinessCalendar {
    /// Merge the present fields into `calendar`
    pub fn apply(self, calendar: &mut BusinessCalendar) {
        if let Some(hour) = self.opening_hour {
            calendar.opening_hour = hour;
        }
        if let Some(hour) = self.closing_hour {
            calendar.closing_hour = hour;
        }
        if let Some(hours) = self.min_hours_to_prepare {
            calendar.min_hours_to_prepare = hours;
        }
        if let Some(mut days) = self.weekend_days {
            days.sort_unstable();
            days.dedup();
            calendar.weekend_days = days;
        }
        if let Some(holidays) = self.holidays {
            calendar.holidays = holidays;
        }
        if let Some(closures) = self.emergency_closures {
            calendar.emergency_closures = closures;
        }
        if let Some(is_open) = self.is_open {
            calendar.is_open = is_open;
        }
        if let Some(message) = self.closure_message {
            calendar.closure_message = if message.is_empty() { None } else { Some(message) };
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeliveryEstimateQuery {
    pub size_class: SizeClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub size_class: SizeClass,
    pub will_deliver_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_weekend_uses_sunday_as_zero() {
        let calendar = BusinessCalendar {
            weekend_days: vec![0],
            ..Default::default()
        };
        // 2025-06-01 is a Sunday
        assert!(calendar.is_closed(date("2025-06-01")));
        assert!(!calendar.is_closed(date("2025-06-02")));
    }

    #[test]
    fn test_holiday_and_closure() {
        let calendar = BusinessCalendar {
            weekend_days: vec![],
            holidays: vec!["2025-06-03".to_string()],
            emergency_closures: vec![EmergencyClosure {
                from: date("2025-06-10"),
                to: date("2025-06-12"),
                reason: "Renovation".to_string(),
            }],
            ..Default::default()
        };

        assert!(calendar.is_closed(date("2025-06-03")));
        assert!(!calendar.is_closed(date("2025-06-09")));
        assert!(calendar.is_closed(date("2025-06-10")));
        assert!(calendar.is_closed(date("2025-06-12")));
        assert!(!calendar.is_closed(date("2025-06-13")));
    }

    #[test]
    fn test_global_switch_closes_everything() {
        let calendar = BusinessCalendar {
            weekend_days: vec![],
            is_open: false,
            ..Default::default()
        };
        assert!(calendar.is_closed(date("2025-06-02")));
    }

    #[test]
    fn test_working_hours_are_half_open() {
        let calendar = BusinessCalendar::default();
        assert!(!calendar.is_working_hour(8));
        assert!(calendar.is_working_hour(9));
        assert!(calendar.is_working_hour(17));
        assert!(!calendar.is_working_hour(18));
    }

    #[test]
    fn test_partial_update_keeps_absent_fields() {
        let mut calendar = BusinessCalendar::default();
        calendar.closure_message = Some("Back soon".to_string());

        UpdateBusinessCalendar {
            closing_hour: Some(20),
            weekend_days: Some(vec![6, 5, 6]),
            closure_message: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut calendar);

        assert_eq!(calendar.opening_hour, DEFAULT_OPENING_HOUR);
        assert_eq!(calendar.closing_hour, 20);
        assert_eq!(calendar.weekend_days, vec![5, 6]);
        assert_eq!(calendar.closure_message, None);
    }

    #[test]
    fn test_update_validation() {
        let invalid = UpdateBusinessCalendar {
            opening_hour: Some(24),
            ..Default::default()
        };
        assert!(invalid.validate().is_err());

        let invalid = UpdateBusinessCalendar {
            weekend_days: Some(vec![7]),
            ..Default::default()
        };
        assert!(invalid.validate().is_err());

        let invalid = UpdateBusinessCalendar {
            min_hours_to_prepare: Some(-1),
            ..Default::default()
        };
        assert!(invalid.validate().is_err());

        assert!(UpdateBusinessCalendar::default().validate().is_ok());
    }
}
