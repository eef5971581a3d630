use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::calendar::{BusinessCalendar, CalendarError};
use crate::cart::SizeClass;

/// How far ahead the scheduler looks for open days before giving up
pub const SEARCH_HORIZON_DAYS: u32 = 366;

/// Computes delivery commitments against a business calendar
pub struct DeliveryScheduler;

impl DeliveryScheduler {
    /// Commit a delivery timestamp for an order placed at `now`
    ///
    /// # Arguments
    /// * `size_class` - Cart type of the order; big cakes take two working days, others one
    /// * `now` - Placement time on the bakery's wall clock
    /// * `calendar` - Freshly read business calendar
    ///
    /// # Returns
    /// The first open day reached after counting the required open days forward,
    /// at `opening_hour:00:00`. Orders placed outside working hours need one extra day.
    ///
    /// # Errors
    /// - `StoreClosed` when the bakery's global switch is off
    /// - `NoDeliveryDate` when no open day is found within the search horizon
    pub fn commit(
        size_class: SizeClass,
        now: NaiveDateTime,
        calendar: &BusinessCalendar,
    ) -> Result<NaiveDateTime, CalendarError> {
        if !calendar.is_open {
            return Err(CalendarError::StoreClosed(
                calendar
                    .closure_message
                    .clone()
                    .unwrap_or_else(|| "orders are not being accepted".to_string()),
            ));
        }

        let base_days = size_class.base_days();
        let mut days_to_add = if calendar.is_working_hour(now.hour()) {
            base_days
        } else {
            base_days + 1
        };

        let mut candidate = now.date();
        let mut searched = 0;

        while days_to_add > 0 {
            candidate = Self::next_day(candidate, &mut searched)?;
            if !calendar.is_closed(candidate) {
                days_to_add -= 1;
            }
        }

        while calendar.is_closed(candidate) {
            candidate = Self::next_day(candidate, &mut searched)?;
        }

        let opening_hour = u32::try_from(calendar.opening_hour).map_err(|_| {
            CalendarError::InvalidConfiguration(format!(
                "opening hour {} is out of range",
                calendar.opening_hour
            ))
        })?;

        candidate.and_hms_opt(opening_hour, 0, 0).ok_or_else(|| {
            CalendarError::InvalidConfiguration(format!(
                "opening hour {} is out of range",
                calendar.opening_hour
            ))
        })
    }

    fn next_day(date: NaiveDate, searched: &mut u32) -> Result<NaiveDate, CalendarError> {
        *searched += 1;
        if *searched > SEARCH_HORIZON_DAYS {
            return Err(CalendarError::NoDeliveryDate(SEARCH_HORIZON_DAYS));
        }
        date.succ_opt()
            .ok_or(CalendarError::NoDeliveryDate(SEARCH_HORIZON_DAYS))
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::calendar::EmergencyClosure;
    use chrono::Duration;
    use proptest::prelude::*;

    fn size_class() -> impl Strategy<Value = SizeClass> {
        prop_oneof![
            Just(SizeClass::BigCakes),
            Just(SizeClass::SmallCakes),
            Just(SizeClass::Others),
        ]
    }

    fn calendar() -> impl Strategy<Value = BusinessCalendar> {
        (
            0i32..=12,
            13i32..=23,
            prop::collection::vec(0i32..=6, 0..=5),
            prop::collection::vec(0i64..=60, 0..=6),
            prop::option::of((0i64..=60, 0i64..=10)),
        )
            .prop_map(|(opening, closing, weekend, holiday_offsets, closure)| {
                let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
                BusinessCalendar {
                    opening_hour: opening,
                    closing_hour: closing,
                    weekend_days: weekend,
                    holidays: holiday_offsets
                        .into_iter()
                        .map(|d| (base + Duration::days(d)).format("%Y-%m-%d").to_string())
                        .collect(),
                    emergency_closures: closure
                        .map(|(start, len)| EmergencyClosure {
                            from: base + Duration::days(start),
                            to: base + Duration::days(start + len),
                            reason: "generated".to_string(),
                        })
                        .into_iter()
                        .collect(),
                    ..Default::default()
                }
            })
    }

    fn placement() -> impl Strategy<Value = NaiveDateTime> {
        (0i64..=40, 0u32..=23, 0u32..=59).prop_map(|(day, hour, minute)| {
            let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(day);
            date.and_hms_opt(hour, minute, 0).unwrap()
        })
    }

    proptest! {
        /// A committed delivery never lands on a closed day
        #[test]
        fn prop_delivery_never_on_closed_day(
            calendar in calendar(),
            size_class in size_class(),
            now in placement(),
        ) {
            if let Ok(delivery) = DeliveryScheduler::commit(size_class, now, &calendar) {
                prop_assert!(!calendar.is_closed(delivery.date()));
            }
        }

        /// Delivery is strictly in the future, at opening time, and at least
        /// `base_days` open days ahead
        #[test]
        fn prop_delivery_is_after_enough_open_days(
            calendar in calendar(),
            size_class in size_class(),
            now in placement(),
        ) {
            if let Ok(delivery) = DeliveryScheduler::commit(size_class, now, &calendar) {
                prop_assert!(delivery.date() > now.date());
                prop_assert_eq!(delivery.hour() as i32, calendar.opening_hour);
                prop_assert_eq!(delivery.minute(), 0);

                let mut open_days = 0;
                let mut day = now.date();
                while day < delivery.date() {
                    day = day.succ_opt().unwrap_or(day);
                    if !calendar.is_closed(day) {
                        open_days += 1;
                    }
                }
                prop_assert!(open_days >= size_class.base_days());
            }
        }

        /// A bakery with at least one open weekday always finds a date
        #[test]
        fn prop_open_weekday_always_schedules(
            calendar in calendar(),
            size_class in size_class(),
            now in placement(),
        ) {
            let open_weekday = (0..=6).any(|day| !calendar.weekend_days.contains(&day));
            prop_assume!(open_weekday);
            prop_assert!(DeliveryScheduler::commit(size_class, now, &calendar).is_ok());
        }

        /// The global switch fails regardless of everything else
        #[test]
        fn prop_closed_switch_always_fails(
            mut calendar in calendar(),
            size_class in size_class(),
            now in placement(),
        ) {
            calendar.is_open = false;
            prop_assert!(matches!(
                DeliveryScheduler::commit(size_class, now, &calendar),
                Err(CalendarError::StoreClosed(_))
            ));
        }
    }
}
