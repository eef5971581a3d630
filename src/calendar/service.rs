use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use validator::Validate;

use crate::calendar::{
    BusinessCalendar, CalendarError, CalendarStore, DeliveryEstimate, DeliveryScheduler,
    UpdateBusinessCalendar,
};
use crate::cart::SizeClass;

/// Service for the business calendar and delivery commitments
#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn CalendarStore>,
    offset: FixedOffset,
}

impl CalendarService {
    /// Create a calendar service
    ///
    /// # Arguments
    /// * `store` - Calendar storage
    /// * `offset` - UTC offset of the bakery's wall clock
    pub fn new(store: Arc<dyn CalendarStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub async fn get_calendar(&self) -> Result<BusinessCalendar, CalendarError> {
        self.store.load_or_init().await
    }

    /// Merge a partial update into the stored calendar
    pub async fn update_calendar(
        &self,
        update: UpdateBusinessCalendar,
    ) -> Result<BusinessCalendar, CalendarError> {
        update.validate()?;

        let mut calendar = self.store.load_or_init().await?;
        update.apply(&mut calendar);

        if calendar.opening_hour >= calendar.closing_hour {
            return Err(CalendarError::InvalidConfiguration(format!(
                "opening hour {} must be before closing hour {}",
                calendar.opening_hour, calendar.closing_hour
            )));
        }

        let saved = self.store.save(&calendar).await?;
        tracing::info!(
            "Business calendar updated: open={} hours={}-{} weekend={:?} holidays={} closures={}",
            saved.is_open,
            saved.opening_hour,
            saved.closing_hour,
            saved.weekend_days,
            saved.holidays.len(),
            saved.emergency_closures.len()
        );

        Ok(saved)
    }

    /// Commit a delivery timestamp for an order of `size_class` placed at `now`
    ///
    /// The calendar is read fresh on every call.
    pub async fn commit_delivery(
        &self,
        size_class: SizeClass,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CalendarError> {
        let calendar = self.store.load_or_init().await?;
        let local_now = now.with_timezone(&self.offset).naive_local();

        let local_delivery = DeliveryScheduler::commit(size_class, local_now, &calendar)?;

        let delivery = self
            .offset
            .from_local_datetime(&local_delivery)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                CalendarError::InvalidConfiguration(format!(
                    "{} is not a valid local time",
                    local_delivery
                ))
            })?;

        tracing::debug!("Committed {} delivery for {}", size_class, delivery);
        Ok(delivery)
    }

    /// Preview the delivery commitment of an order placed right now
    pub async fn estimate(&self, size_class: SizeClass) -> Result<DeliveryEstimate, CalendarError> {
        let will_deliver_at = self.commit_delivery(size_class, Utc::now()).await?;

        Ok(DeliveryEstimate {
            size_class,
            will_deliver_at,
        })
    }
}
