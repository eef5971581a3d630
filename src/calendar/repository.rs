use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::calendar::{
    BusinessCalendar, BusinessCalendarRow, CalendarError, DEFAULT_CLOSING_HOUR,
    DEFAULT_MIN_HOURS_TO_PREPARE, DEFAULT_OPENING_HOUR, DEFAULT_WEEKEND_DAYS,
};

/// Storage of the singleton business calendar
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Read the calendar, creating it with defaults on first access
    async fn load_or_init(&self) -> Result<BusinessCalendar, CalendarError>;

    /// Overwrite the calendar; concurrent saves are last-write-wins
    async fn save(&self, calendar: &BusinessCalendar) -> Result<BusinessCalendar, CalendarError>;
}

const CALENDAR_COLUMNS: &str = "opening_hour, closing_hour, min_hours_to_prepare, weekend_days, \
     holidays, emergency_closures, is_open, closure_message, updated_at";

/// Postgres-backed calendar store
#[derive(Clone)]
pub struct PgCalendarStore {
    pool: PgPool,
}

impl PgCalendarStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalendarStore for PgCalendarStore {
    async fn load_or_init(&self) -> Result<BusinessCalendar, CalendarError> {
        // Racing first reads both hit the conflict clause; exactly one row is created
        sqlx::query(
            r#"
            INSERT INTO business_calendar
                (id, opening_hour, closing_hour, min_hours_to_prepare, weekend_days)
            VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(DEFAULT_OPENING_HOUR)
        .bind(DEFAULT_CLOSING_HOUR)
        .bind(DEFAULT_MIN_HOURS_TO_PREPARE)
        .bind(DEFAULT_WEEKEND_DAYS.to_vec())
        .execute(&self.pool)
        .await?;

        let sql = format!("SELECT {} FROM business_calendar WHERE id = 1", CALENDAR_COLUMNS);
        let row = sqlx::query_as::<_, BusinessCalendarRow>(&sql)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn save(&self, calendar: &BusinessCalendar) -> Result<BusinessCalendar, CalendarError> {
        let sql = format!(
            r#"
            INSERT INTO business_calendar
                (id, opening_hour, closing_hour, min_hours_to_prepare, weekend_days, holidays,
                 emergency_closures, is_open, closure_message, updated_at)
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (id) DO UPDATE SET
                opening_hour = EXCLUDED.opening_hour,
                closing_hour = EXCLUDED.closing_hour,
                min_hours_to_prepare = EXCLUDED.min_hours_to_prepare,
                weekend_days = EXCLUDED.weekend_days,
                holidays = EXCLUDED.holidays,
                emergency_closures = EXCLUDED.emergency_closures,
                is_open = EXCLUDED.is_open,
                closure_message = EXCLUDED.closure_message,
                updated_at = NOW()
            RETURNING {}
            "#,
            CALENDAR_COLUMNS
        );

        let row = sqlx::query_as::<_, BusinessCalendarRow>(&sql)
            .bind(calendar.opening_hour)
            .bind(calendar.closing_hour)
            .bind(calendar.min_hours_to_prepare)
            .bind(&calendar.weekend_days)
            .bind(&calendar.holidays)
            .bind(Json(&calendar.emergency_closures))
            .bind(calendar.is_open)
            .bind(&calendar.closure_message)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }
}
