// HTTP handlers for the business calendar

use axum::{
    extract::{Query, State},
    Json,
};

use crate::auth::AdminUser;
use crate::calendar::{
    BusinessCalendar, CalendarError, DeliveryEstimate, DeliveryEstimateQuery,
    UpdateBusinessCalendar,
};

/// Handler for GET /api/calendar
pub async fn get_calendar_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<BusinessCalendar>, CalendarError> {
    let calendar = state.calendar_service.get_calendar().await?;

    Ok(Json(calendar))
}

/// Handler for PUT /api/admin/calendar
/// Merges a partial update into the calendar (Admin only)
pub async fn update_calendar_handler(
    State(state): State<crate::AppState>,
    admin: AdminUser,
    Json(update): Json<UpdateBusinessCalendar>,
) -> Result<Json<BusinessCalendar>, CalendarError> {
    tracing::debug!("Admin {} is updating the business calendar", admin.user_id);
    let calendar = state.calendar_service.update_calendar(update).await?;

    Ok(Json(calendar))
}

/// Handler for GET /api/calendar/delivery-estimate
/// Previews the delivery commitment of an order placed now
pub async fn delivery_estimate_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<DeliveryEstimateQuery>,
) -> Result<Json<DeliveryEstimate>, CalendarError> {
    let estimate = state.calendar_service.estimate(query.size_class).await?;

    Ok(Json(estimate))
}
