// HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::orders::{
    OrderError, OrderHistoryQuery, OrderResponse, PlaceOrderRequest, StatusChangeResponse,
    UpdateStatusRequest,
};

/// Handler for POST /api/orders
/// Places an order from the authenticated user's cart
pub async fn place_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), OrderError> {
    let order = state
        .order_service
        .place_order(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for GET /api/orders
/// Retrieves order history for the authenticated user
pub async fn get_order_history_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<OrderHistoryQuery>,
) -> Result<Json<Vec<OrderResponse>>, OrderError> {
    let orders = state
        .order_service
        .get_user_orders(user.user_id, query.status)
        .await?;

    Ok(Json(orders))
}

/// Handler for GET /api/orders/{order_id}
pub async fn get_order_by_id_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, OrderError> {
    // Ownership is checked in the service layer
    let order = state
        .order_service
        .get_order_by_id(order_id, user.user_id)
        .await?;

    Ok(Json(order))
}

/// Handler for POST /api/orders/{order_id}/cancel
pub async fn cancel_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<StatusChangeResponse>, OrderError> {
    let response = state
        .order_service
        .cancel_order(order_id, user.user_id)
        .await?;

    Ok(Json(response))
}

/// Handler for PATCH /api/admin/orders/{order_id}/status
/// Sets any status on an order (Admin only)
pub async fn change_order_status_handler(
    State(state): State<crate::AppState>,
    admin: AdminUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<StatusChangeResponse>, OrderError> {
    tracing::debug!(
        "Admin {} sets order {} to {}",
        admin.user_id,
        order_id,
        request.status
    );
    let response = state
        .order_service
        .change_order_status(order_id, request.status)
        .await?;

    Ok(Json(response))
}

/// Handler for POST /api/admin/orders/{order_id}/refuse
pub async fn refuse_order_handler(
    State(state): State<crate::AppState>,
    admin: AdminUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<StatusChangeResponse>, OrderError> {
    tracing::debug!("Admin {} refuses order {}", admin.user_id, order_id);
    let response = state.order_service.refuse_order(order_id).await?;

    Ok(Json(response))
}
