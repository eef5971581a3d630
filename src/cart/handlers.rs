// HTTP handlers for cart endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthenticatedUser;
use crate::cart::{
    AddCartLineRequest, BulkDeleteRequest, BulkDeleteResponse, CartError, CartLine, CartView,
    UpdateCartLineRequest,
};
use crate::pricing::RegionQuery;

/// Handler for GET /api/cart
/// Returns the caller's cart priced in the requested region
pub async fn get_cart_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<RegionQuery>,
) -> Result<Json<CartView>, CartError> {
    let cart = state
        .cart_aggregator
        .cart_for_region(user.user_id, query.region_id)
        .await?;

    Ok(Json(cart))
}

/// Handler for POST /api/cart
pub async fn add_cart_line_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AddCartLineRequest>,
) -> Result<(StatusCode, Json<CartLine>), CartError> {
    let line = state.cart_service.add_line(user.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(line)))
}

/// Handler for PATCH /api/cart/{line_id}
pub async fn update_cart_line_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(line_id): Path<i32>,
    Json(request): Json<UpdateCartLineRequest>,
) -> Result<Json<CartLine>, CartError> {
    let line = state
        .cart_service
        .update_line(user.user_id, line_id, request)
        .await?;

    Ok(Json(line))
}

/// Handler for DELETE /api/cart/{line_id}
pub async fn delete_cart_line_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(line_id): Path<i32>,
) -> Result<StatusCode, CartError> {
    state.cart_service.delete_line(user.user_id, line_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/cart/bulk-delete
pub async fn bulk_delete_cart_lines_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, CartError> {
    let response = state.cart_service.bulk_delete(user.user_id, request).await?;

    Ok(Json(response))
}
