// HTTP handlers for price lookups

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::catalog::CatalogKind;
use crate::pricing::{PricingError, ResolvedPrice};

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    pub region_id: i32,
}

/// Handler for GET /api/prices/{kind}/{entity_id}
/// Resolves the price of one catalog entity in the requested region
pub async fn resolve_price_handler(
    State(state): State<crate::AppState>,
    Path((kind, entity_id)): Path<(CatalogKind, i32)>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<ResolvedPrice>, PricingError> {
    let price = state
        .resolver
        .resolve(kind, entity_id, query.region_id)
        .await?;

    Ok(Json(ResolvedPrice {
        kind,
        entity_id,
        region_id: query.region_id,
        price,
    }))
}
