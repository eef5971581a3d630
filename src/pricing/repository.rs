use async_trait::async_trait;
use sqlx::PgPool;

use crate::pricing::{PriceTarget, PricingError, RegionPrice, RegionPriceRow};

/// Read access to the sparse regional price table
#[async_trait]
pub trait PriceMatrix: Send + Sync {
    /// Find the price row for a product reference in a region
    ///
    /// # Returns
    /// `None` when the region has no price for the target
    async fn find_price(
        &self,
        target: PriceTarget,
        region_id: i32,
    ) -> Result<Option<RegionPrice>, PricingError>;
}

/// Postgres-backed price matrix
#[derive(Clone)]
pub struct PgPriceMatrix {
    pool: PgPool,
}

impl PgPriceMatrix {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceMatrix for PgPriceMatrix {
    async fn find_price(
        &self,
        target: PriceTarget,
        region_id: i32,
    ) -> Result<Option<RegionPrice>, PricingError> {
        // Several matching rows are an upstream data bug; the oldest one wins
        let row = sqlx::query_as::<_, RegionPriceRow>(
            r#"
            SELECT id, region_id, product_kind, product_id, price, created_at, updated_at
            FROM region_prices
            WHERE region_id = $1 AND product_kind = $2 AND product_id = $3
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(region_id)
        .bind(target.kind())
        .bind(target.entity_id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RegionPrice::from))
    }
}
