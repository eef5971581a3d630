use async_trait::async_trait;
use sqlx::PgPool;

use crate::catalog::{AddonOption, CatalogEntry, CatalogKind, PredesignedCakeConfig, Region};
use crate::pricing::PricingError;

/// Read-only access to catalog data owned by the catalog service
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn find_entry(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, PricingError>;

    async fn find_addon_option(&self, id: i32) -> Result<Option<AddonOption>, PricingError>;

    /// All stored configurations of a predesigned cake, in id order
    async fn find_predesigned_configs(
        &self,
        predesigned_cake_id: i32,
    ) -> Result<Vec<PredesignedCakeConfig>, PricingError>;

    async fn find_region(&self, id: i32) -> Result<Option<Region>, PricingError>;
}

/// Postgres-backed catalog reader
#[derive(Clone)]
pub struct PgCatalogReader {
    pool: PgPool,
}

impl PgCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogReader for PgCatalogReader {
    async fn find_entry(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, PricingError> {
        // table_name() only yields fixed identifiers
        let sql = format!(
            "SELECT id, title, image_url FROM {} WHERE id = $1",
            kind.table_name()
        );

        let entry = sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    async fn find_addon_option(&self, id: i32) -> Result<Option<AddonOption>, PricingError> {
        let option = sqlx::query_as::<_, AddonOption>(
            "SELECT id, addon_id, title, price FROM addon_options WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(option)
    }

    async fn find_predesigned_configs(
        &self,
        predesigned_cake_id: i32,
    ) -> Result<Vec<PredesignedCakeConfig>, PricingError> {
        let configs = sqlx::query_as::<_, PredesignedCakeConfig>(
            r#"
            SELECT id, predesigned_cake_id, flavor_id, decoration_id, shape_id, frost_color
            FROM predesigned_cake_configs
            WHERE predesigned_cake_id = $1
            ORDER BY id
            "#,
        )
        .bind(predesigned_cake_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(configs)
    }

    async fn find_region(&self, id: i32) -> Result<Option<Region>, PricingError> {
        let region = sqlx::query_as::<_, Region>("SELECT id, name FROM regions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(region)
    }
}
