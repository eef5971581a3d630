use async_trait::async_trait;
use sqlx::PgPool;

use crate::cart::{CartError, CartLine, CartLineRow, NewCartLine, SizeClass};

/// Storage of users' cart lines
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn insert(&self, line: NewCartLine) -> Result<CartLine, CartError>;

    async fn find_by_id(&self, line_id: i32) -> Result<Option<CartLine>, CartError>;

    /// All lines of a user, oldest first
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<CartLine>, CartError>;

    /// Included lines of a user in one size class, oldest first
    async fn find_included(
        &self,
        user_id: i32,
        size_class: SizeClass,
    ) -> Result<Vec<CartLine>, CartError>;

    /// Update quantity and/or inclusion; `None` leaves the column unchanged
    async fn update(
        &self,
        line_id: i32,
        quantity: Option<i32>,
        is_included: Option<bool>,
    ) -> Result<Option<CartLine>, CartError>;

    async fn delete(&self, line_id: i32) -> Result<bool, CartError>;

    /// Delete the listed lines that belong to the user
    ///
    /// # Returns
    /// Number of deleted lines
    async fn delete_many(&self, user_id: i32, line_ids: &[i32]) -> Result<u64, CartError>;
}

const CART_LINE_COLUMNS: &str = "id, user_id, size_class, is_included, quantity, product_kind, \
     product_id, addon_option_id, custom_cake, created_at, updated_at";

fn into_lines(rows: Vec<CartLineRow>) -> Result<Vec<CartLine>, CartError> {
    rows.into_iter()
        .map(|row| CartLine::try_from(row).map_err(CartError::from))
        .collect()
}

/// Postgres-backed cart store
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn insert(&self, line: NewCartLine) -> Result<CartLine, CartError> {
        let columns = line.product.to_columns();

        let sql = format!(
            r#"
            INSERT INTO cart_lines
                (user_id, size_class, is_included, quantity, product_kind, product_id,
                 addon_option_id, custom_cake)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CART_LINE_COLUMNS
        );

        let row = sqlx::query_as::<_, CartLineRow>(&sql)
            .bind(line.user_id)
            .bind(line.size_class)
            .bind(line.is_included)
            .bind(line.quantity)
            .bind(columns.product_kind)
            .bind(columns.product_id)
            .bind(columns.addon_option_id)
            .bind(columns.custom_cake)
            .fetch_one(&self.pool)
            .await?;

        Ok(CartLine::try_from(row)?)
    }

    async fn find_by_id(&self, line_id: i32) -> Result<Option<CartLine>, CartError> {
        let sql = format!("SELECT {} FROM cart_lines WHERE id = $1", CART_LINE_COLUMNS);

        let row = sqlx::query_as::<_, CartLineRow>(&sql)
            .bind(line_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CartLine::try_from)
            .transpose()
            .map_err(CartError::from)
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<CartLine>, CartError> {
        let sql = format!(
            "SELECT {} FROM cart_lines WHERE user_id = $1 ORDER BY id",
            CART_LINE_COLUMNS
        );

        let rows = sqlx::query_as::<_, CartLineRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        into_lines(rows)
    }

    async fn find_included(
        &self,
        user_id: i32,
        size_class: SizeClass,
    ) -> Result<Vec<CartLine>, CartError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM cart_lines
            WHERE user_id = $1 AND size_class = $2 AND is_included = TRUE
            ORDER BY id
            "#,
            CART_LINE_COLUMNS
        );

        let rows = sqlx::query_as::<_, CartLineRow>(&sql)
            .bind(user_id)
            .bind(size_class)
            .fetch_all(&self.pool)
            .await?;

        into_lines(rows)
    }

    async fn update(
        &self,
        line_id: i32,
        quantity: Option<i32>,
        is_included: Option<bool>,
    ) -> Result<Option<CartLine>, CartError> {
        let sql = format!(
            r#"
            UPDATE cart_lines
            SET quantity = COALESCE($1, quantity),
                is_included = COALESCE($2, is_included),
                updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            CART_LINE_COLUMNS
        );

        let row = sqlx::query_as::<_, CartLineRow>(&sql)
            .bind(quantity)
            .bind(is_included)
            .bind(line_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CartLine::try_from)
            .transpose()
            .map_err(CartError::from)
    }

    async fn delete(&self, line_id: i32) -> Result<bool, CartError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = $1")
            .bind(line_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, user_id: i32, line_ids: &[i32]) -> Result<u64, CartError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(line_ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
