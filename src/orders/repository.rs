use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::orders::{
    Location, NewOrder, NewOrderItem, Order, OrderError, OrderItem, OrderItemRow, OrderStatus,
    PaymentMethod,
};

/// Storage of committed orders
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order and all of its items as one unit; nothing is written on failure
    async fn create_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), OrderError>;

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError>;

    /// Orders of a user, newest first, optionally filtered by status
    async fn find_by_user(
        &self,
        user_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError>;

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError>;

    async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError>;

    /// Cancel the order only while it is still pending; `None` when it is not
    async fn cancel_if_pending(&self, order_id: Uuid) -> Result<Option<Order>, OrderError>;
}

/// Read access to user-owned delivery locations and payment methods
#[async_trait]
pub trait AccountReader: Send + Sync {
    async fn find_location(&self, location_id: i32) -> Result<Option<Location>, OrderError>;

    async fn find_payment_method(
        &self,
        payment_method_id: i32,
    ) -> Result<Option<PaymentMethod>, OrderError>;
}

const ORDER_COLUMNS: &str = "id, user_id, location_id, payment_method_id, payment_method_type, \
     card_message, delivery_note, keep_anonymous, card_qr_code_url, discount_amount, \
     total_price, final_price, will_deliver_at, cart_type, status, bakery_id, created_at, \
     updated_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_kind, product_id, addon_option_id, \
     custom_cake, price, quantity, subtotal";

fn into_items(rows: Vec<OrderItemRow>) -> Result<Vec<OrderItem>, OrderError> {
    rows.into_iter()
        .map(|row| OrderItem::try_from(row).map_err(OrderError::from))
        .collect()
}

/// Repository for order operations
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), OrderError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO orders
                (id, user_id, location_id, payment_method_id, payment_method_type, card_message,
                 delivery_note, keep_anonymous, card_qr_code_url, discount_amount, total_price,
                 final_price, will_deliver_at, cart_type, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let created = sqlx::query_as::<_, Order>(&sql)
            .bind(order.id)
            .bind(order.user_id)
            .bind(order.location_id)
            .bind(order.payment_method_id)
            .bind(&order.payment_method_type)
            .bind(&order.card_message)
            .bind(&order.delivery_note)
            .bind(order.keep_anonymous)
            .bind(&order.card_qr_code_url)
            .bind(order.discount_amount)
            .bind(order.total_price)
            .bind(order.final_price)
            .bind(order.will_deliver_at)
            .bind(order.cart_type)
            .bind(order.status)
            .fetch_one(&mut *tx)
            .await?;

        let item_sql = format!(
            r#"
            INSERT INTO order_items
                (order_id, product_kind, product_id, addon_option_id, custom_cake, price,
                 quantity, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ORDER_ITEM_COLUMNS
        );

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let columns = item.product.to_columns();

            let row = sqlx::query_as::<_, OrderItemRow>(&item_sql)
                .bind(created.id)
                .bind(columns.product_kind)
                .bind(columns.product_id)
                .bind(columns.addon_option_id)
                .bind(columns.custom_cake)
                .bind(item.price)
                .bind(item.quantity)
                .bind(item.subtotal)
                .fetch_one(&mut *tx)
                .await?;

            rows.push(row);
        }

        tx.commit().await?;

        Ok((created, into_items(rows)?))
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn find_by_user(
        &self,
        user_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        let orders = match status {
            Some(status_filter) => {
                let sql = format!(
                    "SELECT {} FROM orders WHERE user_id = $1 AND status = $2 \
                     ORDER BY created_at DESC",
                    ORDER_COLUMNS
                );
                sqlx::query_as::<_, Order>(&sql)
                    .bind(user_id)
                    .bind(status_filter)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
                    ORDER_COLUMNS
                );
                sqlx::query_as::<_, Order>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(orders)
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError> {
        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY id",
            ORDER_ITEM_COLUMNS
        );

        let rows = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        into_items(rows)
    }

    async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError> {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn cancel_if_pending(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(OrderStatus::Cancelled)
            .bind(order_id)
            .bind(OrderStatus::Pending)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }
}

/// Postgres-backed account reader
#[derive(Clone)]
pub struct PgAccountReader {
    pool: PgPool,
}

impl PgAccountReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountReader for PgAccountReader {
    async fn find_location(&self, location_id: i32) -> Result<Option<Location>, OrderError> {
        let location =
            sqlx::query_as::<_, Location>("SELECT id, user_id FROM locations WHERE id = $1")
                .bind(location_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(location)
    }

    async fn find_payment_method(
        &self,
        payment_method_id: i32,
    ) -> Result<Option<PaymentMethod>, OrderError> {
        let method = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, user_id, method_type FROM payment_methods WHERE id = $1",
        )
        .bind(payment_method_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }
}
