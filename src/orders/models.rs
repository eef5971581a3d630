use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::cart::{CartProduct, CustomCakeConfig, ProductColumns, ProductKind, SizeClass};
use crate::pricing::PricingError;
use crate::validation::validate_amount;

/// Order status enum representing the lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == lowered)
            .ok_or_else(|| format!("Invalid order status: {}", s))
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing an order in the database
///
/// Prices are a snapshot taken at placement; only `status` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: i32,
    pub location_id: i32,
    pub payment_method_id: i32,
    pub payment_method_type: String,
    pub card_message: Option<String>,
    pub delivery_note: Option<String>,
    pub keep_anonymous: bool,
    pub card_qr_code_url: Option<String>,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
    pub final_price: Decimal,
    pub will_deliver_at: DateTime<Utc>,
    pub cart_type: SizeClass,
    pub status: OrderStatus,
    pub bakery_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Domain model representing an item within an order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: Uuid,
    pub product: CartProduct,
    pub price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

/// Storage layout of an order item
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub id: i32,
    pub order_id: Uuid,
    pub product_kind: ProductKind,
    pub product_id: Option<i32>,
    pub addon_option_id: Option<i32>,
    pub custom_cake: Option<Json<CustomCakeConfig>>,
    pub price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = PricingError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let product = CartProduct::from_columns(ProductColumns {
            product_kind: row.product_kind,
            product_id: row.product_id,
            addon_option_id: row.addon_option_id,
            custom_cake: row.custom_cake,
        })?;

        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product,
            price: row.price,
            quantity: row.quantity,
            subtotal: row.subtotal,
        })
    }
}

/// Values of an order about to be persisted
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub user_id: i32,
    pub location_id: i32,
    pub payment_method_id: i32,
    pub payment_method_type: String,
    pub card_message: Option<String>,
    pub delivery_note: Option<String>,
    pub keep_anonymous: bool,
    pub card_qr_code_url: Option<String>,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
    pub final_price: Decimal,
    pub will_deliver_at: DateTime<Utc>,
    pub cart_type: SizeClass,
    pub status: OrderStatus,
}

/// One priced line of an order about to be persisted
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product: CartProduct,
    pub price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

/// Delivery address owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: i32,
    pub user_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PaymentMethod {
    pub id: i32,
    pub user_id: i32,
    pub method_type: String,
}

/// Request DTO for placing an order from the caller's cart
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    pub location_id: i32,
    pub payment_method_id: i32,
    pub region_id: i32,
    pub size_class: SizeClass,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub discount_amount: Decimal,
    #[validate(length(max = 500, message = "Card message must be at most 500 characters"))]
    pub card_message: Option<String>,
    #[validate(length(max = 1000, message = "Delivery note must be at most 1000 characters"))]
    pub delivery_note: Option<String>,
    #[serde(default)]
    pub keep_anonymous: bool,
    #[validate(url(message = "Card QR code URL must be a valid URL"))]
    pub card_qr_code_url: Option<String>,
}

/// Request DTO for updating order status
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Query parameters for order history
#[derive(Debug, Deserialize)]
pub struct OrderHistoryQuery {
    /// Optional status filter
    pub status: Option<OrderStatus>,
}

/// Response DTO for order with items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: i32,
    pub location_id: i32,
    pub payment_method_id: i32,
    pub payment_method_type: String,
    pub card_message: Option<String>,
    pub delivery_note: Option<String>,
    pub keep_anonymous: bool,
    pub card_qr_code_url: Option<String>,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
    pub final_price: Decimal,
    pub will_deliver_at: DateTime<Utc>,
    pub cart_type: SizeClass,
    pub order_status: OrderStatus,
    pub bakery_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            location_id: order.location_id,
            payment_method_id: order.payment_method_id,
            payment_method_type: order.payment_method_type,
            card_message: order.card_message,
            delivery_note: order.delivery_note,
            keep_anonymous: order.keep_anonymous,
            card_qr_code_url: order.card_qr_code_url,
            discount_amount: order.discount_amount,
            total_price: order.total_price,
            final_price: order.final_price,
            will_deliver_at: order.will_deliver_at,
            cart_type: order.cart_type,
            order_status: order.status,
            bakery_id: order.bakery_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

/// Response DTO for order item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product: CartProduct,
    pub price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            product: item.product,
            price: item.price,
            quantity: item.quantity,
            subtotal: item.subtotal,
        }
    }
}

/// Response DTO for status changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeResponse {
    pub id: Uuid,
    pub status: OrderStatus,
}

impl From<Order> for StatusChangeResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            status: order.status,
        }
    }
}
