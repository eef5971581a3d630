use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use uuid::Uuid;
use validator::Validate;

use crate::calendar::CalendarService;
use crate::cart::CartStore;
use crate::catalog::CatalogReader;
use crate::orders::{
    AccountReader, NewOrder, NewOrderItem, Order, OrderError, OrderResponse, OrderStatus,
    OrderStore, PlaceOrderRequest, StatusChangeResponse, StatusMachine,
};
use crate::pricing::{ComponentAssembler, PriceCalculator, PricingError};

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    accounts: Arc<dyn AccountReader>,
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogReader>,
    assembler: ComponentAssembler,
    calendar: CalendarService,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        accounts: Arc<dyn AccountReader>,
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn CatalogReader>,
        assembler: ComponentAssembler,
        calendar: CalendarService,
    ) -> Self {
        Self {
            orders,
            accounts,
            carts,
            catalog,
            assembler,
            calendar,
        }
    }

    /// Place an order from the caller's cart at the current time
    pub async fn place_order(
        &self,
        user_id: i32,
        request: PlaceOrderRequest,
    ) -> Result<OrderResponse, OrderError> {
        self.place_order_at(user_id, request, Utc::now()).await
    }

    /// Place an order from the caller's cart
    ///
    /// # Arguments
    /// * `user_id` - ID of the authenticated user placing the order
    /// * `request` - Location, payment method, region, size class and card details
    /// * `now` - Placement time used for the delivery commitment
    ///
    /// # Returns
    /// The committed order with its items
    ///
    /// # Validation
    /// - Location and payment method must belong to the caller
    /// - Only included lines of the requested size class are ordered; none is `EmptyCart`
    /// - Every line is re-priced in the request's region; any unpriced line aborts
    /// - `final_price = total_price - discount_amount`, not clamped, and must stay storable
    /// - Nothing is persisted unless every step succeeds
    pub async fn place_order_at(
        &self,
        user_id: i32,
        request: PlaceOrderRequest,
        now: DateTime<Utc>,
    ) -> Result<OrderResponse, OrderError> {
        request.validate()?;

        let payment_method_type = self
            .verify_ownership(user_id, request.location_id, request.payment_method_id)
            .await?;

        if self.catalog.find_region(request.region_id).await?.is_none() {
            return Err(PricingError::RegionNotFound(request.region_id).into());
        }

        let mut lines = self
            .carts
            .find_included(user_id, request.size_class)
            .await?;

        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        // Items are grouped by product kind, cart order within a kind
        lines.sort_by_key(|line| line.product.kind());

        let unit_prices = try_join_all(
            lines
                .iter()
                .map(|line| self.assembler.unit_price(&line.product, request.region_id)),
        )
        .await?;

        let items: Vec<NewOrderItem> = lines
            .into_iter()
            .zip(unit_prices)
            .map(|(line, price)| NewOrderItem {
                subtotal: PriceCalculator::calculate_subtotal(line.quantity, price),
                product: line.product,
                price,
                quantity: line.quantity,
            })
            .collect();

        let subtotals: Vec<_> = items.iter().map(|item| item.subtotal).collect();
        let total_price = PriceCalculator::calculate_total(&subtotals);
        if !PriceCalculator::is_storable(total_price) {
            return Err(OrderError::ValidationError(format!(
                "Order total {} is out of range",
                total_price
            )));
        }
        let final_price = PriceCalculator::calculate_final(total_price, request.discount_amount)
            .filter(|price| PriceCalculator::is_storable(*price))
            .ok_or_else(|| {
                OrderError::ValidationError(
                    "Discount puts the final price out of range".to_string(),
                )
            })?;

        let will_deliver_at = self
            .calendar
            .commit_delivery(request.size_class, now)
            .await?;

        let new_order = NewOrder {
            id: Uuid::new_v4(),
            user_id,
            location_id: request.location_id,
            payment_method_id: request.payment_method_id,
            payment_method_type,
            card_message: request.card_message,
            delivery_note: request.delivery_note,
            keep_anonymous: request.keep_anonymous,
            card_qr_code_url: request.card_qr_code_url,
            discount_amount: request.discount_amount,
            total_price,
            final_price,
            will_deliver_at,
            cart_type: request.size_class,
            status: OrderStatus::Pending,
        };

        let (order, items) = self.orders.create_with_items(new_order, items).await?;

        tracing::info!(
            "Order {} placed by user {}: {} items, total {}, final {}, delivery {}",
            order.id,
            user_id,
            items.len(),
            order.total_price,
            order.final_price,
            order.will_deliver_at
        );

        Ok(OrderResponse::new(order, items))
    }

    /// Get all orders for a user with optional status filter
    ///
    /// # Returns
    /// List of orders with their items, newest first
    pub async fn get_user_orders(
        &self,
        user_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderResponse>, OrderError> {
        let orders = self.orders.find_by_user(user_id, status).await?;

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.orders.items_for(order.id).await?;
            responses.push(OrderResponse::new(order, items));
        }

        Ok(responses)
    }

    /// Get a specific order of the requesting user
    pub async fn get_order_by_id(
        &self,
        order_id: Uuid,
        user_id: i32,
    ) -> Result<OrderResponse, OrderError> {
        let order = self.owned_order(order_id, user_id).await?;
        let items = self.orders.items_for(order.id).await?;

        Ok(OrderResponse::new(order, items))
    }

    /// Cancel one of the user's orders; only pending orders can be cancelled
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        user_id: i32,
    ) -> Result<StatusChangeResponse, OrderError> {
        let order = self.owned_order(order_id, user_id).await?;
        StatusMachine::user_cancel(order.status).map_err(OrderError::InvalidTransition)?;

        // Conditional write, the status may have moved since the read
        let Some(updated) = self.orders.cancel_if_pending(order_id).await? else {
            let current = self
                .orders
                .find_by_id(order_id)
                .await?
                .ok_or(OrderError::NotFound(order_id))?;
            tracing::warn!(
                "Order {} moved to {} before user {} could cancel it",
                order_id,
                current.status,
                user_id
            );
            return Err(OrderError::InvalidTransition(
                StatusMachine::cancel_rejection(current.status),
            ));
        };
        tracing::info!("Order {} cancelled by user {}", order_id, user_id);

        Ok(updated.into())
    }

    /// Refuse an order (admin); forces `cancelled` from any status
    pub async fn refuse_order(&self, order_id: Uuid) -> Result<StatusChangeResponse, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        let updated = self.set_status(order_id, OrderStatus::Cancelled).await?;
        tracing::info!("Order {} refused (was {})", order_id, order.status);

        Ok(updated.into())
    }

    /// Set any status on an order (admin)
    ///
    /// The transition table is not enforced here; transitions outside it are logged.
    pub async fn change_order_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<StatusChangeResponse, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if !StatusMachine::is_valid_transition(order.status, new_status) {
            tracing::warn!(
                "Admin moved order {} from {} to {} outside the transition table",
                order_id,
                order.status,
                new_status
            );
        }

        let updated = self.set_status(order_id, new_status).await?;
        tracing::info!("Order {} status changed to {}", order_id, new_status);

        Ok(updated.into())
    }

    /// Check that location and payment method belong to the user
    ///
    /// # Returns
    /// The payment method's type, snapshotted onto the order
    async fn verify_ownership(
        &self,
        user_id: i32,
        location_id: i32,
        payment_method_id: i32,
    ) -> Result<String, OrderError> {
        let (location, payment_method) = tokio::try_join!(
            self.accounts.find_location(location_id),
            self.accounts.find_payment_method(payment_method_id),
        )?;

        let location = location.ok_or_else(|| {
            OrderError::ValidationError(format!("Location {} not found", location_id))
        })?;
        let payment_method = payment_method.ok_or_else(|| {
            OrderError::ValidationError(format!("Payment method {} not found", payment_method_id))
        })?;

        if location.user_id != user_id {
            tracing::warn!("User {} tried to order to location {}", user_id, location_id);
            return Err(OrderError::OwnershipMismatch(
                "location belongs to another user".to_string(),
            ));
        }

        if payment_method.user_id != user_id {
            tracing::warn!(
                "User {} tried to pay with payment method {}",
                user_id,
                payment_method_id
            );
            return Err(OrderError::OwnershipMismatch(
                "payment method belongs to another user".to_string(),
            ));
        }

        Ok(payment_method.method_type)
    }

    async fn owned_order(&self, order_id: Uuid, user_id: i32) -> Result<Order, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if order.user_id != user_id {
            tracing::warn!("User {} tried to access order {}", user_id, order_id);
            return Err(OrderError::OwnershipMismatch(
                "You do not have permission to access this order".to_string(),
            ));
        }

        Ok(order)
    }

    async fn set_status(&self, order_id: Uuid, status: OrderStatus) -> Result<Order, OrderError> {
        self.orders
            .update_status(order_id, status)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }
}
