// In-memory stores for service and router tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::calendar::{BusinessCalendar, CalendarError, CalendarService, CalendarStore};
use crate::cart::{
    CartAggregator, CartError, CartLine, CartProduct, CartService, CartStore, NewCartLine,
    SizeClass,
};
use crate::catalog::{
    AddonOption, CatalogEntry, CatalogKind, CatalogReader, PredesignedCakeConfig, Region,
};
use crate::config::AppConfig;
use crate::orders::{
    AccountReader, Location, NewOrder, NewOrderItem, Order, OrderError, OrderItem, OrderService,
    OrderStatus, OrderStore, PaymentMethod,
};
use crate::pricing::{
    ComponentAssembler, PriceMatrix, PriceResolver, PriceTarget, PricingError, RegionPrice,
};
use crate::{AppState, Stores};

pub(crate) const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes";

pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgresql://localhost/bakery_test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        db_max_connections: 1,
        business_offset: FixedOffset::east_opt(0).unwrap(),
    }
}

#[derive(Default)]
struct MemoryCatalog {
    entries: Mutex<HashMap<(CatalogKind, i32), CatalogEntry>>,
    addon_options: Mutex<HashMap<i32, AddonOption>>,
    predesigned_configs: Mutex<Vec<PredesignedCakeConfig>>,
    regions: Mutex<HashMap<i32, Region>>,
}

#[async_trait]
impl CatalogReader for MemoryCatalog {
    async fn find_entry(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, PricingError> {
        Ok(self.entries.lock().unwrap().get(&(kind, id)).cloned())
    }

    async fn find_addon_option(&self, id: i32) -> Result<Option<AddonOption>, PricingError> {
        Ok(self.addon_options.lock().unwrap().get(&id).cloned())
    }

    async fn find_predesigned_configs(
        &self,
        predesigned_cake_id: i32,
    ) -> Result<Vec<PredesignedCakeConfig>, PricingError> {
        Ok(self
            .predesigned_configs
            .lock()
            .unwrap()
            .iter()
            .filter(|config| config.predesigned_cake_id == predesigned_cake_id)
            .cloned()
            .collect())
    }

    async fn find_region(&self, id: i32) -> Result<Option<Region>, PricingError> {
        Ok(self.regions.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
struct MemoryPrices {
    rows: Mutex<Vec<RegionPrice>>,
}

#[async_trait]
impl PriceMatrix for MemoryPrices {
    async fn find_price(
        &self,
        target: PriceTarget,
        region_id: i32,
    ) -> Result<Option<RegionPrice>, PricingError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.target == target && row.region_id == region_id)
            .min_by_key(|row| row.id)
            .cloned())
    }
}

#[derive(Default)]
struct MemoryCarts {
    lines: Mutex<Vec<CartLine>>,
}

impl MemoryCarts {
    fn push(&self, line: NewCartLine) -> CartLine {
        let mut lines = self.lines.lock().unwrap();
        let now = Utc::now();
        let created = CartLine {
            id: lines.iter().map(|l| l.id).max().unwrap_or(0) + 1,
            user_id: line.user_id,
            size_class: line.size_class,
            is_included: line.is_included,
            quantity: line.quantity,
            product: line.product,
            created_at: now,
            updated_at: now,
        };
        lines.push(created.clone());
        created
    }
}

#[async_trait]
impl CartStore for MemoryCarts {
    async fn insert(&self, line: NewCartLine) -> Result<CartLine, CartError> {
        Ok(self.push(line))
    }

    async fn find_by_id(&self, line_id: i32) -> Result<Option<CartLine>, CartError> {
        Ok(self
            .lines
            .lock()
            .unwrap()
            .iter()
            .find(|line| line.id == line_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<CartLine>, CartError> {
        Ok(self
            .lines
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_included(
        &self,
        user_id: i32,
        size_class: SizeClass,
    ) -> Result<Vec<CartLine>, CartError> {
        Ok(self
            .lines
            .lock()
            .unwrap()
            .iter()
            .filter(|line| {
                line.user_id == user_id && line.size_class == size_class && line.is_included
            })
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        line_id: i32,
        quantity: Option<i32>,
        is_included: Option<bool>,
    ) -> Result<Option<CartLine>, CartError> {
        let mut lines = self.lines.lock().unwrap();
        let Some(line) = lines.iter_mut().find(|line| line.id == line_id) else {
            return Ok(None);
        };

        if let Some(quantity) = quantity {
            line.quantity = quantity;
        }
        if let Some(is_included) = is_included {
            line.is_included = is_included;
        }
        line.updated_at = Utc::now();

        Ok(Some(line.clone()))
    }

    async fn delete(&self, line_id: i32) -> Result<bool, CartError> {
        let mut lines = self.lines.lock().unwrap();
        let before = lines.len();
        lines.retain(|line| line.id != line_id);
        Ok(lines.len() < before)
    }

    async fn delete_many(&self, user_id: i32, line_ids: &[i32]) -> Result<u64, CartError> {
        let mut lines = self.lines.lock().unwrap();
        let before = lines.len();
        lines.retain(|line| !(line.user_id == user_id && line_ids.contains(&line.id)));
        Ok((before - lines.len()) as u64)
    }
}

#[derive(Default)]
struct MemoryCalendar {
    calendar: Mutex<Option<BusinessCalendar>>,
}

#[async_trait]
impl CalendarStore for MemoryCalendar {
    async fn load_or_init(&self) -> Result<BusinessCalendar, CalendarError> {
        Ok(self
            .calendar
            .lock()
            .unwrap()
            .get_or_insert_with(BusinessCalendar::default)
            .clone())
    }

    async fn save(&self, calendar: &BusinessCalendar) -> Result<BusinessCalendar, CalendarError> {
        let mut saved = calendar.clone();
        saved.updated_at = Utc::now();
        *self.calendar.lock().unwrap() = Some(saved.clone());
        Ok(saved)
    }
}

#[derive(Default)]
struct MemoryOrders {
    orders: Mutex<Vec<Order>>,
    items: Mutex<Vec<OrderItem>>,
}

#[async_trait]
impl OrderStore for MemoryOrders {
    async fn create_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), OrderError> {
        let now = Utc::now();
        let created = Order {
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
            status: order.status,
            bakery_id: None,
            created_at: now,
            updated_at: now,
        };

        // Both locks are held so readers never see an order without its items
        let mut orders = self.orders.lock().unwrap();
        let mut stored_items = self.items.lock().unwrap();

        let first_id = stored_items.len() as i32 + 1;
        let created_items: Vec<OrderItem> = items
            .into_iter()
            .enumerate()
            .map(|(offset, item)| OrderItem {
                id: first_id + offset as i32,
                order_id: created.id,
                product: item.product,
                price: item.price,
                quantity: item.quantity,
                subtotal: item.subtotal,
            })
            .collect();

        orders.push(created.clone());
        stored_items.extend(created_items.iter().cloned());

        Ok((created, created_items))
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|order| order.id == order_id)
            .cloned())
    }

    async fn find_by_user(
        &self,
        user_id: i32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|order| order.user_id == user_id)
            .filter(|order| status.map_or(true, |status| order.status == status))
            .cloned()
            .collect())
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.iter_mut().find(|order| order.id == order_id) else {
            return Ok(None);
        };

        order.status = status;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn cancel_if_pending(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders
            .iter_mut()
            .find(|order| order.id == order_id && order.status == OrderStatus::Pending)
        else {
            return Ok(None);
        };

        order.status = OrderStatus::Cancelled;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }
}

#[derive(Default)]
struct MemoryAccounts {
    locations: Mutex<HashMap<i32, Location>>,
    payment_methods: Mutex<HashMap<i32, PaymentMethod>>,
}

#[async_trait]
impl AccountReader for MemoryAccounts {
    async fn find_location(&self, location_id: i32) -> Result<Option<Location>, OrderError> {
        Ok(self.locations.lock().unwrap().get(&location_id).cloned())
    }

    async fn find_payment_method(
        &self,
        payment_method_id: i32,
    ) -> Result<Option<PaymentMethod>, OrderError> {
        Ok(self
            .payment_methods
            .lock()
            .unwrap()
            .get(&payment_method_id)
            .cloned())
    }
}

/// Seedable in-memory world wired the same way as the Postgres stores
#[derive(Clone, Default)]
pub(crate) struct Fixture {
    catalog: Arc<MemoryCatalog>,
    prices: Arc<MemoryPrices>,
    carts: Arc<MemoryCarts>,
    calendar: Arc<MemoryCalendar>,
    orders: Arc<MemoryOrders>,
    accounts: Arc<MemoryAccounts>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the single price of a target in a region, replacing earlier rows
    pub fn set_price(&self, target: PriceTarget, region_id: i32, price: Decimal) {
        self.prices
            .rows
            .lock()
            .unwrap()
            .retain(|row| !(row.target == target && row.region_id == region_id));
        self.push_raw_price(target, region_id, price);
    }

    /// Append a price row without removing existing ones
    pub fn push_raw_price(&self, target: PriceTarget, region_id: i32, price: Decimal) {
        let mut rows = self.prices.rows.lock().unwrap();
        let now = Utc::now();
        let id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        rows.push(RegionPrice {
            id,
            region_id,
            target,
            price,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn add_entry(&self, kind: CatalogKind, id: i32, title: &str) {
        self.catalog.entries.lock().unwrap().insert(
            (kind, id),
            CatalogEntry {
                id,
                title: title.to_string(),
                image_url: None,
            },
        );
    }

    pub fn add_addon_option(&self, id: i32, addon_id: i32, title: &str, price: Decimal) {
        self.catalog.addon_options.lock().unwrap().insert(
            id,
            AddonOption {
                id,
                addon_id,
                title: title.to_string(),
                price,
            },
        );
    }

    pub fn add_predesigned_config(
        &self,
        predesigned_cake_id: i32,
        flavor_id: i32,
        decoration_id: i32,
        shape_id: i32,
    ) {
        let mut configs = self.catalog.predesigned_configs.lock().unwrap();
        let id = configs.len() as i32 + 1;
        configs.push(PredesignedCakeConfig {
            id,
            predesigned_cake_id,
            flavor_id,
            decoration_id,
            shape_id,
            frost_color: "white".to_string(),
        });
    }

    pub fn add_region(&self, id: i32, name: &str) {
        self.catalog.regions.lock().unwrap().insert(
            id,
            Region {
                id,
                name: name.to_string(),
            },
        );
    }

    pub fn add_cart_line(
        &self,
        user_id: i32,
        size_class: SizeClass,
        is_included: bool,
        quantity: i32,
        product: CartProduct,
    ) -> CartLine {
        self.carts.push(NewCartLine {
            user_id,
            size_class,
            is_included,
            quantity,
            product,
        })
    }

    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.carts.lines.lock().unwrap().clone()
    }

    pub fn add_location(&self, id: i32, user_id: i32) {
        self.accounts
            .locations
            .lock()
            .unwrap()
            .insert(id, Location { id, user_id });
    }

    pub fn add_payment_method(&self, id: i32, user_id: i32, method_type: &str) {
        self.accounts.payment_methods.lock().unwrap().insert(
            id,
            PaymentMethod {
                id,
                user_id,
                method_type: method_type.to_string(),
            },
        );
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.orders.lock().unwrap().clone()
    }

    pub fn order_items(&self) -> Vec<OrderItem> {
        self.orders.items.lock().unwrap().clone()
    }

    pub fn stores(&self) -> Stores {
        Stores {
            catalog: self.catalog.clone(),
            prices: self.prices.clone(),
            carts: self.carts.clone(),
            calendar: self.calendar.clone(),
            orders: self.orders.clone(),
            accounts: self.accounts.clone(),
        }
    }

    pub fn resolver(&self) -> PriceResolver {
        PriceResolver::new(self.prices.clone(), self.catalog.clone())
    }

    pub fn assembler(&self) -> ComponentAssembler {
        ComponentAssembler::new(self.catalog.clone(), self.resolver())
    }

    pub fn cart_aggregator(&self) -> CartAggregator {
        CartAggregator::new(self.carts.clone(), self.catalog.clone(), self.assembler())
    }

    pub fn cart_service(&self) -> CartService {
        CartService::new(self.carts.clone(), self.assembler())
    }

    pub fn calendar_store(&self) -> Arc<dyn CalendarStore> {
        self.calendar.clone()
    }

    /// Calendar service in UTC
    pub fn calendar_service(&self) -> CalendarService {
        CalendarService::new(self.calendar_store(), test_config().business_offset)
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(
            self.orders.clone(),
            self.accounts.clone(),
            self.carts.clone(),
            self.catalog.clone(),
            self.assembler(),
            self.calendar_service(),
        )
    }

    pub fn app_state(&self, config: AppConfig) -> AppState {
        AppState::from_stores(self.stores(), config)
    }
}
