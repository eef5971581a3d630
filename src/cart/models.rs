use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use crate::pricing::{AssembledItem, PricingError};
use crate::validation::validate_distinct_layers;

/// Fulfillment bucket of a cart line; also the cart type of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    BigCakes,
    SmallCakes,
    Others,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::BigCakes => "big_cakes",
            SizeClass::SmallCakes => "small_cakes",
            SizeClass::Others => "others",
        }
    }

    /// Working days needed to prepare an order of this size class
    pub fn base_days(&self) -> u32 {
        match self {
            SizeClass::BigCakes => 2,
            SizeClass::SmallCakes | SizeClass::Others => 1,
        }
    }
}

impl std::fmt::Display for SizeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An additional flavor layer stacked on a custom cake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraLayer {
    pub layer: i32,
    pub flavor_id: i32,
}

/// A customer-composed cake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomCakeConfig {
    pub shape_id: i32,
    pub flavor_id: i32,
    pub decoration_id: i32,
    #[validate(length(min = 1, max = 50, message = "Frost color must be 1-50 characters"))]
    pub frost_color: String,
    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(custom = "validate_distinct_layers")]
    pub extra_layers: Vec<ExtraLayer>,
    #[serde(default)]
    pub snapshot_images: Vec<String>,
}

/// What a cart line (or an order item) refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartProduct {
    Addon {
        addon_id: i32,
        addon_option_id: Option<i32>,
    },
    Sweet {
        sweet_id: i32,
    },
    FeaturedCake {
        featured_cake_id: i32,
    },
    PredesignedCake {
        predesigned_cake_id: i32,
    },
    CustomCake(CustomCakeConfig),
}

/// Stored discriminant of a product reference
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Addon,
    Sweet,
    FeaturedCake,
    PredesignedCake,
    CustomCake,
}

/// Column layout shared by `cart_lines` and `order_items`
#[derive(Debug, Clone)]
pub struct ProductColumns {
    pub product_kind: ProductKind,
    pub product_id: Option<i32>,
    pub addon_option_id: Option<i32>,
    pub custom_cake: Option<Json<CustomCakeConfig>>,
}

impl CartProduct {
    pub fn kind(&self) -> ProductKind {
        match self {
            CartProduct::Addon { .. } => ProductKind::Addon,
            CartProduct::Sweet { .. } => ProductKind::Sweet,
            CartProduct::FeaturedCake { .. } => ProductKind::FeaturedCake,
            CartProduct::PredesignedCake { .. } => ProductKind::PredesignedCake,
            CartProduct::CustomCake(_) => ProductKind::CustomCake,
        }
    }

    pub fn to_columns(&self) -> ProductColumns {
        let (product_id, addon_option_id, custom_cake) = match self {
            CartProduct::Addon {
                addon_id,
                addon_option_id,
            } => (Some(*addon_id), *addon_option_id, None),
            CartProduct::Sweet { sweet_id } => (Some(*sweet_id), None, None),
            CartProduct::FeaturedCake { featured_cake_id } => (Some(*featured_cake_id), None, None),
            CartProduct::PredesignedCake {
                predesigned_cake_id,
            } => (Some(*predesigned_cake_id), None, None),
            CartProduct::CustomCake(config) => (None, None, Some(Json(config.clone()))),
        };

        ProductColumns {
            product_kind: self.kind(),
            product_id,
            addon_option_id,
            custom_cake,
        }
    }

    /// Rebuild a product from its stored columns
    ///
    /// # Returns
    /// `IntegrityFault` when the columns do not describe exactly one product
    pub fn from_columns(columns: ProductColumns) -> Result<Self, PricingError> {
        let ProductColumns {
            product_kind,
            product_id,
            addon_option_id,
            custom_cake,
        } = columns;

        let missing_id = || {
            PricingError::IntegrityFault(format!("{:?} row has no product id", product_kind))
        };

        match product_kind {
            ProductKind::Addon => Ok(CartProduct::Addon {
                addon_id: product_id.ok_or_else(missing_id)?,
                addon_option_id,
            }),
            ProductKind::Sweet => Ok(CartProduct::Sweet {
                sweet_id: product_id.ok_or_else(missing_id)?,
            }),
            ProductKind::FeaturedCake => Ok(CartProduct::FeaturedCake {
                featured_cake_id: product_id.ok_or_else(missing_id)?,
            }),
            ProductKind::PredesignedCake => Ok(CartProduct::PredesignedCake {
                predesigned_cake_id: product_id.ok_or_else(missing_id)?,
            }),
            ProductKind::CustomCake => custom_cake
                .map(|Json(config)| CartProduct::CustomCake(config))
                .ok_or_else(|| {
                    PricingError::IntegrityFault(
                        "custom cake row has no configuration".to_string(),
                    )
                }),
        }
    }
}

/// Domain model of a cart line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub id: i32,
    pub user_id: i32,
    pub size_class: SizeClass,
    pub is_included: bool,
    pub quantity: i32,
    pub product: CartProduct,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage layout of a cart line
#[derive(Debug, Clone, FromRow)]
pub struct CartLineRow {
    pub id: i32,
    pub user_id: i32,
    pub size_class: SizeClass,
    pub is_included: bool,
    pub quantity: i32,
    pub product_kind: ProductKind,
    pub product_id: Option<i32>,
    pub addon_option_id: Option<i32>,
    pub custom_cake: Option<Json<CustomCakeConfig>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = PricingError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let product = CartProduct::from_columns(ProductColumns {
            product_kind: row.product_kind,
            product_id: row.product_id,
            addon_option_id: row.addon_option_id,
            custom_cake: row.custom_cake,
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            size_class: row.size_class,
            is_included: row.is_included,
            quantity: row.quantity,
            product,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Values for a new cart line
#[derive(Debug, Clone)]
pub struct NewCartLine {
    pub user_id: i32,
    pub size_class: SizeClass,
    pub is_included: bool,
    pub quantity: i32,
    pub product: CartProduct,
}

/// Request DTO for adding a cart line
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCartLineRequest {
    pub size_class: SizeClass,
    #[validate(range(min = 1, max = 999, message = "Quantity must be between 1 and 999"))]
    pub quantity: i32,
    #[serde(default = "default_included")]
    pub is_included: bool,
    pub product: CartProduct,
}

fn default_included() -> bool {
    true
}

/// Request DTO for updating a cart line
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCartLineRequest {
    #[validate(range(min = 1, max = 999, message = "Quantity must be between 1 and 999"))]
    pub quantity: Option<i32>,
    pub is_included: Option<bool>,
}

impl UpdateCartLineRequest {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.is_included.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, message = "At least one line id is required"))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

/// A priced, displayable cart line
///
/// Prices are absent when some component is not priced in the region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineView {
    pub id: i32,
    pub quantity: i32,
    pub is_included: bool,
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub item: AssembledItem,
}

/// A user's cart grouped by size class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub big_cakes: Vec<CartLineView>,
    pub small_cakes: Vec<CartLineView>,
    pub others: Vec<CartLineView>,
}

impl CartView {
    pub fn bucket_mut(&mut self, size_class: SizeClass) -> &mut Vec<CartLineView> {
        match size_class {
            SizeClass::BigCakes => &mut self.big_cakes,
            SizeClass::SmallCakes => &mut self.small_cakes,
            SizeClass::Others => &mut self.others,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_cake() -> CustomCakeConfig {
        CustomCakeConfig {
            shape_id: 1,
            flavor_id: 2,
            decoration_id: 3,
            frost_color: "pink".to_string(),
            message: Some("Happy birthday".to_string()),
            image_url: None,
            extra_layers: vec![ExtraLayer {
                layer: 1,
                flavor_id: 4,
            }],
            snapshot_images: vec![],
        }
    }

    #[test]
    fn test_base_days() {
        assert_eq!(SizeClass::BigCakes.base_days(), 2);
        assert_eq!(SizeClass::SmallCakes.base_days(), 1);
        assert_eq!(SizeClass::Others.base_days(), 1);
    }

    #[test]
    fn test_product_deserializes_from_tagged_json() {
        let json = serde_json::json!({"kind": "addon", "addon_id": 4, "addon_option_id": 9});
        let product: CartProduct = serde_json::from_value(json).unwrap();
        assert_eq!(
            product,
            CartProduct::Addon {
                addon_id: 4,
                addon_option_id: Some(9)
            }
        );

        let json = serde_json::json!({
            "kind": "custom_cake",
            "shape_id": 1,
            "flavor_id": 2,
            "decoration_id": 3,
            "frost_color": "white",
            "message": null
        });
        let product: CartProduct = serde_json::from_value(json).unwrap();
        match product {
            CartProduct::CustomCake(config) => {
                assert!(config.extra_layers.is_empty());
                assert!(config.snapshot_images.is_empty());
            }
            other => panic!("unexpected product {:?}", other),
        }
    }

    #[test]
    fn test_columns_keep_exactly_one_reference() {
        let columns = CartProduct::Sweet { sweet_id: 8 }.to_columns();
        assert_eq!(columns.product_kind, ProductKind::Sweet);
        assert_eq!(columns.product_id, Some(8));
        assert!(columns.addon_option_id.is_none());
        assert!(columns.custom_cake.is_none());

        let columns = CartProduct::CustomCake(custom_cake()).to_columns();
        assert_eq!(columns.product_kind, ProductKind::CustomCake);
        assert!(columns.product_id.is_none());
        assert!(columns.custom_cake.is_some());
    }

    #[test]
    fn test_from_columns_restores_product() {
        let product = CartProduct::CustomCake(custom_cake());
        assert_eq!(
            CartProduct::from_columns(product.to_columns()).unwrap(),
            product
        );
    }

    #[test]
    fn test_from_columns_rejects_missing_reference() {
        let columns = ProductColumns {
            product_kind: ProductKind::FeaturedCake,
            product_id: None,
            addon_option_id: None,
            custom_cake: None,
        };
        assert!(matches!(
            CartProduct::from_columns(columns),
            Err(PricingError::IntegrityFault(_))
        ));
    }

    #[test]
    fn test_custom_cake_rejects_duplicate_layers() {
        let mut config = custom_cake();
        config.extra_layers.push(ExtraLayer {
            layer: 1,
            flavor_id: 5,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_update_request_validation() {
        let request = UpdateCartLineRequest {
            quantity: Some(0),
            is_included: None,
        };
        assert!(request.validate().is_err());
        assert!(UpdateCartLineRequest::default().is_empty());

        let too_many = UpdateCartLineRequest {
            quantity: Some(1000),
            is_included: None,
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_add_request_defaults_to_included() {
        let json = serde_json::json!({
            "size_class": "others",
            "quantity": 2,
            "product": {"kind": "sweet", "sweet_id": 1}
        });
        let request: AddCartLineRequest = serde_json::from_value(json).unwrap();
        assert!(request.is_included);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_add_request_caps_quantity() {
        let json = serde_json::json!({
            "size_class": "others",
            "quantity": i32::MAX,
            "product": {"kind": "sweet", "sweet_id": 1}
        });
        let request: AddCartLineRequest = serde_json::from_value(json).unwrap();
        assert!(request.validate().is_err());
    }
}
