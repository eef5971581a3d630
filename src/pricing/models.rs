use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::catalog::{AddonOption, CatalogEntry, CatalogKind};

/// The single product reference a price row points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PriceTarget {
    Addon(i32),
    Sweet(i32),
    FeaturedCake(i32),
    Flavor(i32),
    Shape(i32),
    Decoration(i32),
    PredesignedCake(i32),
}

impl PriceTarget {
    pub fn new(kind: CatalogKind, id: i32) -> Self {
        match kind {
            CatalogKind::Addon => PriceTarget::Addon(id),
            CatalogKind::Sweet => PriceTarget::Sweet(id),
            CatalogKind::FeaturedCake => PriceTarget::FeaturedCake(id),
            CatalogKind::Flavor => PriceTarget::Flavor(id),
            CatalogKind::Shape => PriceTarget::Shape(id),
            CatalogKind::Decoration => PriceTarget::Decoration(id),
            CatalogKind::PredesignedCake => PriceTarget::PredesignedCake(id),
        }
    }

    pub fn kind(&self) -> CatalogKind {
        match self {
            PriceTarget::Addon(_) => CatalogKind::Addon,
            PriceTarget::Sweet(_) => CatalogKind::Sweet,
            PriceTarget::FeaturedCake(_) => CatalogKind::FeaturedCake,
            PriceTarget::Flavor(_) => CatalogKind::Flavor,
            PriceTarget::Shape(_) => CatalogKind::Shape,
            PriceTarget::Decoration(_) => CatalogKind::Decoration,
            PriceTarget::PredesignedCake(_) => CatalogKind::PredesignedCake,
        }
    }

    pub fn entity_id(&self) -> i32 {
        match *self {
            PriceTarget::Addon(id)
            | PriceTarget::Sweet(id)
            | PriceTarget::FeaturedCake(id)
            | PriceTarget::Flavor(id)
            | PriceTarget::Shape(id)
            | PriceTarget::Decoration(id)
            | PriceTarget::PredesignedCake(id) => id,
        }
    }
}

/// A row of the price matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionPrice {
    pub id: i32,
    pub region_id: i32,
    pub target: PriceTarget,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage layout of a price matrix row
#[derive(Debug, Clone, FromRow)]
pub struct RegionPriceRow {
    pub id: i32,
    pub region_id: i32,
    pub product_kind: CatalogKind,
    pub product_id: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RegionPriceRow> for RegionPrice {
    fn from(row: RegionPriceRow) -> Self {
        Self {
            id: row.id,
            region_id: row.region_id,
            target: PriceTarget::new(row.product_kind, row.product_id),
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Response DTO for a single price lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub kind: CatalogKind,
    pub entity_id: i32,
    pub region_id: i32,
    pub price: Decimal,
}

/// Catalog entity joined with its price in the queried region
///
/// `price` is absent when the region has no price for the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedComponent {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledLayer {
    pub layer: i32,
    pub flavor: PricedComponent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledCustomCake {
    pub shape: PricedComponent,
    pub flavor: PricedComponent,
    pub decoration: PricedComponent,
    pub frost_color: String,
    pub message: Option<String>,
    pub image_url: Option<String>,
    pub extra_layers: Vec<AssembledLayer>,
    pub snapshot_images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledCakeConfig {
    pub id: i32,
    pub shape: PricedComponent,
    pub flavor: PricedComponent,
    pub decoration: PricedComponent,
    pub frost_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledPredesignedCake {
    pub cake: CatalogEntry,
    pub configs: Vec<AssembledCakeConfig>,
}

/// Displayable object graph of a cart or order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssembledItem {
    Addon {
        addon: CatalogEntry,
        option: Option<AddonOption>,
    },
    Sweet {
        sweet: CatalogEntry,
    },
    FeaturedCake {
        featured_cake: CatalogEntry,
    },
    PredesignedCake(AssembledPredesignedCake),
    CustomCake(AssembledCustomCake),
}
