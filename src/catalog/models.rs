use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// The seven catalog kinds that can carry a regional price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Addon,
    Sweet,
    FeaturedCake,
    Flavor,
    Shape,
    Decoration,
    PredesignedCake,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 7] = [
        CatalogKind::Addon,
        CatalogKind::Sweet,
        CatalogKind::FeaturedCake,
        CatalogKind::Flavor,
        CatalogKind::Shape,
        CatalogKind::Decoration,
        CatalogKind::PredesignedCake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Addon => "addon",
            CatalogKind::Sweet => "sweet",
            CatalogKind::FeaturedCake => "featured_cake",
            CatalogKind::Flavor => "flavor",
            CatalogKind::Shape => "shape",
            CatalogKind::Decoration => "decoration",
            CatalogKind::PredesignedCake => "predesigned_cake",
        }
    }

    /// Backing table of this kind's catalog entries
    pub fn table_name(&self) -> &'static str {
        match self {
            CatalogKind::Addon => "addons",
            CatalogKind::Sweet => "sweets",
            CatalogKind::FeaturedCake => "featured_cakes",
            CatalogKind::Flavor => "flavors",
            CatalogKind::Shape => "shapes",
            CatalogKind::Decoration => "decorations",
            CatalogKind::PredesignedCake => "predesigned_cakes",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Invalid catalog kind: {}", s))
    }
}

/// Display data for any catalog entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CatalogEntry {
    pub id: i32,
    pub title: String,
    pub image_url: Option<String>,
}

/// Optional variant of an addon; its price is a flat surcharge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AddonOption {
    pub id: i32,
    pub addon_id: i32,
    pub title: String,
    pub price: Decimal,
}

/// One fixed (flavor, decoration, shape) layer of a predesigned cake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PredesignedCakeConfig {
    pub id: i32,
    pub predesigned_cake_id: i32,
    pub flavor_id: i32,
    pub decoration_id: i32,
    pub shape_id: i32,
    pub frost_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Region {
    pub id: i32,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in CatalogKind::ALL {
            assert_eq!(CatalogKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(CatalogKind::from_str("coffee").is_err());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&CatalogKind::PredesignedCake).unwrap();
        assert_eq!(json, "\"predesigned_cake\"");
    }

    #[test]
    fn test_table_names_are_distinct() {
        let mut tables: Vec<&str> = CatalogKind::ALL.iter().map(|k| k.table_name()).collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), 7);
    }
}
