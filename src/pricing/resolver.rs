use std::sync::Arc;

use futures::future::try_join_all;
use rust_decimal::Decimal;

use crate::cart::CustomCakeConfig;
use crate::catalog::{CatalogKind, CatalogReader, PredesignedCakeConfig};
use crate::pricing::{PriceCalculator, PriceMatrix, PriceTarget, PricingError, PricingResult};

/// Resolves prices from the regional price matrix
///
/// Every price is region-scoped; there is no fallback to another region or to a
/// default price.
#[derive(Clone)]
pub struct PriceResolver {
    prices: Arc<dyn PriceMatrix>,
    catalog: Arc<dyn CatalogReader>,
}

impl PriceResolver {
    pub fn new(prices: Arc<dyn PriceMatrix>, catalog: Arc<dyn CatalogReader>) -> Self {
        Self { prices, catalog }
    }

    /// Resolve the price of one catalog entity in a region
    ///
    /// # Arguments
    /// * `kind` - Catalog kind of the entity
    /// * `entity_id` - Id of the entity within its kind
    /// * `region_id` - Region whose price applies
    ///
    /// # Returns
    /// The price, or `NotPriced` when the region has no row for the entity
    pub async fn resolve(
        &self,
        kind: CatalogKind,
        entity_id: i32,
        region_id: i32,
    ) -> PricingResult<Decimal> {
        let target = PriceTarget::new(kind, entity_id);

        match self.prices.find_price(target, region_id).await? {
            Some(row) => {
                tracing::debug!(
                    "Resolved {} {} in region {}: {}",
                    kind,
                    entity_id,
                    region_id,
                    row.price
                );
                Ok(row.price)
            }
            None => {
                tracing::debug!("{} {} has no price in region {}", kind, entity_id, region_id);
                Err(PricingError::NotPriced {
                    kind,
                    entity_id,
                    region_id,
                })
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but a missing price is `Ok(None)`
    ///
    /// Used for display, where a missing price must not fail the read.
    pub async fn resolve_optional(
        &self,
        kind: CatalogKind,
        entity_id: i32,
        region_id: i32,
    ) -> PricingResult<Option<Decimal>> {
        soften(self.resolve(kind, entity_id, region_id).await)
    }

    /// Price of a custom cake: shape + flavor + decoration + every extra layer's flavor
    ///
    /// Component lookups run concurrently; any unpriced component fails the whole price.
    pub async fn custom_cake_price(
        &self,
        config: &CustomCakeConfig,
        region_id: i32,
    ) -> PricingResult<Decimal> {
        let layers = try_join_all(
            config
                .extra_layers
                .iter()
                .map(|layer| self.resolve(CatalogKind::Flavor, layer.flavor_id, region_id)),
        );

        let (shape, flavor, decoration, layer_prices) = tokio::try_join!(
            self.resolve(CatalogKind::Shape, config.shape_id, region_id),
            self.resolve(CatalogKind::Flavor, config.flavor_id, region_id),
            self.resolve(CatalogKind::Decoration, config.decoration_id, region_id),
            layers,
        )?;

        Ok(PriceCalculator::sum_components(
            [shape, flavor, decoration].into_iter().chain(layer_prices),
        ))
    }

    /// Price of a predesigned cake: the sum over all of its stored configurations
    ///
    /// # Returns
    /// `IntegrityFault` if the cake has no configuration, `NotPriced` if any
    /// component of any configuration is unpriced
    pub async fn predesigned_cake_price(
        &self,
        predesigned_cake_id: i32,
        region_id: i32,
    ) -> PricingResult<Decimal> {
        let configs = self
            .catalog
            .find_predesigned_configs(predesigned_cake_id)
            .await?;

        if configs.is_empty() {
            return Err(PricingError::IntegrityFault(format!(
                "predesigned cake {} has no configuration",
                predesigned_cake_id
            )));
        }

        let config_prices = try_join_all(
            configs
                .iter()
                .map(|config| self.config_price(config, region_id)),
        )
        .await?;

        Ok(PriceCalculator::sum_components(config_prices))
    }

    async fn config_price(
        &self,
        config: &PredesignedCakeConfig,
        region_id: i32,
    ) -> PricingResult<Decimal> {
        let (flavor, decoration, shape) = tokio::try_join!(
            self.resolve(CatalogKind::Flavor, config.flavor_id, region_id),
            self.resolve(CatalogKind::Decoration, config.decoration_id, region_id),
            self.resolve(CatalogKind::Shape, config.shape_id, region_id),
        )?;

        Ok(PriceCalculator::sum_components([flavor, decoration, shape]))
    }
}

/// Turn `NotPriced` into `None` and keep every other error
pub fn soften(result: PricingResult<Decimal>) -> PricingResult<Option<Decimal>> {
    match result {
        Ok(price) => Ok(Some(price)),
        Err(err) if err.is_not_priced() => Ok(None),
        Err(err) => Err(err),
    }
}
