use std::sync::Arc;

use futures::future::try_join_all;
use rust_decimal::Decimal;

use crate::cart::{CartProduct, CustomCakeConfig};
use crate::catalog::{AddonOption, CatalogEntry, CatalogKind, CatalogReader, PredesignedCakeConfig};
use crate::pricing::{
    AssembledCakeConfig, AssembledCustomCake, AssembledItem, AssembledLayer,
    AssembledPredesignedCake, PriceCalculator, PriceResolver, PricedComponent, PricingError,
    PricingResult,
};

/// Turns product references into display graphs and unit prices
#[derive(Clone)]
pub struct ComponentAssembler {
    catalog: Arc<dyn CatalogReader>,
    resolver: PriceResolver,
}

impl ComponentAssembler {
    pub fn new(catalog: Arc<dyn CatalogReader>, resolver: PriceResolver) -> Self {
        Self { catalog, resolver }
    }

    pub fn resolver(&self) -> &PriceResolver {
        &self.resolver
    }

    /// Unit price of a product in a region
    ///
    /// Hard pricing: any unpriced component fails with `NotPriced`.
    /// Addons add their option's flat surcharge.
    pub async fn unit_price(&self, product: &CartProduct, region_id: i32) -> PricingResult<Decimal> {
        match product {
            CartProduct::Addon {
                addon_id,
                addon_option_id,
            } => {
                let base = self
                    .resolver
                    .resolve(CatalogKind::Addon, *addon_id, region_id)
                    .await?;

                let surcharge = match addon_option_id {
                    Some(option_id) => Some(self.addon_option(*addon_id, *option_id).await?.price),
                    None => None,
                };

                Ok(PriceCalculator::addon_unit_price(base, surcharge))
            }
            CartProduct::Sweet { sweet_id } => {
                self.resolver
                    .resolve(CatalogKind::Sweet, *sweet_id, region_id)
                    .await
            }
            CartProduct::FeaturedCake { featured_cake_id } => {
                self.resolver
                    .resolve(CatalogKind::FeaturedCake, *featured_cake_id, region_id)
                    .await
            }
            CartProduct::PredesignedCake {
                predesigned_cake_id,
            } => {
                self.resolver
                    .predesigned_cake_price(*predesigned_cake_id, region_id)
                    .await
            }
            CartProduct::CustomCake(config) => {
                self.resolver.custom_cake_price(config, region_id).await
            }
        }
    }

    /// Build the display graph of a product
    ///
    /// Component prices are shown when the region prices them and left out otherwise.
    /// A reference to a catalog entity that does not exist is an `IntegrityFault`.
    pub async fn assemble(
        &self,
        product: &CartProduct,
        region_id: i32,
    ) -> PricingResult<AssembledItem> {
        match product {
            CartProduct::Addon {
                addon_id,
                addon_option_id,
            } => {
                let addon = self.entry(CatalogKind::Addon, *addon_id).await?;
                let option = match addon_option_id {
                    Some(option_id) => Some(self.addon_option(*addon_id, *option_id).await?),
                    None => None,
                };
                Ok(AssembledItem::Addon { addon, option })
            }
            CartProduct::Sweet { sweet_id } => Ok(AssembledItem::Sweet {
                sweet: self.entry(CatalogKind::Sweet, *sweet_id).await?,
            }),
            CartProduct::FeaturedCake { featured_cake_id } => Ok(AssembledItem::FeaturedCake {
                featured_cake: self
                    .entry(CatalogKind::FeaturedCake, *featured_cake_id)
                    .await?,
            }),
            CartProduct::PredesignedCake {
                predesigned_cake_id,
            } => Ok(AssembledItem::PredesignedCake(
                self.assemble_predesigned(*predesigned_cake_id, region_id)
                    .await?,
            )),
            CartProduct::CustomCake(config) => Ok(AssembledItem::CustomCake(
                self.assemble_custom(config, region_id).await?,
            )),
        }
    }

    /// Check that every catalog id a product references exists
    pub async fn verify_references(&self, product: &CartProduct) -> PricingResult<()> {
        match product {
            CartProduct::Addon {
                addon_id,
                addon_option_id,
            } => {
                self.entry(CatalogKind::Addon, *addon_id).await?;
                if let Some(option_id) = addon_option_id {
                    self.addon_option(*addon_id, *option_id).await?;
                }
            }
            CartProduct::Sweet { sweet_id } => {
                self.entry(CatalogKind::Sweet, *sweet_id).await?;
            }
            CartProduct::FeaturedCake { featured_cake_id } => {
                self.entry(CatalogKind::FeaturedCake, *featured_cake_id)
                    .await?;
            }
            CartProduct::PredesignedCake {
                predesigned_cake_id,
            } => {
                self.entry(CatalogKind::PredesignedCake, *predesigned_cake_id)
                    .await?;
            }
            CartProduct::CustomCake(config) => {
                let layers = try_join_all(
                    config
                        .extra_layers
                        .iter()
                        .map(|layer| self.entry(CatalogKind::Flavor, layer.flavor_id)),
                );
                tokio::try_join!(
                    self.entry(CatalogKind::Shape, config.shape_id),
                    self.entry(CatalogKind::Flavor, config.flavor_id),
                    self.entry(CatalogKind::Decoration, config.decoration_id),
                    layers,
                )?;
            }
        }

        Ok(())
    }

    async fn entry(&self, kind: CatalogKind, id: i32) -> PricingResult<CatalogEntry> {
        self.catalog.find_entry(kind, id).await?.ok_or_else(|| {
            PricingError::IntegrityFault(format!("{} {} does not exist", kind, id))
        })
    }

    async fn addon_option(&self, addon_id: i32, option_id: i32) -> PricingResult<AddonOption> {
        match self.catalog.find_addon_option(option_id).await? {
            Some(option) if option.addon_id == addon_id => Ok(option),
            Some(_) => Err(PricingError::IntegrityFault(format!(
                "addon option {} does not belong to addon {}",
                option_id, addon_id
            ))),
            None => Err(PricingError::IntegrityFault(format!(
                "addon option {} does not exist",
                option_id
            ))),
        }
    }

    async fn component(
        &self,
        kind: CatalogKind,
        id: i32,
        region_id: i32,
    ) -> PricingResult<PricedComponent> {
        let (entry, price) = tokio::try_join!(
            self.entry(kind, id),
            self.resolver.resolve_optional(kind, id, region_id),
        )?;

        Ok(PricedComponent { entry, price })
    }

    async fn assemble_custom(
        &self,
        config: &CustomCakeConfig,
        region_id: i32,
    ) -> PricingResult<AssembledCustomCake> {
        let layers = try_join_all(config.extra_layers.iter().map(|layer| async move {
            let flavor = self
                .component(CatalogKind::Flavor, layer.flavor_id, region_id)
                .await?;
            Ok::<_, PricingError>(AssembledLayer {
                layer: layer.layer,
                flavor,
            })
        }));

        let (shape, flavor, decoration, extra_layers) = tokio::try_join!(
            self.component(CatalogKind::Shape, config.shape_id, region_id),
            self.component(CatalogKind::Flavor, config.flavor_id, region_id),
            self.component(CatalogKind::Decoration, config.decoration_id, region_id),
            layers,
        )?;

        Ok(AssembledCustomCake {
            shape,
            flavor,
            decoration,
            frost_color: config.frost_color.clone(),
            message: config.message.clone(),
            image_url: config.image_url.clone(),
            extra_layers,
            snapshot_images: config.snapshot_images.clone(),
        })
    }

    async fn assemble_predesigned(
        &self,
        predesigned_cake_id: i32,
        region_id: i32,
    ) -> PricingResult<AssembledPredesignedCake> {
        let (cake, configs) = tokio::try_join!(
            self.entry(CatalogKind::PredesignedCake, predesigned_cake_id),
            self.catalog.find_predesigned_configs(predesigned_cake_id),
        )?;

        let configs = try_join_all(
            configs
                .iter()
                .map(|config| self.assemble_config(config, region_id)),
        )
        .await?;

        Ok(AssembledPredesignedCake { cake, configs })
    }

    async fn assemble_config(
        &self,
        config: &PredesignedCakeConfig,
        region_id: i32,
    ) -> PricingResult<AssembledCakeConfig> {
        let (shape, flavor, decoration) = tokio::try_join!(
            self.component(CatalogKind::Shape, config.shape_id, region_id),
            self.component(CatalogKind::Flavor, config.flavor_id, region_id),
            self.component(CatalogKind::Decoration, config.decoration_id, region_id),
        )?;

        Ok(AssembledCakeConfig {
            id: config.id,
            shape,
            flavor,
            decoration,
            frost_color: config.frost_color.clone(),
        })
    }
}
