use std::sync::Arc;

use futures::future::try_join_all;

use crate::cart::{CartError, CartLine, CartLineView, CartStore, CartView, SizeClass};
use crate::catalog::CatalogReader;
use crate::pricing::{soften, ComponentAssembler, PriceCalculator, PricingError};

/// Builds the priced, displayable view of a user's cart
#[derive(Clone)]
pub struct CartAggregator {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogReader>,
    assembler: ComponentAssembler,
}

impl CartAggregator {
    pub fn new(
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn CatalogReader>,
        assembler: ComponentAssembler,
    ) -> Self {
        Self {
            carts,
            catalog,
            assembler,
        }
    }

    /// Get the user's cart priced in a region, grouped by size class
    ///
    /// # Arguments
    /// * `user_id` - Owner of the cart
    /// * `region_id` - Region whose prices apply
    ///
    /// # Returns
    /// Every line of the cart, included or not. Lines with an unpriced component
    /// carry no price; a line referencing a missing catalog entity fails the read.
    pub async fn cart_for_region(
        &self,
        user_id: i32,
        region_id: i32,
    ) -> Result<CartView, CartError> {
        if self.catalog.find_region(region_id).await?.is_none() {
            return Err(PricingError::RegionNotFound(region_id).into());
        }

        let lines = self.carts.find_by_user(user_id).await?;
        tracing::debug!(
            "Pricing {} cart lines of user {} in region {}",
            lines.len(),
            user_id,
            region_id
        );

        let priced = try_join_all(lines.iter().map(|line| self.price_line(line, region_id))).await?;

        let mut view = CartView::default();
        for (size_class, line_view) in priced {
            view.bucket_mut(size_class).push(line_view);
        }

        Ok(view)
    }

    async fn price_line(
        &self,
        line: &CartLine,
        region_id: i32,
    ) -> Result<(SizeClass, CartLineView), PricingError> {
        let (item, unit_price) = tokio::try_join!(
            self.assembler.assemble(&line.product, region_id),
            async { soften(self.assembler.unit_price(&line.product, region_id).await) },
        )?;

        let total_price =
            unit_price.map(|price| PriceCalculator::calculate_subtotal(line.quantity, price));

        Ok((
            line.size_class,
            CartLineView {
                id: line.id,
                quantity: line.quantity,
                is_included: line.is_included,
                unit_price,
                total_price,
                item,
            },
        ))
    }
}
