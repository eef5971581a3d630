use std::sync::Arc;

use validator::Validate;

use crate::cart::{
    AddCartLineRequest, BulkDeleteRequest, BulkDeleteResponse, CartError, CartLine, CartProduct,
    CartStore, NewCartLine, UpdateCartLineRequest,
};
use crate::pricing::{ComponentAssembler, PricingError};

/// Service for cart line management
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    assembler: ComponentAssembler,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, assembler: ComponentAssembler) -> Self {
        Self { carts, assembler }
    }

    /// Add a line to the user's cart
    ///
    /// # Validation
    /// - Quantity must be at least 1
    /// - Every referenced catalog id must exist
    /// - An addon option must belong to its addon
    /// - Custom cake extra layers must have distinct positive layer numbers
    pub async fn add_line(
        &self,
        user_id: i32,
        request: AddCartLineRequest,
    ) -> Result<CartLine, CartError> {
        request.validate()?;
        if let CartProduct::CustomCake(config) = &request.product {
            config.validate()?;
        }

        self.assembler
            .verify_references(&request.product)
            .await
            .map_err(|err| match err {
                PricingError::IntegrityFault(msg) => CartError::ValidationError(msg),
                other => other.into(),
            })?;

        let line = self
            .carts
            .insert(NewCartLine {
                user_id,
                size_class: request.size_class,
                is_included: request.is_included,
                quantity: request.quantity,
                product: request.product,
            })
            .await?;

        tracing::info!(
            "User {} added cart line {} ({})",
            user_id,
            line.id,
            line.size_class
        );
        Ok(line)
    }

    /// Update quantity and/or inclusion of one of the user's lines
    pub async fn update_line(
        &self,
        user_id: i32,
        line_id: i32,
        request: UpdateCartLineRequest,
    ) -> Result<CartLine, CartError> {
        request.validate()?;
        if request.is_empty() {
            return Err(CartError::ValidationError("Nothing to update".to_string()));
        }

        self.owned_line(user_id, line_id).await?;

        let line = self
            .carts
            .update(line_id, request.quantity, request.is_included)
            .await?
            .ok_or(CartError::NotFound(line_id))?;

        tracing::debug!("User {} updated cart line {}", user_id, line_id);
        Ok(line)
    }

    /// Delete one of the user's lines
    pub async fn delete_line(&self, user_id: i32, line_id: i32) -> Result<(), CartError> {
        self.owned_line(user_id, line_id).await?;

        if !self.carts.delete(line_id).await? {
            return Err(CartError::NotFound(line_id));
        }

        tracing::debug!("User {} deleted cart line {}", user_id, line_id);
        Ok(())
    }

    /// Delete several lines; ids of other users' lines are ignored
    pub async fn bulk_delete(
        &self,
        user_id: i32,
        request: BulkDeleteRequest,
    ) -> Result<BulkDeleteResponse, CartError> {
        request.validate()?;

        let deleted = self.carts.delete_many(user_id, &request.ids).await?;
        tracing::debug!("User {} deleted {} cart lines", user_id, deleted);

        Ok(BulkDeleteResponse { deleted })
    }

    async fn owned_line(&self, user_id: i32, line_id: i32) -> Result<CartLine, CartError> {
        let line = self
            .carts
            .find_by_id(line_id)
            .await?
            .ok_or(CartError::NotFound(line_id))?;

        if line.user_id != user_id {
            return Err(CartError::OwnershipMismatch(line_id));
        }

        Ok(line)
    }
}
