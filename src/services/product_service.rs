//! Catalog service: product validation and partial-update rules.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult, ValidationFailure};
use crate::models::Product;
use crate::repositories::ProductRepository;
use crate::services::ProductService;

/// Checks the fields a new product must carry.
///
/// Rules are applied in order and the first failure wins: name, description,
/// price (> 0), stock (>= 0).
pub fn validate_new_product(product: &Product) -> Result<(), ValidationFailure> {
    if product.name.is_empty() {
        return Err(ValidationFailure::NameRequired);
    }
    if product.description.is_empty() {
        return Err(ValidationFailure::DescriptionRequired);
    }
    if !(product.price > 0.0) {
        return Err(ValidationFailure::PriceInvalid);
    }
    if product.stock < 0 {
        return Err(ValidationFailure::StockInvalid);
    }
    Ok(())
}

/// Applies `patch` on top of `existing`.
///
/// A zero value (`""`, `0.0`, `0`) in the patch keeps the existing field.
/// Consequently a patch cannot set price or stock to zero, nor clear name or
/// description; callers wanting that must delete and recreate. Identifier
/// and timestamps always come from `existing`.
pub fn merge_patch(existing: Product, patch: &Product) -> Result<Product, ValidationFailure> {
    let mut merged = existing;

    if !patch.name.is_empty() {
        merged.name = patch.name.clone();
    }
    if !patch.description.is_empty() {
        merged.description = patch.description.clone();
    }
    if patch.price != 0.0 {
        if !(patch.price > 0.0) {
            return Err(ValidationFailure::PriceInvalid);
        }
        merged.price = patch.price;
    }
    if patch.stock != 0 {
        if patch.stock < 0 {
            return Err(ValidationFailure::StockInvalid);
        }
        merged.stock = patch.stock;
    }

    Ok(merged)
}

/// [`ProductService`] implementation over any [`ProductRepository`].
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    /// Fails with `IdAlreadyExists` when `product_id` is taken.
    ///
    /// A store miss means the identifier is free; any other lookup failure
    /// is passed through.
    async fn ensure_id_available(&self, product_id: &str) -> AppResult<()> {
        match self.repo.find_by_id(product_id).await {
            Ok(_) => Err(AppError::IdAlreadyExists),
            Err(error) if error.is_not_found() => Ok(()),
            Err(error) => Err(error),
        }
    }
}

#[async_trait]
impl ProductService for CatalogService {
    async fn create_product(&self, mut product: Product) -> AppResult<Product> {
        validate_new_product(&product)?;

        if product.product_id.is_empty() {
            product.product_id = Uuid::new_v4().to_string();
        } else {
            self.ensure_id_available(&product.product_id).await?;
        }

        let ack = self.repo.create(&mut product).await?;
        tracing::info!(
            product_id = %product.product_id,
            inserted_id = ack.inserted_id,
            "Product created"
        );

        Ok(product)
    }

    async fn get_all(&self) -> AppResult<Vec<Product>> {
        let products = self.repo.find_all().await?;
        if products.is_empty() {
            return Err(AppError::NoProductsFound);
        }
        Ok(products)
    }

    async fn get_by_id(&self, id: &str) -> AppResult<Product> {
        if id.is_empty() {
            return Err(AppError::IdRequired);
        }
        self.repo.find_by_id(id).await
    }

    async fn update_product(&self, id: &str, patch: Product) -> AppResult<Product> {
        if id.is_empty() {
            return Err(AppError::IdRequired);
        }

        let existing = self.repo.find_by_id(id).await?;

        if !patch.product_id.is_empty() && patch.product_id != id {
            return Err(AppError::IdCannotBeChanged);
        }

        let mut merged = merge_patch(existing, &patch)?;

        let ack = self.repo.update(id, &mut merged).await?;
        if ack.matched == 0 {
            // Removed between the fetch and the write
            return Err(AppError::product_not_found(id));
        }

        tracing::info!(product_id = %id, "Product updated");
        Ok(merged)
    }

    async fn delete_product(&self, id: &str) -> AppResult<()> {
        if id.is_empty() {
            return Err(AppError::IdRequired);
        }

        let existing = self.repo.find_by_id(id).await?;
        if existing.product_id.is_empty() {
            return Err(AppError::NoProductsFound);
        }

        let ack = self.repo.delete(id).await?;
        if ack.deleted == 0 {
            return Err(AppError::product_not_found(id));
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
