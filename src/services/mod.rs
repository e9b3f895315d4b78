//! Service layer for catalog business rules.
//!
//! Services validate input, apply identifier and merge rules, and delegate
//! persistence to a [`ProductRepository`].

mod product_service;

pub use product_service::{CatalogService, merge_patch, validate_new_product};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::Product;
use crate::repositories::ProductRepository;

/// Product business operations consumed by the HTTP layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Validates and stores a new product, generating its `product_id` when
    /// none is supplied. Returns the stored product with its timestamps.
    async fn create_product(&self, product: Product) -> AppResult<Product>;

    /// Every product; an empty catalog is `NoProductsFound`.
    async fn get_all(&self) -> AppResult<Vec<Product>>;

    async fn get_by_id(&self, id: &str) -> AppResult<Product>;

    /// Merges `patch` into the product stored under `id`. Fields holding
    /// their zero value keep the stored value. Returns the merged product.
    async fn update_product(&self, id: &str, patch: Product) -> AppResult<Product>;

    async fn delete_product(&self, id: &str) -> AppResult<()>;
}

/// Aggregates all services for convenient access.
///
/// Held in the Axum application state; cloning only bumps reference counts.
#[derive(Clone)]
pub struct Services {
    pub products: Arc<dyn ProductService>,
}

impl Services {
    /// Wires the catalog service on top of `repository`.
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self {
            products: Arc::new(CatalogService::new(repository)),
        }
    }

    /// Uses an already built product service, e.g. a test double.
    pub fn from_product_service(products: Arc<dyn ProductService>) -> Self {
        Self { products }
    }
}
