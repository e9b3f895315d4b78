//! Repository layer for product persistence.
//!
//! `ProductRepository` is the seam between the service and the store; the
//! PostgreSQL implementation lives in [`PgProductRepository`].

mod product_repo;

pub use product_repo::PgProductRepository;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::Product;

/// Result of a successful insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertAcknowledgment {
    /// Store-assigned internal key
    pub inserted_id: i64,
}

/// Result of an update; both counts may be zero without an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateAcknowledgment {
    pub matched: u64,
    pub modified: u64,
}

/// Result of a delete; zero when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteAcknowledgment {
    pub deleted: u64,
}

/// Product persistence operations.
///
/// Implementations translate entity operations into store queries and own
/// no business rules. Store failures are surfaced unchanged apart from the
/// argument checks each method documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stamps `created_at` and `updated_at` on `product` and persists it.
    ///
    /// Fails with `InvalidArgument` when every field of `product` is unset.
    async fn create(&self, product: &mut Product) -> AppResult<InsertAcknowledgment>;

    /// Every stored product. Documents that cannot be decoded are skipped.
    async fn find_all(&self) -> AppResult<Vec<Product>>;

    /// Looks up a product by its external `product_id`.
    async fn find_by_id(&self, id: &str) -> AppResult<Product>;

    /// Replaces the stored document of `id` with `product`, stamping
    /// `updated_at` on `product` first.
    async fn update(&self, id: &str, product: &mut Product) -> AppResult<UpdateAcknowledgment>;

    async fn delete(&self, id: &str) -> AppResult<DeleteAcknowledgment>;
}
