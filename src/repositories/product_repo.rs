//! PostgreSQL product repository.
//!
//! Products live in the `products` table as a JSONB document keyed by the
//! external `product_id`; the `id` column is the store's internal key.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter, ErrorKind};
use crate::models::{NewProductRecord, Product, ProductChangeset, ProductRecord};
use crate::repositories::{
    DeleteAcknowledgment, InsertAcknowledgment, ProductRepository, UpdateAcknowledgment,
};
use crate::schema::products;

/// Product repository backed by an async connection pool.
///
/// Every operation checks a connection out of the pool and runs under
/// `operation_timeout`; the connection goes back to the pool however the
/// operation ends. Cloning is cheap since the pool is reference counted.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: Option<AsyncDbPool>,
    operation_timeout: Duration,
}

impl PgProductRepository {
    pub fn new(pool: AsyncDbPool, operation_timeout: Duration) -> Self {
        Self {
            pool: Some(pool),
            operation_timeout,
        }
    }

    /// A repository without a store handle. Every operation that passes its
    /// argument checks fails with `NotInitialized`.
    pub fn uninitialized() -> Self {
        Self {
            pool: None,
            operation_timeout: Duration::from_secs(10),
        }
    }

    fn pool(&self) -> AppResult<&AsyncDbPool> {
        self.pool.as_ref().ok_or(AppError::NotInitialized)
    }

    /// Runs `work` under the operation timeout.
    async fn bounded<T, F>(&self, operation: &'static str, work: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let result = match tokio::time::timeout(self.operation_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout {
                operation: operation.to_string(),
                timeout_secs: self.operation_timeout.as_secs(),
            }),
        };

        if let Err(ref error) = result
            && error.kind() == ErrorKind::Upstream
        {
            tracing::error!(operation, error = %error, "Product store operation failed");
        }

        result
    }
}

async fn checkout(pool: &AsyncDbPool) -> AppResult<PooledConnection<'_, AsyncPgConnection>> {
    pool.get().await.map_err(|e| AppError::ConnectionPool {
        source: anyhow::anyhow!("Failed to get connection from pool: {}", e),
    })
}

fn require_id(id: &str) -> AppResult<()> {
    if id.is_empty() {
        return Err(AppError::invalid_argument("id cannot be empty"));
    }
    Ok(())
}

fn require_data(product: &Product) -> AppResult<()> {
    if product.is_empty() {
        return Err(AppError::invalid_argument("product data cannot be empty"));
    }
    Ok(())
}

fn encode_document(product: &Product, operation: &str) -> AppResult<serde_json::Value> {
    product
        .to_document()
        .to_json()
        .map_err(|e| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::from(e),
        })
}

/// Decodes rows in order, skipping (and logging) any whose document does
/// not match the product shape.
fn decode_records(records: Vec<ProductRecord>) -> Vec<Product> {
    records
        .into_iter()
        .filter_map(|record| {
            let product_id = record.product_id.clone();
            match record.into_product() {
                Ok(product) => Some(product),
                Err(error) => {
                    tracing::warn!(%product_id, %error, "Skipping undecodable product document");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: &mut Product) -> AppResult<InsertAcknowledgment> {
        require_data(product)?;
        let pool = self.pool()?;

        let stamped_at = product.stamp_created(Utc::now());
        let record = NewProductRecord {
            product_id: product.product_id.clone(),
            document: encode_document(product, "insert product")?,
            created_at: stamped_at,
            updated_at: stamped_at,
        };

        self.bounded("insert product", async {
            let mut conn = checkout(pool).await?;
            let inserted_id = diesel::insert_into(products::table)
                .values(&record)
                .returning(products::id)
                .get_result::<i64>(&mut conn)
                .await
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert product"))?;

            Ok(InsertAcknowledgment { inserted_id })
        })
        .await
    }

    async fn find_all(&self) -> AppResult<Vec<Product>> {
        let pool = self.pool()?;

        let records = self
            .bounded("list products", async {
                let mut conn = checkout(pool).await?;
                products::table
                    .order(products::id.asc())
                    .select(ProductRecord::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list products"))
            })
            .await?;

        Ok(decode_records(records))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Product> {
        require_id(id)?;
        let pool = self.pool()?;

        let record = self
            .bounded("find product", async {
                let mut conn = checkout(pool).await?;
                products::table
                    .filter(products::product_id.eq(id))
                    .select(ProductRecord::as_select())
                    .first(&mut conn)
                    .await
                    .map_err(|e| {
                        DatabaseErrorConverter::convert_product_lookup(e, id, "find product")
                    })
            })
            .await?;

        record.into_product().map_err(|e| AppError::Database {
            operation: "decode product".to_string(),
            source: anyhow::Error::from(e),
        })
    }

    async fn update(&self, id: &str, product: &mut Product) -> AppResult<UpdateAcknowledgment> {
        require_id(id)?;
        require_data(product)?;
        let pool = self.pool()?;

        let updated_at = product.stamp_updated(Utc::now());
        let changeset = ProductChangeset {
            document: encode_document(product, "update product")?,
            updated_at,
        };

        self.bounded("update product", async {
            let mut conn = checkout(pool).await?;
            let affected = diesel::update(products::table.filter(products::product_id.eq(id)))
                .set(&changeset)
                .execute(&mut conn)
                .await
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "update product"))?;

            // A full-document replace modifies every row it matches.
            Ok(UpdateAcknowledgment {
                matched: affected as u64,
                modified: affected as u64,
            })
        })
        .await
    }

    async fn delete(&self, id: &str) -> AppResult<DeleteAcknowledgment> {
        require_id(id)?;
        let pool = self.pool()?;

        self.bounded("delete product", async {
            let mut conn = checkout(pool).await?;
            let deleted = diesel::delete(products::table.filter(products::product_id.eq(id)))
                .execute(&mut conn)
                .await
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "delete product"))?;

            Ok(DeleteAcknowledgment {
                deleted: deleted as u64,
            })
        })
        .await
    }
}
