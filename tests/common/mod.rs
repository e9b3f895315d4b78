//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use catalog_rs::AppState;
use catalog_rs::api::routes::create_router;
use catalog_rs::error::{AppError, AppResult};
use catalog_rs::models::Product;
use catalog_rs::repositories::{
    DeleteAcknowledgment, InsertAcknowledgment, ProductRepository, UpdateAcknowledgment,
};
use catalog_rs::services::Services;

struct StoredProduct {
    id: i64,
    product: Product,
}

/// Product store kept in memory, in insertion order.
///
/// Mirrors the argument checks and acknowledgment counts of the PostgreSQL
/// repository, including the unique `product_id` index.
#[derive(Default)]
pub struct InMemoryProductRepository {
    rows: Mutex<Vec<StoredProduct>>,
    next_id: Mutex<i64>,
}

impl InMemoryProductRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &mut Product) -> AppResult<InsertAcknowledgment> {
        if product.is_empty() {
            return Err(AppError::invalid_argument("product data cannot be empty"));
        }

        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|row| row.product.product_id == product.product_id)
        {
            return Err(AppError::IdAlreadyExists);
        }

        product.stamp_created(Utc::now());

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        rows.push(StoredProduct {
            id: *next_id,
            product: product.clone(),
        });

        Ok(InsertAcknowledgment {
            inserted_id: *next_id,
        })
    }

    async fn find_all(&self) -> AppResult<Vec<Product>> {
        let mut rows: Vec<(i64, Product)> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|row| (row.id, row.product.clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        Ok(rows.into_iter().map(|(_, product)| product).collect())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Product> {
        if id.is_empty() {
            return Err(AppError::invalid_argument("id cannot be empty"));
        }

        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.product.product_id == id)
            .map(|row| row.product.clone())
            .ok_or_else(|| AppError::product_not_found(id))
    }

    async fn update(&self, id: &str, product: &mut Product) -> AppResult<UpdateAcknowledgment> {
        if id.is_empty() {
            return Err(AppError::invalid_argument("id cannot be empty"));
        }
        if product.is_empty() {
            return Err(AppError::invalid_argument("product data cannot be empty"));
        }

        product.stamp_updated(Utc::now());

        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.product.product_id == id) {
            Some(row) => {
                let created_at = row.product.created_at;
                row.product = Product {
                    product_id: id.to_string(),
                    created_at,
                    ..product.clone()
                };
                Ok(UpdateAcknowledgment {
                    matched: 1,
                    modified: 1,
                })
            }
            None => Ok(UpdateAcknowledgment::default()),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<DeleteAcknowledgment> {
        if id.is_empty() {
            return Err(AppError::invalid_argument("id cannot be empty"));
        }

        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.product.product_id != id);

        Ok(DeleteAcknowledgment {
            deleted: (before - rows.len()) as u64,
        })
    }
}

/// Router over a fresh in-memory store, plus a handle on that store.
pub fn test_app() -> (Router, Arc<InMemoryProductRepository>) {
    let repository = Arc::new(InMemoryProductRepository::default());
    let services = Services::new(repository.clone());
    (create_router(AppState::new(services, None)), repository)
}

/// Sends one request through the router and decodes the JSON body, if any.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
