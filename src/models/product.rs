//! Product models for the catalog.
//!
//! `Product` is the domain entity handed between layers. The database keeps
//! each product as a row keyed by an internal `id`, the external
//! `product_id`, and a JSONB `document` holding the catalog fields.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Catalog product.
///
/// Zero values (`""`, `0.0`, `0`) double as "unset" when a product is used
/// as an update patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// External identifier, stable for the product's lifetime
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// True when every client-settable field holds its zero value.
    pub fn is_empty(&self) -> bool {
        self.product_id.is_empty()
            && self.name.is_empty()
            && self.description.is_empty()
            && self.price == 0.0
            && self.stock == 0
    }

    /// Stamps both timestamps with the same instant, as done on insert, and
    /// returns that instant.
    pub fn stamp_created(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = store_precision(now);
        self.created_at = Some(now);
        self.updated_at = Some(now);
        now
    }

    /// Stamps `updated_at`, never moving it backwards.
    ///
    /// If the clock has not advanced past the previous stamp the new value
    /// is one microsecond after it.
    pub fn stamp_updated(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = store_precision(now);
        let stamp = match self.updated_at {
            Some(previous) if now <= previous => previous + TimeDelta::microseconds(1),
            _ => now,
        };
        self.updated_at = Some(stamp);
        stamp
    }

    /// Splits the catalog fields out into the stored document body.
    pub fn to_document(&self) -> ProductDocument {
        ProductDocument {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            stock: self.stock,
        }
    }
}

/// Postgres keeps timestamps at microsecond precision; truncating up front
/// makes stored and returned values compare equal.
fn store_precision(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(6)
}

/// Body of the JSONB `document` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
}

impl ProductDocument {
    pub fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Product row as read from the database.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRecord {
    pub id: i64,
    pub product_id: String,
    pub document: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Decodes the stored document into a [`Product`].
    ///
    /// Fails when the document does not match [`ProductDocument`].
    pub fn into_product(self) -> Result<Product, serde_json::Error> {
        let document: ProductDocument = serde_json::from_value(self.document)?;
        Ok(Product {
            product_id: self.product_id,
            name: document.name,
            description: document.description,
            price: document.price,
            stock: document.stock,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

/// Product row for INSERT operations.
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProductRecord {
    pub product_id: String,
    pub document: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the full-document replace performed on update.
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductChangeset {
    pub document: JsonValue,
    pub updated_at: DateTime<Utc>,
}
