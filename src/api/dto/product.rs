//! Product request DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::Product;

/// Request body for creating or updating a product.
///
/// Every field is optional on the wire; a missing field takes its zero
/// value. On update a zero value leaves the stored field unchanged.
/// Timestamps are assigned by the server and ignored if sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(default)]
#[schema(example = json!({
    "name": "Widget",
    "description": "A widget",
    "price": 10.0,
    "stock": 5
}))]
pub struct ProductPayload {
    /// External identifier; generated on create when empty
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
}

impl ProductPayload {
    pub fn into_product(self) -> Product {
        Product {
            product_id: self.product_id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let payload: ProductPayload = serde_json::from_value(json!({ "price": -5 })).unwrap();
        let product = payload.into_product();

        assert_eq!(product.price, -5.0);
        assert!(product.name.is_empty());
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_client_timestamps_are_ignored() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "name": "Widget",
            "created_at": "2020-01-01T00:00:00Z"
        }))
        .unwrap();

        assert!(payload.into_product().created_at.is_none());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result = serde_json::from_value::<ProductPayload>(json!({ "stock": "many" }));
        assert!(result.is_err());
    }
}
