use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A restaurant as supplied by the order-management system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    /// Free-text address; may be empty when the operator has not filled it in.
    #[serde(default)]
    pub address: String,
}

/// One row of a restaurant's menu: whether it currently offers a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuAvailabilityRecord {
    pub restaurant_id: i64,
    pub product_id: i64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// A pending order: where it goes and which products it contains.
///
/// `required_product_ids` is a multiset; a product ordered twice appears twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequirement {
    #[serde(rename = "id")]
    pub order_id: i64,
    #[serde(rename = "address")]
    pub delivery_address: String,
    #[serde(rename = "products", default)]
    pub required_product_ids: Vec<i64>,
}

/// Everything the engine needs for one matching pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub menu: Vec<MenuAvailabilityRecord>,
    #[serde(default)]
    pub orders: Vec<OrderRequirement>,
}

/// Load and validate a collaborator snapshot from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SnapshotIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_snapshot(&content)
}

/// Parse and validate a collaborator snapshot from YAML text.
///
/// # Errors
///
/// Returns [`ConfigError::SnapshotParse`] for malformed YAML and
/// [`ConfigError::Validation`] for duplicate restaurant or order ids.
pub fn parse_snapshot(content: &str) -> Result<Snapshot, ConfigError> {
    let snapshot: Snapshot = serde_yaml::from_str(content)?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

fn validate_snapshot(snapshot: &Snapshot) -> Result<(), ConfigError> {
    let mut seen_restaurants = HashSet::new();
    for restaurant in &snapshot.restaurants {
        if !seen_restaurants.insert(restaurant.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate restaurant id {} ('{}')",
                restaurant.id, restaurant.name
            )));
        }
    }

    let mut seen_orders = HashSet::new();
    for order in &snapshot.orders {
        if !seen_orders.insert(order.order_id) {
            return Err(ConfigError::Validation(format!(
                "duplicate order id {}",
                order.order_id
            )));
        }
    }

    Ok(())
}
