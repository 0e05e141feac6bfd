//! Account product lookups
//!
//! The application side of the cache-aside demo: a slow product source and
//! the cached accessor in front of it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::aside::get_or_compute;
use crate::cache::CacheManager;

/// Namespace for per-user account product entries.
pub const ACCOUNT_NAMESPACE: &str = "account_value";

/// Seconds an account product entry stays cached.
pub const PRODUCT_CACHE_TTL: u64 = 120;

// == Product Record ==
/// One product line of a user's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashflow: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total2: Option<i64>,
}

impl ProductRecord {
    /// Creates a record with only the product name set.
    pub fn named(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            cashflow: None,
            total: None,
            total2: None,
        }
    }
}

impl From<ProductRecord> for Value {
    fn from(record: ProductRecord) -> Self {
        let mut object = Map::new();
        object.insert("product".to_string(), Value::String(record.product));
        let numbers = [
            ("cashflow", record.cashflow),
            ("total", record.total),
            ("total2", record.total2),
        ];
        for (name, number) in numbers {
            if let Some(number) = number {
                object.insert(name.to_string(), Value::from(number));
            }
        }
        Value::Object(object)
    }
}

/// Encodes freshly loaded records the way they are cached.
pub fn products_to_json(records: Vec<ProductRecord>) -> Value {
    Value::Array(records.into_iter().map(Value::from).collect())
}

// == Product Source ==
/// Source of truth for account products.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn load(&self, user_id: u64) -> Vec<ProductRecord>;
}

/// Stand-in for a slow database aggregation.
#[derive(Debug, Clone)]
pub struct SimulatedDatabase {
    delay: Duration,
}

impl SimulatedDatabase {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedDatabase {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl ProductSource for SimulatedDatabase {
    async fn load(&self, user_id: u64) -> Vec<ProductRecord> {
        info!(user_id, "performing expensive calculation");
        tokio::time::sleep(self.delay).await;

        vec![
            ProductRecord {
                cashflow: Some(1_213_213),
                total: Some(122_132_131),
                ..ProductRecord::named("DECUMULATOR")
            },
            ProductRecord {
                total2: Some(2_132_131),
                ..ProductRecord::named("ACCUMULATOR")
            },
        ]
    }
}

// == Cached Accessor ==
/// Returns the user's products, served from cache when possible.
///
/// Uses key `account_value:<user_id>` and a 120 second TTL. Whatever JSON is
/// cached under the key is returned as is; freshly loaded records are
/// returned as a JSON array of product objects.
pub async fn get_product_with_cache<S>(cache: &CacheManager, source: &S, user_id: u64) -> Value
where
    S: ProductSource + ?Sized,
{
    get_or_compute(cache, ACCOUNT_NAMESPACE, user_id, PRODUCT_CACHE_TTL, move || async move {
        products_to_json(source.load(user_id).await)
    })
    .await
    .into_value()
}
