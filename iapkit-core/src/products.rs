//! Batch product lookup.

use std::collections::HashSet;

use crate::error::PlatformError;
use crate::native::{NativeProduct, StoreApi};
use crate::types::ProductDetails;

/// Outcome of a product query.
///
/// A query that reaches the catalog reports every requested identifier either
/// in `product_details` or in `not_found_ids`. When the catalog request fails,
/// every identifier is reported as not found and `error` is set.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ProductQueryResult {
    /// Products that exist in the catalog.
    pub product_details: Vec<ProductDetails>,
    /// Requested identifiers with no matching product.
    pub not_found_ids: Vec<String>,
    /// Catalog failure, if any.
    pub error: Option<PlatformError>,
}

impl From<NativeProduct> for ProductDetails {
    fn from(product: NativeProduct) -> Self {
        Self {
            id: product.id,
            title: product.display_name,
            description: product.description,
            price: product.display_price,
            raw_price: product.price,
            currency_code: product.currency_code,
            currency_symbol: product.currency_symbol,
            product_type: product.product_type,
        }
    }
}

/// Resolves `identifiers` against the native catalog. Never fails; see
/// [`ProductQueryResult`].
pub(crate) async fn query_products(
    store: &dyn StoreApi,
    identifiers: Vec<String>,
) -> ProductQueryResult {
    // duplicate ids are collapsed, first occurrence wins the ordering
    let mut seen = HashSet::new();
    let requested: Vec<String> = identifiers
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();

    let products = match store.products(requested.clone()).await {
        Ok(products) => products,
        Err(error) => {
            log::warn!(
                "product query for {} identifiers failed: {error}",
                requested.len()
            );
            return ProductQueryResult {
                product_details: Vec::new(),
                not_found_ids: requested,
                error: Some(PlatformError::from(&error)),
            };
        }
    };

    let mut found_ids = HashSet::new();
    let mut product_details = Vec::with_capacity(products.len());
    for product in products {
        if !seen.contains(&product.id) {
            log::warn!("catalog returned unrequested product {}", product.id);
            continue;
        }
        if found_ids.insert(product.id.clone()) {
            product_details.push(ProductDetails::from(product));
        }
    }

    let not_found_ids = requested
        .into_iter()
        .filter(|id| !found_ids.contains(id))
        .collect();

    ProductQueryResult {
        product_details,
        not_found_ids,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::test_support::{native_product, FakeStore};

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[tokio::test]
    async fn test_partial_match() {
        let store = FakeStore::with_catalog(&["a"]);

        let result = query_products(&store, ids(&["a", "b"])).await;

        assert_eq!(result.product_details.len(), 1);
        assert_eq!(result.product_details[0].id, "a");
        assert_eq!(result.product_details[0].title, "a title");
        assert_eq!(result.not_found_ids, ids(&["b"]));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_found_and_not_found_partition_the_request() {
        let store = FakeStore::with_catalog(&["a", "c", "e"]);
        let requested = ids(&["a", "b", "c", "d", "a"]);

        let result = query_products(&store, requested).await;

        let found: HashSet<String> = result
            .product_details
            .iter()
            .map(|product| product.id.clone())
            .collect();
        let missing: HashSet<String> = result.not_found_ids.iter().cloned().collect();
        assert!(found.is_disjoint(&missing));
        let all: HashSet<String> = found.union(&missing).cloned().collect();
        assert_eq!(all, ids(&["a", "b", "c", "d"]).into_iter().collect());
        assert_eq!(result.not_found_ids, ids(&["b", "d"]));
    }

    #[tokio::test]
    async fn test_catalog_failure_reports_everything_missing() {
        let mut store = FakeStore::with_catalog(&["a"]);
        store.fail_products = true;

        let result = query_products(&store, ids(&["a", "b"])).await;

        assert!(result.product_details.is_empty());
        assert_eq!(result.not_found_ids, ids(&["a", "b"]));
        let error = result.error.unwrap();
        assert_eq!(error.source, "app_store");
        assert_eq!(error.code, "storekit_no_response");
        assert_eq!(error.message, "catalog unavailable");
    }

    #[test]
    fn test_native_product_mapping() {
        let details = ProductDetails::from(native_product("gold"));
        assert_eq!(details.id, "gold");
        assert_eq!(details.title, "gold title");
        assert_eq!(details.description, "gold description");
        assert_eq!(details.price, "$0.99");
        assert_eq!(details.currency_code, "USD");
        assert_eq!(details.currency_symbol, "$");
    }
}
