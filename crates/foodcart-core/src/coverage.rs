//! Coverage matching: which restaurants can cook every product of an order.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::snapshot::{MenuAvailabilityRecord, OrderRequirement};

/// Collapses an order's product multiset into its distinct products.
#[must_use]
pub fn distinct_products(order: &OrderRequirement) -> HashSet<i64> {
    order.required_product_ids.iter().copied().collect()
}

/// Returns the restaurants whose available menu covers every distinct product
/// required by `order`.
///
/// Coverage is tracked per restaurant as a set of distinct products, so
/// duplicate availability rows for the same product count once. Rows with
/// `available == false` are ignored. An order with no products has no
/// candidates.
#[must_use]
pub fn matching_restaurants(
    order: &OrderRequirement,
    availability: &[MenuAvailabilityRecord],
) -> BTreeSet<i64> {
    let required = distinct_products(order);
    if required.is_empty() {
        return BTreeSet::new();
    }

    let mut covered: HashMap<i64, HashSet<i64>> = HashMap::new();
    for record in availability
        .iter()
        .filter(|r| r.available && required.contains(&r.product_id))
    {
        covered
            .entry(record.restaurant_id)
            .or_default()
            .insert(record.product_id);
    }

    covered
        .into_iter()
        .filter(|(_, products)| products.len() == required.len())
        .map(|(restaurant_id, _)| restaurant_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: i64 = 1;
    const B: i64 = 2;
    const C: i64 = 3;

    fn order(products: &[i64]) -> OrderRequirement {
        OrderRequirement {
            order_id: 100,
            delivery_address: "Moscow, Red Square".to_string(),
            required_product_ids: products.to_vec(),
        }
    }

    fn offer(restaurant_id: i64, product_id: i64) -> MenuAvailabilityRecord {
        MenuAvailabilityRecord {
            restaurant_id,
            product_id,
            available: true,
        }
    }

    #[test]
    fn superset_menu_matches() {
        let menu = [offer(10, A), offer(10, B), offer(10, C)];
        assert_eq!(
            matching_restaurants(&order(&[A, B]), &menu),
            BTreeSet::from([10])
        );
    }

    #[test]
    fn partial_menu_does_not_match() {
        let menu = [offer(20, A)];
        assert!(matching_restaurants(&order(&[A, B]), &menu).is_empty());
    }

    #[test]
    fn duplicate_rows_do_not_inflate_coverage() {
        let menu = [offer(30, A), offer(30, A)];
        assert!(matching_restaurants(&order(&[A, B]), &menu).is_empty());
    }

    #[test]
    fn duplicate_order_lines_collapse() {
        let menu = [offer(10, A), offer(10, B), offer(20, A)];
        let matched = matching_restaurants(&order(&[A, A, B, B]), &menu);
        assert_eq!(matched, BTreeSet::from([10]));
    }

    #[test]
    fn unavailable_rows_are_ignored() {
        let mut stale = offer(10, B);
        stale.available = false;
        let menu = [offer(10, A), stale];
        assert!(matching_restaurants(&order(&[A, B]), &menu).is_empty());
    }

    #[test]
    fn empty_order_has_no_candidates() {
        let menu = [offer(10, A), offer(20, B)];
        assert!(matching_restaurants(&order(&[]), &menu).is_empty());
    }

    #[test]
    fn several_restaurants_can_match() {
        let menu = [
            offer(10, A),
            offer(10, B),
            offer(20, B),
            offer(20, A),
            offer(30, A),
        ];
        assert_eq!(
            matching_restaurants(&order(&[B, A]), &menu),
            BTreeSet::from([10, 20])
        );
    }

    #[test]
    fn distinct_products_collapses_multiset() {
        assert_eq!(distinct_products(&order(&[A, A, C])), HashSet::from([A, C]));
    }
}
