//! Per-order assembly of coverage matching and distance ranking.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::coverage::matching_restaurants;
use crate::distance::{rank_candidates, Candidate};
use crate::places::GeoPoint;
use crate::snapshot::{MenuAvailabilityRecord, OrderRequirement, Restaurant};

/// One candidate restaurant for one order, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub order_id: i64,
    pub candidate_restaurant_id: i64,
    pub distance_km: Option<f64>,
    /// `true` when no numeric distance could be computed.
    pub unresolved_label: bool,
    pub label: String,
}

/// Ranked candidates for a single order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderMatches {
    pub order_id: i64,
    pub delivery_address: String,
    pub results: Vec<MatchResult>,
}

/// Distinct, non-blank addresses that must be resolved before matching:
/// every order's delivery address plus the address of every restaurant with
/// at least one available menu row.
#[must_use]
pub fn addresses_to_resolve(
    orders: &[OrderRequirement],
    availability: &[MenuAvailabilityRecord],
    restaurants: &[Restaurant],
) -> BTreeSet<String> {
    let stocked: BTreeSet<i64> = availability
        .iter()
        .filter(|r| r.available)
        .map(|r| r.restaurant_id)
        .collect();

    orders
        .iter()
        .map(|o| o.delivery_address.as_str())
        .chain(
            restaurants
                .iter()
                .filter(|r| stocked.contains(&r.id))
                .map(|r| r.address.as_str()),
        )
        .filter(|address| !address.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

/// Runs coverage matching and distance ranking for every order.
///
/// `coordinates` maps addresses to cached outcomes; an address missing from
/// the map is treated the same as one cached as unresolved. Output preserves
/// the order of `orders`.
#[must_use]
pub fn match_orders(
    orders: &[OrderRequirement],
    availability: &[MenuAvailabilityRecord],
    restaurants: &[Restaurant],
    coordinates: &HashMap<String, Option<GeoPoint>>,
) -> Vec<OrderMatches> {
    let coordinate_of = |address: &str| coordinates.get(address).copied().flatten();

    let restaurant_coordinates: HashMap<i64, Option<GeoPoint>> = restaurants
        .iter()
        .map(|r| (r.id, coordinate_of(&r.address)))
        .collect();

    orders
        .iter()
        .map(|order| {
            let candidates: Vec<Candidate> = matching_restaurants(order, availability)
                .into_iter()
                .map(|restaurant_id| Candidate {
                    restaurant_id,
                    coordinate: restaurant_coordinates
                        .get(&restaurant_id)
                        .copied()
                        .flatten(),
                })
                .collect();

            let order_coordinate = coordinate_of(&order.delivery_address);
            let results = rank_candidates(order_coordinate.as_ref(), &candidates)
                .into_iter()
                .map(|ranked| MatchResult {
                    order_id: order.order_id,
                    candidate_restaurant_id: ranked.restaurant_id,
                    unresolved_label: ranked.distance_km.is_none(),
                    distance_km: ranked.distance_km,
                    label: ranked.label,
                })
                .collect();

            OrderMatches {
                order_id: order.order_id,
                delivery_address: order.delivery_address.clone(),
                results,
            }
        })
        .collect()
}
