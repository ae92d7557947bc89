//! Distance ranking of candidate restaurants for one order.

use std::cmp::Ordering;

use geo::{Distance, Geodesic};
use serde::Serialize;

use crate::places::GeoPoint;

/// Label used for every candidate when the order's own address did not geocode.
pub const ORDER_ADDRESS_NOT_RECOGNIZED: &str = "address not recognized";

/// Label used for a candidate whose restaurant address did not geocode.
pub const RESTAURANT_ADDRESS_NOT_RECOGNIZED: &str = "restaurant address not recognized";

/// A restaurant that covers an order, with its cached coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub restaurant_id: i64,
    pub coordinate: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub restaurant_id: i64,
    /// Kilometres rounded to three decimal places.
    pub distance_km: Option<f64>,
    pub label: String,
}

/// Ellipsoidal (WGS-84) distance between two points, in kilometres.
#[must_use]
pub fn geodesic_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    Geodesic.distance(a.to_point(), b.to_point()) / 1000.0
}

fn round_km(km: f64) -> f64 {
    (km * 1000.0).round() / 1000.0
}

/// Orders `candidates` by distance from `order_coordinate`.
///
/// With an unresolved order every candidate carries
/// [`ORDER_ADDRESS_NOT_RECOGNIZED`] and the output is ordered by restaurant id.
/// Otherwise candidates are sorted by numeric distance, ties by id, and
/// candidates with an unresolved restaurant address come last.
#[must_use]
pub fn rank_candidates(
    order_coordinate: Option<&GeoPoint>,
    candidates: &[Candidate],
) -> Vec<RankedCandidate> {
    let Some(origin) = order_coordinate else {
        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .map(|c| RankedCandidate {
                restaurant_id: c.restaurant_id,
                distance_km: None,
                label: ORDER_ADDRESS_NOT_RECOGNIZED.to_string(),
            })
            .collect();
        ranked.sort_by_key(|r| r.restaurant_id);
        return ranked;
    };

    let mut measured: Vec<(i64, Option<f64>)> = candidates
        .iter()
        .map(|c| {
            (
                c.restaurant_id,
                c.coordinate.as_ref().map(|dest| geodesic_km(origin, dest)),
            )
        })
        .collect();

    measured.sort_by(|(id_a, km_a), (id_b, km_b)| {
        let by_distance = match (km_a, km_b) {
            (Some(a), Some(b)) => a.total_cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_distance.then_with(|| id_a.cmp(id_b))
    });

    measured
        .into_iter()
        .map(|(restaurant_id, km)| match km {
            Some(km) => {
                let rounded = round_km(km);
                RankedCandidate {
                    restaurant_id,
                    distance_km: Some(rounded),
                    label: format!("{rounded:.3} km"),
                }
            }
            None => RankedCandidate {
                restaurant_id,
                distance_km: None,
                label: RESTAURANT_ADDRESS_NOT_RECOGNIZED.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn point(lat: &str, lon: &str) -> GeoPoint {
        GeoPoint::new(Decimal::from_str(lat).unwrap(), Decimal::from_str(lon).unwrap())
    }

    /// A point `km` kilometres due north of the equator/prime-meridian origin.
    ///
    /// One degree of latitude at the equator is about 110.574 km on WGS-84.
    fn north_of_origin(km: f64) -> GeoPoint {
        let degrees = km / 110.574;
        GeoPoint::new(
            Decimal::from_str(&format!("{degrees:.3}")).unwrap(),
            Decimal::ZERO,
        )
    }

    fn origin() -> GeoPoint {
        point("0", "0")
    }

    fn candidate(id: i64, coordinate: Option<GeoPoint>) -> Candidate {
        Candidate {
            restaurant_id: id,
            coordinate,
        }
    }

    #[test]
    fn geodesic_km_is_zero_for_identical_points() {
        let p = point("55.751", "37.618");
        assert!(geodesic_km(&p, &p).abs() < 1e-9);
    }

    #[test]
    fn geodesic_km_matches_known_city_distance() {
        // Moscow (Red Square) to Saint Petersburg (Palace Square), ~634 km.
        let moscow = point("55.754", "37.620");
        let spb = point("59.939", "30.316");
        let km = geodesic_km(&moscow, &spb);
        assert!((630.0..640.0).contains(&km), "unexpected distance {km}");
    }

    #[test]
    fn geodesic_km_is_symmetric() {
        let a = point("55.754", "37.620");
        let b = point("55.700", "37.500");
        assert!((geodesic_km(&a, &b) - geodesic_km(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_numeric_not_lexicographic() {
        let candidates = [
            candidate(1, Some(north_of_origin(9.5))),
            candidate(2, Some(north_of_origin(10.2))),
            candidate(3, Some(north_of_origin(2.1))),
        ];
        let ranked = rank_candidates(Some(&origin()), &candidates);

        let ids: Vec<i64> = ranked.iter().map(|r| r.restaurant_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let distances: Vec<f64> = ranked.iter().filter_map(|r| r.distance_km).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert!((distances[0] - 2.1).abs() < 0.1);
        assert!((distances[2] - 10.2).abs() < 0.1);
    }

    #[test]
    fn distances_are_rounded_to_three_places() {
        let ranked = rank_candidates(
            Some(&origin()),
            &[candidate(1, Some(north_of_origin(3.2)))],
        );
        let km = ranked[0].distance_km.unwrap();
        assert!((km * 1000.0 - (km * 1000.0).round()).abs() < 1e-6);
        assert_eq!(ranked[0].label, format!("{km:.3} km"));
    }

    #[test]
    fn unresolved_order_labels_every_candidate() {
        let candidates = [
            candidate(7, Some(point("55.7", "37.6"))),
            candidate(3, None),
        ];
        let ranked = rank_candidates(None, &candidates);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].restaurant_id, 3);
        assert_eq!(ranked[1].restaurant_id, 7);
        assert!(ranked.iter().all(|r| r.distance_km.is_none()));
        assert!(ranked
            .iter()
            .all(|r| r.label == ORDER_ADDRESS_NOT_RECOGNIZED));
    }

    #[test]
    fn unresolved_restaurant_goes_last() {
        let candidates = [
            candidate(1, None),
            candidate(2, Some(north_of_origin(50.0))),
            candidate(3, Some(north_of_origin(1.0))),
        ];
        let ranked = rank_candidates(Some(&origin()), &candidates);

        let ids: Vec<i64> = ranked.iter().map(|r| r.restaurant_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(ranked[2].label, RESTAURANT_ADDRESS_NOT_RECOGNIZED);
        assert!(ranked[2].distance_km.is_none());
    }

    #[test]
    fn equal_distances_tie_break_on_id() {
        let same = Some(north_of_origin(4.0));
        let ranked = rank_candidates(Some(&origin()), &[candidate(9, same), candidate(4, same)]);
        assert_eq!(ranked[0].restaurant_id, 4);
        assert_eq!(ranked[1].restaurant_id, 9);
    }

    #[test]
    fn no_candidates_yields_empty_ranking() {
        assert!(rank_candidates(Some(&origin()), &[]).is_empty());
        assert!(rank_candidates(None, &[]).is_empty());
    }
}
