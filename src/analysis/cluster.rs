//! Price-level clustering (§4.3). Adapted from the teacher's "Islands"
//! sweep-merge strategy (`analysis/range_gap_finder.rs`, `models/range_gap_finder.rs`):
//! sort, then sweep forward merging neighbors within a gap tolerance. The
//! teacher's gap was an index distance; here it is a price tolerance
//! expressed as a percent of the *cluster's running minimum*, which is what
//! keeps the relation transitive — comparing against a centroid that drifts
//! as the cluster grows would let a long chain of small steps merge points
//! that are arbitrarily far apart.

use super::swing::SwingPoint;

/// One cluster: the swing points that fell within `tolerance_pct` of each
/// other, chained from the lowest price in the group.
#[derive(Debug, Clone)]
pub struct PriceCluster {
    pub points: Vec<SwingPoint>,
}

/// Groups `points` into clusters within `tolerance_pct` of each other.
/// Sorts by price ascending, then sweeps forward: a point joins the current
/// cluster iff it is within `tolerance_pct` of the cluster's minimum price
/// (the first point added to it), not of the previous point or a running
/// average. Starting a new cluster resets the comparison basis.
pub fn cluster_by_price(mut points: Vec<SwingPoint>, tolerance_pct: rust_decimal::Decimal) -> Vec<PriceCluster> {
    if points.is_empty() {
        return Vec::new();
    }

    points.sort_by(|a, b| a.price.value().cmp(&b.price.value()));

    let mut clusters: Vec<PriceCluster> = Vec::new();
    let mut current = vec![points[0]];
    let mut cluster_min = points[0].price.value();

    for point in points.into_iter().skip(1) {
        let tolerance = cluster_min * tolerance_pct / rust_decimal::Decimal::from(100);
        if point.price.value() - cluster_min <= tolerance {
            current.push(point);
        } else {
            clusters.push(PriceCluster { points: current });
            current = vec![point];
            cluster_min = point.price.value();
        }
    }
    clusters.push(PriceCluster { points: current });

    clusters
}
