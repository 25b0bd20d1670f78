//! Capsule ranking service.
//!
//! Transforms an unordered collection of list projections into a total
//! order under the active sort policy, given a fixed reference coordinate.
//! Pure function of its inputs: re-invoked whenever the capsule collection
//! or the policy changes.

use capsule_types::{GeoPoint, ListCapsuleCellItem, SortPolicy};

/// Order `items` under `policy`.
///
/// All four sorts are stable, so items with equal keys keep their input
/// order. Distances are great-circle meters from `reference`; date sorts
/// use the commemorated memory date. Empty input yields empty output.
#[must_use]
pub fn rank(
    mut items: Vec<ListCapsuleCellItem>,
    reference: GeoPoint,
    policy: SortPolicy,
) -> Vec<ListCapsuleCellItem> {
    // GeoPoint guarantees finite coordinates, so total_cmp is a plain
    // numeric order here.
    match policy {
        SortPolicy::Nearest => items.sort_by(|a, b| {
            a.coordinate
                .distance_to(reference)
                .total_cmp(&b.coordinate.distance_to(reference))
        }),
        SortPolicy::Furthest => items.sort_by(|a, b| {
            b.coordinate
                .distance_to(reference)
                .total_cmp(&a.coordinate.distance_to(reference))
        }),
        SortPolicy::Latest => items.sort_by(|a, b| b.memory_date.cmp(&a.memory_date)),
        SortPolicy::Oldest => items.sort_by(|a, b| a.memory_date.cmp(&b.memory_date)),
    }
    items
}
