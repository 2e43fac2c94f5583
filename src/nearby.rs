//! Radius filter behind "View Stores within 30 miles" and the order flow.
//! Coordinates are treated as points on a plane; no great-circle correction.

use crate::models::{NearbyStore, Store, User};

/// Stores farther than this from the user are hidden. Same unit as the stored
/// coordinates, which the UI calls miles.
pub const NEARBY_RADIUS: f64 = 30.0;

/// Planar Euclidean distance between two coordinate pairs.
pub fn distance(lat1: f64, long1: f64, lat2: f64, long2: f64) -> f64 {
    let dlat = lat1 - lat2;
    let dlong = long1 - long2;
    (dlat * dlat + dlong * dlong).sqrt()
}

/// Keep the stores within `radius` of the user, in table order.
pub fn stores_within(user: &User, stores: Vec<Store>, radius: f64) -> Vec<NearbyStore> {
    stores
        .into_iter()
        .filter_map(|store| {
            let distance = distance(user.latitude, user.longitude, store.latitude, store.longitude);
            (distance <= radius).then_some(NearbyStore { store, distance })
        })
        .collect()
}
