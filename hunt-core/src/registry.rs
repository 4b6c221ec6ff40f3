//! The live geofence set of a hunt session.

use crate::geo::Coordinate;
use crate::story::SpotDefinition;

/// A spot plus its completion flag.
#[derive(Debug, Clone)]
pub struct GeofenceState {
    /// The validated spot this geofence guards.
    pub spot: SpotDefinition,

    /// Whether the geofence has been entered. Monotonic, never reverts.
    pub completed: bool,
}

/// All geofences of a session, in story order.
#[derive(Debug, Clone, Default)]
pub struct GeofenceRegistry {
    fences: Vec<GeofenceState>,
}

impl GeofenceRegistry {
    /// Build the registry from validated spots. Ids listed in
    /// `restored_ids` start out completed and will never re-trigger;
    /// restored ids with no matching spot have no effect here.
    pub fn build(spots: Vec<SpotDefinition>, restored_ids: &[String]) -> Self {
        let fences = spots
            .into_iter()
            .map(|spot| {
                let completed = restored_ids.iter().any(|id| *id == spot.id);
                GeofenceState { spot, completed }
            })
            .collect();
        Self { fences }
    }

    /// Mark `id` completed. Idempotent: returns true only on the
    /// pending to completed transition.
    pub fn mark_completed(&mut self, id: &str) -> bool {
        match self.fences.iter_mut().find(|f| f.spot.id == id) {
            Some(fence) if !fence.completed => {
                fence.completed = true;
                true
            }
            _ => false,
        }
    }

    /// Whether `id` exists and has not completed yet.
    pub fn is_pending(&self, id: &str) -> bool {
        self.get(id).map(|f| !f.completed).unwrap_or(false)
    }

    /// Look up a geofence by spot id.
    pub fn get(&self, id: &str) -> Option<&GeofenceState> {
        self.fences.iter().find(|f| f.spot.id == id)
    }

    /// Ids still pending, in story order.
    pub fn pending_ids(&self) -> Vec<String> {
        self.fences
            .iter()
            .filter(|f| !f.completed)
            .map(|f| f.spot.id.clone())
            .collect()
    }

    /// Ids already completed, in story order.
    pub fn completed_ids(&self) -> Vec<String> {
        self.fences
            .iter()
            .filter(|f| f.completed)
            .map(|f| f.spot.id.clone())
            .collect()
    }

    /// Iterate all geofences in story order.
    pub fn iter(&self) -> impl Iterator<Item = &GeofenceState> {
        self.fences.iter()
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }

    /// Corner coordinates covering every spot, for fit-to-bounds
    /// display. None when the registry is empty.
    pub fn bounding_box(&self) -> Option<(Coordinate, Coordinate)> {
        let first = self.fences.first()?.spot.position;
        let mut south_west = first;
        let mut north_east = first;

        for fence in &self.fences[1..] {
            let p = fence.spot.position;
            south_west.lat = south_west.lat.min(p.lat);
            south_west.lng = south_west.lng.min(p.lng);
            north_east.lat = north_east.lat.max(p.lat);
            north_east.lng = north_east.lng.max(p.lng);
        }
        Some((south_west, north_east))
    }

    /// Revert every geofence to pending. Only the session's progress
    /// reset path uses this.
    pub(crate) fn reset(&mut self) {
        for fence in &mut self.fences {
            fence.completed = false;
        }
    }
}
