//! HuntSession - the primary public API for running a hunt.
//!
//! A session owns the geofence registry, the progress record, the
//! storage capability, and the last known user position. Position
//! events are explicit method calls processed run-to-completion, so no
//! locking is needed and multiple sessions can coexist.

use crate::geo::{distance_meters, Coordinate};
use crate::progress::{self, ProgressRecord, ProgressStore, DEFAULT_STORAGE_KEY};
use crate::registry::GeofenceRegistry;
use crate::story::SpotDefinition;
use uuid::Uuid;

/// Collaborator notified once per newly-completed spot, in emission
/// order. The frontend turns this into whatever its UI shows.
pub trait Notifier {
    fn spot_completed(&mut self, spot: &SpotDefinition);
}

/// Notifier that does nothing. The default when no frontend is
/// attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn spot_completed(&mut self, _spot: &SpotDefinition) {}
}

/// Configuration for creating a hunt session.
#[derive(Debug, Clone)]
pub struct HuntConfig {
    /// Display name for the hunt.
    pub hunt_name: String,

    /// Namespaced key under which progress is stored.
    pub storage_key: String,
}

impl HuntConfig {
    /// Create a config with the given hunt name and default storage key.
    pub fn new(hunt_name: impl Into<String>) -> Self {
        Self {
            hunt_name: hunt_name.into(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Set the storage key. Use distinct keys to keep several hunts'
    /// progress apart in one medium.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self::new("Scavenger Hunt")
    }
}

/// A scavenger-hunt session.
///
/// Completion policy is any-eligible: every pending geofence in range
/// of a position sample completes in the same pass, in story order.
pub struct HuntSession {
    session_id: Uuid,
    config: HuntConfig,
    registry: GeofenceRegistry,
    record: ProgressRecord,
    store: Box<dyn ProgressStore>,
    notifier: Box<dyn Notifier>,
    last_position: Option<Coordinate>,
}

impl HuntSession {
    /// Create a session from validated spots, restoring any progress
    /// stored under the configured key.
    ///
    /// Restored ids with no matching spot are kept in the record (a
    /// story may have changed between sessions) but produce no
    /// geofence.
    pub fn new(
        config: HuntConfig,
        spots: Vec<SpotDefinition>,
        store: Box<dyn ProgressStore>,
    ) -> Self {
        let record = progress::load_progress(store.as_ref(), &config.storage_key);
        let registry = GeofenceRegistry::build(spots, &record.completed_spot_ids);
        let session_id = Uuid::new_v4();

        tracing::info!(
            %session_id,
            hunt = %config.hunt_name,
            spots = registry.len(),
            restored = record.completed_spot_ids.len(),
            "hunt session created"
        );

        Self {
            session_id,
            config,
            registry,
            record,
            store,
            notifier: Box::new(NullNotifier),
            last_position: None,
        }
    }

    /// Attach a notifier collaborator.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Feed a device-location update.
    ///
    /// Returns the newly-completed spot ids in story order; an id is
    /// reported at most once over the life of the session.
    pub fn on_user_position(&mut self, position: Coordinate) -> Vec<String> {
        self.last_position = Some(position);
        self.evaluate(position)
    }

    /// Feed a map click. Same evaluation path as a location update.
    pub fn on_map_click(&mut self, position: Coordinate) -> Vec<String> {
        self.on_user_position(position)
    }

    fn evaluate(&mut self, position: Coordinate) -> Vec<String> {
        let in_range: Vec<String> = self
            .registry
            .iter()
            .filter(|f| !f.completed)
            .filter(|f| distance_meters(f.spot.position, position) <= f.spot.radius_m())
            .map(|f| f.spot.id.clone())
            .collect();

        let mut newly_completed = Vec::with_capacity(in_range.len());
        for id in in_range {
            if self.registry.mark_completed(&id) && self.record.record_completion(&id) {
                newly_completed.push(id);
            }
        }

        if !newly_completed.is_empty() {
            progress::save_progress(
                self.store.as_mut(),
                &self.config.storage_key,
                &self.record,
            );
            for id in &newly_completed {
                tracing::info!(session_id = %self.session_id, spot = %id, "spot completed");
                if let Some(fence) = self.registry.get(id) {
                    self.notifier.spot_completed(&fence.spot);
                }
            }
        }

        newly_completed
    }

    /// Per-spot distance from `position`, in story order, completed
    /// spots included.
    pub fn distances_from(&self, position: Coordinate) -> Vec<(String, f64)> {
        self.registry
            .iter()
            .map(|f| {
                (
                    f.spot.id.clone(),
                    distance_meters(f.spot.position, position),
                )
            })
            .collect()
    }

    /// Persist the current record. Evaluation already saves after every
    /// completion; this is for explicit checkpoints.
    pub fn save(&mut self) {
        progress::save_progress(self.store.as_mut(), &self.config.storage_key, &self.record);
    }

    /// Clear stored progress and revert every geofence to pending.
    pub fn reset_progress(&mut self) {
        progress::clear_progress(self.store.as_mut(), &self.config.storage_key);
        self.record = ProgressRecord::default();
        self.registry.reset();
        tracing::info!(session_id = %self.session_id, "progress reset");
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn hunt_name(&self) -> &str {
        &self.config.hunt_name
    }

    /// The most recent position sample, if any. Latest wins; no track
    /// history is kept.
    pub fn last_position(&self) -> Option<Coordinate> {
        self.last_position
    }

    /// Ids still pending, in story order.
    pub fn pending_ids(&self) -> Vec<String> {
        self.registry.pending_ids()
    }

    /// Ids completed so far, in story order.
    pub fn completed_ids(&self) -> Vec<String> {
        self.registry.completed_ids()
    }

    /// Whether every geofence has completed.
    pub fn is_complete(&self) -> bool {
        !self.registry.is_empty() && self.registry.pending_ids().is_empty()
    }

    /// The merged progress record as it would be persisted.
    pub fn progress(&self) -> &ProgressRecord {
        &self.record
    }

    /// The live geofence set.
    pub fn registry(&self) -> &GeofenceRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{load_progress, MemoryStore};
    use crate::testing::{spot, RecordingNotifier, SharedStore, UnavailableStore, WriteFailingStore};

    fn session_with(spots: Vec<SpotDefinition>) -> HuntSession {
        HuntSession::new(
            HuntConfig::new("Test Hunt"),
            spots,
            Box::new(MemoryStore::new()),
        )
    }

    #[test]
    fn test_completion_within_radius_fires_once() {
        let mut session = session_with(vec![spot("a", 45.0, 2.0, 5.0)]);

        // ~3.3 m away from the spot center
        let near = Coordinate::new(45.00003, 2.0);

        assert_eq!(session.on_user_position(near), vec!["a"]);
        assert_eq!(session.on_user_position(near), Vec::<String>::new());
        assert!(session.is_complete());
    }

    #[test]
    fn test_out_of_range_position_completes_nothing() {
        let mut session = session_with(vec![spot("a", 45.0, 2.0, 5.0)]);

        // ~111 m away
        let far = Coordinate::new(45.001, 2.0);

        assert!(session.on_user_position(far).is_empty());
        assert_eq!(session.pending_ids(), vec!["a"]);
    }

    #[test]
    fn test_overlapping_geofences_complete_in_story_order() {
        let mut session = session_with(vec![
            spot("first", 45.0, 2.0, 50.0),
            spot("second", 45.0001, 2.0, 50.0),
        ]);

        let between = Coordinate::new(45.00005, 2.0);
        assert_eq!(session.on_user_position(between), vec!["first", "second"]);
    }

    #[test]
    fn test_map_click_uses_same_evaluation_path() {
        let mut session = session_with(vec![spot("a", 45.0, 2.0, 5.0)]);

        assert_eq!(session.on_map_click(Coordinate::new(45.0, 2.0)), vec!["a"]);
        assert_eq!(session.last_position(), Some(Coordinate::new(45.0, 2.0)));
    }

    #[test]
    fn test_restored_progress_never_refires() {
        let mut store = MemoryStore::new();
        let mut record = ProgressRecord::default();
        record.record_completion("a");
        progress::save_progress(&mut store, DEFAULT_STORAGE_KEY, &record);

        let mut session = HuntSession::new(
            HuntConfig::new("Test Hunt"),
            vec![spot("a", 45.0, 2.0, 5.0), spot("b", 45.1, 2.0, 5.0)],
            Box::new(store),
        );

        // Standing right on the restored spot reports nothing
        assert!(session.on_user_position(Coordinate::new(45.0, 2.0)).is_empty());
        assert_eq!(session.pending_ids(), vec!["b"]);
    }

    #[test]
    fn test_unknown_restored_id_is_retained_across_saves() {
        let mut store = MemoryStore::new();
        let mut record = ProgressRecord::default();
        record.record_completion("removed_last_season");
        progress::save_progress(&mut store, DEFAULT_STORAGE_KEY, &record);

        let mut session = HuntSession::new(
            HuntConfig::new("Test Hunt"),
            vec![spot("a", 45.0, 2.0, 5.0)],
            Box::new(store),
        );

        assert_eq!(session.on_user_position(Coordinate::new(45.0, 2.0)), vec!["a"]);

        // The stale id survives in the session record after the save
        assert!(session.progress().contains("removed_last_season"));
        assert!(session.progress().contains("a"));
        // ...but never surfaced as a geofence
        assert!(session.registry().get("removed_last_season").is_none());
    }

    #[test]
    fn test_notifier_called_once_per_completion() {
        let (notifier, log) = RecordingNotifier::new();
        let mut session = HuntSession::new(
            HuntConfig::new("Test Hunt"),
            vec![spot("a", 45.0, 2.0, 50.0), spot("b", 45.0001, 2.0, 50.0)],
            Box::new(MemoryStore::new()),
        )
        .with_notifier(Box::new(notifier));

        session.on_user_position(Coordinate::new(45.00005, 2.0));
        session.on_user_position(Coordinate::new(45.00005, 2.0));

        assert_eq!(log.borrow().as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_unavailable_storage_keeps_session_in_memory() {
        let mut session = HuntSession::new(
            HuntConfig::new("Test Hunt"),
            vec![spot("a", 45.0, 2.0, 5.0)],
            Box::new(UnavailableStore),
        );

        assert_eq!(session.on_user_position(Coordinate::new(45.0, 2.0)), vec!["a"]);
        assert!(session.is_complete());
    }

    #[test]
    fn test_failing_write_does_not_panic_or_lose_state() {
        let mut session = HuntSession::new(
            HuntConfig::new("Test Hunt"),
            vec![spot("a", 45.0, 2.0, 5.0)],
            Box::new(WriteFailingStore::default()),
        );

        assert_eq!(session.on_user_position(Coordinate::new(45.0, 2.0)), vec!["a"]);
        assert_eq!(session.completed_ids(), vec!["a"]);
    }

    #[test]
    fn test_completion_is_persisted_through_the_store() {
        let store = SharedStore::new();

        let mut session = HuntSession::new(
            HuntConfig::new("Test Hunt"),
            vec![spot("a", 45.0, 2.0, 5.0)],
            Box::new(store.clone()),
        );
        session.on_user_position(Coordinate::new(45.0, 2.0));

        let stored = load_progress(&store, DEFAULT_STORAGE_KEY);
        assert_eq!(stored.completed_spot_ids, vec!["a"]);

        // A second session over the same medium restores it
        let mut next = HuntSession::new(
            HuntConfig::new("Test Hunt"),
            vec![spot("a", 45.0, 2.0, 5.0)],
            Box::new(store.clone()),
        );
        assert!(next.on_user_position(Coordinate::new(45.0, 2.0)).is_empty());
    }

    #[test]
    fn test_reset_progress_reverts_everything() {
        let mut session = session_with(vec![spot("a", 45.0, 2.0, 5.0)]);
        session.on_user_position(Coordinate::new(45.0, 2.0));
        assert!(session.is_complete());

        session.reset_progress();

        assert_eq!(session.pending_ids(), vec!["a"]);
        assert!(session.progress().is_empty());
        // The spot fires again after a reset
        assert_eq!(session.on_user_position(Coordinate::new(45.0, 2.0)), vec!["a"]);
    }

    #[test]
    fn test_distances_from_reports_all_spots_in_order() {
        let session = session_with(vec![
            spot("near", 45.0, 2.0, 5.0),
            spot("far", 46.0, 2.0, 5.0),
        ]);

        let distances = session.distances_from(Coordinate::new(45.0, 2.0));
        assert_eq!(distances.len(), 2);
        assert_eq!(distances[0].0, "near");
        assert!(distances[0].1 < 0.2);
        assert!(distances[1].1 > 100_000.0);
    }

    #[test]
    fn test_empty_hunt_is_never_complete() {
        let session = session_with(Vec::new());
        assert!(!session.is_complete());
    }
}
