//! Testing utilities for the hunt engine.
//!
//! This module provides tools for integration testing:
//! - Storage fakes covering the degradation paths
//! - Builders for spots and stories
//! - `TestHarness` for scripted walks
//! - Assertion helpers for verifying hunt state

use crate::engine::{HuntConfig, HuntSession, Notifier};
use crate::geo::Coordinate;
use crate::progress::{MemoryStore, ProgressStore, StoreError};
use crate::story::{load_spots, RawStory, RawTheme, SpotDefinition, SpotStyle};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Storage fake that is never available. Models a medium the platform
/// refuses outright (privacy mode, missing mount).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl ProgressStore for UnavailableStore {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&mut self, _key: &str) {}
}

/// Storage fake that reports available but fails every write, like a
/// medium over quota.
#[derive(Debug, Default, Clone)]
pub struct WriteFailingStore {
    inner: MemoryStore,
}

impl ProgressStore for WriteFailingStore {
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&mut self, key: &str) {
        self.inner.remove(key);
    }
}

/// In-memory storage whose contents are shared between clones, so a
/// test can inspect what a session wrote or hand the same medium to a
/// second session.
#[derive(Debug, Default, Clone)]
pub struct SharedStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for SharedStore {
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

/// Notifier that records completed spot ids into a shared log.
pub struct RecordingNotifier {
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingNotifier {
    /// Create the notifier and a handle to its log.
    pub fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (Self { log: Rc::clone(&log) }, log)
    }
}

impl Notifier for RecordingNotifier {
    fn spot_completed(&mut self, spot: &SpotDefinition) {
        self.log.borrow_mut().push(spot.id.clone());
    }
}

/// Build a spot definition at `(lat, lng)` with the given radius.
pub fn spot(id: &str, lat: f64, lng: f64, radius_m: f64) -> SpotDefinition {
    SpotDefinition {
        id: id.to_string(),
        position: Coordinate::new(lat, lng),
        style: SpotStyle {
            radius: radius_m,
            ..SpotStyle::default()
        },
        custom: None,
    }
}

/// Validate spots out of inline story JSON with no theme.
pub fn spots_from_json(story: serde_json::Value) -> Vec<SpotDefinition> {
    let story: RawStory = serde_json::from_value(story).expect("story json");
    load_spots(&story, &RawTheme::default())
}

/// Test harness: a hunt session over a shared in-memory store with a
/// recorded notification log.
pub struct TestHarness {
    /// The session under test.
    pub session: HuntSession,
    /// The store backing the session, for inspection or reuse.
    pub store: SharedStore,
    notifications: Rc<RefCell<Vec<String>>>,
}

impl TestHarness {
    /// Create a harness over a fresh in-memory medium.
    pub fn new(spots: Vec<SpotDefinition>) -> Self {
        Self::with_store(spots, SharedStore::new())
    }

    /// Create a harness reusing an existing medium, as a session
    /// restart would.
    pub fn with_store(spots: Vec<SpotDefinition>, store: SharedStore) -> Self {
        let (notifier, notifications) = RecordingNotifier::new();
        let session = HuntSession::new(HuntConfig::new("Test Hunt"), spots, Box::new(store.clone()))
            .with_notifier(Box::new(notifier));

        Self {
            session,
            store,
            notifications,
        }
    }

    /// Walk to a position, returning newly-completed ids.
    pub fn walk(&mut self, lat: f64, lng: f64) -> Vec<String> {
        self.session.on_user_position(Coordinate::new(lat, lng))
    }

    /// Every notification emitted so far, in order.
    pub fn notifications(&self) -> Vec<String> {
        self.notifications.borrow().clone()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that `id` has been completed.
#[track_caller]
pub fn assert_completed(harness: &TestHarness, id: &str) {
    assert!(
        harness.session.completed_ids().iter().any(|c| c == id),
        "Expected spot '{id}' to be completed"
    );
}

/// Assert that `id` is still pending.
#[track_caller]
pub fn assert_pending(harness: &TestHarness, id: &str) {
    assert!(
        harness.session.registry().is_pending(id),
        "Expected spot '{id}' to be pending"
    );
}
