//! Location-based scavenger-hunt engine.
//!
//! This crate provides:
//! - Great-circle proximity math for circular geofences
//! - Story/theme ingestion with per-entry validation
//! - Exactly-once completion semantics, restored across sessions
//! - Best-effort progress persistence over a pluggable store
//!
//! # Quick Start
//!
//! ```
//! use hunt_core::geo::Coordinate;
//! use hunt_core::story::{load_spots, RawStory, RawTheme};
//! use hunt_core::{HuntConfig, HuntSession, MemoryStore};
//!
//! let story = RawStory::from_json(
//!     r#"{ "spots": [ { "id": "fountain", "lat": 45.0, "lng": 2.0 } ] }"#,
//! )?;
//! let spots = load_spots(&story, &RawTheme::default());
//!
//! let mut session = HuntSession::new(
//!     HuntConfig::new("Old Town Hunt"),
//!     spots,
//!     Box::new(MemoryStore::new()),
//! );
//!
//! let completed = session.on_user_position(Coordinate::new(45.0, 2.0));
//! assert_eq!(completed, vec!["fountain".to_string()]);
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod engine;
pub mod geo;
pub mod progress;
pub mod registry;
pub mod story;
pub mod testing;

// Primary public API
pub use engine::{HuntConfig, HuntSession, Notifier, NullNotifier};
pub use geo::{distance_meters, Coordinate};
pub use progress::{
    FileStore, MemoryStore, ProgressRecord, ProgressStore, StoreError, DEFAULT_STORAGE_KEY,
};
pub use registry::{GeofenceRegistry, GeofenceState};
pub use story::{load_spots, RawStory, RawTheme, SpotDefinition, SpotStyle};
