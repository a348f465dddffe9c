//! Load and save the aggregate [`BrownfieldState`](brownfield_model::BrownfieldState).
//!
//! The state file is the single source of truth shared between invocations.
//! Writes are atomic; older schema versions are migrated on load.

mod migration;
mod store;

pub use migration::{LEGACY_SCHEMA_VERSION, Migration, migrate_value};
pub use store::StateStore;
