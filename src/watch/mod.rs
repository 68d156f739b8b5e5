// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) on the source
//!   directory and turning its events into rebuild requests.
//! - Compiling the optional `exclude` glob patterns.
//! - Hashing the source tree for `skip_unchanged`.
//!
//! It does **not** know how rebuilds are scheduled; it only sends
//! `RuntimeEvent::RebuildRequested` into the runtime.

pub mod hash;
pub mod patterns;
pub mod watcher;

pub use hash::{compute_file_hash, compute_tree_hash};
pub use patterns::ExcludeSet;
pub use watcher::{is_change, spawn_watcher, WatcherHandle};
