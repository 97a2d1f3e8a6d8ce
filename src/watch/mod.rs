// src/watch/mod.rs

//! Change detection for deployed sources.
//!
//! - [`watcher`] forwards `notify` events for the directories of watched
//!   files into the runtime.
//! - [`hash`] fingerprints file contents so unchanged files can be skipped.

pub mod hash;
pub mod watcher;

pub use hash::{compute_file_hash, is_unchanged};
pub use watcher::{spawn_watcher, WatcherHandle};
