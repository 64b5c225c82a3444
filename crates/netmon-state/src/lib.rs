//! netmon-state: Durable storage for the known host map.
//!
//! The known host set lives in a single JSON file that is fully rewritten on
//! every cycle. A missing or zero-byte file means no baseline exists yet.

pub mod store;

pub use store::{FileStateStore, StateStore, StoreError};
