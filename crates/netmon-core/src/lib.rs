//! netmon-core: Host identity types and the pure scan bookkeeping for netmon.
//!
//! This crate provides the pieces of a monitoring cycle that never touch the
//! network or the filesystem:
//! - `HostMap`, the MAC -> IP snapshot of everything seen on the segment
//! - Diffing a fresh observation against known state
//! - Merging an observation into known state
//! - Notification and cycle report values

pub mod diff;
pub mod events;
pub mod types;

pub use diff::{merge, HostDiff, HostMove};
pub use events::{CycleKind, CycleReport, NotificationEvent, NOTIFICATION_TITLE};
pub use types::{HostMap, HostRecord};
