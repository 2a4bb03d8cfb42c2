//! Ownership resolution
//!
//! Walks owner references upward from an object, reduces the resulting graph to
//! the nearest owners and picks a single parent for display.

pub mod graph;
pub mod picker;

pub use graph::{FetchPolicy, OwnershipGraph, WalkLimits};
pub use picker::{OwnerPick, pick_owner};
