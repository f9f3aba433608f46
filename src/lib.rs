//! Client core for the todone task service: a typed address model, a cached
//! task forest with positional ordering, the drag-and-drop move protocol, and
//! the media-library payload layer.
//!
//! The server stays authoritative for ordering; this crate keeps a local
//! cache consistent with it across optimistic mutations.

pub mod drag;
pub mod model;
pub mod net;
pub mod ops;
pub mod session;
pub mod tree;
