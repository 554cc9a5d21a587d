//! Page data model.

/// Pages, backdrops, and the shared composite slot.
pub mod model;
