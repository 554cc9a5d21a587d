//! Drawing surface seam.

/// Traits the session drives the live surface through.
pub mod adapter;
/// Reference polyline surface rasterized with `vello_cpu`.
pub mod vector;
