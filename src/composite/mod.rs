//! Template/stroke compositing and the background worker that drives it.
//!
//! Saves hand a snapshot to the worker, which composes, JPEG-encodes, and exports it in
//! dispatch order.

/// Pure template-under-strokes merge.
pub mod compositor;
/// JPEG encoding and template decoding.
pub mod encode;
/// Last-write-wins composite/export worker.
pub mod worker;
