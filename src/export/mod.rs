//! Export sinks.
//!
//! Sinks consume every composite the worker produces, in dispatch order.

/// Sink trait and built-in sinks.
pub mod sink;
