//! Session state machine.

/// The drawing session and its intents.
pub mod drawing_session;
/// Session options.
pub mod opts;
/// Shell-facing view state.
pub mod view;
