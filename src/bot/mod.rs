//! Bot-level plumbing: the channel gate, the chat platform seam and the
//! session lifecycle.

/// Channel restriction evaluated before every command.
pub mod gate;
/// Command registration and sync state machine.
pub mod lifecycle;
/// The chat platform operations the lifecycle relies on.
pub mod platform;
