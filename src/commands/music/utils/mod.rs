//! Helpers shared by the music commands.

/// Errors raised while resolving user input.
pub mod errors;
/// Expansion of classified references into search terms.
pub mod media_resolver;
