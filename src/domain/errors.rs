// Domain-level errors for world mutations.

use super::state::PlayerId;

/// An intent referenced a player that is not (or no longer) in the world.
///
/// Expected when a disconnect races an in-flight input; callers drop it quietly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlayerError {
    pub player_id: PlayerId,
}
