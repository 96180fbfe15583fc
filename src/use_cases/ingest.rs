// Input ingestion: applies decoded intent to the world between ticks.

use crate::domain::{PlayerInput, UnknownPlayerError, World};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Applied,
    // The player is gone (or never existed); the input is discarded.
    Dropped,
}

pub fn on_intent(world: &mut World, player_id: &str, input: PlayerInput) -> IngestOutcome {
    match world.set_input(player_id, input) {
        Ok(()) => IngestOutcome::Applied,
        Err(UnknownPlayerError { player_id }) => {
            // Inputs racing a disconnect are expected; not worth more than a trace.
            trace!(%player_id, "input for unknown player dropped");
            IngestOutcome::Dropped
        }
    }
}
