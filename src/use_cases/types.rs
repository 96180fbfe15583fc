// Use-case level inputs/outputs for the game loop.

use crate::domain::{CoinSnapshot, PlayerId, PlayerInput, PlayerSnapshot};
use axum::extract::ws::Utf8Bytes;
use tokio::sync::{mpsc, oneshot};

/// Requests from connection tasks to the world task.
#[derive(Debug)]
pub enum GameEvent {
    // Register a new connection; the world replies with the assigned player id.
    Join {
        outbound: mpsc::Sender<Utf8Bytes>,
        reply: oneshot::Sender<PlayerId>,
    },
    Leave {
        player_id: PlayerId,
    },
    Input {
        player_id: PlayerId,
        input: PlayerInput,
    },
}

/// Point-in-time copy of the world produced once per tick.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub tick: u64,
    /// Wall-clock milliseconds since the Unix epoch at production time.
    pub timestamp: u64,
    pub players: Vec<PlayerSnapshot>,
    pub coins: Vec<CoinSnapshot>,
}
