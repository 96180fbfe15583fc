// Wire protocol DTOs and conversions for public game server messages.
//
// Every frame is a JSON object tagged by `type`; payload fields sit next to the tag.

use crate::domain::{CoinSnapshot, PlayerInput, PlayerSnapshot};
use crate::use_cases::{SnapshotEncoder, WorldSnapshot};
use axum::extract::ws::Utf8Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    // Assigned identity, sent once before any update.
    Init { id: String },
    // Snapshot of the world for a given tick.
    Update(WorldUpdateDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    // Latest movement intent; replaces the previous one.
    Input { inputs: PlayerInputDto },
}

/// Direction flags; all four are required.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlayerInputDto {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl From<PlayerInputDto> for PlayerInput {
    fn from(input: PlayerInputDto) -> Self {
        Self {
            left: input.left,
            right: input.right,
            up: input.up,
            down: input.down,
        }
    }
}

/// Snapshot of the world sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub timestamp: u64,
    pub players: BTreeMap<String, PlayerViewDto>,
    pub coins: Vec<CoinViewDto>,
}

impl From<&WorldSnapshot> for WorldUpdateDto {
    fn from(snapshot: &WorldSnapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            players: snapshot
                .players
                .iter()
                .map(|p| (p.id.clone(), PlayerViewDto::from(p)))
                .collect(),
            coins: snapshot.coins.iter().map(CoinViewDto::from).collect(),
        }
    }
}

/// Per-player view keyed by id in world updates.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerViewDto {
    pub x: f32,
    pub y: f32,
    pub score: u32,
    pub color: String,
}

impl From<&PlayerSnapshot> for PlayerViewDto {
    fn from(player: &PlayerSnapshot) -> Self {
        Self {
            x: player.x,
            y: player.y,
            score: player.score,
            color: player.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoinViewDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

impl From<&CoinSnapshot> for CoinViewDto {
    fn from(coin: &CoinSnapshot) -> Self {
        Self {
            id: coin.id.clone(),
            x: coin.x,
            y: coin.y,
        }
    }
}

/// Inbound frame that could not be decoded into a `ClientMessage`.
#[derive(Debug)]
pub struct DecodeError(pub serde_json::Error);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed client message: {}", self.0)
    }
}

pub fn decode_client_text(text: &str) -> Result<ClientMessage, DecodeError> {
    serde_json::from_str(text).map_err(DecodeError)
}

pub fn decode_client_bytes(bytes: &[u8]) -> Result<ClientMessage, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError)
}

/// Serializes each snapshot once into the shared `update` frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotEncoder;

impl SnapshotEncoder for JsonSnapshotEncoder {
    type Error = serde_json::Error;

    fn encode(&self, snapshot: &WorldSnapshot) -> Result<Utf8Bytes, Self::Error> {
        let msg = ServerMessage::Update(WorldUpdateDto::from(snapshot));
        serde_json::to_string(&msg).map(Utf8Bytes::from)
    }
}
