// Use cases layer: application workflows for the game server.

pub mod broadcast;
pub mod game;
pub mod ingest;
pub mod ports;
pub mod registry;
pub mod types;

pub use broadcast::DelayedBroadcaster;
pub use game::{WorldHandle, WorldSettings, spawn_world};
pub use ports::{Clock, SnapshotEncoder};
pub use registry::{ChannelDeliveryError, ConnectionRegistry, DeliveryReport};
pub use types::{GameEvent, WorldSnapshot};
