// Connection registry: the only place players enter or leave the world.

use crate::domain::{PlayerId, World};
use axum::extract::ws::Utf8Bytes;
use rand::Rng;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info};

/// Why a frame did not reach one recipient. Never aborts delivery to the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelDeliveryError {
    // The connection task is gone.
    Closed,
    // The connection is not draining its queue fast enough.
    Full,
}

/// Per-delivery counts, mostly for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub closed: usize,
    pub full: usize,
    // Joined after the snapshot was produced.
    pub not_yet_joined: usize,
}

struct Connection {
    outbound: mpsc::Sender<Utf8Bytes>,
    // Ticks completed when the connection joined; older snapshots are not sent to it.
    joined_after_tick: u64,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<PlayerId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.connections.contains_key(player_id)
    }

    /// Creates the player and registers its outbound channel. Returns the new id.
    pub fn on_connect<R: Rng>(
        &mut self,
        world: &mut World,
        outbound: mpsc::Sender<Utf8Bytes>,
        current_tick: u64,
        rng: &mut R,
    ) -> PlayerId {
        let player_id = uuid::Uuid::new_v4().to_string();
        let player = world.spawn_player(player_id.clone(), rng);
        info!(player_id = %player.id, color = %player.color, "player joined");

        self.connections.insert(
            player_id.clone(),
            Connection {
                outbound,
                joined_after_tick: current_tick,
            },
        );
        player_id
    }

    /// Removes the player and its channel. Unknown ids are a no-op; returns whether anything
    /// was removed.
    pub fn on_disconnect(&mut self, world: &mut World, player_id: &str) -> bool {
        let had_connection = self.connections.remove(player_id).is_some();
        let had_player = world.remove_player(player_id);
        if had_connection || had_player {
            info!(%player_id, "player left");
        }
        had_connection || had_player
    }

    /// Sends `payload`, produced at tick `tick`, to every connection registered before that
    /// tick. Never blocks.
    pub fn deliver(&self, tick: u64, payload: &Utf8Bytes) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for (player_id, conn) in &self.connections {
            if conn.joined_after_tick >= tick {
                report.not_yet_joined += 1;
                continue;
            }

            match send_frame(&conn.outbound, payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(ChannelDeliveryError::Closed) => {
                    debug!(%player_id, tick, "outbound channel closed; skipping");
                    report.closed += 1;
                }
                Err(ChannelDeliveryError::Full) => {
                    debug!(%player_id, tick, "outbound channel full; skipping");
                    report.full += 1;
                }
            }
        }

        report
    }
}

fn send_frame(
    outbound: &mpsc::Sender<Utf8Bytes>,
    payload: Utf8Bytes,
) -> Result<(), ChannelDeliveryError> {
    outbound.try_send(payload).map_err(|e| match e {
        TrySendError::Closed(_) => ChannelDeliveryError::Closed,
        TrySendError::Full(_) => ChannelDeliveryError::Full,
    })
}
