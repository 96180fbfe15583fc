use super::broadcast::DelayedBroadcaster;
use super::ingest::{self, IngestOutcome};
use super::ports::{Clock, SnapshotEncoder};
use super::registry::ConnectionRegistry;
use super::types::{GameEvent, WorldSnapshot};
use crate::domain::{ArenaTuning, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const TICK_SUMMARY_EVERY: u64 = 300;

/// Runtime configuration for the world task.
#[derive(Debug, Clone)]
pub struct WorldSettings {
    /// Capacity for inbound join/leave/input events.
    pub event_channel_capacity: usize,
    /// Fixed tick interval for the game loop.
    pub tick_interval: Duration,
    /// Artificial latency between producing a snapshot and delivering it.
    pub broadcast_delay: Duration,
    /// Gameplay tuning for the arena.
    pub tuning: ArenaTuning,
}

/// Handles to a running world task.
pub struct WorldHandle {
    /// Sender for game events into the world task.
    pub event_tx: mpsc::Sender<GameEvent>,
    /// `notify_one` stops the task after the current step.
    pub shutdown: Arc<Notify>,
    pub task: JoinHandle<()>,
}

/// Spawns the authoritative world loop on the current runtime.
pub fn spawn_world<E, C>(settings: WorldSettings, encoder: E, clock: C) -> WorldHandle
where
    E: SnapshotEncoder + 'static,
    C: Clock + 'static,
{
    let (event_tx, event_rx) = mpsc::channel::<GameEvent>(settings.event_channel_capacity);
    let shutdown = Arc::new(Notify::new());
    let task = tokio::spawn(world_task(
        event_rx,
        settings,
        encoder,
        clock,
        StdRng::from_os_rng(),
        shutdown.clone(),
    ));

    WorldHandle {
        event_tx,
        shutdown,
        task,
    }
}

// Everything the world task owns. Each method runs to completion inside one select branch,
// so ticks, joins, leaves and inputs never interleave.
struct WorldLoop<E, C, R> {
    world: World,
    registry: ConnectionRegistry,
    broadcaster: DelayedBroadcaster,
    encoder: E,
    clock: C,
    rng: R,
    tick: u64,
    // Inputs for players that were already gone; reported in the tick summary.
    dropped_inputs: u64,
    last_full_log: Instant,
}

impl<E, C, R> WorldLoop<E, C, R>
where
    E: SnapshotEncoder,
    C: Clock,
    R: Rng,
{
    fn new(settings: &WorldSettings, encoder: E, clock: C, mut rng: R) -> Self {
        let world = World::new(settings.tuning, &mut rng);
        Self {
            world,
            registry: ConnectionRegistry::new(),
            broadcaster: DelayedBroadcaster::new(settings.broadcast_delay),
            encoder,
            clock,
            rng,
            tick: 0,
            dropped_inputs: 0,
            last_full_log: Instant::now(),
        }
    }

    fn handle_event(&mut self, ev: GameEvent) {
        match ev {
            GameEvent::Join { outbound, reply } => {
                let player_id =
                    self.registry
                        .on_connect(&mut self.world, outbound, self.tick, &mut self.rng);
                if let Err(player_id) = reply.send(player_id) {
                    // The connection went away before it learned its id.
                    self.registry.on_disconnect(&mut self.world, &player_id);
                }
            }
            GameEvent::Leave { player_id } => {
                self.registry.on_disconnect(&mut self.world, &player_id);
            }
            GameEvent::Input { player_id, input } => {
                let outcome = ingest::on_intent(&mut self.world, &player_id, input);
                if outcome == IngestOutcome::Dropped {
                    self.dropped_inputs += 1;
                }
            }
        }
    }

    fn run_tick(&mut self, now: Instant) {
        self.tick += 1;
        let pickups = self.world.step(&mut self.rng);

        let snapshot = WorldSnapshot {
            tick: self.tick,
            timestamp: self.clock.now_epoch_millis(),
            players: self.world.player_snapshots(),
            coins: self.world.coin_snapshots(),
        };

        match self.encoder.encode(&snapshot) {
            Ok(payload) => {
                self.broadcaster.schedule(self.tick, payload, now);
            }
            Err(e) => {
                error!(tick = self.tick, error = ?e, "failed to encode snapshot");
            }
        }

        if pickups > 0 {
            debug!(tick = self.tick, pickups, "coins collected this tick");
        }
        if self.tick % TICK_SUMMARY_EVERY == 0 {
            debug!(
                tick = self.tick,
                players = self.world.players().len(),
                in_flight = self.broadcaster.len(),
                dropped_inputs = self.dropped_inputs,
                "tick summary"
            );
        }
    }

    fn deliver_due(&mut self, now: Instant) {
        while let Some(delivery) = self.broadcaster.pop_due(now) {
            let report = self.registry.deliver(delivery.tick, &delivery.payload);
            if report.full > 0 && should_log(&mut self.last_full_log) {
                warn!(
                    tick = delivery.tick,
                    skipped = report.full,
                    "outbound channels full; dropping snapshot for slow clients"
                );
            }
        }
    }
}

pub async fn world_task<E, C, R>(
    mut event_rx: mpsc::Receiver<GameEvent>,
    settings: WorldSettings,
    encoder: E,
    clock: C,
    rng: R,
    shutdown: Arc<Notify>,
) where
    E: SnapshotEncoder,
    C: Clock,
    R: Rng,
{
    let mut state = WorldLoop::new(&settings, encoder, clock, rng);

    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(settings.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        tick_interval_ms = settings.tick_interval.as_millis() as u64,
        broadcast_delay_ms = settings.broadcast_delay.as_millis() as u64,
        coins = state.world.coins().len(),
        "world started"
    );

    loop {
        let next_due = state.broadcaster.next_due();
        let delivery = tokio::time::sleep_until(next_due.unwrap_or_else(Instant::now));

        tokio::select! {
            biased;

            _ = shutdown.notified() => {
                info!(tick = state.tick, "world shutting down");
                break;
            }
            _ = delivery, if next_due.is_some() => {
                state.deliver_due(Instant::now());
            }
            _ = interval.tick() => {
                state.run_tick(Instant::now());
            }
            ev = event_rx.recv() => {
                match ev {
                    Some(ev) => state.handle_event(ev),
                    None => {
                        info!(tick = state.tick, "event channel closed; world exiting");
                        break;
                    }
                }
            }
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}
