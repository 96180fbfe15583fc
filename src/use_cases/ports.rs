use super::types::WorldSnapshot;
use axum::extract::ws::Utf8Bytes;
use std::fmt::Debug;

// Port for reading wall-clock time stamped onto snapshots.
pub trait Clock: Send + Sync {
    fn now_epoch_millis(&self) -> u64;
}

// Port for turning a snapshot into the frame every client receives.
pub trait SnapshotEncoder: Send + Sync {
    type Error: Debug;

    fn encode(&self, snapshot: &WorldSnapshot) -> Result<Utf8Bytes, Self::Error>;
}
