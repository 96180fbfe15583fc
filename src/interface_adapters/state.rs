use crate::use_cases::GameEvent;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    // Joins, leaves and inputs flowing from the network into the world task.
    pub event_tx: mpsc::Sender<GameEvent>,
}
