use crate::use_cases::WorldCommand;
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Lifecycle commands (join/leave) flowing into the world task.
    pub command_tx: mpsc::Sender<WorldCommand>,
    // Latest completed tick; outbound actors subscribe to know when to send.
    pub tick_tx: watch::Sender<u64>,
}
