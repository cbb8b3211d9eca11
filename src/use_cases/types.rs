// Use-case level commands accepted by the world task.

use super::world::WorldError;
use crate::domain::PlayerHandle;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum WorldCommand {
    SpawnPlayer {
        name: String,
        reply: oneshot::Sender<Result<PlayerHandle, WorldError>>,
    },
    DespawnPlayer {
        name: String,
    },
}
