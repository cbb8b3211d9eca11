use super::types::WorldCommand;
use super::world::World;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tracing::{debug, info, warn};

/// Drives the world on a fixed cadence and applies lifecycle commands between ticks.
///
/// This task is the only owner of the `World`; every spawn, despawn and tick runs here in
/// order. After each tick the tick index is published on `tick_tx` so outbound session
/// actors know a fresh snapshot is waiting.
pub async fn world_task(
    mut world: World,
    mut command_rx: mpsc::Receiver<WorldCommand>,
    tick_tx: watch::Sender<u64>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(tick_interval);
    info!(
        tick_interval_ms = tick_interval.as_millis() as u64,
        "world task started"
    );

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                break;
            }
            command = command_rx.recv() => {
                match command {
                    Some(command) => apply_command(&mut world, command),
                    None => {
                        warn!("world command channel closed; world task exiting");
                        break;
                    }
                }
            }
            _ = interval.tick() => {
                let tick = world.tick();
                // Replace even with no receivers so late subscribers see the current tick.
                tick_tx.send_replace(tick);
            }
        }
    }

    info!(tick = world.current_tick(), "world task stopped");
}

fn apply_command(world: &mut World, command: WorldCommand) {
    match command {
        WorldCommand::SpawnPlayer { name, reply } => {
            let result = world.spawn_player(&name);
            if let Err(e) = &result {
                warn!(name = %name, error = ?e, "player spawn rejected");
            }
            if let Err(Ok(handle)) = reply.send(result) {
                // The connection went away while waiting; don't leave a ghost behind.
                debug!(name = %name, entity_id = handle.id, "spawn reply dropped; despawning");
                world.despawn_player(&name);
            }
        }
        WorldCommand::DespawnPlayer { name } => {
            world.despawn_player(&name);
        }
    }
}
