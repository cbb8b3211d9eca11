// Per-connection session state shared between the world task and the network actors.

use super::state::{ClientPacket, EntityId, ServerPacket};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// At most one unprocessed input batch may wait for the next tick.
pub const INPUT_QUEUE_CAPACITY: usize = 1;

/// Lock-guarded outbound accumulator.
#[derive(Debug, Default)]
pub struct Outbound {
    packet: Mutex<ServerPacket>,
}

impl Outbound {
    fn lock(&self) -> MutexGuard<'_, ServerPacket> {
        // The packet is plain data; a panicking writer cannot leave it unusable.
        self.packet.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies `mutate` to the accumulator under the session lock.
    pub fn write_update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut ServerPacket),
    {
        mutate(&mut *self.lock());
    }

    /// Deep copy of the accumulator. Does not reset it.
    pub fn read_update(&self) -> ServerPacket {
        self.lock().clone()
    }

    /// Copies and clears the accumulator in one critical section.
    pub fn take_update(&self) -> ServerPacket {
        std::mem::take(&mut *self.lock())
    }
}

#[derive(Debug)]
pub enum InputError {
    // A batch is already waiting for the next tick.
    Full,
    // The session was removed from the world.
    Closed,
}

/// World-side session for one connected player.
pub struct Player {
    id: EntityId,
    name: Arc<str>,
    inputs: mpsc::Receiver<ClientPacket>,
    input_tx: mpsc::Sender<ClientPacket>,
    outbound: Arc<Outbound>,
}

impl Player {
    pub fn new(id: EntityId, name: impl Into<Arc<str>>) -> Self {
        let (input_tx, inputs) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        Self {
            id,
            name: name.into(),
            inputs,
            input_tx,
            outbound: Arc::new(Outbound::default()),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Next queued input batch, if any. Never waits.
    pub fn try_next_input(&mut self) -> Option<ClientPacket> {
        self.inputs.try_recv().ok()
    }

    pub fn write_update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut ServerPacket),
    {
        self.outbound.write_update(mutate);
    }

    pub fn read_update(&self) -> ServerPacket {
        self.outbound.read_update()
    }

    /// Handle given to the network layer for this session.
    pub fn handle(&self) -> PlayerHandle {
        PlayerHandle {
            id: self.id,
            name: self.name.clone(),
            inputs: self.input_tx.clone(),
            outbound: self.outbound.clone(),
        }
    }
}

/// Network-side view of a session: push inputs in, pull snapshots out.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    pub id: EntityId,
    pub name: Arc<str>,
    inputs: mpsc::Sender<ClientPacket>,
    outbound: Arc<Outbound>,
}

impl PlayerHandle {
    /// Queues a batch without waiting; drops it if one is already pending.
    pub fn try_push_input(&self, packet: ClientPacket) -> Result<(), InputError> {
        self.inputs.try_send(packet).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => InputError::Full,
            mpsc::error::TrySendError::Closed(_) => InputError::Closed,
        })
    }

    /// Queues a batch, waiting until the previous one has been consumed.
    pub async fn push_input(&self, packet: ClientPacket) -> Result<(), InputError> {
        self.inputs
            .send(packet)
            .await
            .map_err(|_| InputError::Closed)
    }

    pub fn read_update(&self) -> ServerPacket {
        self.outbound.read_update()
    }

    pub fn take_update(&self) -> ServerPacket {
        self.outbound.take_update()
    }

    /// True once the world has dropped the session.
    pub fn is_closed(&self) -> bool {
        self.inputs.is_closed()
    }
}
