// The authoritative ECS world: archetype registry, entity lifecycle, sessions and the tick.

use crate::domain::archetype::row_key;
use crate::domain::components::{movement_signature, player_signature};
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::systems::{movement, snapshot};
use crate::domain::tuning::PlayerTuning;
use crate::domain::{
    Archetype, ClientEvent, ComponentRegistry, EntityDescriptor, EntityId, EntityKind, Player,
    PlayerEntity, PlayerHandle, ServerEvent, Signature, StoreError,
};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Errors returned by world operations that can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldError {
    /// The descriptor's fields did not fit the archetype's columns.
    Store(StoreError),
    /// Another session already uses this display name.
    NameTaken,
}

impl From<StoreError> for WorldError {
    fn from(e: StoreError) -> Self {
        WorldError::Store(e)
    }
}

/// Fixed parameters of a world.
#[derive(Debug, Clone)]
pub struct WorldSettings {
    /// Simulated time per tick.
    pub tick_interval: Duration,
    pub player: PlayerTuning,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            player: PlayerTuning::default(),
        }
    }
}

/// Owns every archetype and session. Must only be driven from one task.
pub struct World {
    registry: ComponentRegistry,
    archetypes: HashMap<Signature, Archetype>,
    players: HashMap<String, Player>,
    next_entity_id: EntityId,
    tick: u64,
    settings: WorldSettings,
    clock: Box<dyn Clock>,
    player_signature: Signature,
    movement_signature: Signature,
}

impl World {
    pub fn new(registry: ComponentRegistry, settings: WorldSettings) -> Self {
        Self::with_clock(registry, settings, Box::new(SystemClock))
    }

    pub fn with_clock(
        registry: ComponentRegistry,
        settings: WorldSettings,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            archetypes: HashMap::new(),
            players: HashMap::new(),
            next_entity_id: 1,
            tick: 0,
            settings,
            clock,
            player_signature: player_signature(),
            movement_signature: movement_signature(),
        }
    }

    /// Archetype for `signature`, created on first use of that bit pattern.
    pub fn get_archetype(&mut self, signature: &Signature) -> &mut Archetype {
        let registry = &self.registry;
        self.archetypes
            .entry(signature.clone())
            .or_insert_with(|| {
                debug!(%signature, "creating archetype");
                Archetype::new(signature.clone(), registry)
            })
    }

    /// Existing archetype for `signature`; never creates one.
    pub fn find_archetype(&self, signature: &Signature) -> Option<&Archetype> {
        self.archetypes.get(signature)
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Archetypes whose signature contains all of `with` and none of `without`.
    ///
    /// Order is unspecified.
    pub fn query_archetypes(&self, with: &Signature, without: &Signature) -> Vec<&Archetype> {
        self.archetypes
            .values()
            .filter(|a| matches(a.signature(), with, without))
            .collect()
    }

    pub fn query_with(&self, with: &Signature) -> Vec<&Archetype> {
        self.query_archetypes(with, &Signature::new())
    }

    pub fn query_without(&self, without: &Signature) -> Vec<&Archetype> {
        self.query_archetypes(&Signature::new(), without)
    }

    pub fn query_archetypes_mut<'a>(
        &'a mut self,
        with: &'a Signature,
        without: &'a Signature,
    ) -> impl Iterator<Item = &'a mut Archetype> + 'a {
        self.archetypes
            .values_mut()
            .filter(move |a| matches(a.signature(), with, without))
    }

    /// Allocates the next id and inserts the descriptor's row into its archetype.
    ///
    /// The id is consumed even if insertion fails; ids are never handed out twice.
    pub fn spawn_entity(
        &mut self,
        descriptor: &dyn EntityDescriptor,
    ) -> Result<EntityId, WorldError> {
        let id = self.next_entity_id;
        self.next_entity_id += 1;

        let signature = descriptor.signature();
        self.get_archetype(&signature).insert(id, descriptor)?;
        debug!(entity_id = id, kind = descriptor.kind().as_str(), %signature, "entity spawned");
        Ok(id)
    }

    /// Removes an entity. Unknown signatures or ids are a no-op; returns whether a row was removed.
    pub fn despawn_entity(&mut self, id: EntityId, signature: &Signature) -> bool {
        let Some(archetype) = self.archetypes.get_mut(signature) else {
            return false;
        };
        archetype.remove(id)
    }

    /// Spawns a player entity and its session, and queues its `EnterGame` event.
    pub fn spawn_player(&mut self, name: &str) -> Result<PlayerHandle, WorldError> {
        if self.players.contains_key(name) {
            return Err(WorldError::NameTaken);
        }

        let descriptor = PlayerEntity::new(name, self.settings.player.spawn_position);
        let id = self.spawn_entity(&descriptor)?;

        let player = Player::new(id, name);
        player.write_update(|packet| {
            packet.events.push(ServerEvent::EnterGame { entity_id: id })
        });
        let handle = player.handle();
        self.players.insert(name.to_string(), player);

        info!(entity_id = id, name, "player spawned");
        Ok(handle)
    }

    /// Despawns the player's entity and drops its session. Unknown names are a no-op.
    pub fn despawn_player(&mut self, name: &str) -> bool {
        let Some(player) = self.players.remove(name) else {
            return false;
        };
        let signature = self.player_signature.clone();
        self.despawn_entity(player.id(), &signature);
        info!(entity_id = player.id(), name, "player despawned");
        true
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn dt(&self) -> f32 {
        self.settings.tick_interval.as_secs_f32()
    }

    /// Runs one fixed step: drain inputs, run systems, broadcast snapshots.
    ///
    /// Never fails; anything that disappeared mid-tick is skipped. Returns the tick index.
    pub fn tick(&mut self) -> u64 {
        self.tick += 1;
        let tick = self.tick;

        self.drain_inputs(tick);
        self.run_systems();
        self.broadcast(tick);

        tick
    }

    fn drain_inputs(&mut self, tick: u64) {
        let archetype = self.archetypes.get_mut(&self.player_signature);
        let mut store = archetype.map(|a| a.store_mut());

        for player in self.players.values_mut() {
            // At most one batch per tick: anything pushed after this point waits for the next one.
            if let Some(packet) = player.try_next_input() {
                let Some(store) = store.as_deref_mut() else {
                    continue;
                };
                let key = row_key(player.id());
                for event in packet.events {
                    match event {
                        ClientEvent::Move { direction } => {
                            if let Err(e) = movement::apply_move(store, &key, direction, tick) {
                                debug!(entity_id = player.id(), error = ?e, "move skipped");
                            }
                        }
                    }
                }
            }
        }
    }

    fn run_systems(&mut self) {
        let dt = self.dt();
        let with = self.movement_signature.clone();
        let without = Signature::new();
        for archetype in self.query_archetypes_mut(&with, &without) {
            if let Err(e) = movement::integrate(archetype.store_mut(), dt) {
                warn!(signature = %archetype.signature(), error = ?e, "movement integration failed");
            }
        }
    }

    fn broadcast(&self, tick: u64) {
        let states = match self.archetypes.get(&self.player_signature) {
            Some(archetype) => snapshot::collect_entity_states(
                archetype.store(),
                EntityKind::PlayerGunner,
                self.settings.player.collider,
                self.settings.player.radius,
            ),
            None => Vec::new(),
        };
        let timestamp_ms = self.clock.now_epoch_millis();

        for player in self.players.values() {
            player.write_update(|packet| {
                packet.entities.extend(states.iter().cloned());
                packet.tick = tick;
                packet.timestamp_ms = timestamp_ms;
            });
        }
    }
}

fn matches(signature: &Signature, with: &Signature, without: &Signature) -> bool {
    signature.contains_all(with) && signature.is_disjoint(without)
}
