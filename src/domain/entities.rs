// Entity descriptors: what an entity is made of and its initial field values.

use super::components::{fields, player_signature, projectile_signature};
use super::signature::Signature;
use super::state::{EntityKind, Vec2};
use super::store::{RowMut, StoreError};

/// Describes an entity to spawn.
pub trait EntityDescriptor {
    /// What the entity is; reported in snapshots and logs.
    fn kind(&self) -> EntityKind;

    /// Component composition; decides the archetype for the entity's whole life.
    fn signature(&self) -> Signature;

    /// Writes the initial field values into a freshly inserted row.
    fn insert(&self, row: &mut RowMut<'_>) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct PlayerEntity {
    pub name: String,
    pub position: Vec2,
}

impl PlayerEntity {
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

impl EntityDescriptor for PlayerEntity {
    fn kind(&self) -> EntityKind {
        EntityKind::PlayerGunner
    }

    fn signature(&self) -> Signature {
        player_signature()
    }

    fn insert(&self, row: &mut RowMut<'_>) -> Result<(), StoreError> {
        row.set(fields::POSITION, self.position)?;
        row.set(fields::VELOCITY, Vec2::ZERO)?;
        row.set(fields::ROTATION, 0.0_f32)?;
        row.set(fields::NAME, self.name.clone())?;
        row.set(fields::LAST_INPUT_TICK, 0_u64)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectileEntity {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl ProjectileEntity {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }
}

impl EntityDescriptor for ProjectileEntity {
    fn kind(&self) -> EntityKind {
        EntityKind::Projectile
    }

    fn signature(&self) -> Signature {
        projectile_signature()
    }

    fn insert(&self, row: &mut RowMut<'_>) -> Result<(), StoreError> {
        row.set(fields::POSITION, self.position)?;
        row.set(fields::VELOCITY, self.velocity)
    }
}
