use crate::domain::components::fields;
use crate::domain::state::Vec2;
use crate::domain::store::{ColumnStore, StoreError};

/// Writes a client's requested direction as the entity's velocity.
///
/// The direction is normalized to unit length; a zero (or non-finite) direction stops the entity.
pub fn apply_move(
    store: &mut ColumnStore,
    key: &str,
    direction: Vec2,
    tick: u64,
) -> Result<(), StoreError> {
    store.set(key, fields::VELOCITY, direction.normalized_or_zero())?;
    store.set(key, fields::LAST_INPUT_TICK, tick)
}

/// `position += velocity * dt` for every row of a store with both columns.
pub fn integrate(store: &mut ColumnStore, dt: f32) -> Result<(), StoreError> {
    store.update(|row| {
        let position: Vec2 = row.get(fields::POSITION)?;
        let velocity: Vec2 = row.get(fields::VELOCITY)?;
        row.set(fields::POSITION, position + velocity * dt)
    })
}
