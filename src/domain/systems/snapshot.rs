use crate::domain::components::fields;
use crate::domain::state::{ColliderShape, EntityKind, EntityState, Vec2};
use crate::domain::store::{ColumnStore, StoreError};

/// Builds one entity-state record per row of a player-shaped store.
///
/// Every row is reported as `kind` with the given collider. Rows that fail to read
/// (e.g. a malformed key) are skipped.
pub fn collect_entity_states(
    store: &ColumnStore,
    kind: EntityKind,
    collider: ColliderShape,
    radius: f32,
) -> Vec<EntityState> {
    let mut states = Vec::with_capacity(store.len());
    store.scan(|row| {
        let read = || -> Result<EntityState, StoreError> {
            Ok(EntityState {
                id: row
                    .key()
                    .parse()
                    .map_err(|_| StoreError::UnknownRow(row.key().to_string()))?,
                kind,
                collider,
                name: row.get(fields::NAME)?,
                position: row.get::<Vec2>(fields::POSITION)?,
                velocity: row.get::<Vec2>(fields::VELOCITY)?,
                rotation: row.get(fields::ROTATION)?,
                radius,
            })
        };
        match read() {
            Ok(state) => states.push(state),
            Err(e) => tracing::debug!(row = row.key(), error = ?e, "skipping unreadable row"),
        }
    });
    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::components::{ComponentRegistry, player_signature};
    use crate::domain::store::ColumnType;

    #[test]
    fn when_player_rows_exist_then_each_becomes_a_record() {
        let registry = ComponentRegistry::standard();
        let mut store = ColumnStore::new();
        for bit in player_signature().iter_bits() {
            registry.install(bit, &mut store);
        }
        let mut row = store.insert_row("4").expect("insert should succeed");
        row.set(fields::NAME, "Pilot".to_string()).expect("name");
        row.set(fields::POSITION, Vec2::new(2.0, 3.0)).expect("position");

        let states =
            collect_entity_states(&store, EntityKind::PlayerGunner, ColliderShape::Circle, 0.5);

        assert_eq!(
            states,
            vec![EntityState {
                id: 4,
                kind: EntityKind::PlayerGunner,
                collider: ColliderShape::Circle,
                name: "Pilot".to_string(),
                position: Vec2::new(2.0, 3.0),
                velocity: Vec2::ZERO,
                rotation: 0.0,
                radius: 0.5,
            }]
        );
    }

    #[test]
    fn when_store_lacks_player_columns_then_rows_are_skipped() {
        let mut store = ColumnStore::new();
        store.add_column(fields::POSITION, ColumnType::Vec2);
        store.insert_row("1").expect("insert should succeed");

        assert!(
            collect_entity_states(&store, EntityKind::PlayerGunner, ColliderShape::Circle, 0.5)
                .is_empty()
        );
    }
}
