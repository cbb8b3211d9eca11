// Archetype: one component composition and the rows of every entity that has it.

use super::components::ComponentRegistry;
use super::entities::EntityDescriptor;
use super::signature::Signature;
use super::state::EntityId;
use super::store::{ColumnStore, StoreError};
use tracing::warn;

/// Entities sharing an identical [`Signature`], backed by one column store.
///
/// The signature is fixed at creation; entities never move between archetypes.
pub struct Archetype {
    signature: Signature,
    entities: Vec<EntityId>,
    store: ColumnStore,
}

impl Archetype {
    /// Builds an empty archetype whose store has one column family per set bit.
    pub fn new(signature: Signature, registry: &ComponentRegistry) -> Self {
        let mut store = ColumnStore::new();
        if let Some(highest) = signature.highest_bit() {
            for bit in 0..=highest {
                if signature.contains(bit) && !registry.install(bit, &mut store) {
                    warn!(bit, %signature, "no column installer registered for component bit");
                }
            }
        }

        Self {
            signature,
            entities: Vec::new(),
            store,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Entity ids in spawn order (removal preserves the order of the rest).
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.store.contains_row(&row_key(id))
    }

    pub fn store(&self) -> &ColumnStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ColumnStore {
        &mut self.store
    }

    /// Inserts a row for `id` filled in by the descriptor.
    ///
    /// On failure the partial row is dropped and the id is not recorded.
    pub fn insert(
        &mut self,
        id: EntityId,
        descriptor: &dyn EntityDescriptor,
    ) -> Result<(), StoreError> {
        let key = row_key(id);
        let mut row = self.store.insert_row(key.clone())?;
        if let Err(e) = descriptor.insert(&mut row) {
            self.store.remove_row(&key);
            return Err(e);
        }
        self.entities.push(id);
        Ok(())
    }

    /// Removes the row and id. Returns false if the entity is not here.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let removed = self.store.remove_row(&row_key(id));
        if let Some(pos) = self.entities.iter().position(|&e| e == id) {
            self.entities.remove(pos);
        }
        removed
    }
}

/// Row key for an entity: its id in decimal.
pub fn row_key(id: EntityId) -> String {
    id.to_string()
}
