// Component kinds, their bit numbering and column installers.

use super::signature::Signature;
use super::store::{ColumnStore, ColumnType};

/// Column names written by the standard components.
pub mod fields {
    pub const POSITION: &str = "position";
    pub const VELOCITY: &str = "velocity";
    pub const ROTATION: &str = "rotation";
    pub const NAME: &str = "name";
    pub const LAST_INPUT_TICK: &str = "last_input_tick";
}

/// Bit indices assigned by [`ComponentRegistry::standard`].
pub mod kinds {
    pub const POSITION: usize = 0;
    pub const VELOCITY: usize = 1;
    pub const ROTATION: usize = 2;
    pub const NAME: usize = 3;
    pub const CONTROLLED: usize = 4;
}

pub type ColumnInstaller = Box<dyn Fn(&mut ColumnStore) + Send + Sync>;

/// Maps component bit indices to the routine that installs their columns.
///
/// The index a component is registered at is the bit every [`Signature`] uses for it.
#[derive(Default)]
pub struct ComponentRegistry {
    installers: Vec<ColumnInstaller>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the components the simulation systems rely on.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(|store| store.add_column(fields::POSITION, ColumnType::Vec2));
        registry.register(|store| store.add_column(fields::VELOCITY, ColumnType::Vec2));
        registry.register(|store| store.add_column(fields::ROTATION, ColumnType::F32));
        registry.register(|store| store.add_column(fields::NAME, ColumnType::Text));
        registry.register(|store| store.add_column(fields::LAST_INPUT_TICK, ColumnType::U64));
        registry
    }

    /// Registers an installer and returns the bit index assigned to it.
    pub fn register<F>(&mut self, installer: F) -> usize
    where
        F: Fn(&mut ColumnStore) + Send + Sync + 'static,
    {
        self.installers.push(Box::new(installer));
        self.installers.len() - 1
    }

    /// Installs the columns for `bit`. Returns false if nothing is registered there.
    pub fn install(&self, bit: usize, store: &mut ColumnStore) -> bool {
        match self.installers.get(bit) {
            Some(installer) => {
                installer(store);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.installers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installers.is_empty()
    }
}

pub fn player_signature() -> Signature {
    [
        kinds::POSITION,
        kinds::VELOCITY,
        kinds::ROTATION,
        kinds::NAME,
        kinds::CONTROLLED,
    ]
    .into_iter()
    .collect()
}

pub fn projectile_signature() -> Signature {
    [kinds::POSITION, kinds::VELOCITY].into_iter().collect()
}

/// Components the movement system reads and writes.
pub fn movement_signature() -> Signature {
    [kinds::POSITION, kinds::VELOCITY].into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_standard_registry_installs_player_bits_then_all_columns_exist() {
        let registry = ComponentRegistry::standard();
        let mut store = ColumnStore::new();

        for bit in player_signature().iter_bits() {
            assert!(registry.install(bit, &mut store));
        }

        assert_eq!(store.column_count(), 5);
        assert_eq!(store.column_type(fields::POSITION), Some(ColumnType::Vec2));
        assert_eq!(store.column_type(fields::LAST_INPUT_TICK), Some(ColumnType::U64));
    }

    #[test]
    fn when_bit_not_registered_then_install_returns_false() {
        let registry = ComponentRegistry::standard();
        let mut store = ColumnStore::new();

        assert!(!registry.install(registry.len(), &mut store));
        assert_eq!(store.column_count(), 0);
    }

    #[test]
    fn when_registering_then_bits_are_assigned_in_order() {
        let mut registry = ComponentRegistry::new();

        let first = registry.register(|_| {});
        let second = registry.register(|store| store.add_column("hp", ColumnType::F32));

        assert_eq!((first, second), (0, 1));
    }
}
