// Domain layer: ECS storage, session state and simulation rules.

pub mod archetype;
pub mod components;
pub mod entities;
pub mod player;
pub mod ports;
pub mod signature;
pub mod state;
pub mod store;
pub mod systems;
pub mod tuning;

pub use archetype::Archetype;
pub use components::ComponentRegistry;
pub use entities::{EntityDescriptor, PlayerEntity, ProjectileEntity};
pub use player::{InputError, Player, PlayerHandle};
pub use signature::Signature;
pub use state::{
    ClientEvent, ClientPacket, ColliderShape, EntityId, EntityKind, EntityState, ServerEvent,
    ServerPacket, Vec2,
};
pub use store::{ColumnStore, StoreError};
