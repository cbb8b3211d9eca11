// Use cases layer: the world and the task that drives it.

pub mod game;
pub mod types;
pub mod world;

pub use types::WorldCommand;
pub use world::{World, WorldError, WorldSettings};
