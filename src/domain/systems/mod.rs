// Simulation systems run by the world tick, in the order listed here.

pub mod movement;
pub mod snapshot;
