pub mod player;

pub use player::PlayerTuning;
