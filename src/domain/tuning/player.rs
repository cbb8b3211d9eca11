use super::super::state::{ColliderShape, Vec2};

/// Gameplay tuning for player-controlled entities.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Collision radius reported in every entity snapshot, in world units.
    pub radius: f32,

    /// Collider shape reported alongside the radius.
    pub collider: ColliderShape,

    /// Where newly joined players appear.
    pub spawn_position: Vec2,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 0.5,
            collider: ColliderShape::Circle,
            spawn_position: Vec2::ZERO,
        }
    }
}
