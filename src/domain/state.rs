// Domain-level packet, snapshot and vector types shared by the world and its sessions.

use std::ops::{Add, Mul};

pub type EntityId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or zero when the length is zero or not finite.
    pub fn normalized_or_zero(self) -> Vec2 {
        // Scale into [-1, 1] first so huge finite components cannot overflow the length.
        let scale = self.x.abs().max(self.y.abs());
        if !self.is_finite() || scale == 0.0 {
            return Vec2::ZERO;
        }
        let scaled = Vec2::new(self.x / scale, self.y / scale);
        let len = scaled.length();
        Vec2::new(scaled.x / len, scaled.y / len)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Events a client can send inside one input batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Move { direction: Vec2 },
}

/// One batch of client intent, queued for the next tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPacket {
    pub events: Vec<ClientEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    // Tells a freshly joined client which entity it controls.
    EnterGame { entity_id: EntityId },
}

/// What an entity is, so clients know how to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    PlayerGunner,
    Projectile,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::PlayerGunner => "player_gunner",
            EntityKind::Projectile => "projectile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderShape {
    // Sized by the record's radius.
    Circle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub id: EntityId,
    pub kind: EntityKind,
    pub collider: ColliderShape,
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub radius: f32,
}

/// Outbound accumulator for one connection: everything the next send should carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerPacket {
    // Tick index that last stamped this packet.
    pub tick: u64,
    // Wall-clock milliseconds since the unix epoch at that tick.
    pub timestamp_ms: u64,
    pub events: Vec<ServerEvent>,
    pub entities: Vec<EntityState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_direction_is_three_four_then_normalizes_to_unit() {
        let unit = Vec2::new(3.0, 4.0).normalized_or_zero();

        assert!((unit.x - 0.6).abs() < 1e-6);
        assert!((unit.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn when_direction_is_zero_then_normalizes_to_zero() {
        let unit = Vec2::ZERO.normalized_or_zero();

        assert_eq!(unit, Vec2::ZERO);
        assert!(unit.is_finite());
    }

    #[test]
    fn when_direction_is_huge_but_finite_then_normalizes_to_unit() {
        let unit = Vec2::new(3.0e38, 3.0e38).normalized_or_zero();

        assert!((unit.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((unit.y - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn when_direction_is_tiny_then_still_normalizes_to_unit() {
        let unit = Vec2::new(0.0, -1.0e-40).normalized_or_zero();

        assert_eq!(unit, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn when_direction_is_infinite_then_normalizes_to_zero() {
        let unit = Vec2::new(f32::INFINITY, 1.0).normalized_or_zero();

        assert_eq!(unit, Vec2::ZERO);
    }

    #[test]
    fn when_direction_has_nan_then_normalizes_to_zero() {
        assert_eq!(Vec2::new(f32::NAN, 1.0).normalized_or_zero(), Vec2::ZERO);
    }
}
