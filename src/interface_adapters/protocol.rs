// Wire protocol DTOs and conversions for public world server messages.

use crate::domain::{
    ClientEvent, ClientPacket, ColliderShape, EntityKind, EntityState, ServerEvent, ServerPacket,
    Vec2,
};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Everything accumulated for this client since the last send.
    Update(ServerPacketDto),
    // Terminal problem with the session (bad join, name taken, ...).
    Error { message: String },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake choosing a display name.
    Join(JoinPayload),
    // Input batches sent after a successful Join.
    Input(ClientPacketDto),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2Dto {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for Vec2Dto {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Vec2Dto> for Vec2 {
    fn from(v: Vec2Dto) -> Self {
        Vec2::new(v.x, v.y)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientEventDto {
    Move {
        direction: Vec2Dto,
    },
    // Event kinds the world does not consume are accepted and dropped.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientPacketDto {
    #[serde(default)]
    pub events: Vec<ClientEventDto>,
}

impl From<ClientPacketDto> for ClientPacket {
    fn from(packet: ClientPacketDto) -> Self {
        let events = packet
            .events
            .into_iter()
            .filter_map(|event| match event {
                ClientEventDto::Move { direction } => {
                    let direction = Vec2::from(direction);
                    // Non-finite directions never reach the simulation.
                    direction
                        .is_finite()
                        .then_some(ClientEvent::Move { direction })
                }
                ClientEventDto::Unknown => None,
            })
            .collect();
        Self { events }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerEventDto {
    EnterGame { entity_id: u32 },
}

impl From<&ServerEvent> for ServerEventDto {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::EnterGame { entity_id } => ServerEventDto::EnterGame {
                entity_id: *entity_id,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKindDto {
    PlayerGunner,
    Projectile,
}

impl From<EntityKind> for EntityKindDto {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::PlayerGunner => EntityKindDto::PlayerGunner,
            EntityKind::Projectile => EntityKindDto::Projectile,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColliderShapeDto {
    Circle,
}

impl From<ColliderShape> for ColliderShapeDto {
    fn from(shape: ColliderShape) -> Self {
        match shape {
            ColliderShape::Circle => ColliderShapeDto::Circle,
        }
    }
}

/// Flattened entity state for wire transmission.
#[derive(Debug, Clone, Serialize)]
pub struct EntityStateDto {
    pub id: u32,
    pub kind: EntityKindDto,
    pub collider: ColliderShapeDto,
    pub name: String,
    pub position: Vec2Dto,
    pub velocity: Vec2Dto,
    pub rotation: f32,
    pub radius: f32,
}

impl From<&EntityState> for EntityStateDto {
    fn from(entity: &EntityState) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind.into(),
            collider: entity.collider.into(),
            name: entity.name.clone(),
            position: entity.position.into(),
            velocity: entity.velocity.into(),
            rotation: entity.rotation,
            radius: entity.radius,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerPacketDto {
    pub tick: u64,
    pub timestamp_ms: u64,
    pub events: Vec<ServerEventDto>,
    pub entities: Vec<EntityStateDto>,
}

impl From<ServerPacket> for ServerPacketDto {
    fn from(packet: ServerPacket) -> Self {
        Self {
            tick: packet.tick,
            timestamp_ms: packet.timestamp_ms,
            events: packet.events.iter().map(ServerEventDto::from).collect(),
            entities: packet.entities.iter().map(EntityStateDto::from).collect(),
        }
    }
}
