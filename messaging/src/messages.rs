//! The wire catalog of application messages. Every message serializes as a u32 (BE) name tag
//!  followed by its body; bodies are fixed-size or carry a varint element count, so messages
//!  are self-delimiting and can be packed back-to-back into one packet payload.

use bytes::{Buf, BufMut};
use bytes_varint::try_get_fixed::TryGetFixedSupport;
use bytes_varint::{VarIntSupport, VarIntSupportMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ServerMessageName {
    InitMap = 0,
    Discover,
    Ping,
    DiscoverTown,
    YourTurn,
    ConstructionSet,
    AddUnit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ClientMessageName {
    Connect = 0,
    Start,
    Pong,
    AdminDiscoverEntireMap,
    EndTurn,
    SetConstruction,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Terrain {
    Fog = 0,
    Ground,
    Water,
    Hills,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum UnitKind {
    Soldier = 0,
    Caravan,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub fn ser(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.x);
        buf.put_u32(self.y);
    }

    pub fn deser(buf: &mut impl Buf) -> anyhow::Result<GridPos> {
        Ok(GridPos {
            x: buf.try_get_u32()?,
            y: buf.try_get_u32()?,
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DiscoveredTile {
    pub position: GridPos,
    pub terrain: Terrain,
}

impl DiscoveredTile {
    pub fn ser(&self, buf: &mut impl BufMut) {
        self.position.ser(buf);
        buf.put_u8(self.terrain.into());
    }

    pub fn deser(buf: &mut impl Buf) -> anyhow::Result<DiscoveredTile> {
        let position = GridPos::deser(buf)?;
        let terrain = Terrain::try_from(buf.try_get_u8()?)?;
        Ok(DiscoveredTile { position, terrain })
    }
}

/// everything the server sends to clients and bot agents
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ServerMessage {
    InitMap { your_id: u32, width: u32, height: u32 },
    Discover { tiles: Vec<DiscoveredTile> },
    /// keepalive probe, answered with [`ClientMessage::Pong`]
    Ping,
    DiscoverTown { id: u32, owner: i32, position: GridPos },
    YourTurn,
    ConstructionSet { town_id: u32, unit: UnitKind },
    AddUnit { unit: UnitKind, position: GridPos },
}

impl ServerMessage {
    pub fn name(&self) -> ServerMessageName {
        match self {
            ServerMessage::InitMap { .. } => ServerMessageName::InitMap,
            ServerMessage::Discover { .. } => ServerMessageName::Discover,
            ServerMessage::Ping => ServerMessageName::Ping,
            ServerMessage::DiscoverTown { .. } => ServerMessageName::DiscoverTown,
            ServerMessage::YourTurn => ServerMessageName::YourTurn,
            ServerMessage::ConstructionSet { .. } => ServerMessageName::ConstructionSet,
            ServerMessage::AddUnit { .. } => ServerMessageName::AddUnit,
        }
    }

    pub fn ser(&self, buf: &mut impl BufMut) {
        buf.put_u32(u32::from(self.name()));

        match self {
            ServerMessage::InitMap { your_id, width, height } => {
                buf.put_u32(*your_id);
                buf.put_u32(*width);
                buf.put_u32(*height);
            }
            ServerMessage::Discover { tiles } => {
                buf.put_usize_varint(tiles.len());
                for tile in tiles {
                    tile.ser(buf);
                }
            }
            ServerMessage::Ping | ServerMessage::YourTurn => {}
            ServerMessage::DiscoverTown { id, owner, position } => {
                buf.put_u32(*id);
                buf.put_i32_varint(*owner);
                position.ser(buf);
            }
            ServerMessage::ConstructionSet { town_id, unit } => {
                buf.put_u32(*town_id);
                buf.put_u8((*unit).into());
            }
            ServerMessage::AddUnit { unit, position } => {
                buf.put_u8((*unit).into());
                position.ser(buf);
            }
        }
    }

    pub fn deser(buf: &mut impl Buf) -> anyhow::Result<ServerMessage> {
        let name = ServerMessageName::try_from(buf.try_get_u32()?)?;

        let message = match name {
            ServerMessageName::InitMap => ServerMessage::InitMap {
                your_id: buf.try_get_u32()?,
                width: buf.try_get_u32()?,
                height: buf.try_get_u32()?,
            },
            ServerMessageName::Discover => {
                let num_tiles = buf.try_get_usize_varint()?;
                let mut tiles = Vec::with_capacity(num_tiles);
                for _ in 0..num_tiles {
                    tiles.push(DiscoveredTile::deser(buf)?);
                }
                ServerMessage::Discover { tiles }
            }
            ServerMessageName::Ping => ServerMessage::Ping,
            ServerMessageName::DiscoverTown => ServerMessage::DiscoverTown {
                id: buf.try_get_u32()?,
                owner: buf.try_get_i32_varint()?,
                position: GridPos::deser(buf)?,
            },
            ServerMessageName::YourTurn => ServerMessage::YourTurn,
            ServerMessageName::ConstructionSet => ServerMessage::ConstructionSet {
                town_id: buf.try_get_u32()?,
                unit: UnitKind::try_from(buf.try_get_u8()?)?,
            },
            ServerMessageName::AddUnit => ServerMessage::AddUnit {
                unit: UnitKind::try_from(buf.try_get_u8()?)?,
                position: GridPos::deser(buf)?,
            },
        };
        Ok(message)
    }
}

/// everything clients and bot agents send to the server
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ClientMessage {
    Connect,
    Start,
    /// answer to [`ServerMessage::Ping`]
    Pong,
    AdminDiscoverEntireMap,
    EndTurn,
    SetConstruction { town_id: u32, unit: UnitKind },
}

impl ClientMessage {
    pub fn name(&self) -> ClientMessageName {
        match self {
            ClientMessage::Connect => ClientMessageName::Connect,
            ClientMessage::Start => ClientMessageName::Start,
            ClientMessage::Pong => ClientMessageName::Pong,
            ClientMessage::AdminDiscoverEntireMap => ClientMessageName::AdminDiscoverEntireMap,
            ClientMessage::EndTurn => ClientMessageName::EndTurn,
            ClientMessage::SetConstruction { .. } => ClientMessageName::SetConstruction,
        }
    }

    pub fn ser(&self, buf: &mut impl BufMut) {
        buf.put_u32(u32::from(self.name()));

        match self {
            ClientMessage::Connect
            | ClientMessage::Start
            | ClientMessage::Pong
            | ClientMessage::AdminDiscoverEntireMap
            | ClientMessage::EndTurn => {}
            ClientMessage::SetConstruction { town_id, unit } => {
                buf.put_u32(*town_id);
                buf.put_u8((*unit).into());
            }
        }
    }

    pub fn deser(buf: &mut impl Buf) -> anyhow::Result<ClientMessage> {
        let name = ClientMessageName::try_from(buf.try_get_u32()?)?;

        let message = match name {
            ClientMessageName::Connect => ClientMessage::Connect,
            ClientMessageName::Start => ClientMessage::Start,
            ClientMessageName::Pong => ClientMessage::Pong,
            ClientMessageName::AdminDiscoverEntireMap => ClientMessage::AdminDiscoverEntireMap,
            ClientMessageName::EndTurn => ClientMessage::EndTurn,
            ClientMessageName::SetConstruction => ClientMessage::SetConstruction {
                town_id: buf.try_get_u32()?,
                unit: UnitKind::try_from(buf.try_get_u8()?)?,
            },
        };
        Ok(message)
    }
}
