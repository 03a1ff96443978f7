use std::fmt;

use thiserror::Error;

use world::{EntityKindDef, EntityState, WorldEntity, LEAFLESS_TICK_NONE};

use crate::predicates::{is_compact_flora, is_compact_litter, is_compact_mineral};

/// Reserved wire id meaning "no qualifying entity at this cell". No real
/// def may carry it; the catalog rejects it at construction.
pub const SENTINEL_KIND_ID: u16 = 0;

const FLORA_FLAG_SOWN: u8 = 1 << 0;
const FLORA_FLAG_HAS_TAIL: u8 = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    Mineral,
    Litter,
    Flora,
}

impl Archetype {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mineral => "mineral",
            Self::Litter => "litter",
            Self::Flora => "flora",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum CompactCodecError {
    #[error("{archetype} stream ended mid-record at cell index {cell_index}")]
    Truncated {
        archetype: Archetype,
        cell_index: usize,
    },
    #[error("unknown kind id {kind_id} in {archetype} stream at cell index {cell_index}")]
    UnknownKindId {
        archetype: Archetype,
        kind_id: u16,
        cell_index: usize,
    },
    #[error(
        "kind id {kind_id} at cell index {cell_index} resolves to def '{def_name}', which is not a {archetype} def"
    )]
    KindCategoryMismatch {
        archetype: Archetype,
        kind_id: u16,
        def_name: String,
        cell_index: usize,
    },
    #[error("{archetype} stream has {remaining} trailing bytes after the final cell")]
    TrailingBytes {
        archetype: Archetype,
        remaining: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMineral {
    pub kind_id: u16,
    pub instance_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedLitter {
    pub kind_id: u16,
    pub instance_id: i32,
    pub thickness: u8,
    pub grow_tick: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedFlora {
    pub kind_id: u16,
    pub instance_id: i32,
    pub hit_points: i32,
    pub growth: f32,
    pub age: i32,
    pub sown: bool,
    pub unlit_ticks: i32,
    pub made_leafless_tick: i32,
}

// One record per cell, absence included: an empty cell costs exactly the
// two sentinel bytes so that stream position stays in lockstep with the
// cell index.

pub(crate) fn encode_mineral(
    buffer: &mut Vec<u8>,
    occupant: Option<(&EntityKindDef, &WorldEntity)>,
) {
    let Some((def, entity)) = occupant else {
        write_sentinel(buffer);
        return;
    };
    debug_assert!(
        is_compact_mineral(def, entity),
        "mineral encoder fed a non-qualifying entity"
    );
    buffer.extend_from_slice(&def.kind_id.0.to_le_bytes());
    buffer.extend_from_slice(&entity.instance_id.to_le_bytes());
}

pub(crate) fn encode_litter(buffer: &mut Vec<u8>, occupant: Option<(&EntityKindDef, &WorldEntity)>) {
    let Some((def, entity)) = occupant else {
        write_sentinel(buffer);
        return;
    };
    debug_assert!(
        is_compact_litter(def, entity),
        "litter encoder fed a non-qualifying entity"
    );
    let EntityState::Litter(litter) = entity.state else {
        write_sentinel(buffer);
        return;
    };
    buffer.extend_from_slice(&def.kind_id.0.to_le_bytes());
    buffer.extend_from_slice(&entity.instance_id.to_le_bytes());
    buffer.push(litter.thickness);
    buffer.extend_from_slice(&litter.grow_tick.to_le_bytes());
}

pub(crate) fn encode_flora(buffer: &mut Vec<u8>, occupant: Option<(&EntityKindDef, &WorldEntity)>) {
    let Some((def, entity)) = occupant else {
        write_sentinel(buffer);
        return;
    };
    debug_assert!(
        is_compact_flora(def, entity),
        "flora encoder fed a non-qualifying entity"
    );
    let EntityState::Flora(flora) = entity.state else {
        write_sentinel(buffer);
        return;
    };
    buffer.extend_from_slice(&def.kind_id.0.to_le_bytes());
    buffer.extend_from_slice(&entity.instance_id.to_le_bytes());
    buffer.extend_from_slice(&flora.hit_points.to_le_bytes());
    buffer.extend_from_slice(&flora.growth.to_le_bytes());
    buffer.extend_from_slice(&flora.age.to_le_bytes());

    let save_tail = flora.unlit_ticks != 0 || flora.made_leafless_tick != LEAFLESS_TICK_NONE;
    let mut flags = 0u8;
    if flora.sown {
        flags |= FLORA_FLAG_SOWN;
    }
    if save_tail {
        flags |= FLORA_FLAG_HAS_TAIL;
    }
    buffer.push(flags);

    if save_tail {
        buffer.extend_from_slice(&flora.unlit_ticks.to_le_bytes());
        buffer.extend_from_slice(&flora.made_leafless_tick.to_le_bytes());
    }
}

pub(crate) fn decode_mineral(
    bytes: &[u8],
    cursor: &mut usize,
    cell_index: usize,
) -> Result<Option<DecodedMineral>, CompactCodecError> {
    let archetype = Archetype::Mineral;
    let kind_id = read_u16(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    if kind_id == SENTINEL_KIND_ID {
        return Ok(None);
    }
    let instance_id = read_i32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    Ok(Some(DecodedMineral {
        kind_id,
        instance_id,
    }))
}

pub(crate) fn decode_litter(
    bytes: &[u8],
    cursor: &mut usize,
    cell_index: usize,
) -> Result<Option<DecodedLitter>, CompactCodecError> {
    let archetype = Archetype::Litter;
    let kind_id = read_u16(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    if kind_id == SENTINEL_KIND_ID {
        return Ok(None);
    }
    let instance_id = read_i32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    let thickness = read_u8(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    let grow_tick = read_i32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    Ok(Some(DecodedLitter {
        kind_id,
        instance_id,
        thickness,
        grow_tick,
    }))
}

pub(crate) fn decode_flora(
    bytes: &[u8],
    cursor: &mut usize,
    cell_index: usize,
) -> Result<Option<DecodedFlora>, CompactCodecError> {
    let archetype = Archetype::Flora;
    let kind_id = read_u16(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    if kind_id == SENTINEL_KIND_ID {
        return Ok(None);
    }
    let instance_id = read_i32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    let hit_points = read_i32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    let growth = read_f32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    let age = read_i32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    let flags = read_u8(bytes, cursor).ok_or(truncated(archetype, cell_index))?;

    let sown = flags & FLORA_FLAG_SOWN != 0;
    let mut unlit_ticks = 0;
    let mut made_leafless_tick = LEAFLESS_TICK_NONE;
    if flags & FLORA_FLAG_HAS_TAIL != 0 {
        unlit_ticks = read_i32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
        made_leafless_tick = read_i32(bytes, cursor).ok_or(truncated(archetype, cell_index))?;
    }

    Ok(Some(DecodedFlora {
        kind_id,
        instance_id,
        hit_points,
        growth,
        age,
        sown,
        unlit_ticks,
        made_leafless_tick,
    }))
}

/// A stream is exactly one record per cell; leftover bytes mean the save
/// was written against a different cell count or is corrupt.
pub(crate) fn ensure_consumed(
    bytes: &[u8],
    cursor: usize,
    archetype: Archetype,
) -> Result<(), CompactCodecError> {
    if cursor != bytes.len() {
        return Err(CompactCodecError::TrailingBytes {
            archetype,
            remaining: bytes.len().saturating_sub(cursor),
        });
    }
    Ok(())
}

fn write_sentinel(buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&SENTINEL_KIND_ID.to_le_bytes());
}

fn truncated(archetype: Archetype, cell_index: usize) -> CompactCodecError {
    CompactCodecError::Truncated {
        archetype,
        cell_index,
    }
}

fn read_array<const N: usize>(bytes: &[u8], cursor: &mut usize) -> Option<[u8; N]> {
    let end = cursor.checked_add(N)?;
    if end > bytes.len() {
        return None;
    }
    let out: [u8; N] = bytes[*cursor..end].try_into().ok()?;
    *cursor = end;
    Some(out)
}

fn read_u8(bytes: &[u8], cursor: &mut usize) -> Option<u8> {
    read_array::<1>(bytes, cursor).map(|raw| raw[0])
}

fn read_u16(bytes: &[u8], cursor: &mut usize) -> Option<u16> {
    read_array::<2>(bytes, cursor).map(u16::from_le_bytes)
}

fn read_i32(bytes: &[u8], cursor: &mut usize) -> Option<i32> {
    read_array::<4>(bytes, cursor).map(i32::from_le_bytes)
}

fn read_f32(bytes: &[u8], cursor: &mut usize) -> Option<f32> {
    read_array::<4>(bytes, cursor).map(f32::from_le_bytes)
}

#[cfg(test)]
mod tests {
    use world::{CellCoord, FloraState, KindCategory, KindId, LitterState, MineralState};

    use super::*;

    fn mineral_def() -> EntityKindDef {
        EntityKindDef {
            kind_id: KindId(7),
            def_name: "mineral.granite".to_string(),
            category: KindCategory::Mineral,
            save_compressible: true,
            uses_durability: true,
            max_durability: 900,
        }
    }

    fn flora_def() -> EntityKindDef {
        EntityKindDef {
            kind_id: KindId(42),
            def_name: "flora.oak_tree".to_string(),
            category: KindCategory::Flora,
            save_compressible: false,
            uses_durability: true,
            max_durability: 150,
        }
    }

    fn litter_def() -> EntityKindDef {
        EntityKindDef {
            kind_id: KindId(12),
            def_name: "litter.stone_rubble".to_string(),
            category: KindCategory::Litter,
            save_compressible: false,
            uses_durability: false,
            max_durability: 0,
        }
    }

    fn entity(def_index: usize, instance_id: i32, state: EntityState) -> WorldEntity {
        WorldEntity {
            def_index,
            instance_id,
            cell: CellCoord { x: 0, y: 0 },
            state,
        }
    }

    #[test]
    fn mineral_roundtrip_and_sentinel() {
        let def = mineral_def();
        let rock = entity(
            0,
            100,
            EntityState::Mineral(MineralState { durability: 900 }),
        );

        let mut buffer = Vec::new();
        encode_mineral(&mut buffer, Some((&def, &rock)));
        encode_mineral(&mut buffer, None);
        assert_eq!(buffer.len(), 6 + 2);

        let mut cursor = 0;
        let decoded = decode_mineral(&buffer, &mut cursor, 0)
            .expect("decode")
            .expect("record");
        assert_eq!(decoded.kind_id, 7);
        assert_eq!(decoded.instance_id, 100);
        assert!(decode_mineral(&buffer, &mut cursor, 1)
            .expect("decode sentinel")
            .is_none());
        ensure_consumed(&buffer, cursor, Archetype::Mineral).expect("consumed");
    }

    #[test]
    fn litter_roundtrip() {
        let def = litter_def();
        let rubble = entity(
            0,
            55,
            EntityState::Litter(LitterState {
                thickness: 3,
                grow_tick: -200,
            }),
        );

        let mut buffer = Vec::new();
        encode_litter(&mut buffer, Some((&def, &rubble)));

        let mut cursor = 0;
        let decoded = decode_litter(&buffer, &mut cursor, 0)
            .expect("decode")
            .expect("record");
        assert_eq!(decoded.kind_id, 12);
        assert_eq!(decoded.instance_id, 55);
        assert_eq!(decoded.thickness, 3);
        assert_eq!(decoded.grow_tick, -200);
    }

    #[test]
    fn flora_with_default_lighting_omits_tail() {
        let def = flora_def();
        let plant = entity(
            0,
            200,
            EntityState::Flora(FloraState {
                hit_points: 50,
                growth: 0.8,
                age: 1000,
                sown: true,
                unlit_ticks: 0,
                made_leafless_tick: LEAFLESS_TICK_NONE,
            }),
        );

        let mut buffer = Vec::new();
        encode_flora(&mut buffer, Some((&def, &plant)));
        // u16 + i32 + i32 + f32 + i32 + flags, no 8-byte tail.
        assert_eq!(buffer.len(), 19);

        let mut cursor = 0;
        let decoded = decode_flora(&buffer, &mut cursor, 0)
            .expect("decode")
            .expect("record");
        assert!(decoded.sown);
        assert_eq!(decoded.unlit_ticks, 0);
        assert_eq!(decoded.made_leafless_tick, LEAFLESS_TICK_NONE);
    }

    #[test]
    fn flora_with_lighting_state_carries_tail() {
        let def = flora_def();
        let plant = entity(
            0,
            200,
            EntityState::Flora(FloraState {
                hit_points: 50,
                growth: 0.8,
                age: 1000,
                sown: true,
                unlit_ticks: 5,
                made_leafless_tick: -1,
            }),
        );

        let mut buffer = Vec::new();
        encode_flora(&mut buffer, Some((&def, &plant)));
        assert_eq!(buffer.len(), 27);
        assert_eq!(buffer[18], FLORA_FLAG_SOWN | FLORA_FLAG_HAS_TAIL);

        let mut cursor = 0;
        let decoded = decode_flora(&buffer, &mut cursor, 0)
            .expect("decode")
            .expect("record");
        assert_eq!(decoded.unlit_ticks, 5);
        assert_eq!(decoded.made_leafless_tick, -1);
        assert_eq!(decoded.growth, 0.8);
        assert_eq!(decoded.age, 1000);
    }

    #[test]
    fn leafless_tick_alone_forces_tail() {
        let def = flora_def();
        let plant = entity(
            0,
            1,
            EntityState::Flora(FloraState {
                hit_points: 10,
                growth: 0.1,
                age: 5,
                sown: false,
                unlit_ticks: 0,
                made_leafless_tick: 77,
            }),
        );
        let mut buffer = Vec::new();
        encode_flora(&mut buffer, Some((&def, &plant)));
        assert_eq!(buffer.len(), 27);

        let mut cursor = 0;
        let decoded = decode_flora(&buffer, &mut cursor, 0)
            .expect("decode")
            .expect("record");
        assert!(!decoded.sown);
        assert_eq!(decoded.made_leafless_tick, 77);
    }

    #[test]
    fn truncated_record_is_fatal() {
        let def = mineral_def();
        let rock = entity(
            0,
            100,
            EntityState::Mineral(MineralState { durability: 900 }),
        );
        let mut buffer = Vec::new();
        encode_mineral(&mut buffer, Some((&def, &rock)));
        buffer.truncate(4);

        let mut cursor = 0;
        let error = decode_mineral(&buffer, &mut cursor, 9).expect_err("truncated");
        let CompactCodecError::Truncated {
            archetype,
            cell_index,
        } = error
        else {
            panic!("expected truncation error");
        };
        assert_eq!(archetype, Archetype::Mineral);
        assert_eq!(cell_index, 9);
    }

    #[test]
    fn trailing_bytes_are_fatal() {
        let bytes = [0u8, 0, 1];
        let mut cursor = 0;
        assert!(decode_litter(&bytes, &mut cursor, 0).expect("sentinel").is_none());
        let error = ensure_consumed(&bytes, cursor, Archetype::Litter).expect_err("trailing");
        assert!(matches!(
            error,
            CompactCodecError::TrailingBytes { remaining: 1, .. }
        ));
    }
}
