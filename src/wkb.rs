//! Decoder for the store's binary geometry column (hex-encoded EWKB).
//!
//! Layout of every geometry: one byte-order flag (0 = big-endian,
//! 1 = little-endian), a 4-byte type code, an optional 4-byte SRID when the
//! type code carries [`SRID_FLAG`], then the shape body. Multi geometries and
//! collections embed complete member geometries, each with its own flag and
//! type code.

use thiserror::Error;

use crate::models::{Geometry, GeometryKind, Position};

/// Type-code bit announcing a 4-byte SRID after the type code
pub const SRID_FLAG: u32 = 0x2000_0000;
const Z_FLAG: u32 = 0x8000_0000;
const M_FLAG: u32 = 0x4000_0000;

/// Collections nested deeper than this are rejected
const MAX_DEPTH: usize = 32;

const POSITION_LEN: usize = 16;
const COUNT_LEN: usize = 4;
/// Smallest possible member geometry: flag, type code and an empty count
const MIN_MEMBER_LEN: usize = 9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("geometry payload is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("geometry payload truncated at offset {offset}: needed {needed} bytes, {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid byte order flag {0:#04x}")]
    InvalidByteOrder(u8),

    #[error("unsupported geometry type code {0:#010x}")]
    UnsupportedType(u32),

    #[error("{kind} declares {count} elements but only {available} bytes remain")]
    CountOverflow {
        kind: GeometryKind,
        count: usize,
        available: usize,
    },

    #[error("polygon ring with {len} positions is not closed or too short")]
    InvalidRing { len: usize },

    #[error("{expected} member expected, found {found}")]
    UnexpectedMember {
        expected: GeometryKind,
        found: GeometryKind,
    },

    #[error("geometry nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,

    #[error("{0} trailing bytes after geometry")]
    TrailingBytes(usize),
}

/// Decode a hex-encoded geometry payload
pub fn decode_hex(payload: &str) -> Result<Geometry, GeometryError> {
    let bytes = hex::decode(payload.trim())?;
    decode(&bytes)
}

/// Decode a binary geometry payload
pub fn decode(bytes: &[u8]) -> Result<Geometry, GeometryError> {
    let mut reader = Reader::new(bytes);
    let geometry = reader.geometry(0)?;

    let rest = reader.remaining();
    if rest > 0 {
        return Err(GeometryError::TrailingBytes(rest));
    }

    Ok(geometry)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], GeometryError> {
        let bytes = self
            .buf
            .get(self.pos..self.pos + N)
            .ok_or(GeometryError::Truncated {
                offset: self.pos,
                needed: N,
                available: self.remaining(),
            })?;

        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.pos += N;
        Ok(out)
    }

    fn byte_order(&mut self) -> Result<ByteOrder, GeometryError> {
        match self.take::<1>()?[0] {
            0 => Ok(ByteOrder::Big),
            1 => Ok(ByteOrder::Little),
            other => Err(GeometryError::InvalidByteOrder(other)),
        }
    }

    fn u32(&mut self, order: ByteOrder) -> Result<u32, GeometryError> {
        let bytes = self.take::<4>()?;
        Ok(match order {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        })
    }

    fn f64(&mut self, order: ByteOrder) -> Result<f64, GeometryError> {
        let bytes = self.take::<8>()?;
        Ok(match order {
            ByteOrder::Big => f64::from_be_bytes(bytes),
            ByteOrder::Little => f64::from_le_bytes(bytes),
        })
    }

    /// Read an element count, refusing counts the remaining bytes cannot hold
    fn count(
        &mut self,
        order: ByteOrder,
        kind: GeometryKind,
        min_element_len: usize,
    ) -> Result<usize, GeometryError> {
        let count = self.u32(order)? as usize;
        let available = self.remaining();
        if count.saturating_mul(min_element_len) > available {
            return Err(GeometryError::CountOverflow {
                kind,
                count,
                available,
            });
        }
        Ok(count)
    }

    fn position(&mut self, order: ByteOrder) -> Result<Position, GeometryError> {
        let x = self.f64(order)?;
        let y = self.f64(order)?;
        Ok([x, y])
    }

    fn positions(
        &mut self,
        order: ByteOrder,
        kind: GeometryKind,
    ) -> Result<Vec<Position>, GeometryError> {
        let count = self.count(order, kind, POSITION_LEN)?;
        (0..count).map(|_| self.position(order)).collect()
    }

    fn rings(&mut self, order: ByteOrder) -> Result<Vec<Vec<Position>>, GeometryError> {
        let count = self.count(order, GeometryKind::Polygon, COUNT_LEN)?;
        let mut rings = Vec::with_capacity(count);
        for _ in 0..count {
            let ring = self.positions(order, GeometryKind::Polygon)?;
            if ring.len() < 4 || ring.first() != ring.last() {
                return Err(GeometryError::InvalidRing { len: ring.len() });
            }
            rings.push(ring);
        }
        Ok(rings)
    }

    fn geometry(&mut self, depth: usize) -> Result<Geometry, GeometryError> {
        if depth > MAX_DEPTH {
            return Err(GeometryError::TooDeep);
        }

        let order = self.byte_order()?;
        let type_code = self.u32(order)?;

        // Only 2D shapes are modelled
        if type_code & (Z_FLAG | M_FLAG) != 0 {
            return Err(GeometryError::UnsupportedType(type_code));
        }
        if type_code & SRID_FLAG != 0 {
            self.u32(order)?;
        }

        match type_code & !SRID_FLAG {
            1 => Ok(Geometry::Point {
                coordinates: self.position(order)?,
            }),
            2 => Ok(Geometry::LineString {
                coordinates: self.positions(order, GeometryKind::LineString)?,
            }),
            3 => Ok(Geometry::Polygon {
                coordinates: self.rings(order)?,
            }),
            4 => {
                let members = self.members(order, depth, GeometryKind::MultiPoint)?;
                let coordinates = members
                    .into_iter()
                    .map(|m| match m {
                        Geometry::Point { coordinates } => Ok(coordinates),
                        other => Err(unexpected(GeometryKind::Point, &other)),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Geometry::MultiPoint { coordinates })
            }
            5 => {
                let members = self.members(order, depth, GeometryKind::MultiLineString)?;
                let coordinates = members
                    .into_iter()
                    .map(|m| match m {
                        Geometry::LineString { coordinates } => Ok(coordinates),
                        other => Err(unexpected(GeometryKind::LineString, &other)),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Geometry::MultiLineString { coordinates })
            }
            6 => {
                let members = self.members(order, depth, GeometryKind::MultiPolygon)?;
                let coordinates = members
                    .into_iter()
                    .map(|m| match m {
                        Geometry::Polygon { coordinates } => Ok(coordinates),
                        other => Err(unexpected(GeometryKind::Polygon, &other)),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Geometry::MultiPolygon { coordinates })
            }
            7 => Ok(Geometry::GeometryCollection {
                geometries: self.members(order, depth, GeometryKind::GeometryCollection)?,
            }),
            _ => Err(GeometryError::UnsupportedType(type_code)),
        }
    }

    fn members(
        &mut self,
        order: ByteOrder,
        depth: usize,
        kind: GeometryKind,
    ) -> Result<Vec<Geometry>, GeometryError> {
        let count = self.count(order, kind, MIN_MEMBER_LEN)?;
        (0..count).map(|_| self.geometry(depth + 1)).collect()
    }
}

fn unexpected(expected: GeometryKind, found: &Geometry) -> GeometryError {
    GeometryError::UnexpectedMember {
        expected,
        found: found.kind(),
    }
}
