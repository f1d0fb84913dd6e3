//! Semantic-typed configuration values.
//!
//! Every configuration item carries a type tag fixed by the ICD; encoding
//! width and byte layout follow directly from the tag (§4.3). Representing
//! values as this enum rather than a raw integer means the codec cannot mix
//! widths at runtime — a VALGET response decoded against the wrong tag is a
//! type error, not a silently-misaligned read.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Bit,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Enum8,
    Bitfield8,
    Bitfield16,
    Bitfield32,
    Bitfield64,
}

impl SemanticType {
    /// Wire width in bytes, per the fixed table in §4.3.
    pub fn width(self) -> usize {
        match self {
            SemanticType::Bit
            | SemanticType::U8
            | SemanticType::I8
            | SemanticType::Enum8
            | SemanticType::Bitfield8 => 1,
            SemanticType::U16 | SemanticType::I16 | SemanticType::Bitfield16 => 2,
            SemanticType::U32
            | SemanticType::I32
            | SemanticType::F32
            | SemanticType::Bitfield32 => 4,
            SemanticType::U64
            | SemanticType::I64
            | SemanticType::F64
            | SemanticType::Bitfield64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedValue {
    Bit(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Enum8(u8),
    Bitfield8(u8),
    Bitfield16(u16),
    Bitfield32(u32),
    Bitfield64(u64),
}

impl TypedValue {
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            TypedValue::Bit(_) => SemanticType::Bit,
            TypedValue::U8(_) => SemanticType::U8,
            TypedValue::U16(_) => SemanticType::U16,
            TypedValue::U32(_) => SemanticType::U32,
            TypedValue::U64(_) => SemanticType::U64,
            TypedValue::I8(_) => SemanticType::I8,
            TypedValue::I16(_) => SemanticType::I16,
            TypedValue::I32(_) => SemanticType::I32,
            TypedValue::I64(_) => SemanticType::I64,
            TypedValue::F32(_) => SemanticType::F32,
            TypedValue::F64(_) => SemanticType::F64,
            TypedValue::Enum8(_) => SemanticType::Enum8,
            TypedValue::Bitfield8(_) => SemanticType::Bitfield8,
            TypedValue::Bitfield16(_) => SemanticType::Bitfield16,
            TypedValue::Bitfield32(_) => SemanticType::Bitfield32,
            TypedValue::Bitfield64(_) => SemanticType::Bitfield64,
        }
    }

    /// Little-endian, two's-complement encoding at the type's fixed width.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match *self {
            TypedValue::Bit(v) => out.push(v as u8),
            TypedValue::U8(v) => out.push(v),
            TypedValue::U16(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::I8(v) => out.push(v as u8),
            TypedValue::I16(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::I32(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::F32(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::F64(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::Enum8(v) => out.push(v),
            TypedValue::Bitfield8(v) => out.push(v),
            TypedValue::Bitfield16(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::Bitfield32(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::Bitfield64(v) => out.extend_from_slice(&v.to_le_bytes()),
        }
    }

    /// Decode `bytes` (exactly `ty.width()` long) per `ty`.
    pub fn decode(ty: SemanticType, bytes: &[u8]) -> Option<TypedValue> {
        if bytes.len() != ty.width() {
            return None;
        }
        Some(match ty {
            SemanticType::Bit => TypedValue::Bit(bytes[0] != 0),
            SemanticType::U8 => TypedValue::U8(bytes[0]),
            SemanticType::U16 => TypedValue::U16(u16::from_le_bytes(bytes.try_into().ok()?)),
            SemanticType::U32 => TypedValue::U32(u32::from_le_bytes(bytes.try_into().ok()?)),
            SemanticType::U64 => TypedValue::U64(u64::from_le_bytes(bytes.try_into().ok()?)),
            SemanticType::I8 => TypedValue::I8(bytes[0] as i8),
            SemanticType::I16 => TypedValue::I16(i16::from_le_bytes(bytes.try_into().ok()?)),
            SemanticType::I32 => TypedValue::I32(i32::from_le_bytes(bytes.try_into().ok()?)),
            SemanticType::I64 => TypedValue::I64(i64::from_le_bytes(bytes.try_into().ok()?)),
            SemanticType::F32 => TypedValue::F32(f32::from_le_bytes(bytes.try_into().ok()?)),
            SemanticType::F64 => TypedValue::F64(f64::from_le_bytes(bytes.try_into().ok()?)),
            SemanticType::Enum8 => TypedValue::Enum8(bytes[0]),
            SemanticType::Bitfield8 => TypedValue::Bitfield8(bytes[0]),
            SemanticType::Bitfield16 => {
                TypedValue::Bitfield16(u16::from_le_bytes(bytes.try_into().ok()?))
            }
            SemanticType::Bitfield32 => {
                TypedValue::Bitfield32(u32::from_le_bytes(bytes.try_into().ok()?))
            }
            SemanticType::Bitfield64 => {
                TypedValue::Bitfield64(u64::from_le_bytes(bytes.try_into().ok()?))
            }
        })
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Bit(v) => write!(f, "{v}"),
            TypedValue::U8(v) => write!(f, "{v}"),
            TypedValue::U16(v) => write!(f, "{v}"),
            TypedValue::U32(v) => write!(f, "{v}"),
            TypedValue::U64(v) => write!(f, "{v}"),
            TypedValue::I8(v) => write!(f, "{v}"),
            TypedValue::I16(v) => write!(f, "{v}"),
            TypedValue::I32(v) => write!(f, "{v}"),
            TypedValue::I64(v) => write!(f, "{v}"),
            TypedValue::F32(v) => write!(f, "{v}"),
            TypedValue::F64(v) => write!(f, "{v}"),
            TypedValue::Enum8(v) => write!(f, "{v:#04x}"),
            TypedValue::Bitfield8(v) => write!(f, "{v:#010b}"),
            TypedValue::Bitfield16(v) => write!(f, "{v:#018b}"),
            TypedValue::Bitfield32(v) => write!(f, "{v:#034b}"),
            TypedValue::Bitfield64(v) => write!(f, "{v:#066b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: TypedValue) {
        let mut buf = Vec::new();
        v.encode(&mut buf);
        assert_eq!(buf.len(), v.semantic_type().width());
        let back = TypedValue::decode(v.semantic_type(), &buf).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn every_semantic_type_round_trips() {
        roundtrip(TypedValue::Bit(true));
        roundtrip(TypedValue::Bit(false));
        roundtrip(TypedValue::U8(0xab));
        roundtrip(TypedValue::U16(0xbeef));
        roundtrip(TypedValue::U32(0xdead_beef));
        roundtrip(TypedValue::U64(0x0123_4567_89ab_cdef));
        roundtrip(TypedValue::I8(-42));
        roundtrip(TypedValue::I16(-1000));
        roundtrip(TypedValue::I32(-100_000));
        roundtrip(TypedValue::I64(-1_000_000_000_000));
        roundtrip(TypedValue::F32(3.5));
        roundtrip(TypedValue::F64(-2.25));
        roundtrip(TypedValue::Enum8(3));
        roundtrip(TypedValue::Bitfield8(0b1010_0101));
        roundtrip(TypedValue::Bitfield16(0xff00));
        roundtrip(TypedValue::Bitfield32(0x0f0f_0f0f));
        roundtrip(TypedValue::Bitfield64(0x00ff_00ff_00ff_00ff));
    }

    #[test]
    fn widths_match_the_fixed_table() {
        assert_eq!(SemanticType::Bit.width(), 1);
        assert_eq!(SemanticType::U8.width(), 1);
        assert_eq!(SemanticType::Enum8.width(), 1);
        assert_eq!(SemanticType::Bitfield8.width(), 1);
        assert_eq!(SemanticType::U16.width(), 2);
        assert_eq!(SemanticType::Bitfield16.width(), 2);
        assert_eq!(SemanticType::U32.width(), 4);
        assert_eq!(SemanticType::F32.width(), 4);
        assert_eq!(SemanticType::I32.width(), 4);
        assert_eq!(SemanticType::Bitfield32.width(), 4);
        assert_eq!(SemanticType::U64.width(), 8);
        assert_eq!(SemanticType::F64.width(), 8);
        assert_eq!(SemanticType::I64.width(), 8);
        assert_eq!(SemanticType::Bitfield64.width(), 8);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert!(TypedValue::decode(SemanticType::U32, &[0, 1]).is_none());
    }

    #[test]
    fn signed_values_use_twos_complement() {
        let mut buf = Vec::new();
        TypedValue::I32(-1).encode(&mut buf);
        assert_eq!(buf, vec![0xff, 0xff, 0xff, 0xff]);
    }
}
