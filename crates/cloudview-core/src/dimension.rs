//! Dimension identifiers and primitive storage types
//!
//! A dimension is one named attribute of a point with a fixed primitive
//! type. Well-known dimensions have fixed ids below [`FIRST_CUSTOM_ID`];
//! any other name is assigned an id from a process-wide registry the first
//! time it is seen.

use std::fmt;

use lazy_static::lazy_static;
use parking_lot::RwLock;

/// First id handed out to dimension names outside the well-known set.
pub const FIRST_CUSTOM_ID: u32 = 1000;

/// Most custom names the registry will hold. Names are never removed, so
/// the registry only grows for the life of the process.
pub const MAX_CUSTOM_DIMENSIONS: usize = 4096;

/// Primitive storage type of a dimension.
///
/// Discriminants encode the base kind in the high byte and the byte width
/// in the low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DimensionType {
    Signed8 = 0x101,
    Signed16 = 0x102,
    Signed32 = 0x104,
    Signed64 = 0x108,
    Unsigned8 = 0x201,
    Unsigned16 = 0x202,
    Unsigned32 = 0x204,
    Unsigned64 = 0x208,
    Float = 0x404,
    Double = 0x408,
}

/// Base kind of a [`DimensionType`], reported as `base` in pipeline schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Signed,
    Unsigned,
    Floating,
}

impl BaseType {
    pub fn name(self) -> &'static str {
        match self {
            BaseType::Signed => "signed",
            BaseType::Unsigned => "unsigned",
            BaseType::Floating => "floating",
        }
    }
}

/// A single decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Signed(i64),
    Unsigned(u64),
    Floating(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Signed(v) => v as f64,
            Value::Unsigned(v) => v as f64,
            Value::Floating(v) => v,
        }
    }
}

impl DimensionType {
    pub const ALL: [DimensionType; 10] = [
        DimensionType::Signed8,
        DimensionType::Signed16,
        DimensionType::Signed32,
        DimensionType::Signed64,
        DimensionType::Unsigned8,
        DimensionType::Unsigned16,
        DimensionType::Unsigned32,
        DimensionType::Unsigned64,
        DimensionType::Float,
        DimensionType::Double,
    ];

    /// Look up a type by its numeric code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Look up a type by its interpretation name (`"uint16"`, `"double"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let alias = match lower.as_str() {
            "float32" => "float",
            "float64" | "floating" => "double",
            "unsigned8" | "uint8_t" => "uint8",
            "unsigned16" | "uint16_t" => "uint16",
            "unsigned32" | "uint32_t" => "uint32",
            "unsigned64" | "uint64_t" => "uint64",
            "signed8" | "int8_t" => "int8",
            "signed16" | "int16_t" => "int16",
            "signed32" | "int32_t" => "int32",
            "signed64" | "int64_t" => "int64",
            other => other,
        };
        Self::ALL.iter().copied().find(|t| t.name() == alias)
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Width in bytes of one value of this type.
    pub fn size(self) -> usize {
        (self.code() & 0xff) as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DimensionType::Signed8 => "int8",
            DimensionType::Signed16 => "int16",
            DimensionType::Signed32 => "int32",
            DimensionType::Signed64 => "int64",
            DimensionType::Unsigned8 => "uint8",
            DimensionType::Unsigned16 => "uint16",
            DimensionType::Unsigned32 => "uint32",
            DimensionType::Unsigned64 => "uint64",
            DimensionType::Float => "float",
            DimensionType::Double => "double",
        }
    }

    pub fn base(self) -> BaseType {
        match self.code() >> 8 {
            1 => BaseType::Signed,
            2 => BaseType::Unsigned,
            _ => BaseType::Floating,
        }
    }

    /// Decode a native-endian value. `bytes` must be exactly `self.size()` long.
    pub fn read(self, bytes: &[u8]) -> Value {
        macro_rules! ne {
            ($t:ty) => {{
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_ne_bytes(raw)
            }};
        }
        match self {
            DimensionType::Signed8 => Value::Signed(ne!(i8) as i64),
            DimensionType::Signed16 => Value::Signed(ne!(i16) as i64),
            DimensionType::Signed32 => Value::Signed(ne!(i32) as i64),
            DimensionType::Signed64 => Value::Signed(ne!(i64)),
            DimensionType::Unsigned8 => Value::Unsigned(ne!(u8) as u64),
            DimensionType::Unsigned16 => Value::Unsigned(ne!(u16) as u64),
            DimensionType::Unsigned32 => Value::Unsigned(ne!(u32) as u64),
            DimensionType::Unsigned64 => Value::Unsigned(ne!(u64)),
            DimensionType::Float => Value::Floating(ne!(f32) as f64),
            DimensionType::Double => Value::Floating(ne!(f64)),
        }
    }

    /// Encode `value` as this type in native byte order.
    ///
    /// Returns `false` and leaves `out` untouched when the value cannot be
    /// represented. Floating values headed for integer types are rounded.
    pub fn write(self, value: Value, out: &mut [u8]) -> bool {
        macro_rules! int {
            ($t:ty) => {{
                let converted: Option<$t> = match value {
                    Value::Signed(v) => <$t>::try_from(v).ok(),
                    Value::Unsigned(v) => <$t>::try_from(v).ok(),
                    Value::Floating(v) => {
                        // MAX as f64 rounds up for 64-bit types; compare against 2^bits instead.
                        let r = v.round();
                        let upper = 2f64.powi(<$t>::BITS as i32 - (<$t>::MIN != 0) as i32);
                        if r.is_finite() && r >= <$t>::MIN as f64 && r < upper {
                            Some(r as $t)
                        } else {
                            None
                        }
                    }
                };
                match converted {
                    Some(v) => {
                        out.copy_from_slice(&v.to_ne_bytes());
                        true
                    }
                    None => false,
                }
            }};
        }
        match self {
            DimensionType::Signed8 => int!(i8),
            DimensionType::Signed16 => int!(i16),
            DimensionType::Signed32 => int!(i32),
            DimensionType::Signed64 => int!(i64),
            DimensionType::Unsigned8 => int!(u8),
            DimensionType::Unsigned16 => int!(u16),
            DimensionType::Unsigned32 => int!(u32),
            DimensionType::Unsigned64 => int!(u64),
            DimensionType::Float => {
                let v = value.as_f64();
                if v.is_finite() && v.abs() > f32::MAX as f64 {
                    return false;
                }
                out.copy_from_slice(&(v as f32).to_ne_bytes());
                true
            }
            DimensionType::Double => {
                out.copy_from_slice(&value.as_f64().to_ne_bytes());
                true
            }
        }
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric dimension identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimId(pub u32);

/// Well-known dimensions: id, canonical name, default storage type.
const WELL_KNOWN: &[(u32, &str, DimensionType)] = &[
    (1, "X", DimensionType::Double),
    (2, "Y", DimensionType::Double),
    (3, "Z", DimensionType::Double),
    (4, "Intensity", DimensionType::Unsigned16),
    (5, "Amplitude", DimensionType::Float),
    (6, "Reflectance", DimensionType::Float),
    (7, "ReturnNumber", DimensionType::Unsigned8),
    (8, "NumberOfReturns", DimensionType::Unsigned8),
    (9, "ScanDirectionFlag", DimensionType::Unsigned8),
    (10, "EdgeOfFlightLine", DimensionType::Unsigned8),
    (11, "Classification", DimensionType::Unsigned8),
    (12, "ScanAngleRank", DimensionType::Float),
    (13, "UserData", DimensionType::Unsigned8),
    (14, "PointSourceId", DimensionType::Unsigned16),
    (15, "GpsTime", DimensionType::Double),
    (16, "Red", DimensionType::Unsigned16),
    (17, "Green", DimensionType::Unsigned16),
    (18, "Blue", DimensionType::Unsigned16),
    (19, "OffsetTime", DimensionType::Unsigned32),
    (20, "PointId", DimensionType::Unsigned32),
];

lazy_static! {
    static ref CUSTOM_NAMES: RwLock<Vec<String>> = RwLock::new(Vec::new());
}

impl DimId {
    pub const X: DimId = DimId(1);
    pub const Y: DimId = DimId(2);
    pub const Z: DimId = DimId(3);

    /// Find the id for `name` without registering it.
    ///
    /// Matching is case-insensitive for well-known names and exact for
    /// custom ones.
    pub fn lookup(name: &str) -> Option<DimId> {
        if let Some((id, _, _)) = WELL_KNOWN
            .iter()
            .find(|(_, known, _)| known.eq_ignore_ascii_case(name))
        {
            return Some(DimId(*id));
        }
        CUSTOM_NAMES
            .read()
            .iter()
            .position(|n| n == name)
            .map(|i| DimId(FIRST_CUSTOM_ID + i as u32))
    }

    /// Find or register the id for `name`.
    ///
    /// Returns `None` once [`MAX_CUSTOM_DIMENSIONS`] names are registered
    /// and `name` is not one of them.
    pub fn resolve(name: &str) -> Option<DimId> {
        if let Some(id) = Self::lookup(name) {
            return Some(id);
        }
        // Another thread may have registered it between the two locks.
        let index = register(&mut CUSTOM_NAMES.write(), name, MAX_CUSTOM_DIMENSIONS);
        match index {
            Some(i) => Some(DimId(FIRST_CUSTOM_ID + i as u32)),
            None => {
                tracing::warn!(name, limit = MAX_CUSTOM_DIMENSIONS, "dimension registry full");
                None
            }
        }
    }

    /// Canonical name for this id, if it is known.
    pub fn name(self) -> Option<String> {
        if self.0 >= FIRST_CUSTOM_ID {
            return CUSTOM_NAMES
                .read()
                .get((self.0 - FIRST_CUSTOM_ID) as usize)
                .cloned();
        }
        WELL_KNOWN
            .iter()
            .find(|(id, _, _)| *id == self.0)
            .map(|(_, name, _)| name.to_string())
    }

    /// Default storage type for well-known dimensions.
    pub fn default_type(self) -> Option<DimensionType> {
        WELL_KNOWN
            .iter()
            .find(|(id, _, _)| *id == self.0)
            .map(|(_, _, t)| *t)
    }
}

/// Position of `name` in `names`, appending it when absent and `names`
/// holds fewer than `limit` entries.
fn register(names: &mut Vec<String>, name: &str, limit: usize) -> Option<usize> {
    if let Some(i) = names.iter().position(|n| n == name) {
        return Some(i);
    }
    if names.len() >= limit {
        return None;
    }
    names.push(name.to_string());
    tracing::debug!(name, id = FIRST_CUSTOM_ID as usize + names.len() - 1, "registered custom dimension");
    Some(names.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_encode_size() {
        assert_eq!(DimensionType::Double.size(), 8);
        assert_eq!(DimensionType::Unsigned16.size(), 2);
        assert_eq!(DimensionType::Signed8.size(), 1);
        assert_eq!(DimensionType::from_code(0x404), Some(DimensionType::Float));
        assert_eq!(DimensionType::from_code(0), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(DimensionType::from_name("uint16"), Some(DimensionType::Unsigned16));
        assert_eq!(DimensionType::from_name("Float64"), Some(DimensionType::Double));
        assert_eq!(DimensionType::from_name("complex"), None);
        assert_eq!(DimensionType::Signed32.base(), BaseType::Signed);
    }

    #[test]
    fn test_read_write_native() {
        let mut buf = [0u8; 2];
        assert!(DimensionType::Unsigned16.write(Value::Unsigned(513), &mut buf));
        assert_eq!(buf, 513u16.to_ne_bytes());
        assert_eq!(DimensionType::Unsigned16.read(&buf), Value::Unsigned(513));
    }

    #[test]
    fn test_write_rejects_out_of_range() {
        let mut buf = [7u8; 1];
        assert!(!DimensionType::Unsigned8.write(Value::Signed(-1), &mut buf));
        assert!(!DimensionType::Unsigned8.write(Value::Floating(300.0), &mut buf));
        assert_eq!(buf, [7]);
    }

    #[test]
    fn test_write_rounds_floats_into_integers() {
        let mut buf = [0u8; 4];
        assert!(DimensionType::Signed32.write(Value::Floating(-2.6), &mut buf));
        assert_eq!(i32::from_ne_bytes(buf), -3);
    }

    #[test]
    fn test_write_rejects_floats_past_64_bit_range() {
        let mut buf = [0u8; 8];
        assert!(!DimensionType::Unsigned64.write(Value::Floating(18446744073709551616.0), &mut buf));
        assert!(!DimensionType::Signed64.write(Value::Floating(9223372036854775808.0), &mut buf));
        assert_eq!(buf, [0; 8]);

        assert!(DimensionType::Signed64.write(Value::Floating(-9223372036854775808.0), &mut buf));
        assert_eq!(i64::from_ne_bytes(buf), i64::MIN);
        assert!(DimensionType::Unsigned64.write(Value::Floating(9007199254740992.0), &mut buf));
        assert_eq!(u64::from_ne_bytes(buf), 1 << 53);
        assert!(!DimensionType::Unsigned32.write(Value::Floating(4294967295.6), &mut buf[..4]));
        assert!(DimensionType::Unsigned32.write(Value::Floating(4294967295.4), &mut buf[..4]));
    }

    #[test]
    fn test_well_known_ids() {
        assert_eq!(DimId::lookup("x"), Some(DimId::X));
        assert_eq!(DimId::X.name().as_deref(), Some("X"));
        assert_eq!(DimId(4).default_type(), Some(DimensionType::Unsigned16));
    }

    #[test]
    fn test_custom_ids_are_stable() {
        let a = DimId::resolve("dimension_test_custom_a").unwrap();
        let again = DimId::resolve("dimension_test_custom_a").unwrap();
        assert_eq!(a, again);
        assert!(a.0 >= FIRST_CUSTOM_ID);
        assert_eq!(a.name().as_deref(), Some("dimension_test_custom_a"));
        assert_eq!(a.default_type(), None);
    }

    #[test]
    fn test_registry_stops_at_limit() {
        let mut names = Vec::new();
        assert_eq!(register(&mut names, "a", 2), Some(0));
        assert_eq!(register(&mut names, "b", 2), Some(1));
        assert_eq!(register(&mut names, "c", 2), None);
        assert_eq!(register(&mut names, "a", 2), Some(0));
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
