//! Data element building blocks: tags, value representations and values

use crate::dicom::dataset::Dataset;
use crate::dicom::reader::Endianness;
use std::fmt;
use std::str::FromStr;

/// A (group, element) attribute tag, ordered by group then element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u16, pub u16);

impl Tag {
    pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
    pub const ITEM_DELIMITER: Tag = Tag(0xFFFE, 0xE00D);
    pub const SEQUENCE_DELIMITER: Tag = Tag(0xFFFE, 0xE0DD);

    #[inline(always)]
    #[must_use]
    pub fn group(self) -> u16 {
        self.0
    }

    #[inline(always)]
    #[must_use]
    pub fn element(self) -> u16 {
        self.1
    }

    /// Item and delimitation tags (group FFFE) carry no VR, even in explicit syntaxes
    #[inline]
    #[must_use]
    pub fn is_delimiter(self) -> bool {
        self.0 == 0xFFFE
    }

    #[inline]
    #[must_use]
    pub fn is_private(self) -> bool {
        self.0 & 1 == 1
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

/// Error produced when a tag string is neither `GGGG,EEEE` nor a known keyword
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tag '{0}': expected 'GGGG,EEEE' in hex or a dictionary keyword")]
pub struct ParseTagError(pub String);

impl FromStr for Tag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().trim_start_matches('(').trim_end_matches(')');

        if let Some((group, element)) = cleaned.split_once(',') {
            let group = u16::from_str_radix(group.trim(), 16);
            let element = u16::from_str_radix(element.trim(), 16);
            return match (group, element) {
                (Ok(g), Ok(e)) => Ok(Tag(g, e)),
                _ => Err(ParseTagError(s.to_string())),
            };
        }

        crate::dicom::dictionary::by_keyword(cleaned)
            .map(|entry| entry.tag)
            .ok_or_else(|| ParseTagError(s.to_string()))
    }
}

/// Value representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VR {
    AE,
    AS,
    AT,
    CS,
    DA,
    DS,
    DT,
    FD,
    FL,
    IS,
    LO,
    LT,
    OB,
    OD,
    OF,
    OL,
    OV,
    OW,
    PN,
    SH,
    SL,
    SQ,
    SS,
    ST,
    SV,
    TM,
    UC,
    UI,
    UL,
    UN,
    UR,
    US,
    UT,
    UV,
}

impl VR {
    /// Decode the two-character code found in explicit VR streams
    #[must_use]
    pub fn from_bytes(code: [u8; 2]) -> Option<Self> {
        Some(match &code {
            b"AE" => Self::AE,
            b"AS" => Self::AS,
            b"AT" => Self::AT,
            b"CS" => Self::CS,
            b"DA" => Self::DA,
            b"DS" => Self::DS,
            b"DT" => Self::DT,
            b"FD" => Self::FD,
            b"FL" => Self::FL,
            b"IS" => Self::IS,
            b"LO" => Self::LO,
            b"LT" => Self::LT,
            b"OB" => Self::OB,
            b"OD" => Self::OD,
            b"OF" => Self::OF,
            b"OL" => Self::OL,
            b"OV" => Self::OV,
            b"OW" => Self::OW,
            b"PN" => Self::PN,
            b"SH" => Self::SH,
            b"SL" => Self::SL,
            b"SQ" => Self::SQ,
            b"SS" => Self::SS,
            b"ST" => Self::ST,
            b"SV" => Self::SV,
            b"TM" => Self::TM,
            b"UC" => Self::UC,
            b"UI" => Self::UI,
            b"UL" => Self::UL,
            b"UN" => Self::UN,
            b"UR" => Self::UR,
            b"US" => Self::US,
            b"UT" => Self::UT,
            b"UV" => Self::UV,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AE => "AE",
            Self::AS => "AS",
            Self::AT => "AT",
            Self::CS => "CS",
            Self::DA => "DA",
            Self::DS => "DS",
            Self::DT => "DT",
            Self::FD => "FD",
            Self::FL => "FL",
            Self::IS => "IS",
            Self::LO => "LO",
            Self::LT => "LT",
            Self::OB => "OB",
            Self::OD => "OD",
            Self::OF => "OF",
            Self::OL => "OL",
            Self::OV => "OV",
            Self::OW => "OW",
            Self::PN => "PN",
            Self::SH => "SH",
            Self::SL => "SL",
            Self::SQ => "SQ",
            Self::SS => "SS",
            Self::ST => "ST",
            Self::SV => "SV",
            Self::TM => "TM",
            Self::UC => "UC",
            Self::UI => "UI",
            Self::UL => "UL",
            Self::UN => "UN",
            Self::UR => "UR",
            Self::US => "US",
            Self::UT => "UT",
            Self::UV => "UV",
        }
    }

    /// VRs encoded with 2 reserved bytes and a 4-byte length in explicit VR syntaxes
    #[must_use]
    pub fn has_long_length(self) -> bool {
        matches!(
            self,
            Self::OB
                | Self::OD
                | Self::OF
                | Self::OL
                | Self::OV
                | Self::OW
                | Self::SQ
                | Self::UC
                | Self::UN
                | Self::UR
                | Self::UT
                | Self::UV
        )
    }

    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::AE
                | Self::AS
                | Self::CS
                | Self::DA
                | Self::DS
                | Self::DT
                | Self::IS
                | Self::LO
                | Self::LT
                | Self::PN
                | Self::SH
                | Self::ST
                | Self::TM
                | Self::UC
                | Self::UI
                | Self::UR
                | Self::UT
        )
    }

    /// Word size of "other" binary VRs whose byte order follows the transfer syntax
    #[must_use]
    pub fn swap_width(self) -> Option<usize> {
        match self {
            Self::OW => Some(2),
            Self::OF | Self::OL => Some(4),
            Self::OD | Self::OV => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared value length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Defined(u32),
    Undefined,
}

impl Length {
    pub const UNDEFINED_MARKER: u32 = 0xFFFF_FFFF;

    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        if raw == Self::UNDEFINED_MARKER {
            Self::Undefined
        } else {
            Self::Defined(raw)
        }
    }
}

/// Decoded element value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text with padding removed; multiple values stay separated by `\`
    Str(String),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    U64(Vec<u64>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Tags(Vec<Tag>),
    /// Raw bytes; other-word VRs are kept in little-endian order
    Bytes(Vec<u8>),
    Sequence(Vec<Dataset>),
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn items(&self) -> Option<&[Dataset]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// First value as an unsigned integer, parsing integer strings if needed
    #[must_use]
    pub fn to_u32(&self) -> Option<u32> {
        match self {
            Self::U16(v) => v.first().map(|&x| u32::from(x)),
            Self::U32(v) => v.first().copied(),
            Self::I16(v) => v.first().and_then(|&x| u32::try_from(x).ok()),
            Self::I32(v) => v.first().and_then(|&x| u32::try_from(x).ok()),
            Self::Str(s) => s.split('\\').next()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// Number of individual values (items for sequences)
    #[must_use]
    pub fn multiplicity(&self) -> usize {
        match self {
            Self::Str(s) if s.is_empty() => 0,
            Self::Str(s) => s.split('\\').count(),
            Self::U16(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Tags(v) => v.len(),
            Self::Bytes(b) => usize::from(!b.is_empty()),
            Self::Sequence(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.multiplicity() == 0
    }

    /// Append the primitive value bytes in the given byte order.
    ///
    /// Sequences write nothing here; their framing depends on the caller.
    pub fn write_primitive(&self, endian: Endianness, out: &mut Vec<u8>) {
        macro_rules! put {
            ($values:expr) => {
                for v in $values {
                    match endian {
                        Endianness::Little => out.extend_from_slice(&v.to_le_bytes()),
                        Endianness::Big => out.extend_from_slice(&v.to_be_bytes()),
                    }
                }
            };
        }

        match self {
            Self::Str(s) => out.extend_from_slice(s.as_bytes()),
            Self::U16(v) => put!(v),
            Self::I16(v) => put!(v),
            Self::U32(v) => put!(v),
            Self::I32(v) => put!(v),
            Self::U64(v) => put!(v),
            Self::I64(v) => put!(v),
            Self::F32(v) => put!(v),
            Self::F64(v) => put!(v),
            Self::Tags(tags) => put!(tags.iter().flat_map(|t| [t.0, t.1])),
            Self::Bytes(b) => out.extend_from_slice(b),
            Self::Sequence(_) => {}
        }
    }
}

impl fmt::Display for Value {
    /// Human-readable rendering; multiple values are joined with ", "
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(values: &[T]) -> String {
            values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        }

        match self {
            Self::Str(s) => {
                write!(f, "{}", s.split('\\').map(str::trim).collect::<Vec<_>>().join(", "))
            }
            Self::U16(v) => f.write_str(&join(v)),
            Self::I16(v) => f.write_str(&join(v)),
            Self::U32(v) => f.write_str(&join(v)),
            Self::I32(v) => f.write_str(&join(v)),
            Self::U64(v) => f.write_str(&join(v)),
            Self::I64(v) => f.write_str(&join(v)),
            Self::F32(v) => f.write_str(&join(v)),
            Self::F64(v) => f.write_str(&join(v)),
            Self::Tags(v) => f.write_str(&join(v)),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Sequence(items) => write!(f, "<{} items>", items.len()),
        }
    }
}

/// One decoded data element
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: Tag,
    pub vr: VR,
    pub length: Length,
    pub value: Value,
}

impl Element {
    /// Build an element, deriving the length from the value
    #[must_use]
    pub fn new(tag: Tag, vr: VR, value: Value) -> Self {
        let length = match &value {
            Value::Sequence(_) => Length::Undefined,
            other => {
                let mut buf = Vec::new();
                other.write_primitive(Endianness::Little, &mut buf);
                Length::Defined(u32::try_from(buf.len().next_multiple_of(2)).unwrap_or(u32::MAX))
            }
        };
        Self { tag, vr, length, value }
    }

    /// Dictionary keyword, if the tag is known
    #[must_use]
    pub fn keyword(&self) -> Option<&'static str> {
        crate::dicom::dictionary::lookup(self.tag).map(|entry| entry.keyword)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.vr == other.vr && self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_tag_parsing() {
        assert_eq!("0010,0010".parse::<Tag>(), Ok(Tag(0x0010, 0x0010)));
        assert_eq!(" (7fe0, 0010) ".parse::<Tag>(), Ok(Tag(0x7FE0, 0x0010)));
        assert_eq!("PatientName".parse::<Tag>(), Ok(Tag(0x0010, 0x0010)));
        assert_matches!("0010;0010".parse::<Tag>(), Err(ParseTagError(_)));
        assert_matches!("zz10,0010".parse::<Tag>(), Err(ParseTagError(_)));
    }

    #[test]
    fn test_tag_display_and_order() {
        assert_eq!(Tag(0x0008, 0x0016).to_string(), "(0008,0016)");
        assert!(Tag(0x0008, 0xFFFF) < Tag(0x0010, 0x0000));
        assert!(Tag(0x0028, 0x0010) < Tag(0x0028, 0x0011));
    }

    #[test]
    fn test_vr_codes() {
        assert_eq!(VR::from_bytes(*b"SQ"), Some(VR::SQ));
        assert_eq!(VR::from_bytes(*b"??"), None);
        assert!(VR::UT.has_long_length());
        assert!(!VR::US.has_long_length());
        assert_eq!(VR::OW.swap_width(), Some(2));
        assert_eq!(VR::OB.swap_width(), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Str("ORIGINAL\\PRIMARY".into()).to_string(), "ORIGINAL, PRIMARY");
        assert_eq!(Value::U16(vec![512, 512]).to_string(), "512, 512");
        assert_eq!(Value::Bytes(vec![0; 4]).to_string(), "<4 bytes>");
    }

    #[test]
    fn test_value_to_u32() {
        assert_eq!(Value::U16(vec![256]).to_u32(), Some(256));
        assert_eq!(Value::Str(" 3 ".into()).to_u32(), Some(3));
        assert_eq!(Value::I16(vec![-1]).to_u32(), None);
        assert_eq!(Value::Bytes(vec![1]).to_u32(), None);
    }

    #[test]
    fn test_element_length_is_even() {
        let element = Element::new(Tag(0x0010, 0x0020), VR::LO, Value::Str("ABC".into()));
        assert_eq!(element.length, Length::Defined(4));
    }
}
