//! Transfer syntaxes understood by the parser

use crate::dicom::reader::Endianness;
use std::fmt;

/// Encoding of the main dataset, fixed for the whole parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferSyntax {
    ImplicitVrLittleEndian,
    ExplicitVrLittleEndian,
    ExplicitVrBigEndian,
}

impl TransferSyntax {
    pub const ALL: [TransferSyntax; 3] = [
        Self::ImplicitVrLittleEndian,
        Self::ExplicitVrLittleEndian,
        Self::ExplicitVrBigEndian,
    ];

    /// Resolve a Transfer Syntax UID (trailing NUL padding tolerated)
    #[must_use]
    pub fn from_uid(uid: &str) -> Option<Self> {
        let uid = uid.trim_end_matches(['\0', ' ']);
        Self::ALL.into_iter().find(|ts| ts.uid() == uid)
    }

    #[must_use]
    pub fn uid(self) -> &'static str {
        match self {
            Self::ImplicitVrLittleEndian => "1.2.840.10008.1.2",
            Self::ExplicitVrLittleEndian => "1.2.840.10008.1.2.1",
            Self::ExplicitVrBigEndian => "1.2.840.10008.1.2.2",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ImplicitVrLittleEndian => "Implicit VR Little Endian",
            Self::ExplicitVrLittleEndian => "Explicit VR Little Endian",
            Self::ExplicitVrBigEndian => "Explicit VR Big Endian",
        }
    }

    #[inline]
    #[must_use]
    pub fn endianness(self) -> Endianness {
        match self {
            Self::ExplicitVrBigEndian => Endianness::Big,
            _ => Endianness::Little,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_explicit_vr(self) -> bool {
        !matches!(self, Self::ImplicitVrLittleEndian)
    }
}

impl fmt::Display for TransferSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{name} ({uid})", name = self.name(), uid = self.uid())
    }
}
