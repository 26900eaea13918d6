//! Content fingerprints for duplicate detection
//!
//! A fingerprint is the SHA-256 digest of a canonical serialization of a
//! dataset. The serialization visits elements in ascending tag order at
//! every nesting level and frames every value with its length, so the
//! digest depends only on content and never on file layout, transfer
//! syntax or padding.

use crate::dicom::reader::Endianness;
use crate::dicom::{Dataset, DicomFile, Tag, Value, tags};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 32-byte SHA-256 digest; hex in text form
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint([u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid fingerprint {0:?}: expected 64 hex digits")]
pub struct ParseFingerprintError(pub String);

impl Fingerprint {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFingerprintError(s.to_string());
        if s.len() != 64 || !s.is_ascii() {
            return Err(err());
        }

        let mut bytes = [0u8; 32];
        for (byte, pair) in bytes.iter_mut().zip(s.as_bytes().chunks_exact(2)) {
            let hex = std::str::from_utf8(pair).map_err(|_| err())?;
            *byte = u8::from_str_radix(hex, 16).map_err(|_| err())?;
        }
        Ok(Self(bytes))
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_string()
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ParseFingerprintError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Attributes regenerated on every export of the same study
pub const VOLATILE_TAGS: [Tag; 4] = [
    tags::INSTANCE_CREATION_DATE,
    tags::INSTANCE_CREATION_TIME,
    tags::INSTANCE_CREATOR_UID,
    tags::TIMEZONE_OFFSET_FROM_UTC,
];

/// Which content decides that two uploads are duplicates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FingerprintScope {
    /// Raw file bytes
    File,
    /// Every element of the main dataset
    #[default]
    Dataset,
    /// Main dataset without volatile instance-creation attributes
    Clinical,
}

impl FingerprintScope {
    /// Fingerprint an upload according to this scope
    #[must_use]
    pub fn fingerprint(self, bytes: &[u8], file: &DicomFile) -> Fingerprint {
        match self {
            Self::File => fingerprint_bytes(bytes),
            Self::Dataset => compute_fingerprint(&file.dataset),
            Self::Clinical => {
                compute_fingerprint(&file.dataset.filtered(|e| !VOLATILE_TAGS.contains(&e.tag)))
            }
        }
    }
}

/// Digest of raw bytes
#[must_use]
pub fn fingerprint_bytes(bytes: &[u8]) -> Fingerprint {
    Fingerprint(Sha256::digest(bytes).into())
}

/// Canonical content digest of `dataset`, including nested sequences
#[must_use]
pub fn compute_fingerprint(dataset: &Dataset) -> Fingerprint {
    let mut hasher = Sha256::new();
    let mut scratch = Vec::new();
    hash_dataset(&mut hasher, dataset, &mut scratch);
    Fingerprint(hasher.finalize().into())
}

const SEQUENCE_MARKER: u32 = 0xFFFF_FFFF;

fn hash_tag(hasher: &mut Sha256, tag: Tag) {
    hasher.update(tag.group().to_le_bytes());
    hasher.update(tag.element().to_le_bytes());
}

fn hash_dataset(hasher: &mut Sha256, dataset: &Dataset, scratch: &mut Vec<u8>) {
    for element in dataset.sorted() {
        hash_tag(hasher, element.tag);
        hasher.update(element.vr.as_str().as_bytes());

        match &element.value {
            Value::Sequence(items) => {
                hasher.update(SEQUENCE_MARKER.to_le_bytes());
                hasher.update((items.len() as u32).to_le_bytes());
                for item in items {
                    hash_tag(hasher, Tag::ITEM);
                    hash_dataset(hasher, item, scratch);
                    hash_tag(hasher, Tag::ITEM_DELIMITER);
                }
            }
            Value::Str(s) => {
                let text = s.trim_end_matches([' ', '\0']);
                hasher.update((text.len() as u32).to_le_bytes());
                hasher.update(text.as_bytes());
            }
            value => {
                scratch.clear();
                value.write_primitive(Endianness::Little, scratch);
                hasher.update((scratch.len() as u32).to_le_bytes());
                hasher.update(scratch.as_slice());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicom::writer::{SequenceLength, write_file};
    use crate::dicom::{Element, TransferSyntax, VR, parse_dataset};

    fn text(tag: Tag, vr: VR, s: &str) -> Element {
        Element::new(tag, vr, Value::Str(s.into()))
    }

    fn sample() -> Vec<Element> {
        let item = Dataset::from_elements([
            text(tags::SOP_CLASS_UID, VR::UI, "1.2.840.10008.5.1.4.1.1.2"),
            text(tags::SOP_INSTANCE_UID, VR::UI, "1.2.3.4"),
        ])
        .unwrap();

        vec![
            text(tags::INSTANCE_CREATION_DATE, VR::DA, "20240101"),
            text(tags::MODALITY, VR::CS, "CT"),
            Element::new(tags::REFERENCED_IMAGE_SEQUENCE, VR::SQ, Value::Sequence(vec![item])),
            text(tags::PATIENT_NAME, VR::PN, "Doe^Jane"),
            Element::new(tags::ROWS, VR::US, Value::U16(vec![512])),
            Element::new(tags::PIXEL_DATA, VR::OW, Value::Bytes(vec![1, 2, 3, 4])),
        ]
    }

    #[test]
    fn test_deterministic() {
        let dataset = Dataset::from_elements(sample()).unwrap();
        assert_eq!(compute_fingerprint(&dataset), compute_fingerprint(&dataset.clone()));
    }

    #[test]
    fn test_insertion_order_independent() {
        let forward = Dataset::from_elements(sample()).unwrap();
        let reversed = Dataset::from_elements(sample().into_iter().rev()).unwrap();
        assert_ne!(forward, reversed);
        assert_eq!(compute_fingerprint(&forward), compute_fingerprint(&reversed));
    }

    #[test]
    fn test_sensitive_to_single_value() {
        let base = compute_fingerprint(&Dataset::from_elements(sample()).unwrap());

        let mut changed = sample();
        changed[3] = text(tags::PATIENT_NAME, VR::PN, "Doe^John");
        assert_ne!(base, compute_fingerprint(&Dataset::from_elements(changed).unwrap()));

        let mut changed = sample();
        changed[5] = Element::new(tags::PIXEL_DATA, VR::OW, Value::Bytes(vec![1, 2, 3, 5]));
        assert_ne!(base, compute_fingerprint(&Dataset::from_elements(changed).unwrap()));
    }

    #[test]
    fn test_framing_separates_adjacent_values() {
        let a = Dataset::from_elements([
            text(tags::MODALITY, VR::CS, "AB"),
            text(tags::PATIENT_NAME, VR::PN, "C"),
        ])
        .unwrap();
        let b = Dataset::from_elements([
            text(tags::MODALITY, VR::CS, "A"),
            text(tags::PATIENT_NAME, VR::PN, "BC"),
        ])
        .unwrap();
        assert_ne!(compute_fingerprint(&a), compute_fingerprint(&b));
    }

    #[test]
    fn test_independent_of_transfer_syntax() {
        let dataset = Dataset::from_elements(sample()).unwrap();
        let expected = compute_fingerprint(&dataset);
        for syntax in TransferSyntax::ALL {
            for sequences in [SequenceLength::Defined, SequenceLength::Undefined] {
                let parsed = parse_dataset(&write_file(&dataset, syntax, sequences)).unwrap();
                assert_eq!(compute_fingerprint(&parsed.dataset), expected, "{syntax}");
            }
        }
    }

    #[test]
    fn test_acquisition_attributes_independent_of_transfer_syntax() {
        let item = Dataset::from_elements([text(Tag(0x0018, 0x0020), VR::CS, "SE")]).unwrap();
        let dataset = Dataset::from_elements([
            Element::new(Tag(0x0008, 0x9215), VR::SQ, Value::Sequence(vec![item])),
            text(Tag(0x0018, 0x0020), VR::CS, "SE"),
            text(Tag(0x0018, 0x0087), VR::DS, "1.5"),
            Element::new(Tag(0x0028, 0x0120), VR::US, Value::U16(vec![0])),
        ])
        .unwrap();

        let explicit = write_file(
            &dataset,
            TransferSyntax::ExplicitVrLittleEndian,
            SequenceLength::Defined,
        );
        let implicit = write_file(
            &dataset,
            TransferSyntax::ImplicitVrLittleEndian,
            SequenceLength::Defined,
        );
        let explicit = parse_dataset(&explicit).unwrap();
        let implicit = parse_dataset(&implicit).unwrap();

        assert_eq!(compute_fingerprint(&implicit.dataset), compute_fingerprint(&explicit.dataset));
        assert_eq!(compute_fingerprint(&implicit.dataset), compute_fingerprint(&dataset));
    }

    #[test]
    fn test_clinical_scope_ignores_volatile_tags() {
        let dataset = Dataset::from_elements(sample()).unwrap();
        let mut later = sample();
        later[0] = text(tags::INSTANCE_CREATION_DATE, VR::DA, "20250505");
        let later = Dataset::from_elements(later).unwrap();

        let bytes_a = write_file(
            &dataset,
            TransferSyntax::ExplicitVrLittleEndian,
            SequenceLength::Undefined,
        );
        let bytes_b = write_file(
            &later,
            TransferSyntax::ExplicitVrLittleEndian,
            SequenceLength::Undefined,
        );
        let file_a = parse_dataset(&bytes_a).unwrap();
        let file_b = parse_dataset(&bytes_b).unwrap();

        assert_eq!(
            FingerprintScope::Clinical.fingerprint(&bytes_a, &file_a),
            FingerprintScope::Clinical.fingerprint(&bytes_b, &file_b)
        );
        assert_ne!(
            FingerprintScope::Dataset.fingerprint(&bytes_a, &file_a),
            FingerprintScope::Dataset.fingerprint(&bytes_b, &file_b)
        );
        assert_ne!(
            FingerprintScope::File.fingerprint(&bytes_a, &file_a),
            FingerprintScope::File.fingerprint(&bytes_b, &file_b)
        );
    }

    #[test]
    fn test_hex_round_trip() {
        let fp = fingerprint_bytes(b"abc");
        let hex = fp.to_string();
        assert_eq!(hex, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
        assert_eq!(hex.parse::<Fingerprint>().unwrap(), fp);
        assert!("abc".parse::<Fingerprint>().is_err());
        assert!("zz".repeat(32).parse::<Fingerprint>().is_err());
    }
}
