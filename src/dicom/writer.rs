//! Part 10 serializer for in-memory datasets
//!
//! Produces byte streams the parser accepts, in any supported transfer
//! syntax. Tests and benchmarks use it to synthesize input files.

use crate::dicom::reader::Endianness;
use crate::dicom::transfer_syntax::TransferSyntax;
use crate::dicom::{Dataset, Element, Tag, VR, Value, tags};

/// How sequences and their items encode their length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceLength {
    /// 0xFFFFFFFF with item and sequence delimitation tags
    Undefined,
    /// Explicit byte counts, no delimiters
    Defined,
}

const IMPLEMENTATION_VERSION_NAME: &str = "DCMINGEST_010";

/// Write preamble, file meta group and `dataset` encoded in `syntax`
#[must_use]
pub fn write_file(dataset: &Dataset, syntax: TransferSyntax, sequences: SequenceLength) -> Vec<u8> {
    let mut out = vec![0u8; 128];
    out.extend_from_slice(b"DICM");

    let mut meta = vec![
        Element::new(tags::FILE_META_INFORMATION_VERSION, VR::OB, Value::Bytes(vec![0, 1])),
    ];
    let uid = |value: &str| Value::Str(value.to_string());
    if let Some(class) = dataset.string(tags::SOP_CLASS_UID) {
        meta.push(Element::new(tags::MEDIA_STORAGE_SOP_CLASS_UID, VR::UI, uid(class)));
    }
    if let Some(instance) = dataset.string(tags::SOP_INSTANCE_UID) {
        meta.push(Element::new(tags::MEDIA_STORAGE_SOP_INSTANCE_UID, VR::UI, uid(instance)));
    }
    meta.push(Element::new(tags::TRANSFER_SYNTAX_UID, VR::UI, uid(syntax.uid())));
    meta.push(Element::new(
        Tag(0x0002, 0x0013),
        VR::SH,
        Value::Str(IMPLEMENTATION_VERSION_NAME.to_string()),
    ));

    let meta_syntax = TransferSyntax::ExplicitVrLittleEndian;
    let mut meta_body = Vec::new();
    for element in &meta {
        write_element(&mut meta_body, element, meta_syntax, sequences);
    }

    let group_length = Element::new(
        tags::FILE_META_INFORMATION_GROUP_LENGTH,
        VR::UL,
        Value::U32(vec![meta_body.len() as u32]),
    );
    write_element(&mut out, &group_length, meta_syntax, sequences);
    out.extend_from_slice(&meta_body);

    out.extend_from_slice(&write_dataset(dataset, syntax, sequences));
    out
}

/// Encode the elements of `dataset` in file order, without preamble or meta group
#[must_use]
pub fn write_dataset(
    dataset: &Dataset,
    syntax: TransferSyntax,
    sequences: SequenceLength,
) -> Vec<u8> {
    let mut out = Vec::new();
    for element in dataset {
        write_element(&mut out, element, syntax, sequences);
    }
    out
}

fn put_u16(out: &mut Vec<u8>, value: u16, endian: Endianness) {
    match endian {
        Endianness::Little => out.extend_from_slice(&value.to_le_bytes()),
        Endianness::Big => out.extend_from_slice(&value.to_be_bytes()),
    }
}

fn put_u32(out: &mut Vec<u8>, value: u32, endian: Endianness) {
    match endian {
        Endianness::Little => out.extend_from_slice(&value.to_le_bytes()),
        Endianness::Big => out.extend_from_slice(&value.to_be_bytes()),
    }
}

fn put_tag(out: &mut Vec<u8>, tag: Tag, endian: Endianness) {
    put_u16(out, tag.group(), endian);
    put_u16(out, tag.element(), endian);
}

fn write_element(
    out: &mut Vec<u8>,
    element: &Element,
    syntax: TransferSyntax,
    sequences: SequenceLength,
) {
    let endian = syntax.endianness();
    put_tag(out, element.tag, endian);

    if let Value::Sequence(items) = &element.value {
        let body = write_items(items, syntax, sequences);
        if syntax.is_explicit_vr() {
            out.extend_from_slice(VR::SQ.as_str().as_bytes());
            out.extend_from_slice(&[0, 0]);
        }
        match sequences {
            SequenceLength::Undefined => {
                put_u32(out, 0xFFFF_FFFF, endian);
                out.extend_from_slice(&body);
                put_tag(out, Tag::SEQUENCE_DELIMITER, endian);
                put_u32(out, 0, endian);
            }
            SequenceLength::Defined => {
                put_u32(out, body.len() as u32, endian);
                out.extend_from_slice(&body);
            }
        }
        return;
    }

    let value = encode_value(element, endian);
    if syntax.is_explicit_vr() {
        out.extend_from_slice(element.vr.as_str().as_bytes());
        if element.vr.has_long_length() {
            out.extend_from_slice(&[0, 0]);
            put_u32(out, value.len() as u32, endian);
        } else {
            put_u16(out, value.len() as u16, endian);
        }
    } else {
        put_u32(out, value.len() as u32, endian);
    }
    out.extend_from_slice(&value);
}

fn write_items(items: &[Dataset], syntax: TransferSyntax, sequences: SequenceLength) -> Vec<u8> {
    let endian = syntax.endianness();
    let mut out = Vec::new();
    for item in items {
        let body = write_dataset(item, syntax, sequences);
        put_tag(&mut out, Tag::ITEM, endian);
        match sequences {
            SequenceLength::Undefined => {
                put_u32(&mut out, 0xFFFF_FFFF, endian);
                out.extend_from_slice(&body);
                put_tag(&mut out, Tag::ITEM_DELIMITER, endian);
                put_u32(&mut out, 0, endian);
            }
            SequenceLength::Defined => {
                put_u32(&mut out, body.len() as u32, endian);
                out.extend_from_slice(&body);
            }
        }
    }
    out
}

/// Value bytes in wire order, padded to even length
fn encode_value(element: &Element, endian: Endianness) -> Vec<u8> {
    let mut bytes = Vec::new();
    match &element.value {
        Value::Bytes(raw) => {
            bytes.extend_from_slice(raw);
            let width = if element.tag == tags::PIXEL_DATA && element.vr != VR::OB {
                Some(2)
            } else {
                element.vr.swap_width()
            };
            if let (Some(width), Endianness::Big) = (width, endian) {
                for word in bytes.chunks_exact_mut(width) {
                    word.reverse();
                }
            }
        }
        value => value.write_primitive(endian, &mut bytes),
    }

    if bytes.len() % 2 == 1 {
        bytes.push(match element.vr {
            VR::UI | VR::OB | VR::UN => 0,
            vr if vr.is_text() => b' ',
            _ => 0,
        });
    }
    bytes
}
