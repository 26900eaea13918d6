//! DICOM Part 10 dataset parser
//!
//! Reads the preamble and file meta group (always explicit VR little
//! endian), then decodes the main dataset in the transfer syntax the meta
//! group announces. Sequences are parsed recursively with a fixed depth
//! limit.

use crate::dicom::dataset::Dataset;
use crate::dicom::error::{FormatError, TagNotFound};
use crate::dicom::reader::{ByteReader, Endianness};
use crate::dicom::transfer_syntax::TransferSyntax;
use crate::dicom::{Element, Length, Tag, VR, Value, dictionary, tags};
use encoding_rs::Encoding;
use tracing::debug;

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";
pub const MAX_SEQUENCE_DEPTH: usize = 32;

/// A parsed file: meta group, transfer syntax and main dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DicomFile {
    pub meta: Dataset,
    pub transfer_syntax: TransferSyntax,
    pub dataset: Dataset,
}

impl DicomFile {
    /// True when nothing follows the meta group
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Look up `tag` in the main dataset, falling back to the meta group for group 0002
    pub fn get_tag_value(&self, tag: Tag) -> Result<&Element, TagNotFound> {
        self.dataset
            .get(tag)
            .or_else(|| (tag.group() == 0x0002).then(|| self.meta.get(tag)).flatten())
            .ok_or(TagNotFound(tag))
    }
}

/// Parse a complete DICOM file held in memory
pub fn parse_dataset(bytes: &[u8]) -> Result<DicomFile, FormatError> {
    let magic_end = PREAMBLE_LEN + MAGIC.len();
    if bytes.len() < magic_end || &bytes[PREAMBLE_LEN..magic_end] != MAGIC {
        return Err(FormatError::NotADicomFile);
    }

    let mut reader = ByteReader::new(bytes);
    reader.skip(PREAMBLE_LEN + MAGIC.len())?;

    let meta = parse_meta_group(&mut reader)?;
    let uid = meta
        .string(tags::TRANSFER_SYNTAX_UID)
        .ok_or(FormatError::MissingTransferSyntax)?;
    let transfer_syntax = TransferSyntax::from_uid(uid)
        .ok_or_else(|| FormatError::UnsupportedTransferSyntax(uid.to_string()))?;

    debug!(%transfer_syntax, meta_elements = meta.len(), "parsed file meta group");

    let dataset = Parser::for_syntax(transfer_syntax).read_dataset(
        &mut reader,
        0,
        encoding_rs::UTF_8,
        DatasetEnd::EndOfData,
    )?;

    debug!(elements = dataset.len(), "parsed main dataset");

    Ok(DicomFile {
        meta,
        transfer_syntax,
        dataset,
    })
}

fn parse_meta_group(reader: &mut ByteReader<'_>) -> Result<Dataset, FormatError> {
    let parser = Parser::for_syntax(TransferSyntax::ExplicitVrLittleEndian);
    let mut meta = Dataset::new();

    while !reader.is_at_end() && reader.peek_tag(Endianness::Little)?.group() == 0x0002 {
        meta.insert(parser.read_element(reader, 0, encoding_rs::UTF_8)?)?;
    }

    Ok(meta)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatasetEnd {
    /// Top level or defined-length item: stop when the bytes run out
    EndOfData,
    /// Undefined-length item: stop at the item delimitation tag
    ItemDelimiter,
}

#[derive(Debug, Clone, Copy)]
struct Parser {
    explicit_vr: bool,
    endian: Endianness,
}

impl Parser {
    fn for_syntax(syntax: TransferSyntax) -> Self {
        Self {
            explicit_vr: syntax.is_explicit_vr(),
            endian: syntax.endianness(),
        }
    }

    fn read_dataset(
        &self,
        reader: &mut ByteReader<'_>,
        depth: usize,
        mut charset: &'static Encoding,
        end: DatasetEnd,
    ) -> Result<Dataset, FormatError> {
        let mut dataset = Dataset::new();

        loop {
            if reader.is_at_end() {
                if end == DatasetEnd::ItemDelimiter {
                    return Err(FormatError::MalformedSequence(
                        "item ended without item delimitation".to_string(),
                    ));
                }
                break;
            }

            let tag = reader.peek_tag(self.endian)?;
            if tag == Tag::ITEM_DELIMITER && end == DatasetEnd::ItemDelimiter {
                reader.skip(4)?;
                reader.read_u32(self.endian)?;
                break;
            }
            if tag.is_delimiter() {
                return Err(FormatError::MalformedSequence(format!(
                    "unexpected {tag} at offset {}",
                    reader.position()
                )));
            }

            let element = self.read_element(reader, depth, charset)?;
            if element.tag == tags::SPECIFIC_CHARACTER_SET
                && let Some(term) = element.value.as_str()
            {
                charset = encoding_for(term);
            }
            dataset.insert(element)?;
        }

        Ok(dataset)
    }

    fn read_element(
        &self,
        reader: &mut ByteReader<'_>,
        depth: usize,
        charset: &'static Encoding,
    ) -> Result<Element, FormatError> {
        let tag = reader.read_tag(self.endian)?;

        let (vr, length) = if self.explicit_vr {
            let code = reader.read_bytes(2)?;
            let vr = VR::from_bytes([code[0], code[1]]).unwrap_or(VR::UN);
            let length = if vr.has_long_length() {
                reader.skip(2)?;
                Length::from_raw(reader.read_u32(self.endian)?)
            } else {
                Length::Defined(u32::from(reader.read_u16(self.endian)?))
            };
            (vr, length)
        } else {
            let length = Length::from_raw(reader.read_u32(self.endian)?);
            (dictionary::vr_of(tag), length)
        };

        match length {
            Length::Defined(len) if vr != VR::SQ => {
                let bytes = reader.read_bytes(len as usize)?;
                let value = decode_value(tag, vr, bytes, self.endian, charset)?;
                Ok(Element { tag, vr, length, value })
            }
            _ => {
                // undefined-length UN content is always implicit VR little endian
                let inner = if vr == VR::UN {
                    Self::for_syntax(TransferSyntax::ImplicitVrLittleEndian)
                } else {
                    *self
                };
                let items = inner.read_sequence(reader, length, depth + 1, charset)?;
                Ok(Element {
                    tag,
                    vr: VR::SQ,
                    length,
                    value: Value::Sequence(items),
                })
            }
        }
    }

    fn read_sequence(
        &self,
        reader: &mut ByteReader<'_>,
        length: Length,
        depth: usize,
        charset: &'static Encoding,
    ) -> Result<Vec<Dataset>, FormatError> {
        if depth > MAX_SEQUENCE_DEPTH {
            return Err(FormatError::MalformedSequence(format!(
                "sequences nested deeper than {MAX_SEQUENCE_DEPTH} levels"
            )));
        }

        let mut items = Vec::new();

        match length {
            Length::Defined(len) => {
                let mut sub = reader.sub_reader(len as usize)?;
                while !sub.is_at_end() {
                    let tag = sub.read_tag(self.endian)?;
                    let item_length = Length::from_raw(sub.read_u32(self.endian)?);
                    if tag != Tag::ITEM {
                        return Err(FormatError::MalformedSequence(format!(
                            "expected item tag, found {tag}"
                        )));
                    }
                    items.push(self.read_item(&mut sub, item_length, depth, charset)?);
                }
            }
            Length::Undefined => loop {
                if reader.is_at_end() {
                    return Err(FormatError::MalformedSequence(
                        "sequence ended without sequence delimitation".to_string(),
                    ));
                }
                let tag = reader.read_tag(self.endian)?;
                let item_length = Length::from_raw(reader.read_u32(self.endian)?);
                match tag {
                    Tag::SEQUENCE_DELIMITER => break,
                    Tag::ITEM => items.push(self.read_item(reader, item_length, depth, charset)?),
                    other => {
                        return Err(FormatError::MalformedSequence(format!(
                            "expected item tag, found {other}"
                        )));
                    }
                }
            },
        }

        Ok(items)
    }

    fn read_item(
        &self,
        reader: &mut ByteReader<'_>,
        length: Length,
        depth: usize,
        charset: &'static Encoding,
    ) -> Result<Dataset, FormatError> {
        match length {
            Length::Defined(len) => {
                let mut sub = reader.sub_reader(len as usize)?;
                self.read_dataset(&mut sub, depth, charset, DatasetEnd::EndOfData)
            }
            Length::Undefined => {
                self.read_dataset(reader, depth, charset, DatasetEnd::ItemDelimiter)
            }
        }
    }
}

macro_rules! numbers {
    ($ty:ty, $tag:expr, $vr:expr, $bytes:expr, $endian:expr) => {{
        const WIDTH: usize = std::mem::size_of::<$ty>();
        if $bytes.len() % WIDTH != 0 {
            return Err(FormatError::InvalidValueLength {
                tag: $tag,
                vr: $vr,
                length: $bytes.len() as u32,
            });
        }
        $bytes
            .chunks_exact(WIDTH)
            .map(|chunk| {
                let mut raw = [0u8; WIDTH];
                raw.copy_from_slice(chunk);
                match $endian {
                    Endianness::Little => <$ty>::from_le_bytes(raw),
                    Endianness::Big => <$ty>::from_be_bytes(raw),
                }
            })
            .collect::<Vec<$ty>>()
    }};
}

fn decode_value(
    tag: Tag,
    vr: VR,
    bytes: &[u8],
    endian: Endianness,
    charset: &'static Encoding,
) -> Result<Value, FormatError> {
    if tag == tags::PIXEL_DATA {
        let width = if vr == VR::OB { None } else { Some(2) };
        return Ok(Value::Bytes(to_little_endian(bytes, width, endian)));
    }

    Ok(match vr {
        _ if vr.is_text() => Value::Str(decode_text(vr, bytes, charset)),
        VR::US => Value::U16(numbers!(u16, tag, vr, bytes, endian)),
        VR::SS => Value::I16(numbers!(i16, tag, vr, bytes, endian)),
        VR::UL => Value::U32(numbers!(u32, tag, vr, bytes, endian)),
        VR::SL => Value::I32(numbers!(i32, tag, vr, bytes, endian)),
        VR::UV => Value::U64(numbers!(u64, tag, vr, bytes, endian)),
        VR::SV => Value::I64(numbers!(i64, tag, vr, bytes, endian)),
        VR::FL => Value::F32(numbers!(f32, tag, vr, bytes, endian)),
        VR::FD => Value::F64(numbers!(f64, tag, vr, bytes, endian)),
        VR::AT => {
            let halves = numbers!(u16, tag, vr, bytes, endian);
            if halves.len() % 2 != 0 {
                return Err(FormatError::InvalidValueLength {
                    tag,
                    vr,
                    length: bytes.len() as u32,
                });
            }
            Value::Tags(halves.chunks_exact(2).map(|p| Tag(p[0], p[1])).collect())
        }
        _ => Value::Bytes(to_little_endian(bytes, vr.swap_width(), endian)),
    })
}

/// Reorder other-word values to little endian so stored bytes never depend on the syntax
fn to_little_endian(bytes: &[u8], width: Option<usize>, endian: Endianness) -> Vec<u8> {
    match (width, endian) {
        (Some(width), Endianness::Big) if width > 1 => {
            let mut out = bytes.to_vec();
            for word in out.chunks_exact_mut(width) {
                word.reverse();
            }
            out
        }
        _ => bytes.to_vec(),
    }
}

fn decode_text(vr: VR, bytes: &[u8], charset: &'static Encoding) -> String {
    let (text, _) = charset.decode_without_bom_handling(bytes);
    let text = text.trim_end_matches(['\0', ' ']);
    let text = if matches!(vr, VR::LT | VR::ST | VR::UT) {
        text
    } else {
        text.trim_start_matches(' ')
    };
    text.to_string()
}

/// Text encoding for the first value of Specific Character Set
fn encoding_for(term: &str) -> &'static Encoding {
    match term.split('\\').next().unwrap_or_default().trim() {
        "ISO_IR 100" => encoding_rs::WINDOWS_1252,
        "ISO_IR 101" => encoding_rs::ISO_8859_2,
        "ISO_IR 144" => encoding_rs::ISO_8859_5,
        "ISO_IR 126" => encoding_rs::ISO_8859_7,
        "ISO_IR 13" => encoding_rs::SHIFT_JIS,
        "GB18030" | "GBK" => encoding_rs::GB18030,
        "ISO_IR 192" => encoding_rs::UTF_8,
        _ => encoding_rs::UTF_8,
    }
}
