//! Tag dictionary backed by the standard DICOM data dictionary
//!
//! The parser consults it to resolve VRs in implicit VR streams; everything
//! else uses it for keywords and SOP class names.

use crate::dicom::{Tag, VR};
use dicom_core::dictionary::{DataDictionary, DataDictionaryEntryRef, UidDictionary};
use dicom_dictionary_std::{StandardDataDictionary, sop_class};

static STANDARD: StandardDataDictionary = StandardDataDictionary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub tag: Tag,
    pub keyword: &'static str,
    pub vr: VR,
}

impl DictionaryEntry {
    fn from_standard(tag: Tag, entry: &'static DataDictionaryEntryRef<'static>) -> Self {
        // Context-dependent VRs (xs, ox, px, lt) resolve to US or OW
        let vr = VR::from_bytes(entry.vr.relaxed().to_bytes()).unwrap_or(VR::UN);
        Self { tag, keyword: entry.alias, vr }
    }
}

/// Dictionary entry for `tag`, including repeating groups, generic group
/// length and private creator entries
#[must_use]
pub fn lookup(tag: Tag) -> Option<DictionaryEntry> {
    STANDARD
        .by_tag(dicom_core::Tag(tag.group(), tag.element()))
        .map(|entry| DictionaryEntry::from_standard(tag, entry))
}

#[must_use]
pub fn by_keyword(keyword: &str) -> Option<DictionaryEntry> {
    STANDARD.by_name(keyword).map(|entry| {
        let base = entry.tag.inner();
        DictionaryEntry::from_standard(Tag(base.0, base.1), entry)
    })
}

/// VR used when the stream does not say; unknown tags fall back to UN
#[must_use]
pub fn vr_of(tag: Tag) -> VR {
    lookup(tag).map_or(VR::UN, |entry| entry.vr)
}

/// Human-readable name of a SOP class
#[must_use]
pub fn sop_class_name(uid: &str) -> Option<&'static str> {
    let uid = uid.trim_end_matches(['\0', ' ']);
    sop_class::registry().by_uid(uid).map(|entry| entry.name)
}
