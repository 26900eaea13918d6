//! Upload pipeline: parse, deduplicate, store, extract a tag, render
//!
//! A file that fails to parse is rejected outright. Once it parses, tag
//! extraction and rendering are reported per upload and never undo the
//! registration.

use crate::dicom::{
    Dataset, DecodeError, DicomFile, Element, FormatError, Tag, TransferSyntax, VR, parse_dataset,
};
use crate::fingerprint::{Fingerprint, FingerprintScope};
use crate::image::render_to_raster;
use crate::registry::{DuplicateRegistry, Registration};
use crate::store::{StoreError, UploadStore};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Groups reported as image-related attributes: identification (0008),
/// acquisition (0018) and image pixel description (0028)
pub const IMAGE_ATTRIBUTE_GROUPS: [u16; 3] = [0x0008, 0x0018, 0x0028];

#[derive(Debug, Error)]
pub enum IngestError {
    /// Not a usable DICOM file; nothing was stored
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no stored upload with id {0}")]
    UnknownUpload(String),

    #[error("no DICOM files found in the upload directory")]
    NoStoredUploads,
}

/// Which stored upload to process again
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredUpload {
    Id(String),
    Random,
}

/// Result of looking up the requested tag
#[derive(Debug, Clone, PartialEq)]
pub enum TagQuery {
    NotRequested,
    Found(Element),
    NotFound(Tag),
}

/// Displayable attribute: keyword (or `GGGG-EEEE`) and rendered value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug)]
pub struct IngestReport {
    pub file_id: String,
    pub is_duplicate: bool,
    pub fingerprint: Fingerprint,
    pub transfer_syntax: TransferSyntax,
    pub tag: TagQuery,
    pub png: Result<Vec<u8>, DecodeError>,
    pub attributes: Vec<Attribute>,
}

pub struct Ingestor<'r> {
    store: UploadStore,
    registry: &'r DuplicateRegistry,
    scope: FingerprintScope,
    snapshot_lock: Mutex<()>,
}

impl<'r> Ingestor<'r> {
    #[must_use]
    pub fn new(
        store: UploadStore,
        registry: &'r DuplicateRegistry,
        scope: FingerprintScope,
    ) -> Self {
        Self {
            store,
            registry,
            scope,
            snapshot_lock: Mutex::new(()),
        }
    }

    /// Seed the registry from the store's persisted snapshot
    pub fn restore(&self) -> Result<usize, StoreError> {
        let entries = self.store.load_snapshot()?;
        let count = entries.len();
        self.registry.seed(entries);
        Ok(count)
    }

    #[must_use]
    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Ingest one upload
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a parseable DICOM file or if
    /// the upload directory cannot be written
    pub fn ingest(&self, bytes: &[u8], tag: Option<Tag>) -> Result<IngestReport, IngestError> {
        let file = parse_dataset(bytes)?;
        if file.is_empty() {
            warn!("upload has an empty main dataset");
        }

        let fingerprint = self.scope.fingerprint(bytes, &file);
        let (file_id, is_duplicate) = self.register(fingerprint, bytes)?;

        Ok(report(file_id, is_duplicate, fingerprint, &file, tag))
    }

    /// Extract a tag from and render an upload that is already stored,
    /// leaving the registry untouched
    pub fn process_stored(
        &self,
        which: &StoredUpload,
        tag: Option<Tag>,
    ) -> Result<IngestReport, IngestError> {
        let id = match which {
            StoredUpload::Id(id) if self.store.contains(id) => id.clone(),
            StoredUpload::Id(id) => return Err(IngestError::UnknownUpload(id.clone())),
            StoredUpload::Random => self.random_stored_id()?,
        };

        let bytes = self.store.read(&id)?;
        let file = parse_dataset(&bytes)?;
        info!(%id, "processing stored upload");

        let fingerprint = self.scope.fingerprint(&bytes, &file);
        Ok(report(id, false, fingerprint, &file, tag))
    }

    fn random_stored_id(&self) -> Result<String, IngestError> {
        let mut ids = self.store.ids()?;
        if ids.is_empty() {
            return Err(IngestError::NoStoredUploads);
        }
        // random index drawn from a v4 uuid
        let pick = Uuid::new_v4().as_u128() % ids.len() as u128;
        Ok(ids.swap_remove(pick as usize))
    }

    // The upload is written before it is registered, so a registered
    // identifier always has its file unless it was removed externally.
    fn register(
        &self,
        fingerprint: Fingerprint,
        bytes: &[u8],
    ) -> Result<(String, bool), IngestError> {
        let id = Uuid::new_v4().to_string();
        self.store.write(&id, bytes)?;

        loop {
            match self.registry.try_insert(fingerprint, id.clone()) {
                Registration::Inserted => {
                    self.persist()?;
                    return Ok((id, false));
                }
                Registration::AlreadyExists(existing) if self.store.contains(&existing) => {
                    self.store.remove(&id)?;
                    info!(%fingerprint, id = %existing, "duplicate upload");
                    return Ok((existing, true));
                }
                Registration::AlreadyExists(stale) => {
                    warn!(
                        %fingerprint,
                        id = %stale,
                        "stored file for registered upload is gone, storing again"
                    );
                    self.registry.evict(&fingerprint, &stale);
                }
            }
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.snapshot_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.save_snapshot(&self.registry.snapshot())
    }
}

fn report(
    file_id: String,
    is_duplicate: bool,
    fingerprint: Fingerprint,
    file: &DicomFile,
    tag: Option<Tag>,
) -> IngestReport {
    let tag = match tag {
        None => TagQuery::NotRequested,
        Some(tag) => match file.get_tag_value(tag) {
            Ok(element) => TagQuery::Found(element.clone()),
            Err(_) => TagQuery::NotFound(tag),
        },
    };

    IngestReport {
        file_id,
        is_duplicate,
        fingerprint,
        transfer_syntax: file.transfer_syntax,
        tag,
        png: render_to_raster(&file.dataset),
        attributes: image_attributes(&file.dataset),
    }
}

/// Non-empty, non-sequence attributes of [`IMAGE_ATTRIBUTE_GROUPS`] in file order
#[must_use]
pub fn image_attributes(dataset: &Dataset) -> Vec<Attribute> {
    dataset
        .iter()
        .filter(|e| IMAGE_ATTRIBUTE_GROUPS.contains(&e.tag.group()))
        .filter(|e| e.vr != VR::SQ && e.value.items().is_none())
        .filter_map(|e| {
            let value = e.value.to_string().replace('\n', " ").replace('\r', "");
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            let name = e
                .keyword()
                .map_or_else(
                    || format!("{:04X}-{:04X}", e.tag.group(), e.tag.element()),
                    str::to_string,
                );
            Some(Attribute {
                name,
                value: value.to_string(),
            })
        })
        .collect()
}
