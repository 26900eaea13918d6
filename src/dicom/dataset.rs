//! Ordered collection of data elements

use crate::dicom::error::{FormatError, TagNotFound};
use crate::dicom::{Element, Tag};
use std::collections::HashMap;

/// Elements in file order, indexed by tag. Tags are unique within one dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    elements: Vec<Element>,
    index: HashMap<Tag, usize>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from elements, rejecting repeated tags
    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Result<Self, FormatError> {
        let mut dataset = Self::new();
        for element in elements {
            dataset.insert(element)?;
        }
        Ok(dataset)
    }

    pub fn insert(&mut self, element: Element) -> Result<(), FormatError> {
        if self.index.contains_key(&element.tag) {
            return Err(FormatError::DuplicateTag(element.tag));
        }
        self.index.insert(element.tag, self.elements.len());
        self.elements.push(element);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.index.get(&tag).map(|&i| &self.elements[i])
    }

    /// Elements in file order
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Elements in ascending tag order
    #[must_use]
    pub fn sorted(&self) -> Vec<&Element> {
        let mut sorted: Vec<&Element> = self.elements.iter().collect();
        sorted.sort_by_key(|e| e.tag);
        sorted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Copy of this dataset keeping only the top-level elements accepted by `keep`
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&Element) -> bool) -> Self {
        let mut out = Self::new();
        for element in self.elements.iter().filter(|e| keep(e)) {
            out.index.insert(element.tag, out.elements.len());
            out.elements.push(element.clone());
        }
        out
    }

    /// Trimmed text value of `tag`, if present and textual
    #[must_use]
    pub fn string(&self, tag: Tag) -> Option<&str> {
        self.get(tag)
            .and_then(|e| e.value.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// First value of `tag` as an unsigned integer
    #[must_use]
    pub fn uint(&self, tag: Tag) -> Option<u32> {
        self.get(tag).and_then(|e| e.value.to_u32())
    }
}

impl PartialEq for Dataset {
    /// Same elements in the same order
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// Look up one element by tag
pub fn get_tag_value(dataset: &Dataset, tag: Tag) -> Result<&Element, TagNotFound> {
    dataset.get(tag).ok_or(TagNotFound(tag))
}
