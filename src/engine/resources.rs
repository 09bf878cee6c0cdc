//! Resource enumeration and retrieval.
//!
//! Ids come back in discovery order. A resource with no payload is treated
//! as failed: it is never listed, so every listed id is retrievable and
//! non-empty, and the count always equals the listing length.

use crate::common::{Error, Result};
use crate::model::{Document, Resource};
use bytes::Bytes;

#[inline]
fn is_usable(resource: &Resource) -> bool {
    !resource.is_empty()
}

/// Ids of all retrievable resources, in discovery order.
pub fn resource_ids(document: &Document) -> Vec<String> {
    document
        .resources
        .iter()
        .filter(|r| is_usable(r))
        .map(|r| r.id.clone())
        .collect()
}

#[inline]
pub fn resource_count(document: &Document) -> usize {
    document.resources.iter().filter(|r| is_usable(r)).count()
}

/// Payload of the resource named `id`.
///
/// The returned [`Bytes`] shares the document's buffer.
pub fn resource_data(document: &Document, id: &str) -> Result<Bytes> {
    match document.resource(id) {
        Some(resource) if is_usable(resource) => Ok(resource.data.clone()),
        Some(_) => Err(Error::ResourceNotFound(format!("{} (empty payload)", id))),
        None => Err(Error::ResourceNotFound(id.to_string())),
    }
}

/// Every retrievable resource with its payload; failed ones are skipped.
pub fn all_resources(document: &Document) -> Vec<(String, Bytes)> {
    document
        .resources
        .iter()
        .filter_map(|r| match resource_data(document, &r.id) {
            Ok(data) => Some((r.id.clone(), data)),
            Err(e) => {
                log::warn!("skipping resource: {}", e);
                None
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    fn document() -> Document {
        let mut doc = Document::new();
        doc.add_resource(Resource::from_file_name("BIN0002.jpg", vec![0xFFu8, 0xD8]));
        doc.add_resource(Resource::from_file_name("BIN0001.png", Vec::<u8>::new()));
        doc.add_resource(Resource::from_file_name("BIN0003.bmp", b"BM".to_vec()));
        doc
    }

    #[test]
    fn test_listing_skips_failed() {
        let doc = document();
        let ids = resource_ids(&doc);
        assert_eq!(ids, vec!["BIN0002.jpg", "BIN0003.bmp"]);
        assert_eq!(resource_count(&doc), ids.len());
        for id in &ids {
            assert!(!resource_data(&doc, id).unwrap().is_empty());
        }
    }

    #[test]
    fn test_missing_and_empty_are_not_found() {
        let doc = document();
        assert_eq!(
            resource_data(&doc, "BIN0009.png").unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            resource_data(&doc, "BIN0001.png").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_all_resources() {
        let all = all_resources(&document());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "BIN0002.jpg");
        assert_eq!(&all[1].1[..], b"BM");
    }
}
