//! Binary resources embedded in a document.

use bytes::Bytes;
use phf::phf_map;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// MIME types of the attachment extensions HWP writers produce.
static MIME_BY_EXTENSION: phf::Map<&'static str, &'static str> = phf_map! {
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "bmp" => "image/bmp",
    "tif" => "image/tiff",
    "tiff" => "image/tiff",
    "webp" => "image/webp",
    "svg" => "image/svg+xml",
    "wmf" => "image/wmf",
    "emf" => "image/emf",
    "ole" => "application/x-ole-storage",
    "ogg" => "audio/ogg",
    "mp3" => "audio/mpeg",
    "mp4" => "video/mp4",
};

/// Look up the MIME type for a file extension (case-insensitive).
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    MIME_BY_EXTENSION.get(ext.to_ascii_lowercase().as_str()).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ResourceKind {
    Image,
    OleObject,
    Other,
}

/// A named binary resource.
///
/// The data is reference-counted, so handing a resource to several consumers
/// does not copy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Unique within a document, typically the stored file name (`BIN0001.png`)
    pub id: String,
    pub kind: ResourceKind,
    pub mime_type: Option<String>,
    pub data: Bytes,
}

impl Resource {
    /// Build a resource, deriving kind and MIME type from the id's extension.
    pub fn from_file_name(id: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let id = id.into();
        let mime = id
            .rsplit_once('.')
            .and_then(|(_, ext)| mime_for_extension(ext));
        let kind = match mime {
            Some(m) if m.starts_with("image/") => ResourceKind::Image,
            Some("application/x-ole-storage") => ResourceKind::OleObject,
            _ => ResourceKind::Other,
        };
        Self {
            id,
            kind,
            mime_type: mime.map(str::to_string),
            data: data.into(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn is_image(&self) -> bool {
        self.kind == ResourceKind::Image
    }

    /// Id without its extension, as referenced from content.
    pub fn base_name(&self) -> &str {
        self.id.rsplit_once('.').map_or(&self.id, |(base, _)| base)
    }
}

// Payloads are left out of the JSON content tree; only their size is reported.
impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Resource", 4)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("kind", &self.kind)?;
        s.serialize_field("mime_type", &self.mime_type)?;
        s.serialize_field("size", &self.data.len())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        let png = Resource::from_file_name("BIN0001.PNG", vec![1u8, 2, 3]);
        assert_eq!(png.kind, ResourceKind::Image);
        assert_eq!(png.mime_type.as_deref(), Some("image/png"));
        assert_eq!(png.base_name(), "BIN0001");
        assert_eq!(png.len(), 3);

        let ole = Resource::from_file_name("BIN0002.ole", vec![0u8]);
        assert_eq!(ole.kind, ResourceKind::OleObject);

        let other = Resource::from_file_name("notes", Vec::<u8>::new());
        assert_eq!(other.kind, ResourceKind::Other);
        assert!(other.mime_type.is_none());
        assert_eq!(other.base_name(), "notes");
    }

    #[test]
    fn test_json_omits_payload() {
        let res = Resource::from_file_name("image1.jpg", vec![0xFFu8; 10]);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["size"], 10);
        assert_eq!(json["kind"], "Image");
        assert!(json.get("data").is_none());
    }
}
