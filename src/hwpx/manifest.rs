//! `Contents/content.hpf` (OPF package document) and `version.xml`.

use super::xml::{attr, local_name, reference, text};
use crate::common::Result;
use crate::model::{Metadata, parse_timestamp};
use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub metadata: Metadata,
    pub items: Vec<ManifestItem>,
    /// `idref` values of the spine, in reading order
    pub spine: Vec<String>,
}

impl Manifest {
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Section part paths in spine order.
    pub fn section_paths(&self) -> Vec<String> {
        self.spine
            .iter()
            .filter(|idref| idref.starts_with("section"))
            .map(|idref| match self.item(idref) {
                Some(item) => item.href.clone(),
                None => format!("Contents/{}.xml", idref),
            })
            .collect()
    }
}

pub fn parse_manifest(xml: &str) -> Result<Manifest> {
    let mut manifest = Manifest::default();
    let mut reader = Reader::from_str(xml);
    // Field the next text node belongs to
    let mut field: Option<String> = None;
    let mut value = String::new();
    let mut generator = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                field = match name.as_ref() {
                    "meta" => attr(&e, "name"),
                    "title" | "creator" | "subject" | "description" | "date" | "modified"
                    | "keyword" | "keywords" | "generator" => Some(name.into_owned()),
                    _ => None,
                };
                value.clear();
            },
            Event::Empty(e) => match local_name(&e).as_ref() {
                "item" => {
                    if let (Some(id), Some(href)) = (attr(&e, "id"), attr(&e, "href")) {
                        manifest.items.push(ManifestItem {
                            id,
                            href,
                            media_type: attr(&e, "media-type"),
                        });
                    }
                },
                "itemref" => {
                    if let Some(idref) = attr(&e, "idref") {
                        manifest.spine.push(idref);
                    }
                },
                "meta" => {
                    // `content="text"` only marks the value type of the element form
                    if let (Some(name), Some(content)) = (attr(&e, "name"), attr(&e, "content"))
                        && content != "text"
                    {
                        apply_field(&mut manifest.metadata, &mut generator, &name, &content);
                    }
                },
                _ => {},
            },
            Event::Text(t) if field.is_some() => value.push_str(&text(&t)),
            Event::GeneralRef(r) if field.is_some() => {
                if let Some(resolved) = reference(&r) {
                    value.push_str(&resolved);
                }
            },
            Event::End(_) => {
                if let Some(name) = field.take() {
                    apply_field(&mut manifest.metadata, &mut generator, &name, value.trim());
                }
                value.clear();
            },
            Event::Eof => break,
            _ => {},
        }
    }
    if manifest.metadata.creator_app.is_none() {
        manifest.metadata.creator_app = generator;
    }
    Ok(manifest)
}

fn apply_field(meta: &mut Metadata, generator: &mut Option<String>, name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let owned = || Some(value.to_string());
    match name.to_ascii_lowercase().as_str() {
        "title" => meta.title = owned(),
        "creator" | "author" => meta.author = owned(),
        "subject" => meta.subject = owned(),
        "description" if meta.subject.is_none() => meta.subject = owned(),
        "date" | "createddate" | "created" => meta.created = parse_timestamp(value),
        "modified" | "modifieddate" | "lastsaveddate" => meta.modified = parse_timestamp(value),
        "keyword" | "keywords" => meta.set_keywords(value),
        "generator" | "application" => *generator = owned(),
        _ => {},
    }
}

/// Format version and application from `version.xml`.
pub fn parse_version(xml: &str) -> Result<(Option<String>, Option<String>)> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if local_name(&e) == "HCFVersion" => {
                let part = |name: &str| attr(&e, name).unwrap_or_else(|| "0".to_string());
                let version = format!(
                    "{}.{}.{}.{}",
                    part("major"),
                    part("minor"),
                    part("micro"),
                    part("buildNumber")
                );
                return Ok((Some(version), attr(&e, "application")));
            },
            Event::Eof => return Ok((None, None)),
            _ => {},
        }
    }
}
