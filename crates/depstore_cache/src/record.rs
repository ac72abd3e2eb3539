//! The persisted dependency record and its XML codec.
//!
//! The record is a single document stored at a fixed virtual path:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <Dependencies>
//!   <Dependency>
//!     <ExtensionId>Blog</ExtensionId>
//!     <LoaderName>DynamicExtensionLoader</LoaderName>
//!     <VirtualPath>~/Modules/Blog/Blog.csproj</VirtualPath>
//!     <Hash>0f3a...</Hash>
//!   </Dependency>
//! </Dependencies>
//! ```
//!
//! Documents are compared as decoded trees, so indentation and other
//! incidental formatting never make two records differ. Field text is kept
//! exactly as written, surrounding whitespace included.

use std::fmt::Display;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

use crate::descriptor::{ActivatedExtensionDescriptor, DependencyDescriptor};
use crate::error::RecordError;

/// Name of the container element.
pub const ROOT_ELEMENT: &str = "Dependencies";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// A decoded dependency record.
///
/// Equality is structural: same entries, same order, same field values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename = "Dependencies")]
pub struct RecordDocument {
    /// Entries in document order.
    #[serde(rename = "Dependency")]
    pub entries: Vec<ActivatedExtensionDescriptor>,
}

impl RecordDocument {
    /// Parses a record. Fails if the text is not well-formed XML, the root
    /// is not `<Dependencies>`, or any entry lacks one of its four fields.
    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(false);

        let mut entries = Vec::new();
        let mut seen_root = false;
        let mut depth = 0usize;
        let mut entry: Option<PartialEntry> = None;
        let mut field: Option<(Field, String)> = None;

        loop {
            match reader.read_event().map_err(parse_error)? {
                Event::Start(e) => {
                    let name = e.name();
                    match depth {
                        0 => open_root(name.as_ref(), &mut seen_root)?,
                        1 if name.as_ref() == ENTRY_ELEMENT.as_bytes() => {
                            entry = Some(PartialEntry::default());
                        }
                        2 => {
                            if let (Some(current), Some(f)) =
                                (entry.as_ref(), Field::from_tag(name.as_ref()))
                            {
                                current.check_unset(f)?;
                                field = Some((f, String::new()));
                            }
                        }
                        _ => {
                            if let Some((f, _)) = field {
                                return Err(parse_error(format!(
                                    "unexpected element inside <{}>",
                                    f.tag()
                                )));
                            }
                        }
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    let name = e.name();
                    match depth {
                        0 => open_root(name.as_ref(), &mut seen_root)?,
                        1 if name.as_ref() == ENTRY_ELEMENT.as_bytes() => {
                            entries.push(PartialEntry::default().finish()?);
                        }
                        2 => {
                            if let (Some(current), Some(f)) =
                                (entry.as_mut(), Field::from_tag(name.as_ref()))
                            {
                                current.check_unset(f)?;
                                *current.slot(f) = Some(String::new());
                            }
                        }
                        _ => {
                            if let Some((f, _)) = field {
                                return Err(parse_error(format!(
                                    "unexpected element inside <{}>",
                                    f.tag()
                                )));
                            }
                        }
                    }
                }
                Event::Text(t) => {
                    if let Some((_, value)) = field.as_mut() {
                        value.push_str(&t.unescape().map_err(parse_error)?);
                    } else if depth == 0 && !t.iter().all(u8::is_ascii_whitespace) {
                        return Err(parse_error("text outside of the root element"));
                    }
                }
                Event::CData(c) => {
                    if let Some((_, value)) = field.as_mut() {
                        value.push_str(std::str::from_utf8(&c).map_err(parse_error)?);
                    } else if depth == 0 {
                        return Err(parse_error("text outside of the root element"));
                    }
                }
                Event::End(_) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| parse_error("unmatched closing tag"))?;
                    match depth {
                        2 => {
                            if let (Some(current), Some((f, value))) = (entry.as_mut(), field.take())
                            {
                                *current.slot(f) = Some(value);
                            }
                        }
                        1 => {
                            if let Some(done) = entry.take() {
                                entries.push(done.finish()?);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(RecordError::Empty);
        }
        if depth != 0 {
            return Err(parse_error("unexpected end of document"));
        }
        Ok(Self { entries })
    }

    /// Serializes the record with two-space indentation.
    pub fn to_xml(&self) -> Result<String, RecordError> {
        let mut buffer = String::from(XML_DECLARATION);
        buffer.push('\n');
        let mut serializer =
            quick_xml::se::Serializer::with_root(&mut buffer, Some(ROOT_ELEMENT)).map_err(|e| {
                RecordError::Serialize {
                    reason: e.to_string(),
                }
            })?;
        serializer.indent(' ', 2);
        self.serialize(serializer).map_err(|e| RecordError::Serialize {
            reason: e.to_string(),
        })?;
        buffer.push('\n');
        Ok(buffer)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the document, yielding its entries.
    pub fn into_descriptors(self) -> Vec<ActivatedExtensionDescriptor> {
        self.entries
    }
}

/// Builds a record from descriptors paired with their content hashes,
/// keeping the given order.
pub fn encode<'a, I>(entries: I) -> RecordDocument
where
    I: IntoIterator<Item = (&'a DependencyDescriptor, String)>,
{
    RecordDocument {
        entries: entries
            .into_iter()
            .map(|(descriptor, hash)| {
                ActivatedExtensionDescriptor::from_dependency(descriptor, hash)
            })
            .collect(),
    }
}

/// Returns the record's entries in document order.
pub fn decode(document: &RecordDocument) -> Vec<ActivatedExtensionDescriptor> {
    document.entries.clone()
}

const ENTRY_ELEMENT: &str = "Dependency";

/// The four leaf elements of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ExtensionId,
    LoaderName,
    VirtualPath,
    Hash,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"ExtensionId" => Some(Field::ExtensionId),
            b"LoaderName" => Some(Field::LoaderName),
            b"VirtualPath" => Some(Field::VirtualPath),
            b"Hash" => Some(Field::Hash),
            _ => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Field::ExtensionId => "ExtensionId",
            Field::LoaderName => "LoaderName",
            Field::VirtualPath => "VirtualPath",
            Field::Hash => "Hash",
        }
    }
}

/// An entry whose fields are still being read.
#[derive(Debug, Default)]
struct PartialEntry {
    extension_id: Option<String>,
    loader_name: Option<String>,
    virtual_path: Option<String>,
    hash: Option<String>,
}

impl PartialEntry {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::ExtensionId => &mut self.extension_id,
            Field::LoaderName => &mut self.loader_name,
            Field::VirtualPath => &mut self.virtual_path,
            Field::Hash => &mut self.hash,
        }
    }

    fn check_unset(&self, field: Field) -> Result<(), RecordError> {
        let set = match field {
            Field::ExtensionId => self.extension_id.is_some(),
            Field::LoaderName => self.loader_name.is_some(),
            Field::VirtualPath => self.virtual_path.is_some(),
            Field::Hash => self.hash.is_some(),
        };
        if set {
            return Err(parse_error(format!("duplicate field `{}`", field.tag())));
        }
        Ok(())
    }

    fn finish(self) -> Result<ActivatedExtensionDescriptor, RecordError> {
        let missing = |field: Field| parse_error(format!("missing field `{}`", field.tag()));
        Ok(ActivatedExtensionDescriptor {
            extension_id: self
                .extension_id
                .ok_or_else(|| missing(Field::ExtensionId))?,
            loader_name: self.loader_name.ok_or_else(|| missing(Field::LoaderName))?,
            virtual_path: self
                .virtual_path
                .ok_or_else(|| missing(Field::VirtualPath))?,
            hash: self.hash.ok_or_else(|| missing(Field::Hash))?,
        })
    }
}

/// Accepts the document's first element if it is the record container.
fn open_root(name: &[u8], seen_root: &mut bool) -> Result<(), RecordError> {
    if *seen_root {
        return Err(parse_error("more than one root element"));
    }
    if name != ROOT_ELEMENT.as_bytes() {
        return Err(RecordError::UnexpectedRoot {
            found: String::from_utf8_lossy(name).into_owned(),
        });
    }
    *seen_root = true;
    Ok(())
}

fn parse_error(reason: impl Display) -> RecordError {
    RecordError::Parse {
        reason: reason.to_string(),
    }
}
