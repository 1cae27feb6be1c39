//! Field resolution: explicit node parameter first, input item second.
//!
//! Every content field follows the same two-step lookup. A parameter that is
//! unset or empty defers to the same-named JSON field on the item being
//! processed; if that is missing too the field is unresolved and the caller
//! decides whether that is an error.

use crate::item::{BinaryData, InputItem};

/// Resolve a text field: non-empty `explicit` wins, then `item.json[key]`.
pub fn resolve_text<'a>(explicit: Option<&'a str>, item: &'a InputItem, key: &str) -> Option<&'a str> {
    explicit
        .filter(|s| !s.is_empty())
        .or_else(|| item.text_field(key))
}

/// Where the document for an office conversion comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeSource<'a> {
    /// A file path, read when the request is sent.
    Path(&'a str),
    /// The item's binary attachment.
    Attachment(&'a BinaryData),
}

/// Resolve the office document: explicit parameter, then the item's binary
/// attachment, then the item's `officeFile` field.
pub fn resolve_office<'a>(explicit: Option<&'a str>, item: &'a InputItem) -> Option<OfficeSource<'a>> {
    if let Some(path) = explicit.filter(|s| !s.is_empty()) {
        return Some(OfficeSource::Path(path));
    }
    if let Some(att) = item.attachment().filter(|a| !a.data.is_empty()) {
        return Some(OfficeSource::Attachment(att));
    }
    item.text_field("officeFile").map(OfficeSource::Path)
}
