//! Host item types: what flows into and out of the node.
//!
//! Items follow the workflow host's shape: a JSON field map plus an optional
//! map of named binary attachments whose payloads are base64 strings.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// MIME type stamped on every conversion result.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Name of the binary property the node reads from and writes to.
pub const BINARY_PROPERTY: &str = "data";

/// One unit of input data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    #[serde(default)]
    pub json: Map<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binary: BTreeMap<String, BinaryData>,
}

impl InputItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a JSON field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.json.insert(key.into(), value.into());
        self
    }

    /// Attach a binary payload under `key`.
    pub fn with_binary(mut self, key: impl Into<String>, data: BinaryData) -> Self {
        self.binary.insert(key.into(), data);
        self
    }

    /// A JSON field as text, if it is a non-empty string.
    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.json
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The attachment the node consumes, if any.
    pub fn attachment(&self) -> Option<&BinaryData> {
        self.binary.get(BINARY_PROPERTY)
    }
}

/// A binary attachment as the host represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    /// Base64-encoded payload.
    pub data: String,

    pub mime_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl BinaryData {
    /// Wrap raw bytes, encoding them as base64.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>, file_name: Option<String>) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
            file_name,
        }
    }

    /// Decode the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.as_bytes())
    }
}

// ── Output ───────────────────────────────────────────────────────────────

/// One converted document, in the host's output item shape:
///
/// ```json
/// {
///   "json":   { "pdf": "<base64>", "filename": "output.pdf" },
///   "binary": { "data": { "data": "<base64>", "mimeType": "application/pdf", "fileName": "output.pdf" } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub json: ResultJson,
    pub binary: ResultBinary,
}

/// JSON-readable copy of the converted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultJson {
    /// Base64-encoded PDF.
    pub pdf: String,
    pub filename: String,
}

/// Binary attachment map of a result; always holds exactly the `data` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBinary {
    pub data: BinaryData,
}

impl ConversionResult {
    /// Build a result from an already-encoded PDF.
    pub fn new(pdf_base64: String, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            binary: ResultBinary {
                data: BinaryData {
                    data: pdf_base64.clone(),
                    mime_type: PDF_MIME_TYPE.to_string(),
                    file_name: Some(filename.clone()),
                },
            },
            json: ResultJson {
                pdf: pdf_base64,
                filename,
            },
        }
    }

    pub fn filename(&self) -> &str {
        &self.json.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.binary.data.mime_type
    }

    /// Decode the PDF bytes carried by this result.
    pub fn decode_pdf(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.json.pdf.as_bytes())
    }
}
