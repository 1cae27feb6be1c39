//! Request construction: operation + parameters + item → form payload.
//!
//! Each operation maps to one endpoint and a fixed set of form fields:
//!
//! | Operation         | Endpoint                            | Fields                     |
//! |-------------------|-------------------------------------|----------------------------|
//! | `convertUrl`      | `/forms/chromium/convert/url`       | `url`                      |
//! | `convertHtml`     | `/forms/chromium/convert/html`      | `index.html`               |
//! | `convertMarkdown` | `/forms/chromium/convert/markdown`  | `index.html`, `content.md` |
//! | `convertOffice`   | `/forms/libreoffice/convert`        | `file`                     |
//!
//! Options are merged into the same payload. When an option key collides
//! with one of the fields above, the field wins and the option is dropped.

use crate::config::{Credentials, NodeParameters, DEFAULT_HTML_WRAPPER};
use crate::error::GotenbergError;
use crate::host::HttpRequest;
use crate::item::InputItem;
use crate::operation::Operation;
use crate::pipeline::fields::{resolve_office, resolve_text, OfficeSource};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header carrying the name the service gives the produced file.
pub const OUTPUT_FILENAME_HEADER: &str = "Gotenberg-Output-Filename";

/// Content type of every request body.
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// File name used for an office attachment that carries none.
const FALLBACK_OFFICE_NAME: &str = "document";

/// One value of the multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Plain text part.
    Text(String),
    /// In-memory file part.
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
    /// File part read from disk when the request is sent.
    Path(PathBuf),
}

impl FormValue {
    fn html(name: &str, body: &str) -> Self {
        FormValue::File {
            file_name: name.to_string(),
            content_type: "text/html".to_string(),
            bytes: body.as_bytes().to_vec(),
        }
    }

    /// Text content if this part is text or an in-memory file holding UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            FormValue::File { bytes, .. } => std::str::from_utf8(bytes).ok(),
            FormValue::Path(_) => None,
        }
    }
}

/// Endpoint and form payload for one input item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub operation: Operation,
    pub endpoint: String,
    pub fields: BTreeMap<String, FormValue>,
}

impl ConversionRequest {
    /// Attach headers and optional basic auth, producing the outbound request.
    pub fn into_http_request(
        self,
        output_filename: &str,
        credentials: Option<&Credentials>,
    ) -> HttpRequest {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), MULTIPART_FORM_DATA.to_string());
        headers.insert(OUTPUT_FILENAME_HEADER.to_string(), output_filename.to_string());

        HttpRequest {
            method: reqwest::Method::POST,
            url: self.endpoint,
            headers,
            form: self.fields,
            auth: credentials.cloned(),
        }
    }
}

/// Build the request for item number `index` (1-based, for error messages).
pub fn build_request(
    params: &NodeParameters,
    operation: Operation,
    item: &InputItem,
    index: usize,
) -> Result<ConversionRequest, GotenbergError> {
    let missing = |field: &'static str| GotenbergError::MissingField {
        operation,
        field,
        item: index,
    };

    let mut fields = BTreeMap::new();
    match operation {
        Operation::ConvertUrl => {
            let url = resolve_text(params.url.as_deref(), item, "url").ok_or_else(|| missing("url"))?;
            fields.insert("url".to_string(), FormValue::Text(url.to_string()));
        }
        Operation::ConvertHtml => {
            let html = resolve_text(params.html_content.as_deref(), item, "htmlContent")
                .ok_or_else(|| missing("htmlContent"))?;
            fields.insert("index.html".to_string(), FormValue::html("index.html", html));
        }
        Operation::ConvertMarkdown => {
            let wrapper = resolve_text(Some(params.html_wrapper.as_str()), item, "htmlWrapper")
                .unwrap_or(DEFAULT_HTML_WRAPPER);
            let markdown = resolve_text(params.markdown_content.as_deref(), item, "markdownContent")
                .ok_or_else(|| missing("markdownContent"))?;
            fields.insert("index.html".to_string(), FormValue::html("index.html", wrapper));
            fields.insert(
                "content.md".to_string(),
                FormValue::File {
                    file_name: "content.md".to_string(),
                    content_type: "text/markdown".to_string(),
                    bytes: markdown.as_bytes().to_vec(),
                },
            );
        }
        Operation::ConvertOffice => {
            let source = resolve_office(params.office_file.as_deref(), item)
                .ok_or_else(|| missing("officeFile"))?;
            fields.insert("file".to_string(), office_part(source, index)?);
        }
    }

    for (key, value) in params.options.form_fields() {
        if fields.contains_key(&key) {
            debug!("Item {}: option '{}' shadowed by built-in field", index, key);
            continue;
        }
        fields.insert(key, FormValue::Text(value));
    }

    Ok(ConversionRequest {
        operation,
        endpoint: operation.endpoint(&params.api_url),
        fields,
    })
}

fn office_part(source: OfficeSource<'_>, index: usize) -> Result<FormValue, GotenbergError> {
    match source {
        OfficeSource::Path(path) => Ok(FormValue::Path(PathBuf::from(path))),
        OfficeSource::Attachment(att) => {
            let bytes = att.decode().map_err(|e| GotenbergError::InvalidBinary {
                item: index,
                detail: e.to_string(),
            })?;
            let file_name = att
                .file_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(|n| {
                    Path::new(n)
                        .file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                        .unwrap_or_else(|| n.to_string())
                })
                .unwrap_or_else(|| FALLBACK_OFFICE_NAME.to_string());
            let content_type = if att.mime_type.is_empty() {
                "application/octet-stream".to_string()
            } else {
                att.mime_type.clone()
            };
            Ok(FormValue::File {
                file_name,
                content_type,
                bytes,
            })
        }
    }
}
