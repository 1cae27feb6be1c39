//! Node parameters: what the user configured on the node.
//!
//! All request-building behaviour is controlled through [`NodeParameters`],
//! built via its [`NodeParametersBuilder`]. The operation selector is kept as
//! the raw string the host stored, so an unrecognised value surfaces as
//! [`GotenbergError::UnsupportedOperation`] when the node executes rather than
//! being silently coerced.

use crate::error::GotenbergError;
use crate::operation::Operation;
use crate::progress::{ExecutionProgressCallback, ProgressCallback};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Base URL used when the user does not set one.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Output filename used when the user does not set one.
pub const DEFAULT_OUTPUT_FILENAME: &str = "output.pdf";

/// HTML template that pulls `content.md` into the rendered page.
pub const DEFAULT_HTML_WRAPPER: &str =
    r#"<!DOCTYPE html><html><body>{{ toHTML "content.md" }}</body></html>"#;

/// Parameters of one node execution.
///
/// Content fields (`url`, `html_content`, `markdown_content`, `office_file`)
/// are optional: when unset or empty the dispatcher looks for a same-named
/// field on each input item instead.
///
/// # Example
/// ```rust
/// use gotenberg_node::{NodeParameters, Operation};
///
/// let params = NodeParameters::builder()
///     .api_url("http://gotenberg:3000/")
///     .operation(Operation::ConvertHtml)
///     .html_content("<h1>Invoice</h1>")
///     .output_filename("invoice.pdf")
///     .landscape(true)
///     .build()
///     .unwrap();
/// assert_eq!(params.api_url, "http://gotenberg:3000");
/// ```
#[derive(Clone)]
pub struct NodeParameters {
    /// Base URL of the Gotenberg instance, without trailing slash.
    pub api_url: String,

    /// Operation selector as stored by the host (`convertUrl`, …).
    pub operation: String,

    /// Page to render for `convertUrl`.
    pub url: Option<String>,

    /// Document body for `convertHtml`.
    pub html_content: Option<String>,

    /// Template for `convertMarkdown`. Default: [`DEFAULT_HTML_WRAPPER`].
    pub html_wrapper: String,

    /// Markdown source for `convertMarkdown`.
    pub markdown_content: Option<String>,

    /// Path of the document for `convertOffice`.
    pub office_file: Option<String>,

    /// Name the service gives the produced PDF. Default: `output.pdf`.
    pub output_filename: String,

    /// Transformation flags merged into every request.
    pub options: ConversionOptions,

    /// Optional per-item progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for NodeParameters {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            operation: Operation::default().as_str().to_string(),
            url: None,
            html_content: None,
            html_wrapper: DEFAULT_HTML_WRAPPER.to_string(),
            markdown_content: None,
            office_file: None,
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            options: ConversionOptions::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for NodeParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeParameters")
            .field("api_url", &self.api_url)
            .field("operation", &self.operation)
            .field("url", &self.url)
            .field("html_content", &self.html_content.as_ref().map(|s| s.len()))
            .field("html_wrapper", &self.html_wrapper.len())
            .field("markdown_content", &self.markdown_content.as_ref().map(|s| s.len()))
            .field("office_file", &self.office_file)
            .field("output_filename", &self.output_filename)
            .field("options", &self.options)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExecutionProgressCallback>"),
            )
            .finish()
    }
}

impl NodeParameters {
    /// Create a new builder for `NodeParameters`.
    pub fn builder() -> NodeParametersBuilder {
        NodeParametersBuilder {
            params: Self::default(),
        }
    }

    /// Output filename, falling back to the default when blank.
    pub fn effective_output_filename(&self) -> &str {
        if self.output_filename.trim().is_empty() {
            DEFAULT_OUTPUT_FILENAME
        } else {
            &self.output_filename
        }
    }
}

/// Builder for [`NodeParameters`].
#[derive(Debug)]
pub struct NodeParametersBuilder {
    params: NodeParameters,
}

impl NodeParametersBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.params.api_url = url.into();
        self
    }

    pub fn operation(mut self, op: Operation) -> Self {
        self.params.operation = op.as_str().to_string();
        self
    }

    /// Set the raw operation selector, exactly as a host would store it.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.params.operation = name.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.params.url = Some(url.into());
        self
    }

    pub fn html_content(mut self, html: impl Into<String>) -> Self {
        self.params.html_content = Some(html.into());
        self
    }

    pub fn html_wrapper(mut self, wrapper: impl Into<String>) -> Self {
        self.params.html_wrapper = wrapper.into();
        self
    }

    pub fn markdown_content(mut self, markdown: impl Into<String>) -> Self {
        self.params.markdown_content = Some(markdown.into());
        self
    }

    pub fn office_file(mut self, path: impl Into<String>) -> Self {
        self.params.office_file = Some(path.into());
        self
    }

    pub fn output_filename(mut self, name: impl Into<String>) -> Self {
        self.params.output_filename = name.into();
        self
    }

    pub fn options(mut self, options: ConversionOptions) -> Self {
        self.params.options = options;
        self
    }

    pub fn landscape(mut self, v: bool) -> Self {
        self.params.options.landscape = Some(v);
        self
    }

    pub fn page_ranges(mut self, ranges: impl Into<String>) -> Self {
        self.params.options.native_page_ranges = Some(ranges.into());
        self
    }

    /// Add a pass-through option not known to this crate.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.options.extra.insert(key.into(), value.into());
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ExecutionProgressCallback>) -> Self {
        self.params.progress_callback = Some(cb);
        self
    }

    /// Build the parameters, validating constraints.
    pub fn build(mut self) -> Result<NodeParameters, GotenbergError> {
        let api_url = self.params.api_url.trim().trim_end_matches('/').to_string();
        if api_url.is_empty() {
            return Err(GotenbergError::InvalidConfig(
                "Gotenberg API URL must not be empty".into(),
            ));
        }
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(GotenbergError::InvalidConfig(format!(
                "Gotenberg API URL must start with http:// or https://, got '{}'",
                api_url
            )));
        }
        self.params.api_url = api_url;

        if self.params.output_filename.trim().is_empty() {
            self.params.output_filename = DEFAULT_OUTPUT_FILENAME.to_string();
        }
        Ok(self.params)
    }
}

// ── Options ──────────────────────────────────────────────────────────────

/// Additional form fields sent with every request.
///
/// Mirrors the host's open "Additional Options" collection: two recognised
/// flags plus any other keys, which are forwarded without validation. The
/// service is the one that rejects unknown or malformed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Paper orientation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landscape: Option<bool>,

    /// Pages to print, e.g. `1-5, 8, 11-13`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_page_ranges: Option<String>,

    /// Caller-supplied keys passed through verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ConversionOptions {
    pub fn is_empty(&self) -> bool {
        self.landscape.is_none() && self.native_page_ranges.is_none() && self.extra.is_empty()
    }

    /// Render every option as a text form field, in a stable order.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(self.extra.len() + 2);
        if let Some(landscape) = self.landscape {
            fields.push(("landscape".to_string(), landscape.to_string()));
        }
        if let Some(ref ranges) = self.native_page_ranges {
            fields.push(("nativePageRanges".to_string(), ranges.clone()));
        }
        for (key, value) in &self.extra {
            if fields.iter().any(|(k, _)| k == key) {
                debug!("Option '{}' already set by its typed setter; ignoring duplicate", key);
                continue;
            }
            fields.push((key.clone(), option_value_text(value)));
        }
        fields
    }
}

/// Strings are sent bare; everything else uses its JSON text.
fn option_value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Credentials ──────────────────────────────────────────────────────────

/// Basic-auth pair for a protected Gotenberg instance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let p = NodeParameters::default();
        assert_eq!(p.api_url, "http://localhost:3000");
        assert_eq!(p.operation, "convertUrl");
        assert_eq!(p.output_filename, "output.pdf");
        assert_eq!(p.html_wrapper, DEFAULT_HTML_WRAPPER);
        assert!(p.options.is_empty());
    }

    #[test]
    fn build_trims_trailing_slash() {
        let p = NodeParameters::builder()
            .api_url("https://pdf.example.com//")
            .build()
            .unwrap();
        assert_eq!(p.api_url, "https://pdf.example.com");
    }

    #[test]
    fn build_rejects_empty_api_url() {
        let err = NodeParameters::builder().api_url("  ").build().unwrap_err();
        assert!(matches!(err, GotenbergError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_non_http_api_url() {
        assert!(NodeParameters::builder()
            .api_url("ftp://example.com")
            .build()
            .is_err());
    }

    #[test]
    fn blank_output_filename_falls_back() {
        let p = NodeParameters::builder().output_filename("").build().unwrap();
        assert_eq!(p.output_filename, "output.pdf");

        let mut raw = NodeParameters::default();
        raw.output_filename = String::new();
        assert_eq!(raw.effective_output_filename(), "output.pdf");
    }

    #[test]
    fn options_form_fields_order_and_text() {
        let opts = NodeParameters::builder()
            .landscape(true)
            .page_ranges("1-5, 8")
            .option("scale", 0.75)
            .option("emulatedMediaType", "print")
            .build()
            .unwrap()
            .options;

        assert_eq!(
            opts.form_fields(),
            vec![
                ("landscape".to_string(), "true".to_string()),
                ("nativePageRanges".to_string(), "1-5, 8".to_string()),
                ("emulatedMediaType".to_string(), "print".to_string()),
                ("scale".to_string(), "0.75".to_string()),
            ]
        );
    }

    #[test]
    fn typed_option_wins_over_same_named_extra() {
        let opts = NodeParameters::builder()
            .landscape(true)
            .option("landscape", false)
            .option("nativePageRanges", "9")
            .build()
            .unwrap()
            .options;

        assert_eq!(
            opts.form_fields(),
            vec![
                ("landscape".to_string(), "true".to_string()),
                ("nativePageRanges".to_string(), "9".to_string()),
            ]
        );
    }

    #[test]
    fn options_deserialize_from_host_collection() {
        let opts: ConversionOptions = serde_json::from_value(json!({
            "landscape": false,
            "nativePageRanges": "2-3",
            "preferCssPageSize": true
        }))
        .unwrap();
        assert_eq!(opts.landscape, Some(false));
        assert_eq!(opts.native_page_ranges.as_deref(), Some("2-3"));
        assert_eq!(opts.extra.get("preferCssPageSize"), Some(&json!(true)));
        assert!(opts
            .form_fields()
            .contains(&("preferCssPageSize".to_string(), "true".to_string())));
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let c = Credentials::new("admin", "hunter2");
        let dbg = format!("{:?}", c);
        assert!(dbg.contains("admin"));
        assert!(!dbg.contains("hunter2"));
    }
}
