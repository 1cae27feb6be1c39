//! The node's view of its host: credentials and an HTTP performer.
//!
//! The dispatcher never touches a global client or credential store. It asks
//! a [`HostContext`] for both, which keeps it testable with an in-memory fake
//! and lets an embedding application route requests through its own client.
//!
//! [`GotenbergClient`] is the production implementation built on `reqwest`.

use crate::config::Credentials;
use crate::error::{GotenbergError, TransportError};
use crate::pipeline::request::FormValue;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// An outbound request, fully described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub form: BTreeMap<String, FormValue>,
    /// Basic-auth pair; `None` means no `Authorization` header at all.
    pub auth: Option<Credentials>,
}

/// Services the node consumes from its host.
#[async_trait]
pub trait HostContext: Send + Sync {
    /// Credentials configured for the node, if any. Called once per execution.
    async fn fetch_credentials(&self) -> Option<Credentials>;

    /// Send `request` and return the raw response body.
    ///
    /// Implementations must turn non-success statuses into
    /// [`TransportError::Api`]; the body is never interpreted as JSON.
    async fn perform_request(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError>;
}

/// `reqwest`-backed host with statically configured credentials.
#[derive(Debug, Clone)]
pub struct GotenbergClient {
    client: reqwest::Client,
    credentials: Option<Credentials>,
    timeout_secs: Option<u64>,
}

impl GotenbergClient {
    /// Client without a request timeout; the service decides how long a
    /// conversion may take.
    pub fn new(credentials: Option<Credentials>) -> Result<Self, GotenbergError> {
        Self::build(credentials, None)
    }

    /// Client that gives up on a request after `secs` seconds.
    pub fn with_timeout(credentials: Option<Credentials>, secs: u64) -> Result<Self, GotenbergError> {
        Self::build(credentials, Some(secs))
    }

    fn build(credentials: Option<Credentials>, timeout_secs: Option<u64>) -> Result<Self, GotenbergError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GotenbergError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
            timeout_secs,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        classify_send_error(err.is_timeout(), self.timeout_secs, err.to_string())
    }
}

#[async_trait]
impl HostContext for GotenbergClient {
    async fn fetch_credentials(&self) -> Option<Credentials> {
        self.credentials.clone()
    }

    async fn perform_request(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        let form = build_form(&request.form).await?;
        debug!("{} {} ({} form fields)", request.method, request.url, request.form.len());

        let mut builder = self.client.request(request.method.clone(), &request.url);
        // reqwest sets the boundary-qualified multipart content type itself.
        for (name, value) in request
            .headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
        {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref creds) = request.auth {
            builder = builder.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = builder
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        debug!("Received {} bytes from {}", bytes.len(), request.url);
        Ok(bytes.to_vec())
    }
}

/// Turn the payload into a multipart form, reading path parts from disk.
async fn build_form(fields: &BTreeMap<String, FormValue>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (name, value) in fields {
        let part = match value {
            FormValue::Text(text) => Part::text(text.clone()),
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => file_part(bytes, file_name, content_type),
            FormValue::Path(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| TransportError::FileRead {
                        path: path.clone(),
                        source,
                    })?;
                Part::bytes(bytes).file_name(file_name_of(path))
            }
        };
        form = form.part(name.clone(), part);
    }
    Ok(form)
}

/// A file part carrying `content_type`, or no content type if it does not parse.
fn file_part(bytes: &[u8], file_name: &str, content_type: &str) -> Part {
    let part = || Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
    part().mime_str(content_type).unwrap_or_else(|e| {
        debug!("Ignoring content type '{}' for {}: {}", content_type, file_name, e);
        part()
    })
}

/// A timeout only counts as such when the client was configured with one.
fn classify_send_error(is_timeout: bool, timeout_secs: Option<u64>, message: String) -> TransportError {
    match timeout_secs {
        Some(secs) if is_timeout => TransportError::Timeout { secs },
        _ => TransportError::Network(message),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
