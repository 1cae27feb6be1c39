//! # gotenberg-node
//!
//! A workflow node that converts URLs, HTML, Markdown and Office documents to
//! PDF by relaying them to a [Gotenberg](https://gotenberg.dev) service.
//!
//! The node reads a handful of parameters, builds the multipart form the
//! service expects, sends one POST per input item, and returns each PDF as a
//! host output item carrying both a JSON copy and a binary attachment. It
//! never parses the documents it relays.
//!
//! ## Pipeline Overview
//!
//! ```text
//! items
//!  │
//!  ├─ 1. Operation  parse the selector, fail before any request if unknown
//!  ├─ 2. Fields     node parameter, else same-named item field
//!  ├─ 3. Request    endpoint + multipart form + options + headers + auth
//!  ├─ 4. Dispatch   one POST per item, sequential, first failure aborts
//!  └─ 5. Encode     PDF bytes → base64 → ConversionResult
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gotenberg_node::{execute, GotenbergClient, InputItem, NodeParameters, Operation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let host = GotenbergClient::new(None)?;
//!     let params = NodeParameters::builder()
//!         .api_url("http://localhost:3000")
//!         .operation(Operation::ConvertMarkdown)
//!         .markdown_content("# Quarterly report")
//!         .output_filename("report.pdf")
//!         .build()?;
//!     let results = execute(&host, &params, &[InputItem::new()]).await?;
//!     std::fs::write("report.pdf", results[0].decode_pdf()?)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Embedding in a host
//!
//! Implement [`HostContext`] to supply credentials and perform requests with
//! the host's own HTTP stack; [`GotenbergClient`] is the stand-alone default.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gotenberg` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod item;
pub mod operation;
pub mod pipeline;
pub mod progress;
pub mod schema;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionOptions, Credentials, NodeParameters, NodeParametersBuilder};
pub use dispatch::{execute, execute_sync, output_paths, write_results};
pub use error::{ErrorKind, GotenbergError, TransportError};
pub use host::{GotenbergClient, HostContext, HttpRequest};
pub use item::{BinaryData, ConversionResult, InputItem, PDF_MIME_TYPE};
pub use operation::Operation;
pub use pipeline::request::{ConversionRequest, FormValue};
pub use progress::{ExecutionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use schema::{credentials_description, node_description};
