//! Node execution: one request per input item, strictly in order.
//!
//! Items are handled one after another. The next request is sent only after
//! the previous one returned, and the first failure ends the batch: the
//! caller receives that error and none of the results gathered so far.

use crate::config::{Credentials, NodeParameters, DEFAULT_OUTPUT_FILENAME};
use crate::error::GotenbergError;
use crate::host::HostContext;
use crate::item::{ConversionResult, InputItem};
use crate::operation::Operation;
use crate::pipeline::{encode, request};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the node over `items`.
///
/// # Returns
/// Exactly one [`ConversionResult`] per input item, in input order.
///
/// # Errors
/// - [`GotenbergError::UnsupportedOperation`] before any request is sent
/// - [`GotenbergError::MissingField`] / [`GotenbergError::InvalidBinary`]
///   when an item cannot be turned into a request
/// - [`GotenbergError::RequestFailed`] when the service call fails
///
/// Any error aborts the batch; no partial results are returned.
///
/// # Example
/// ```rust,no_run
/// use gotenberg_node::{execute, GotenbergClient, InputItem, NodeParameters, Operation};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let host = GotenbergClient::new(None)?;
/// let params = NodeParameters::builder()
///     .operation(Operation::ConvertUrl)
///     .build()?;
/// let items = vec![
///     InputItem::new().with_field("url", "https://example.com"),
///     InputItem::new().with_field("url", "https://example.org"),
/// ];
/// let results = execute(&host, &params, &items).await?;
/// assert_eq!(results.len(), 2);
/// # Ok(())
/// # }
/// ```
pub async fn execute(
    host: &dyn HostContext,
    params: &NodeParameters,
    items: &[InputItem],
) -> Result<Vec<ConversionResult>, GotenbergError> {
    let start = Instant::now();
    let operation: Operation = params.operation.parse()?;
    let output_filename = params.effective_output_filename();
    let total = items.len();
    info!(
        "Executing {} for {} item(s) against {}",
        operation, total, params.api_url
    );

    let credentials = host.fetch_credentials().await;
    debug!(
        "Credentials: {}",
        if credentials.is_some() { "basic auth" } else { "none" }
    );

    if let Some(ref cb) = params.progress_callback {
        cb.on_batch_start(total);
    }

    let mut results = Vec::with_capacity(total);
    for (i, item) in items.iter().enumerate() {
        let index = i + 1;
        if let Some(ref cb) = params.progress_callback {
            cb.on_item_start(index, total);
        }

        let outcome = process_item(
            host,
            params,
            operation,
            item,
            index,
            credentials.as_ref(),
        )
        .await;

        match outcome {
            Ok(pdf) => {
                if let Some(ref cb) = params.progress_callback {
                    cb.on_item_complete(index, total, pdf.len());
                }
                results.push(encode::encode_result(&pdf, output_filename));
            }
            Err(e) => {
                warn!("Item {}/{} failed, aborting batch: {}", index, total, e);
                if let Some(ref cb) = params.progress_callback {
                    cb.on_item_error(index, total, &e.to_string());
                    cb.on_batch_complete(total, results.len());
                }
                return Err(e);
            }
        }
    }

    info!(
        "Converted {} item(s) in {}ms",
        results.len(),
        start.elapsed().as_millis()
    );
    if let Some(ref cb) = params.progress_callback {
        cb.on_batch_complete(total, results.len());
    }

    Ok(results)
}

/// Build, send and await the request for a single item.
async fn process_item(
    host: &dyn HostContext,
    params: &NodeParameters,
    operation: Operation,
    item: &InputItem,
    index: usize,
    credentials: Option<&Credentials>,
) -> Result<Vec<u8>, GotenbergError> {
    let req = request::build_request(params, operation, item, index)?;
    let http = req.into_http_request(params.effective_output_filename(), credentials);
    debug!("Item {}: {} {}", index, http.method, http.url);
    host.perform_request(&http)
        .await
        .map_err(|source| GotenbergError::RequestFailed { operation, source })
}

/// Synchronous wrapper around [`execute`].
///
/// Creates a temporary tokio runtime internally; do not call from within an
/// async context.
pub fn execute_sync(
    host: &dyn HostContext,
    params: &NodeParameters,
    items: &[InputItem],
) -> Result<Vec<ConversionResult>, GotenbergError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| GotenbergError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(execute(host, params, items))
}

/// File paths for `count` results named `filename` inside `dir`.
///
/// Only the final component of `filename` is used, so every path stays
/// directly under `dir`. A single result keeps that name; several get a
/// 1-based suffix (`out.pdf` → `out-1.pdf`, `out-2.pdf`, …) so they do not
/// overwrite each other.
pub fn output_paths(dir: &Path, filename: &str, count: usize) -> Vec<PathBuf> {
    let name = Path::new(filename)
        .file_name()
        .map(Path::new)
        .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_FILENAME));
    if count == 1 {
        return vec![dir.join(name)];
    }
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = name
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pdf".to_string());
    (1..=count)
        .map(|n| dir.join(format!("{}-{}.{}", stem, n, ext)))
        .collect()
}

/// Decode each result and write it to `dir`, returning the written paths.
///
/// Uses atomic writes (temp file + rename) so a failed run never leaves a
/// truncated PDF behind.
pub async fn write_results(
    results: &[ConversionResult],
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, GotenbergError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| GotenbergError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let Some(first) = results.first() else {
        return Ok(Vec::new());
    };
    let paths = output_paths(dir, first.filename(), results.len());

    for (result, path) in results.iter().zip(&paths) {
        let bytes = result
            .decode_pdf()
            .map_err(|e| GotenbergError::Internal(format!("Result is not valid base64: {e}")))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GotenbergError::OutputWriteFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let tmp_path = path.with_extension("pdf.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| GotenbergError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| GotenbergError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_output_keeps_name() {
        let paths = output_paths(Path::new("/out"), "invoice.pdf", 1);
        assert_eq!(paths, vec![PathBuf::from("/out/invoice.pdf")]);
    }

    #[test]
    fn multiple_outputs_are_numbered() {
        let paths = output_paths(Path::new("/out"), "invoice.pdf", 3);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/out/invoice-1.pdf"),
                PathBuf::from("/out/invoice-2.pdf"),
                PathBuf::from("/out/invoice-3.pdf"),
            ]
        );
    }

    #[test]
    fn extensionless_name_gets_pdf() {
        let paths = output_paths(Path::new("out"), "scan", 2);
        assert_eq!(paths[1], PathBuf::from("out/scan-2.pdf"));
    }

    #[test]
    fn directory_components_are_stripped() {
        let dir = Path::new("/out");
        assert_eq!(
            output_paths(dir, "reports/q3.pdf", 1),
            vec![PathBuf::from("/out/q3.pdf")]
        );
        assert_eq!(
            output_paths(dir, "../x.pdf", 1),
            vec![PathBuf::from("/out/x.pdf")]
        );
        assert_eq!(
            output_paths(dir, "/etc/passwd.pdf", 2)[0],
            PathBuf::from("/out/passwd-1.pdf")
        );
        assert_eq!(
            output_paths(dir, "..", 1),
            vec![PathBuf::from("/out/output.pdf")]
        );
    }

    #[test]
    fn write_results_stays_inside_dir() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out");

        let nested = vec![encode::encode_result(b"%PDF-q3", "reports/q3.pdf")];
        let paths = tokio_test::block_on(write_results(&nested, &out)).unwrap();
        assert_eq!(paths, vec![out.join("q3.pdf")]);
        assert_eq!(std::fs::read(&paths[0]).unwrap(), b"%PDF-q3");

        let escaping = vec![encode::encode_result(b"%PDF-x", "../escaped.pdf")];
        let paths = tokio_test::block_on(write_results(&escaping, &out)).unwrap();
        assert_eq!(paths, vec![out.join("escaped.pdf")]);
        assert!(!root.path().join("escaped.pdf").exists());
    }

    #[test]
    fn write_results_decodes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            encode::encode_result(b"%PDF-a", "doc.pdf"),
            encode::encode_result(b"%PDF-b", "doc.pdf"),
        ];
        let paths = tokio_test::block_on(write_results(&results, dir.path())).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(std::fs::read(&paths[0]).unwrap(), b"%PDF-a");
        assert_eq!(std::fs::read(&paths[1]).unwrap(), b"%PDF-b");
        assert!(!paths[0].with_extension("pdf.tmp").exists());
    }
}
