//! Response encoding: raw PDF bytes → base64 → [`ConversionResult`].
//!
//! The host carries binary payloads as base64 strings, so the service's
//! response is encoded once and the same string is placed in both the JSON
//! copy and the binary attachment of the output item.

use crate::item::ConversionResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Wrap the service's response body as an output item.
pub fn encode_result(pdf: &[u8], output_filename: &str) -> ConversionResult {
    let b64 = STANDARD.encode(pdf);
    debug!("Encoded PDF {} bytes → {} bytes base64", pdf.len(), b64.len());
    ConversionResult::new(b64, output_filename)
}
