//! Progress-callback trait for per-item execution events.
//!
//! Inject an [`Arc<dyn ExecutionProgressCallback>`] via
//! [`crate::config::NodeParametersBuilder::progress_callback`] to receive
//! events as the dispatcher works through the input items.
//!
//! # Example
//!
//! ```rust
//! use gotenberg_node::{ExecutionProgressCallback, NodeParameters};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ExecutionProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, index: usize, total: usize, pdf_bytes: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Item {}/{} done ({} bytes)", index, total, pdf_bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let params = NodeParameters::builder()
//!     .progress_callback(counter as Arc<dyn ExecutionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the dispatcher as it processes each item.
///
/// Items are processed one at a time, so calls never overlap, but the
/// callback may be invoked from any tokio worker thread. All methods have
/// default no-op implementations.
pub trait ExecutionProgressCallback: Send + Sync {
    /// Called once before the first request.
    fn on_batch_start(&self, total_items: usize) {
        let _ = total_items;
    }

    /// Called just before the request for an item is sent.
    ///
    /// # Arguments
    /// * `index` — 1-based item position
    /// * `total` — number of items in the batch
    fn on_item_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when an item's PDF was received.
    fn on_item_complete(&self, index: usize, total: usize, pdf_bytes: usize) {
        let _ = (index, total, pdf_bytes);
    }

    /// Called when an item fails. The batch stops after this event.
    fn on_item_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after the batch ends, successfully or not.
    ///
    /// # Arguments
    /// * `total`         — number of items in the batch
    /// * `success_count` — items converted before the batch ended
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExecutionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::NodeParameters`].
pub type ProgressCallback = Arc<dyn ExecutionProgressCallback>;
