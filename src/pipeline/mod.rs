//! Pipeline stages for one input item.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested without a host or a network.
//!
//! ## Data Flow
//!
//! ```text
//! fields ──▶ request ──▶ (host performs POST) ──▶ encode
//! (lookup)   (form)                                (base64)
//! ```
//!
//! 1. [`fields`]  — resolve each content field from the node parameter or,
//!    when that is empty, from the current item
//! 2. [`request`] — pick the endpoint, build the multipart form, merge
//!    options, attach headers and credentials
//! 3. [`encode`]  — base64-wrap the returned PDF into the host's output item

pub mod encode;
pub mod fields;
pub mod request;
