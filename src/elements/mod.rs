//! Elements shipped with the crate.
//!
//! These cover the common chain ends and middles: file/URI sources with
//! type detection, a counting pass-through, a caps gate, and a collecting
//! terminal sink. The `testing` module adds deterministic elements for
//! exercising pipelines without touching the filesystem.

mod caps_filter;
mod passthrough;
mod sink;
mod source;
pub mod testing;

pub use caps_filter::{CapsFilter, NegotiationPolicy};
pub use passthrough::PassThrough;
pub use sink::CollectSink;
pub use source::{PrebufferSrc, UriSrc, DEFAULT_PREBUFFER_BYTES};
