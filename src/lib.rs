//! # Typeflow
//!
//! A typed, push-based dataflow pipeline for content-type detection.
//!
//! Typeflow moves payloads through chains of elements linked by pads.
//! Sources sample the head of a file, resolve its type through an
//! ordered detector chain (with an optional classifier fallback),
//! announce the result as caps, and push the data downstream through
//! one synchronous depth-first pass.
//!
//! ## Features
//!
//! - **Caps negotiation**: immutable type descriptors offered upstream,
//!   accepted or rejected downstream
//! - **Dynamic pads**: directional endpoints created on demand, linked
//!   exactly once
//! - **Header detection**: first-match-wins signature chain covering
//!   documents, images, video, mail, calendars, and archives
//! - **Classifier fallback**: pluggable external collaborator (Ollama
//!   out of the box) for samples no signature recognizes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use typeflow::prelude::*;
//!
//! let mut pipeline = Pipeline::new();
//! let src = pipeline.add(PrebufferSrc::new("report.pdf"));
//! let sink = pipeline.add(CollectSink::new());
//! pipeline.link_many(&[src, sink])?;
//!
//! let summary = pipeline.run()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod caps;
pub mod classify;
pub mod detect;
pub mod element;
pub mod elements;
pub mod error;
pub mod event;
pub mod payload;
pub mod pipeline;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::caps::{Caps, ParamValue};
    pub use crate::classify::{Classify, ClassifyError, ClassifyRequest, OllamaClassifier};
    pub use crate::detect::{Detector, HeaderAnalyzer};
    pub use crate::element::{Element, ElementId, ElementType, ExecCtx, PadDirection, PadId};
    pub use crate::elements::{CapsFilter, CollectSink, NegotiationPolicy, PassThrough, PrebufferSrc, UriSrc};
    pub use crate::error::{Error, Result};
    pub use crate::event::Event;
    pub use crate::payload::{Payload, Record};
    pub use crate::pipeline::Pipeline;
}

pub use error::{Error, Result};
