//! Header-based content-type detection.
//!
//! A [`HeaderAnalyzer`] holds an ordered chain of [`Detector`]s. Each
//! detector pairs a byte-level predicate with the caps it announces; the
//! first matching detector wins. A failing predicate is logged and
//! skipped so one broken check cannot take the whole chain down.

pub mod signatures;

pub use signatures::{default_detectors, PREVIEW_LEN, TEXT_DENSITY_THRESHOLD};

use crate::caps::Caps;
use crate::error::Result;
use std::fmt;

/// Bytes of header hex handed to classifier fallbacks.
pub const HEADER_HEX_LEN: usize = 64;

/// Bytes of decoded text preview handed to classifier fallbacks.
pub const TEXT_PREVIEW_LEN: usize = 400;

/// Hex-encode the leading `max_len` bytes of a sample.
pub fn header_sample_to_hex(data: &[u8], max_len: usize) -> String {
    hex::encode(&data[..data.len().min(max_len)])
}

/// Decode the leading `max_len` bytes of a sample as text.
///
/// Strict UTF-8 first; on failure every byte is widened as Latin-1 so the
/// preview never fails, only degrades.
pub fn preview_text(data: &[u8], max_len: usize) -> String {
    let sample = &data[..data.len().min(max_len)];
    match std::str::from_utf8(sample) {
        Ok(text) => text.to_string(),
        Err(_) => sample.iter().map(|&b| b as char).collect(),
    }
}

/// A named byte-signature check bound to the caps it announces.
pub struct Detector {
    name: String,
    caps: Caps,
    predicate: Box<dyn Fn(&[u8]) -> Result<bool> + Send + Sync>,
}

impl Detector {
    /// Create a detector from a name, the caps it announces, and a
    /// predicate over the header sample.
    pub fn new<F>(name: impl Into<String>, caps: Caps, predicate: F) -> Self
    where
        F: Fn(&[u8]) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            caps,
            predicate: Box::new(predicate),
        }
    }

    /// The detector's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The caps this detector announces on a match.
    pub fn caps(&self) -> &Caps {
        &self.caps
    }
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector")
            .field("name", &self.name)
            .field("caps", &self.caps)
            .finish()
    }
}

/// Ordered detector chain with first-match-wins semantics.
#[derive(Debug)]
pub struct HeaderAnalyzer {
    detectors: Vec<Detector>,
}

impl HeaderAnalyzer {
    /// Create an analyzer with no detectors.
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Create an analyzer with the builtin detector chain.
    pub fn new() -> Self {
        Self {
            detectors: default_detectors(),
        }
    }

    /// Append a detector to the end of the chain (builder style).
    pub fn with_detector(mut self, detector: Detector) -> Self {
        self.detectors.push(detector);
        self
    }

    /// The detectors in evaluation order.
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    /// Run the chain over a header sample; the first match wins.
    ///
    /// A predicate error disables that detector for this sample only.
    pub fn detect(&self, sample: &[u8]) -> Option<&Caps> {
        for detector in &self.detectors {
            match (detector.predicate)(sample) {
                Ok(true) => {
                    tracing::debug!(detector = detector.name.as_str(), "header match");
                    return Some(&detector.caps);
                }
                Ok(false) => {}
                Err(error) => {
                    tracing::warn!(
                        detector = detector.name.as_str(),
                        %error,
                        "detector failed, skipping"
                    );
                }
            }
        }
        None
    }
}

impl Default for HeaderAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
