//! Classifier fallback for samples no detector recognizes.
//!
//! The pipeline core never talks to a model directly; it goes through
//! the [`Classify`] trait with a compact, pre-digested request (hex
//! header plus text preview), so implementations stay swappable and the
//! core stays free of transport concerns.

mod ollama;

pub use ollama::OllamaClassifier;

use crate::caps::Caps;
use crate::detect::{header_sample_to_hex, preview_text, HEADER_HEX_LEN, TEXT_PREVIEW_LEN};
use thiserror::Error;

/// What a classifier gets to look at: a digest of the header sample.
#[derive(Debug, Clone)]
pub struct ClassifyRequest<'a> {
    /// Origin label (usually the source URI), when known.
    pub source_label: Option<&'a str>,
    /// Hex encoding of the leading header bytes.
    pub header_hex: String,
    /// Lossy text preview of the leading bytes.
    pub text_preview: String,
}

impl<'a> ClassifyRequest<'a> {
    /// Digest a raw header sample into a request.
    pub fn from_sample(source_label: Option<&'a str>, sample: &[u8]) -> Self {
        Self {
            source_label,
            header_hex: header_sample_to_hex(sample, HEADER_HEX_LEN),
            text_preview: preview_text(sample, TEXT_PREVIEW_LEN),
        }
    }
}

/// Errors a classifier can produce.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The classifier backend could not be reached.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// The backend answered, but the answer could not be interpreted.
    #[error("malformed classifier response: {0}")]
    Malformed(String),
}

/// External collaborator that names a type when header detection fails.
pub trait Classify {
    /// Classify a sample digest into caps.
    fn classify(&self, request: &ClassifyRequest<'_>) -> Result<Caps, ClassifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_digests_sample() {
        let sample = b"%PDF-1.7 stream data";
        let request = ClassifyRequest::from_sample(Some("report.pdf"), sample);
        assert_eq!(request.source_label, Some("report.pdf"));
        assert!(request.header_hex.starts_with("25504446"));
        assert!(request.text_preview.starts_with("%PDF-1.7"));
    }

    #[test]
    fn test_request_truncates_long_samples() {
        let sample = vec![b'a'; 4096];
        let request = ClassifyRequest::from_sample(None, &sample);
        assert_eq!(request.header_hex.len(), HEADER_HEX_LEN * 2);
        assert_eq!(request.text_preview.len(), TEXT_PREVIEW_LEN);
    }
}
