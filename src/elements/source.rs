//! Source elements: where data enters the pipeline.

use crate::classify::{Classify, ClassifyRequest};
use crate::detect::HeaderAnalyzer;
use crate::element::{Element, ElementId, ElementType, ExecCtx};
use crate::error::{Error, Result};
use crate::payload::{Payload, Record};
use bytes::Bytes;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default number of leading bytes read from the resource.
pub const DEFAULT_PREBUFFER_BYTES: usize = 65_535;

/// File source that prebuffers, detects the content type, announces caps
/// downstream, then pushes the data as a record.
///
/// The prebuffer limit bounds both what is read and what is pushed: the
/// source never reads the resource past it. Type resolution runs the
/// header detector chain first; when nothing matches and a classifier is
/// configured, the classifier gets a digest of the sample. The winning
/// caps gain a `type-source` parameter naming which path resolved them
/// ("header" or "classifier").
pub struct PrebufferSrc {
    name: String,
    uri: String,
    prebuffer_bytes: usize,
    analyzer: HeaderAnalyzer,
    classifier: Option<Box<dyn Classify>>,
}

impl PrebufferSrc {
    /// Create a source reading from a file path or `file://` URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            name: "prebuffer-src".to_string(),
            uri: uri.into(),
            prebuffer_bytes: DEFAULT_PREBUFFER_BYTES,
            analyzer: HeaderAnalyzer::new(),
            classifier: None,
        }
    }

    /// Rename the element.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Use a different sample size for detection.
    pub fn with_prebuffer_bytes(mut self, bytes: usize) -> Self {
        self.prebuffer_bytes = bytes;
        self
    }

    /// Replace the detector chain.
    pub fn with_analyzer(mut self, analyzer: HeaderAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Configure a classifier fallback for samples no detector matches.
    pub fn with_classifier<C: Classify + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    fn file_path(&self) -> &str {
        self.uri.strip_prefix("file://").unwrap_or(&self.uri)
    }

    /// Read at most `prebuffer_bytes` from the resource. Any failure to
    /// open or read it is a missing resource, carrying the declared uri.
    fn read_prebuffer(&self) -> Result<Vec<u8>> {
        let missing = || Error::MissingResource {
            uri: self.uri.clone(),
        };
        let path = self.file_path();
        if !Path::new(path).is_file() {
            return Err(missing());
        }
        let file = File::open(path).map_err(|_| missing())?;
        let mut data = Vec::new();
        file.take(self.prebuffer_bytes as u64)
            .read_to_end(&mut data)
            .map_err(|_| missing())?;
        Ok(data)
    }

    fn resolve_caps(&self, sample: &[u8]) -> Result<(crate::caps::Caps, &'static str)> {
        if let Some(caps) = self.analyzer.detect(sample) {
            return Ok((caps.clone(), "header"));
        }
        let Some(classifier) = &self.classifier else {
            return Err(Error::DetectionExhausted);
        };
        tracing::info!(uri = self.uri.as_str(), "no header match, asking classifier");
        let request = ClassifyRequest::from_sample(Some(&self.uri), sample);
        let caps = classifier.classify(&request)?;
        Ok((caps, "classifier"))
    }
}

impl Element for PrebufferSrc {
    fn name(&self) -> &str {
        &self.name
    }

    fn element_type(&self) -> ElementType {
        ElementType::Source
    }

    fn process(&mut self, ctx: &mut ExecCtx<'_>, id: ElementId) -> Result<()> {
        let data = self.read_prebuffer()?;
        let (caps, origin) = self.resolve_caps(&data)?;
        let caps = caps.merge_params([("type-source", origin)]);
        tracing::debug!(uri = self.uri.as_str(), caps = %caps, origin, "type resolved");

        let record = Record::new()
            .with("type-source", Payload::Text(origin.to_string()))
            .with("uri", Payload::Text(self.uri.clone()))
            .with("data", Payload::Bytes(Bytes::from(data)));

        for pad in ctx.linked_src_pads(id) {
            ctx.set_caps(pad, caps.clone(), true)?;
            ctx.push(pad, Payload::Record(record.clone()))?;
        }
        Ok(())
    }
}

/// Source that pushes a location reference instead of reading it.
///
/// Useful when a downstream element does its own fetching. Optionally
/// announces caps when the type is known up front.
pub struct UriSrc {
    name: String,
    uri: String,
    caps: Option<crate::caps::Caps>,
}

impl UriSrc {
    /// Create a source emitting the given URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            name: "uri-src".to_string(),
            uri: uri.into(),
            caps: None,
        }
    }

    /// Rename the element.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Announce these caps before pushing the reference.
    pub fn with_caps(mut self, caps: crate::caps::Caps) -> Self {
        self.caps = Some(caps);
        self
    }
}

impl Element for UriSrc {
    fn name(&self) -> &str {
        &self.name
    }

    fn element_type(&self) -> ElementType {
        ElementType::Source
    }

    fn process(&mut self, ctx: &mut ExecCtx<'_>, id: ElementId) -> Result<()> {
        for pad in ctx.linked_src_pads(id) {
            if let Some(caps) = &self.caps {
                ctx.set_caps(pad, caps.clone(), true)?;
            }
            ctx.push(pad, Payload::Uri(self.uri.clone()))?;
        }
        Ok(())
    }
}
