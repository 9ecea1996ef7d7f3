//! Deterministic elements for exercising pipelines in tests.

use crate::caps::Caps;
use crate::element::{Element, ElementId, ElementType, ExecCtx, PadId};
use crate::error::Result;
use crate::payload::Payload;
use std::sync::{Arc, Mutex};

/// Source pushing a fixed caps announcement and payload sequence.
pub struct StaticSrc {
    name: String,
    caps: Option<Caps>,
    payloads: Vec<Payload>,
}

impl StaticSrc {
    /// Create a source with nothing to push yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caps: None,
            payloads: Vec::new(),
        }
    }

    /// Announce these caps before pushing.
    pub fn with_caps(mut self, caps: Caps) -> Self {
        self.caps = Some(caps);
        self
    }

    /// Queue a payload to push.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payloads.push(payload);
        self
    }
}

impl Element for StaticSrc {
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
            for payload in &self.payloads {
                ctx.push(pad, payload.clone())?;
            }
        }
        Ok(())
    }
}

/// Sink recording every delivered payload verbatim.
///
/// Unlike [`crate::elements::CollectSink`] it imposes no caps
/// requirement, so tests can assert exact delivery in isolation.
pub struct ProbeSink {
    name: String,
    received: Arc<Mutex<Vec<Payload>>>,
}

impl ProbeSink {
    /// Create a probe and the shared handle to its recordings.
    pub fn new(name: impl Into<String>) -> (Self, Arc<Mutex<Vec<Payload>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                name: name.into(),
                received: Arc::clone(&received),
            },
            received,
        )
    }
}

impl Element for ProbeSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn element_type(&self) -> ElementType {
        ElementType::Sink
    }

    fn on_buffer(&mut self, _ctx: &mut ExecCtx<'_>, _pad: PadId, payload: Payload) -> Result<()> {
        if let Ok(mut received) = self.received.lock() {
            received.push(payload);
        }
        Ok(())
    }
}
