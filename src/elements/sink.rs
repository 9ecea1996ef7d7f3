//! Collecting terminal sink.

use crate::element::{Element, ElementType, ExecCtx, PadId};
use crate::error::{Error, Result};
use crate::payload::Payload;

/// Sink that renders each buffer to a line and hands the joined result
/// back from [`Element::finish`].
///
/// Buffers must arrive under negotiated caps; delivery without them is a
/// caps error. Text payloads pass through verbatim, everything else is
/// rendered as the caps summary (records contribute their recorded
/// type-source to the summary).
pub struct CollectSink {
    name: String,
    outputs: Vec<String>,
}

impl CollectSink {
    /// Create a collecting sink.
    pub fn new() -> Self {
        Self {
            name: "collect-sink".to_string(),
            outputs: Vec::new(),
        }
    }

    /// Rename the element.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Lines collected so far, in arrival order.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }
}

impl Default for CollectSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for CollectSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn element_type(&self) -> ElementType {
        ElementType::Sink
    }

    fn on_buffer(&mut self, ctx: &mut ExecCtx<'_>, pad: PadId, payload: Payload) -> Result<()> {
        let Some(caps) = ctx.pad_caps(pad) else {
            return Err(Error::CapsType(format!(
                "buffer delivered to {} without negotiated caps",
                self.name
            )));
        };
        let line = match &payload {
            Payload::Text(text) => text.clone(),
            Payload::Record(record) => caps.summary_json(record.get_text("type-source")),
            _ => caps.summary_json(None),
        };
        self.outputs.push(line);
        Ok(())
    }

    fn finish(&mut self) -> Option<Payload> {
        if self.outputs.is_empty() {
            return None;
        }
        Some(Payload::Text(self.outputs.join("\n")))
    }
}
