//! Element model: processing units linked by pads.
//!
//! Intent:
//!
//! - Keep the data path explicit: pads link elements, buffers travel via
//!   [`Element::on_buffer`].
//! - Keep control/negotiation explicit: events travel via
//!   [`Element::handle_event`] (e.g. caps).
//! - Keep roles clear: sources emit on src pads, sinks consume on sink
//!   pads, and [`ElementType`] enforces this statically at pad-request
//!   time, distinct from runtime negotiation.

mod context;
mod pad;

pub use context::ExecCtx;
pub use pad::{NegotiationState, Pad, PadDirection, PadId, PadTable};

use crate::error::{Error, Result};
use crate::event::Event;
use crate::payload::Payload;

/// Unique identifier for an element in a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    /// Get the underlying index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Role of an element, restricting which pad directions it provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Provides src pads only.
    Source,
    /// Provides pads of both directions.
    Transform,
    /// Provides sink pads only.
    Sink,
}

impl ElementType {
    /// Check whether elements of this type provide pads of `direction`.
    pub fn accepts(self, direction: PadDirection) -> bool {
        match self {
            Self::Source => direction == PadDirection::Src,
            Self::Sink => direction == PadDirection::Sink,
            Self::Transform => true,
        }
    }
}

/// A processing element with dynamic pads.
///
/// Elements are driven through one `process` call per pipeline run;
/// sources push their initial buffers there, while purely reactive
/// elements no-op and do their work in `on_buffer`. All dispatch to
/// linked peers goes through the [`ExecCtx`] handed to each hook.
pub trait Element {
    /// The element's name, used in diagnostics.
    fn name(&self) -> &str;

    /// The element's role restriction. Defaults to [`ElementType::Transform`].
    fn element_type(&self) -> ElementType {
        ElementType::Transform
    }

    /// One synchronous unit of work per pipeline run.
    ///
    /// Sources push their initial buffer(s) here; reactive elements keep
    /// the default no-op.
    fn process(&mut self, ctx: &mut ExecCtx<'_>, id: ElementId) -> Result<()> {
        let _ = (ctx, id);
        Ok(())
    }

    /// Handle a buffer arriving on a sink pad.
    ///
    /// The base implementation fails loudly: an element that can receive
    /// buffers must override this.
    fn on_buffer(&mut self, ctx: &mut ExecCtx<'_>, pad: PadId, payload: Payload) -> Result<()> {
        let _ = (ctx, pad, payload);
        Err(Error::UnexpectedBuffer {
            element: self.name().to_string(),
        })
    }

    /// Handle a control event arriving on a pad.
    ///
    /// Only the caps event has generic handling: the caps value is
    /// accepted and stored on the pad. A custom event named "caps" whose
    /// payload is not a caps value fails with a caps type error; any
    /// other event name is unhandled.
    fn handle_event(&mut self, ctx: &mut ExecCtx<'_>, pad: PadId, event: Event) -> Result<()> {
        match event {
            Event::Caps(caps) => {
                ctx.accept_caps(pad, caps);
                Ok(())
            }
            Event::Custom { name, .. } if name == "caps" => Err(Error::CapsType(format!(
                "caps event on {} did not carry a caps payload",
                self.name()
            ))),
            Event::Custom { name, .. } => Err(Error::UnhandledEvent { name }),
        }
    }

    /// Extract the element's accumulated result at the end of a run.
    ///
    /// Only terminal sinks typically produce one.
    fn finish(&mut self) -> Option<Payload> {
        None
    }
}
