//! Control events that flow through the pipeline alongside buffers.
//!
//! Events travel over the same links as buffers but carry control
//! information rather than data. The only event with generic handling is
//! [`Event::Caps`]; anything else must be handled explicitly by an element
//! or it fails loudly.

use crate::caps::Caps;
use crate::payload::Payload;

/// A control event delivered to an element's sink pad.
#[derive(Debug, Clone)]
pub enum Event {
    /// Caps negotiation: upstream announces the type of what follows.
    Caps(Caps),

    /// Application-defined event. No generic handling exists; elements
    /// that do not recognize the name must fail with an unhandled-event
    /// error.
    Custom {
        /// Event name.
        name: String,
        /// Optional payload.
        payload: Option<Payload>,
    },
}

impl Event {
    /// The event's name ("caps" for the builtin caps event).
    pub fn name(&self) -> &str {
        match self {
            Self::Caps(_) => "caps",
            Self::Custom { name, .. } => name,
        }
    }
}
