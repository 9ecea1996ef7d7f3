//! Execution context handed to elements during dispatch.
//!
//! `ExecCtx` is a borrowed view over the pipeline's node list and pad
//! table. All pushes, caps propagation and event broadcast go through it,
//! so the depth-first call chain of a synchronous run stays explicit: an
//! element is taken out of its node slot while it executes, and putting
//! a buffer or event on a linked pad re-enters the context to dispatch
//! into the peer element within the same call stack.

use crate::caps::Caps;
use crate::element::pad::{NegotiationState, PadDirection, PadId, PadTable};
use crate::element::ElementId;
use crate::error::{Error, LinkError, Result};
use crate::event::Event;
use crate::payload::Payload;
use crate::pipeline::Node;

/// Dispatch surface for executing elements.
pub struct ExecCtx<'a> {
    nodes: &'a mut [Node],
    pads: &'a mut PadTable,
}

impl<'a> ExecCtx<'a> {
    pub(crate) fn new(nodes: &'a mut [Node], pads: &'a mut PadTable) -> Self {
        Self { nodes, pads }
    }

    /// Negotiated caps on a pad, if any.
    pub fn pad_caps(&self, pad: PadId) -> Option<&Caps> {
        self.pads.caps(pad)
    }

    /// Negotiation state of a pad.
    pub fn negotiation_state(&self, pad: PadId) -> NegotiationState {
        self.pads.get(pad).negotiation()
    }

    /// The element owning a pad.
    pub fn pad_owner(&self, pad: PadId) -> ElementId {
        self.pads.get(pad).owner()
    }

    /// All src pads of an element, in creation order.
    pub fn src_pads(&self, element: ElementId) -> Vec<PadId> {
        self.pads_of(element, PadDirection::Src, false)
    }

    /// The linked src pads of an element, in creation order.
    pub fn linked_src_pads(&self, element: ElementId) -> Vec<PadId> {
        self.pads_of(element, PadDirection::Src, true)
    }

    /// All sink pads of an element, in creation order.
    pub fn sink_pads(&self, element: ElementId) -> Vec<PadId> {
        self.pads_of(element, PadDirection::Sink, false)
    }

    fn pads_of(&self, element: ElementId, direction: PadDirection, linked_only: bool) -> Vec<PadId> {
        self.nodes[element.index()]
            .pads()
            .iter()
            .copied()
            .filter(|&id| {
                let pad = self.pads.get(id);
                pad.direction() == direction && (!linked_only || pad.is_linked())
            })
            .collect()
    }

    /// Store caps on a pad; when `propagate` is set and the pad is a
    /// linked src pad, additionally deliver a caps event to the peer.
    ///
    /// Propagation to an unlinked src pad is an error, matching `push`.
    pub fn set_caps(&mut self, pad: PadId, caps: Caps, propagate: bool) -> Result<()> {
        self.pads.store_caps(pad, caps.clone());
        if !propagate || self.pads.get(pad).direction() != PadDirection::Src {
            return Ok(());
        }
        let peer = self.pads.get(pad).peer().ok_or_else(|| LinkError::NotLinked {
            pad: self.pads.get(pad).name().to_string(),
        })?;
        self.pads.mark_negotiating(peer);
        let owner = self.pads.get(peer).owner();
        self.dispatch_event(owner, peer, Event::Caps(caps))
    }

    /// Accept offered caps: store them on the pad and mark it agreed.
    pub fn accept_caps(&mut self, pad: PadId, caps: Caps) {
        self.pads.store_caps(pad, caps);
    }

    /// Reject offered caps: mark the pad rejected without storing.
    pub fn reject_caps(&mut self, pad: PadId) {
        self.pads.mark_rejected(pad);
    }

    /// Push a buffer downstream from a linked src pad.
    ///
    /// This is the sole data-transfer primitive: it synchronously invokes
    /// the peer element's buffer handler with the exact payload given.
    pub fn push(&mut self, pad: PadId, payload: Payload) -> Result<()> {
        let (direction, peer, name) = {
            let p = self.pads.get(pad);
            (p.direction(), p.peer(), p.name().to_string())
        };
        if direction != PadDirection::Src {
            return Err(LinkError::WrongDirection {
                op: "push",
                expected: PadDirection::Src,
                pad: name,
            }
            .into());
        }
        let peer = peer.ok_or(LinkError::NotLinked { pad: name })?;
        let owner = self.pads.get(peer).owner();
        self.dispatch_buffer(owner, peer, payload)
    }

    /// Broadcast a control event to every linked peer reachable from the
    /// element's src pads.
    pub fn send_event(&mut self, element: ElementId, event: &Event) -> Result<()> {
        for pad in self.linked_src_pads(element) {
            let Some(peer) = self.pads.get(pad).peer() else {
                continue;
            };
            if matches!(event, Event::Caps(_)) {
                self.pads.mark_negotiating(peer);
            }
            let owner = self.pads.get(peer).owner();
            self.dispatch_event(owner, peer, event.clone())?;
        }
        Ok(())
    }

    fn dispatch_buffer(&mut self, element: ElementId, pad: PadId, payload: Payload) -> Result<()> {
        let node = &mut self.nodes[element.index()];
        let mut boxed = node.take_element().ok_or_else(|| Error::Reentrant {
            element: node.name().to_string(),
        })?;
        let result = boxed.on_buffer(self, pad, payload);
        self.nodes[element.index()].restore_element(boxed);
        result
    }

    fn dispatch_event(&mut self, element: ElementId, pad: PadId, event: Event) -> Result<()> {
        let node = &mut self.nodes[element.index()];
        let mut boxed = node.take_element().ok_or_else(|| Error::Reentrant {
            element: node.name().to_string(),
        })?;
        let result = boxed.handle_event(self, pad, event);
        self.nodes[element.index()].restore_element(boxed);
        result
    }
}
