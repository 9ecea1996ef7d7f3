//! Pads: directional, linkable endpoints owned by elements.
//!
//! Pads are created dynamically, linked exactly once, and enforce that
//! src pads only connect to sink pads. Because pad-to-owner and
//! pad-to-peer references form a cycle, all pads live in a pipeline-owned
//! [`PadTable`] and are referenced by copyable [`PadId`] handles.

use crate::caps::Caps;
use crate::element::ElementId;
use crate::error::LinkError;
use std::fmt;

/// Direction of a pad.
///
/// Src pads emit data to a downstream peer; sink pads receive data from
/// an upstream peer. Mixed linking is enforced when pads connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadDirection {
    /// Emits buffers downstream.
    Src,
    /// Receives buffers from upstream.
    Sink,
}

impl PadDirection {
    /// Short tag used in derived pad names ("src" / "sink").
    pub fn tag(self) -> &'static str {
        match self {
            Self::Src => "src",
            Self::Sink => "sink",
        }
    }

    /// The opposite direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::Src => Self::Sink,
            Self::Sink => Self::Src,
        }
    }
}

impl fmt::Display for PadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Unique handle to a pad in the pipeline's pad table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PadId(pub(crate) usize);

impl PadId {
    /// Get the underlying index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Caps negotiation state of a pad.
///
/// A pad starts `Unset`, enters `Negotiating` when a caps event is
/// delivered to it, and ends `Agreed` or `Rejected` depending on the
/// handling element's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NegotiationState {
    /// No caps offered yet.
    #[default]
    Unset,
    /// A caps event has been received and is being evaluated.
    Negotiating,
    /// The element accepted the caps; they are stored on the pad.
    Agreed,
    /// The element rejected the caps.
    Rejected,
}

/// A directional, linkable endpoint owned by an element.
#[derive(Debug)]
pub struct Pad {
    name: String,
    direction: PadDirection,
    owner: ElementId,
    peer: Option<PadId>,
    caps: Option<Caps>,
    negotiation: NegotiationState,
}

impl Pad {
    /// Get the pad's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the pad's direction.
    pub fn direction(&self) -> PadDirection {
        self.direction
    }

    /// Get the owning element.
    pub fn owner(&self) -> ElementId {
        self.owner
    }

    /// Get the linked peer, if any.
    pub fn peer(&self) -> Option<PadId> {
        self.peer
    }

    /// Check whether this pad has a peer.
    pub fn is_linked(&self) -> bool {
        self.peer.is_some()
    }

    /// Get the negotiated caps, if any.
    pub fn caps(&self) -> Option<&Caps> {
        self.caps.as_ref()
    }

    /// Get the negotiation state.
    pub fn negotiation(&self) -> NegotiationState {
        self.negotiation
    }
}

/// Pipeline-owned arena of all pads.
#[derive(Debug, Default)]
pub struct PadTable {
    pads: Vec<Pad>,
}

impl PadTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new unlinked pad and return its handle.
    pub(crate) fn insert(
        &mut self,
        name: String,
        direction: PadDirection,
        owner: ElementId,
    ) -> PadId {
        let id = PadId(self.pads.len());
        self.pads.push(Pad {
            name,
            direction,
            owner,
            peer: None,
            caps: None,
            negotiation: NegotiationState::Unset,
        });
        id
    }

    /// Get a pad by handle.
    ///
    /// Handles are only minted by this table, so a stale handle is a
    /// program bug and panics.
    pub fn get(&self, id: PadId) -> &Pad {
        &self.pads[id.0]
    }

    /// Link two pads, enforcing directionality and single-use rules.
    ///
    /// The pairing must be exactly one src and one sink pad, and neither
    /// side may already have a peer.
    pub fn link(&mut self, a: PadId, b: PadId) -> Result<(), LinkError> {
        if self.pads[a.0].peer.is_some() {
            return Err(LinkError::AlreadyLinked {
                pad: self.pads[a.0].name.clone(),
            });
        }
        if self.pads[b.0].peer.is_some() {
            return Err(LinkError::AlreadyLinked {
                pad: self.pads[b.0].name.clone(),
            });
        }
        if self.pads[a.0].direction == self.pads[b.0].direction {
            return Err(LinkError::SameDirection {
                a: self.pads[a.0].name.clone(),
                b: self.pads[b.0].name.clone(),
            });
        }
        // Directions differ, so the pair is exactly one src and one sink.
        self.pads[a.0].peer = Some(b);
        self.pads[b.0].peer = Some(a);
        Ok(())
    }

    /// Store caps on a pad and mark it agreed.
    pub(crate) fn store_caps(&mut self, id: PadId, caps: Caps) {
        let pad = &mut self.pads[id.0];
        pad.caps = Some(caps);
        pad.negotiation = NegotiationState::Agreed;
    }

    /// Mark a pad as evaluating an offered caps event.
    pub(crate) fn mark_negotiating(&mut self, id: PadId) {
        self.pads[id.0].negotiation = NegotiationState::Negotiating;
    }

    /// Mark a pad's offered caps as rejected.
    pub(crate) fn mark_rejected(&mut self, id: PadId) {
        self.pads[id.0].negotiation = NegotiationState::Rejected;
    }

    /// Get the negotiated caps on a pad, if any.
    pub fn caps(&self, id: PadId) -> Option<&Caps> {
        self.pads[id.0].caps.as_ref()
    }

    /// Number of pads in the table.
    pub fn len(&self) -> usize {
        self.pads.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}
