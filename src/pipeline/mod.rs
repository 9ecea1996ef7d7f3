//! Pipeline construction and execution.
//!
//! A pipeline owns its elements (wrapped in [`Node`]s) and the pad
//! table. Linking is explicit and happens before any data flows:
//! [`Pipeline::link_many`] requests one new src pad on each upstream
//! element and one new sink pad on each downstream element and links
//! them pairwise. No negotiation happens at link time; caps propagate
//! only once buffers flow.
//!
//! # Example
//!
//! ```rust,ignore
//! use typeflow::elements::{CollectSink, PassThrough, PrebufferSrc};
//! use typeflow::pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::new();
//! let src = pipeline.add(PrebufferSrc::new("report.pdf"));
//! let filter = pipeline.add(PassThrough::new());
//! let sink = pipeline.add(CollectSink::new());
//! pipeline.link_many(&[src, filter, sink])?;
//!
//! let output = pipeline.run()?;
//! ```

use crate::caps::Caps;
use crate::element::{Element, ElementId, ElementType, ExecCtx, NegotiationState, PadDirection, PadId, PadTable};
use crate::error::{Error, Result};
use crate::payload::Payload;

/// A node in the pipeline: an element plus its bookkeeping.
pub struct Node {
    /// Unique-enough name, cached from the element for diagnostics.
    name: String,
    /// The element itself. An Option so it can be taken out for the
    /// duration of a dispatch into it.
    element: Option<Box<dyn Element>>,
    /// Cached role restriction (queryable while the element is taken).
    element_type: ElementType,
    /// Pads owned by this element, in creation order.
    pads: Vec<PadId>,
}

impl Node {
    fn new(element: Box<dyn Element>) -> Self {
        let name = element.name().to_string();
        let element_type = element.element_type();
        Self {
            name,
            element: Some(element),
            element_type,
            pads: Vec::new(),
        }
    }

    /// Get the node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the element's role restriction.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Pads owned by this element, in creation order.
    pub fn pads(&self) -> &[PadId] {
        &self.pads
    }

    pub(crate) fn add_pad(&mut self, pad: PadId) {
        self.pads.push(pad);
    }

    pub(crate) fn take_element(&mut self) -> Option<Box<dyn Element>> {
        self.element.take()
    }

    pub(crate) fn restore_element(&mut self, element: Box<dyn Element>) {
        self.element = Some(element);
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("element_type", &self.element_type)
            .field("pads", &self.pads)
            .finish()
    }
}

/// A linear pipeline of elements driven through one synchronous pass.
#[derive(Default)]
pub struct Pipeline {
    nodes: Vec<Node>,
    pads: PadTable,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline from elements in chain order and link them.
    pub fn from_elements(elements: Vec<Box<dyn Element>>) -> Result<Self> {
        let mut pipeline = Self::new();
        let ids: Vec<ElementId> = elements
            .into_iter()
            .map(|e| pipeline.add_boxed(e))
            .collect();
        pipeline.link_many(&ids)?;
        Ok(pipeline)
    }

    /// Add an element; its position defines its place in chain order.
    pub fn add<E: Element + 'static>(&mut self, element: E) -> ElementId {
        self.add_boxed(Box::new(element))
    }

    /// Add a boxed element.
    pub fn add_boxed(&mut self, element: Box<dyn Element>) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node::new(element));
        id
    }

    /// Create a new dynamic pad on an element.
    ///
    /// When no name is supplied, one is derived from the direction tag
    /// and the element's current pad count ("src0", "sink1", ...), which
    /// is unique within the element without caller coordination.
    /// Role-restricted elements reject the disallowed direction.
    pub fn request_pad(
        &mut self,
        element: ElementId,
        direction: PadDirection,
        name: Option<&str>,
    ) -> Result<PadId> {
        let node = &mut self.nodes[element.index()];
        if !node.element_type().accepts(direction) {
            return Err(Error::PadRequestRejected {
                element: node.name().to_string(),
                direction,
            });
        }
        let pad_name = match name {
            Some(name) => name.to_string(),
            None => format!("{}{}", direction.tag(), node.pads().len()),
        };
        let pad = self.pads.insert(pad_name, direction, element);
        node.add_pad(pad);
        Ok(pad)
    }

    /// Link two pads (exactly one src to one sink, each unlinked).
    pub fn link(&mut self, a: PadId, b: PadId) -> Result<()> {
        self.pads.link(a, b)?;
        Ok(())
    }

    /// Link a chain of elements using newly requested pads.
    ///
    /// Each upstream element receives a new src pad linked to a new sink
    /// pad on the downstream element, pairwise in declared order.
    pub fn link_many(&mut self, chain: &[ElementId]) -> Result<()> {
        for pair in chain.windows(2) {
            let src = self.request_pad(pair[0], PadDirection::Src, None)?;
            let sink = self.request_pad(pair[1], PadDirection::Sink, None)?;
            self.link(src, sink)?;
        }
        Ok(())
    }

    /// Execute one pass: call `process()` on each element strictly in
    /// chain order, then return the terminal element's result, if any.
    ///
    /// Actual dataflow happens inside `process` via nested push calls,
    /// so any failure below propagates unchanged out of here.
    pub fn run(&mut self) -> Result<Option<Payload>> {
        tracing::debug!(elements = self.nodes.len(), "pipeline run");
        for index in 0..self.nodes.len() {
            let id = ElementId(index);
            let mut element = self.nodes[index].take_element().ok_or_else(|| Error::Reentrant {
                element: self.nodes[index].name().to_string(),
            })?;
            let mut ctx = ExecCtx::new(&mut self.nodes, &mut self.pads);
            let result = element.process(&mut ctx, id);
            self.nodes[index].restore_element(element);
            result?;
        }

        let Some(last) = self.nodes.len().checked_sub(1) else {
            return Ok(None);
        };
        let mut element = self.nodes[last].take_element().ok_or_else(|| Error::Reentrant {
            element: self.nodes[last].name().to_string(),
        })?;
        let output = element.finish();
        self.nodes[last].restore_element(element);
        Ok(output)
    }

    /// Get a node by id.
    pub fn node(&self, element: ElementId) -> &Node {
        &self.nodes[element.index()]
    }

    /// Negotiated caps on a pad, if any.
    pub fn pad_caps(&self, pad: PadId) -> Option<&Caps> {
        self.pads.caps(pad)
    }

    /// Negotiation state of a pad.
    pub fn negotiation_state(&self, pad: PadId) -> NegotiationState {
        self.pads.get(pad).negotiation()
    }

    /// Number of elements in the pipeline.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the pipeline has no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
