//! Caps gate: accepts or rejects offered types by name.

use crate::element::{Element, ExecCtx, NegotiationState, PadId};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::payload::Payload;

/// How an element reacts when offered caps it does not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegotiationPolicy {
    /// Refusing caps fails the run; buffers require agreed caps.
    #[default]
    Strict,
    /// Refusing caps is recorded but data still flows.
    Permissive,
}

/// Transform that gates the chain on the announced content type.
///
/// The accept list matches case-insensitively against the caps name and
/// media type; an empty list accepts everything. Under the default
/// strict policy a refused offer aborts the run with a negotiation
/// error, and buffers arriving before any agreement are refused too.
/// Under the permissive policy refusal is recorded on the pad but both
/// events and buffers keep flowing unchanged.
pub struct CapsFilter {
    name: String,
    accept: Vec<String>,
    policy: NegotiationPolicy,
}

impl CapsFilter {
    /// Create a filter accepting the named types.
    pub fn new<I, S>(accept: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: "caps-filter".to_string(),
            accept: accept.into_iter().map(Into::into).collect(),
            policy: NegotiationPolicy::default(),
        }
    }

    /// Rename the element.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Use a different refusal policy.
    pub fn with_policy(mut self, policy: NegotiationPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn accepts(&self, caps: &crate::caps::Caps) -> bool {
        if self.accept.is_empty() {
            return true;
        }
        self.accept.iter().any(|allowed| {
            allowed.eq_ignore_ascii_case(caps.name())
                || allowed.eq_ignore_ascii_case(caps.media_type())
        })
    }
}

impl Element for CapsFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_buffer(&mut self, ctx: &mut ExecCtx<'_>, pad: PadId, payload: Payload) -> Result<()> {
        let agreed = ctx.negotiation_state(pad) == NegotiationState::Agreed;
        if !agreed && self.policy == NegotiationPolicy::Strict {
            return Err(Error::Negotiation {
                element: self.name.clone(),
                offered: "buffer before agreed caps".to_string(),
            });
        }
        let owner = ctx.pad_owner(pad);
        for src in ctx.linked_src_pads(owner) {
            ctx.push(src, payload.clone())?;
        }
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut ExecCtx<'_>, pad: PadId, event: Event) -> Result<()> {
        let Event::Caps(caps) = &event else {
            let owner = ctx.pad_owner(pad);
            return ctx.send_event(owner, &event);
        };
        if self.accepts(caps) {
            ctx.accept_caps(pad, caps.clone());
            let owner = ctx.pad_owner(pad);
            return ctx.send_event(owner, &event);
        }
        ctx.reject_caps(pad);
        tracing::debug!(element = self.name.as_str(), offered = %caps, "caps refused");
        match self.policy {
            NegotiationPolicy::Strict => Err(Error::Negotiation {
                element: self.name.clone(),
                offered: caps.label().to_string(),
            }),
            NegotiationPolicy::Permissive => {
                let owner = ctx.pad_owner(pad);
                ctx.send_event(owner, &event)
            }
        }
    }
}
