//! Counting pass-through transform.

use crate::element::{Element, ExecCtx, PadId};
use crate::error::Result;
use crate::event::Event;
use crate::payload::Payload;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Transform that forwards buffers and caps unchanged.
///
/// Every forwarded buffer bumps a shared counter, and an optional
/// callback can observe each payload as it passes. Handy as an identity
/// element and as a probe point inside a chain.
pub struct PassThrough {
    name: String,
    count: Arc<AtomicUsize>,
    observer: Option<Box<dyn Fn(&Payload) + Send + Sync>>,
}

impl PassThrough {
    /// Create a pass-through element.
    pub fn new() -> Self {
        Self {
            name: "passthrough".to_string(),
            count: Arc::new(AtomicUsize::new(0)),
            observer: None,
        }
    }

    /// Rename the element.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Observe each payload as it is forwarded.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Shared handle to the forwarded-buffer counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.count)
    }
}

impl Default for PassThrough {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for PassThrough {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_buffer(&mut self, ctx: &mut ExecCtx<'_>, pad: PadId, payload: Payload) -> Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        if let Some(observer) = &self.observer {
            observer(&payload);
        }
        let owner = ctx.pad_owner(pad);
        for src in ctx.linked_src_pads(owner) {
            ctx.push(src, payload.clone())?;
        }
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut ExecCtx<'_>, pad: PadId, event: Event) -> Result<()> {
        if let Event::Caps(caps) = &event {
            ctx.accept_caps(pad, caps.clone());
        }
        let owner = ctx.pad_owner(pad);
        ctx.send_event(owner, &event)
    }
}
