#![forbid(unsafe_code)]

//! Per-render mutable state.
//!
//! A [`RenderContext`] is created at the start of one top-level render and
//! dropped at its end. It tracks object identities (to mark shared
//! references and break cycles), hands out unique ids for markup nodes, and
//! queues deferred parts whose content is streamed after the main body.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::part::{Deferred, Part};

/// Identity of a value being rendered, usually its allocation address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Identity of the allocation behind `rc`.
    #[must_use]
    pub fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self(Rc::as_ptr(rc).cast::<()>() as usize)
    }

    /// Identity from a caller-chosen key.
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw key.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

/// Result of [`RenderContext::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// First time this identity is seen in the current render.
    First,
    /// Seen before; carries how many times, including this one.
    Repeat(usize),
}

/// A deferred part waiting to be streamed, with its placeholder's node id.
#[derive(Debug, Clone)]
pub struct PendingDeferred {
    pub node_id: u64,
    pub deferred: Deferred,
}

/// Mutable state threaded through one render call.
#[derive(Debug, Default)]
pub struct RenderContext {
    seen: FxHashMap<ObjectId, usize>,
    in_progress: FxHashSet<ObjectId>,
    next_node_id: u64,
    stream_deferred: bool,
    pending: Vec<PendingDeferred>,
    deferreds_forced: usize,
}

impl RenderContext {
    /// Fresh context; deferred parts are evaluated inline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh context that streams deferred parts after the main body.
    #[must_use]
    pub fn streaming() -> Self {
        Self {
            stream_deferred: true,
            ..Self::default()
        }
    }

    /// Record a sighting of `id`.
    pub fn observe(&mut self, id: ObjectId) -> Occurrence {
        let count = self.seen.entry(id).or_insert(0);
        *count += 1;
        if *count == 1 {
            Occurrence::First
        } else {
            Occurrence::Repeat(*count)
        }
    }

    /// How many times `id` has been observed.
    #[must_use]
    pub fn times_seen(&self, id: ObjectId) -> usize {
        self.seen.get(&id).copied().unwrap_or(0)
    }

    /// Mark `id` as being rendered. Returns `false` if it already is, which
    /// means the value contains itself.
    pub fn enter(&mut self, id: ObjectId) -> bool {
        self.in_progress.insert(id)
    }

    /// Mark `id` as finished.
    pub fn exit(&mut self, id: ObjectId) {
        self.in_progress.remove(&id);
    }

    /// A node id unique within this render.
    pub fn next_node_id(&mut self) -> u64 {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    /// Whether markup emission streams deferred parts.
    #[must_use]
    pub fn streams_deferred(&self) -> bool {
        self.stream_deferred
    }

    /// Queue a deferred part for streaming and return its placeholder id.
    pub fn queue_deferred(&mut self, deferred: Deferred) -> u64 {
        let node_id = self.next_node_id();
        self.pending.push(PendingDeferred { node_id, deferred });
        node_id
    }

    /// Take every queued deferred part, in queue order.
    pub fn take_pending(&mut self) -> Vec<PendingDeferred> {
        std::mem::take(&mut self.pending)
    }

    /// Number of deferred parts waiting to be streamed.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Evaluate a deferred part (at most once) and return its content.
    pub fn force_deferred(&mut self, deferred: &Deferred) -> Part {
        if deferred.value().is_none() {
            self.deferreds_forced += 1;
        }
        deferred.force().clone()
    }

    /// Deferred parts evaluated through this context.
    #[must_use]
    pub fn deferreds_forced(&self) -> usize {
        self.deferreds_forced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::text;

    #[test]
    fn observe_counts_sightings() {
        let mut ctx = RenderContext::new();
        let shared = Rc::new(5);
        let id = ObjectId::of(&shared);
        assert_eq!(ctx.observe(id), Occurrence::First);
        assert_eq!(ctx.observe(id), Occurrence::Repeat(2));
        assert_eq!(ctx.times_seen(id), 2);
        assert_eq!(ctx.times_seen(ObjectId::from_raw(1)), 0);
    }

    #[test]
    fn clones_of_an_rc_share_identity() {
        let a = Rc::new(String::from("x"));
        let b = Rc::clone(&a);
        let c = Rc::new(String::from("x"));
        assert_eq!(ObjectId::of(&a), ObjectId::of(&b));
        assert_ne!(ObjectId::of(&a), ObjectId::of(&c));
    }

    #[test]
    fn enter_detects_reentry() {
        let mut ctx = RenderContext::new();
        let id = ObjectId::from_raw(42);
        assert!(ctx.enter(id));
        assert!(!ctx.enter(id));
        ctx.exit(id);
        assert!(ctx.enter(id));
    }

    #[test]
    fn node_ids_are_unique() {
        let mut ctx = RenderContext::new();
        let a = ctx.next_node_id();
        let b = ctx.next_node_id();
        assert_ne!(a, b);
    }

    #[test]
    fn deferred_queue_and_force() {
        let mut ctx = RenderContext::streaming();
        assert!(ctx.streams_deferred());
        let deferred = Deferred::new(text("..."), || text("done"));
        let id = ctx.queue_deferred(deferred.clone());
        assert_eq!(ctx.pending_len(), 1);
        let pending = ctx.take_pending();
        assert_eq!(pending[0].node_id, id);
        assert_eq!(ctx.pending_len(), 0);

        let part = ctx.force_deferred(&deferred);
        let again = ctx.force_deferred(&deferred);
        assert!(part.ptr_eq(&again));
        assert_eq!(ctx.deferreds_forced(), 1);
    }
}
