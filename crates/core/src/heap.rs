//! The allocation funnel for aggregate values.
//!
//! A single `Heap::allocate`-shaped choke point that every aggregate an
//! evaluator-internal construction site builds passes through, checked
//! against the resource tracker before the `Rc` is built. This core's
//! aggregates live directly in `Rc<RefCell<_>>` (see
//! `value.rs`'s module doc for why there is no arena/`HeapId` indirection),
//! so `Heap` here is a thin wrapper: it owns the tracker and offers
//! constructors that check `on_allocate` before building the `Rc`, rather
//! than owning the storage itself.

use crate::{error::RunResult, resource::ResourceTracker, value::Value};

/// Rough per-element cost used for allocation accounting. Aggregates don't
/// need a byte-exact size, so every constructor charges a
/// small fixed overhead plus this per-element estimate.
const WORD: usize = std::mem::size_of::<Value>();

pub(crate) struct Heap {
    tracker: Box<dyn ResourceTracker>,
}

impl Heap {
    pub fn new(tracker: Box<dyn ResourceTracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker_mut(&mut self) -> &mut dyn ResourceTracker {
        self.tracker.as_mut()
    }

    pub fn make_list(&mut self, items: Vec<Value>) -> RunResult<Value> {
        self.tracker.on_allocate(WORD * (items.len() + 1))?;
        Ok(Value::list(items))
    }

    pub fn make_vector(&mut self, items: Vec<Value>) -> RunResult<Value> {
        self.tracker.on_allocate(WORD * (items.len() + 1))?;
        Ok(Value::vector(items))
    }
}
