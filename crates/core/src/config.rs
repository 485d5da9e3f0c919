//! Builder-style configuration for a fresh `Interpreter`.
//!
//! Matches `ResourceLimits`'s own builder in `resource.rs`: same
//! `Self`-returning setters, same "all limits optional" shape. This
//! adds one knob the tracker itself has no business owning — a capacity
//! hint for the root frame's namespace maps, since that's a one-time
//! allocation-sizing decision rather than an ongoing accounting concern.

use crate::resource::ResourceLimits;

/// Everything needed to construct an `Interpreter`: the resource ceilings
/// threaded into its tracker, plus a namespace capacity hint.
#[derive(Debug, Clone, Default)]
pub struct InterpreterConfig {
    pub limits: ResourceLimits,
    /// Pre-sizes the root frame's variable/macro maps to avoid rehashing
    /// while a host registers its primitive table. Purely a performance
    /// hint; zero is a perfectly valid default.
    pub root_namespace_capacity: usize,
}

impl InterpreterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn max_allocations(mut self, limit: usize) -> Self {
        self.limits = self.limits.max_allocations(limit);
        self
    }

    #[must_use]
    pub fn max_memory(mut self, limit: usize) -> Self {
        self.limits = self.limits.max_memory(limit);
        self
    }

    #[must_use]
    pub fn max_recursion_depth(mut self, limit: Option<usize>) -> Self {
        self.limits = self.limits.max_recursion_depth(limit);
        self
    }

    #[must_use]
    pub fn root_namespace_capacity(mut self, capacity: usize) -> Self {
        self.root_namespace_capacity = capacity;
        self
    }
}
