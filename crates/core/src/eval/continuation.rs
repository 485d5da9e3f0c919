//! First-class continuations.
//!
//! The evaluator never recurses on the Rust call stack to evaluate a
//! subexpression in tail position (`eval/mod.rs`'s trampoline); the "rest of
//! the computation" at any point is just the `Vec<ContFrame>` the trampoline
//! is driving. Capturing a continuation is therefore only a `Vec::clone` of
//! that stack, and invoking one is only a `Vec::clone` back in as the active
//! stack — no segmented stacks, no setjmp/longjmp, no unsafe. Because the
//! capture is a clone rather than a move, the same continuation can be
//! invoked more than once, including after the `call/cc` that produced it
//! has already returned.

use super::ContFrame;

/// A snapshot of pending work, reified as a first-class value
/// (`Value::Continuation`, `value.rs`).
#[derive(Debug)]
pub struct Continuation {
    pub stack: Vec<ContFrame>,
}
