//! Core value domain, lexical environment, and CPS evaluator for a small
//! Scheme dialect: the value tagged sum, an environment of frames with
//! mutation-aware binding aliasing, and a trampoline-driven evaluator
//! offering proper tail calls and first-class continuations.
//!
//! This crate deliberately stops at the seams a host embeds through: it does
//! not parse source text, does not implement a macro hygiene algorithm, and
//! ships no standard-library procedures beyond what `prelude` registers for
//! demonstration and testing. A host supplies a reader that turns text into
//! `Value` (s-expressions are already the program representation), a table
//! of `PrimFn`/`IoFn` procedures, and drives `Interpreter::eval_top`.

mod config;
mod env;
mod error;
mod eval;
mod heap;
mod intern;
mod prelude;
mod resource;
mod value;

pub use config::InterpreterConfig;
pub use error::{Arity, RunResult, SchemeError};
pub use eval::Interpreter;
pub use eval::continuation::Continuation;
pub use intern::{Interner, Symbol};
pub use resource::{LimitedTracker, NoLimitTracker, ResourceError, ResourceLimits, ResourceTracker};
pub use value::{ArityCheck, Closure, HashTable, IoFn, PairData, PointerData, PortHandle, PrimFn, Value, show};

pub use env::{Env, EnvRef, Namespace};
pub use eval::ContFrame;
pub use prelude::install as install_prelude;
