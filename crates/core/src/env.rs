//! The environment: a tree of lexical frames, two namespaces per frame,
//! and the mutation-aware aliasing protocol.
//!
//! Each frame is a node in a parent-linked tree rather than an entry on a
//! flat call stack: closures capture a frame and keep it reachable
//! independently of whatever called them, which a flat stack can't express.
//! Small from-scratch Lisp interpreters commonly use exactly this
//! parent-pointer-plus-`Rc<RefCell<_>>` shape for the same reason, and this
//! module follows that idiom. Resource accounting is threaded through
//! `extend` the way a resource tracker is threaded through any frame-stack
//! push elsewhere in this crate.

use std::{cell::RefCell, fmt, rc::Rc};

use ahash::AHashMap;

use crate::{
    error::{RunResult, SchemeError},
    intern::Symbol,
    resource::ResourceTracker,
    value::Value,
};

/// The two binding namespaces a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Var,
    Macro,
}

impl Namespace {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Var => "v",
            Self::Macro => "m",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A reverse-alias entry: records that `(namespace, name)` in some other
/// frame holds a `Pointer` aliasing this binding. `frame` is a `Weak`
/// reference — the alias *value* (`PointerData::target`, `value.rs`) is the
/// strong half of the relationship, so a frame that exists only to be
/// pointed at stays alive exactly as long as something points at it, and
/// this reverse list doesn't itself keep dead aliasing frames pinned.
#[derive(Debug, Clone)]
struct ReverseAlias {
    namespace: Namespace,
    name: Symbol,
    frame: std::rc::Weak<RefCell<Frame>>,
}

#[derive(Debug)]
pub struct Frame {
    parent: Option<EnvRef>,
    vars: AHashMap<Symbol, Value>,
    macros: AHashMap<Symbol, Value>,
    /// Bindings in *this* frame that other frames' `Pointer` values alias,
    /// keyed by the aliased `Var` name. Consulted by `would_cycle` for
    /// alias-cycle detection, and by `set`/`define` to relocate the old
    /// value onto the first alias before an aliased binding is overwritten.
    reverse_aliases: AHashMap<Symbol, Vec<ReverseAlias>>,
    depth: usize,
}

/// A handle to one frame. Shared (not cloned) by every closure and
/// `Pointer` that captures it, which is what makes captured-environment
/// sharing and binding aliasing both "just work" under ordinary `Rc`
/// semantics.
pub type EnvRef = Rc<RefCell<Frame>>;

/// Namespace-qualified environment operations.
///
/// A free function module rather than a type with methods: `EnvRef` is
/// already the handle every caller holds, so `Env::get(&env, ...)` reads
/// more like a plain `get(frame, namespace, name)` lookup than a method
/// call on an opaque receiver would.
pub struct Env;

impl Env {
    /// `empty()`: a fresh root frame with no parent.
    pub fn empty() -> EnvRef {
        Self::empty_with_capacity(0)
    }

    /// Like `empty()`, but pre-sizes the root frame's namespace maps —
    /// worthwhile when a host is about to register a large primitive
    /// table and would otherwise pay for repeated rehashing.
    pub fn empty_with_capacity(capacity: usize) -> EnvRef {
        Rc::new(RefCell::new(Frame {
            parent: None,
            vars: AHashMap::with_capacity(capacity),
            macros: AHashMap::with_capacity(capacity),
            reverse_aliases: AHashMap::default(),
            depth: 0,
        }))
    }

    /// `extend(E)`: a new child frame whose parent is `E`. Checked
    /// against the configured recursion-depth ceiling before the frame
    /// is created, since each `extend` corresponds to one level of nested
    /// lexical scope (a `lambda` call, a `let`, …).
    pub fn extend(parent: &EnvRef, tracker: &mut dyn ResourceTracker) -> RunResult<EnvRef> {
        let depth = parent.borrow().depth + 1;
        tracker.check_recursion_depth(depth)?;
        tracing::trace!(depth, "extending frame");
        Ok(Rc::new(RefCell::new(Frame {
            parent: Some(Rc::clone(parent)),
            vars: AHashMap::default(),
            macros: AHashMap::default(),
            reverse_aliases: AHashMap::default(),
            depth,
        })))
    }

    /// `copy(E)`: a new frame with the same parent and a shallow copy
    /// of `E`'s own bindings (not the ancestor chain). Used by forms that
    /// need an isolated scope seeded from an existing one (e.g. a `let`
    /// desugaring that must not let later `define`s in the body leak back
    /// into the template frame).
    ///
    /// `vars`/`macros` are cloned entry-by-entry, so a `Pointer` binding in
    /// `E` is copied by reference to the same target frame it already
    /// aliases, not deep-copied into a fresh one. `reverse_aliases` is
    /// cloned rather than reset, for the same reason: the copy's view of
    /// which bindings other frames alias must keep following the originals.
    pub fn copy(env: &EnvRef) -> EnvRef {
        let frame = env.borrow();
        Rc::new(RefCell::new(Frame {
            parent: frame.parent.clone(),
            vars: frame.vars.clone(),
            macros: frame.macros.clone(),
            reverse_aliases: frame.reverse_aliases.clone(),
            depth: frame.depth,
        }))
    }

    /// `is-bound(E, ns, name)`: true if `name` is bound in `E` itself,
    /// not an ancestor.
    pub fn is_bound(env: &EnvRef, ns: Namespace, name: Symbol) -> bool {
        let frame = env.borrow();
        match ns {
            Namespace::Var => frame.vars.contains_key(&name),
            Namespace::Macro => frame.macros.contains_key(&name),
        }
    }

    /// `is-rec-bound(E, ns, name)`: true if `name` is bound in `E` or
    /// any ancestor.
    pub fn is_rec_bound(env: &EnvRef, ns: Namespace, name: Symbol) -> bool {
        Self::find_env(env, ns, name).is_some()
    }

    /// `find-env(E, ns, name)`: the nearest frame in `E`'s ancestor
    /// chain (inclusive of `E`) that binds `name`, or `None`.
    pub fn find_env(env: &EnvRef, ns: Namespace, name: Symbol) -> Option<EnvRef> {
        let mut current = Rc::clone(env);
        loop {
            if Self::is_bound(&current, ns, name) {
                return Some(current);
            }
            let parent = current.borrow().parent.clone();
            current = parent?;
        }
    }

    /// `define(E, ns, name, v)`: binds `name` in `E` itself, shadowing
    /// any ancestor binding. Overwrites an existing binding in `E` without
    /// complaint, matching top-level `define`'s redefinition semantics.
    ///
    /// If `name` is already bound in `E` and other frames hold aliases
    /// pointing at it, the old value is relocated onto the first such
    /// alias before the new value is written — see `relocate_reverse_aliases`.
    pub fn define(env: &EnvRef, ns: Namespace, name: Symbol, value: Value) {
        if ns == Namespace::Var
            && let Some(old) = Self::get_direct(env, ns, name)
        {
            Self::relocate_reverse_aliases(env, name, old);
        }
        let mut frame = env.borrow_mut();
        match ns {
            Namespace::Var => frame.vars.insert(name, value),
            Namespace::Macro => frame.macros.insert(name, value),
        };
    }

    /// The value bound to `name`, searching `env`'s ancestor chain. Chases a
    /// `Pointer` chain to the aliased binding's current value, so aliasing
    /// is transparent to readers.
    pub fn get(env: &EnvRef, ns: Namespace, name: Symbol) -> RunResult<Value> {
        let frame_ref = Self::find_env(env, ns, name).ok_or_else(|| SchemeError::unbound_var(name_placeholder(name)))?;
        let raw = Self::get_direct(&frame_ref, ns, name).expect("find_env located the binding");
        match raw {
            Value::Pointer(ptr) => Self::get(&ptr.target, Namespace::Var, ptr.name),
            other => Ok(other),
        }
    }

    /// Reads exactly one frame's binding without following a `Pointer`
    /// chain further. Used by `Value::deref`/`deref_deep` (`value.rs`) and
    /// by `get`'s own one-level chase.
    pub fn get_direct(env: &EnvRef, ns: Namespace, name: Symbol) -> Option<Value> {
        let frame = env.borrow();
        match ns {
            Namespace::Var => frame.vars.get(&name).cloned(),
            Namespace::Macro => frame.macros.get(&name).cloned(),
        }
    }

    /// `set(E, ns, name, v)`: mutates the *existing* binding for
    /// `name` found by walking `E`'s ancestor chain; unlike `define`, it
    /// never creates a new binding (`UnboundVar` if none exists).
    ///
    /// If the located binding currently holds a `Pointer`, the write is
    /// redirected to the pointed-to binding instead of overwriting the
    /// pointer itself — this is the mutation-aware half of the aliasing
    /// protocol: `(define b a) (set! b 5)` must change what `a`
    /// reads as too, not shadow `b` with a plain `5` and sever the alias.
    ///
    /// Once the canonical (non-`Pointer`) binding is located, if other
    /// frames alias it, the old value is relocated onto the first such
    /// alias before the new value overwrites it — see
    /// `relocate_reverse_aliases`.
    pub fn set(env: &EnvRef, ns: Namespace, name: Symbol, value: Value) -> RunResult<()> {
        let frame_ref = Self::find_env(env, ns, name).ok_or_else(|| SchemeError::unbound_var(name_placeholder(name)))?;
        let raw = Self::get_direct(&frame_ref, ns, name).expect("find_env located the binding");
        if let Value::Pointer(ptr) = &raw {
            let target = Rc::clone(&ptr.target);
            let target_name = ptr.name;
            return Self::set(&target, Namespace::Var, target_name, value);
        }
        if ns == Namespace::Var {
            Self::relocate_reverse_aliases(&frame_ref, name, raw);
        }
        let mut frame = frame_ref.borrow_mut();
        match ns {
            Namespace::Var => {
                frame.vars.insert(name, value);
            }
            Namespace::Macro => {
                frame.macros.insert(name, value);
            }
        }
        Ok(())
    }

    /// Relocation half of the aliasing protocol: called just before a
    /// `Var` binding with a non-empty reverse-alias set is overwritten.
    ///
    /// The first alias recorded against `(frame_ref, name)` becomes the new
    /// canonical holder — `old_value` is written there directly, as a plain
    /// value rather than another `Pointer` — and every other recorded alias
    /// is re-pointed at that new canonical binding. This way `(set! a v2)`
    /// with an existing alias `b` of `a` leaves `b` reading the value `a`
    /// held *before* the assignment, rather than `v2`: the alias now names
    /// the old value's new home instead of `a`'s new one.
    ///
    /// Dead aliases (their frame already dropped) are discarded rather than
    /// relocated to.
    fn relocate_reverse_aliases(frame_ref: &EnvRef, name: Symbol, old_value: Value) {
        let entries = frame_ref.borrow_mut().reverse_aliases.remove(&name);
        let Some(mut entries) = entries else {
            return;
        };
        entries.retain(|alias| alias.frame.upgrade().is_some());
        if entries.is_empty() {
            return;
        }
        let first = entries.remove(0);
        let first_frame = first.frame.upgrade().expect("just retained: frame is alive");
        first_frame.borrow_mut().vars.insert(first.name, old_value);

        for alias in &entries {
            if let Some(alias_frame) = alias.frame.upgrade() {
                let ptr = Value::Pointer(Rc::new(crate::value::PointerData { name: first.name, target: Rc::clone(&first_frame) }));
                alias_frame.borrow_mut().vars.insert(alias.name, ptr);
            }
        }
        if !entries.is_empty() {
            first_frame.borrow_mut().reverse_aliases.entry(first.name).or_default().extend(entries);
        }
    }

    /// Establishes `name` in `env` as an alias of `target_name` in
    /// `target_env`. Binds a
    /// `Value::Pointer` in `env` and records a reverse-alias entry on the
    /// target frame for cycle detection.
    ///
    /// Rejects creating an alias that would chase back to `env` itself
    /// (directly or through an existing pointer chain), since that can only
    /// arise from a malformed program and would otherwise make `get`/`set`
    /// recurse forever.
    pub fn alias(env: &EnvRef, name: Symbol, target_env: &EnvRef, target_name: Symbol) -> RunResult<()> {
        if Self::would_cycle(target_env, target_name, env) {
            return Err(SchemeError::bad_special_form("alias would create a cycle", name_placeholder(name)));
        }
        let ptr = Value::Pointer(Rc::new(crate::value::PointerData { name: target_name, target: Rc::clone(target_env) }));
        Self::define(env, Namespace::Var, name, ptr);
        target_env.borrow_mut().reverse_aliases.entry(target_name).or_default().push(ReverseAlias {
            namespace: Namespace::Var,
            name,
            frame: Rc::downgrade(env),
        });
        tracing::debug!(alias = name.index(), target = target_name.index(), "bound alias");
        Ok(())
    }

    /// True if following `target_name`'s pointer chain starting at
    /// `target_env` ever reaches `(candidate_env, candidate follows same
    /// name)` — i.e. whether pointing `candidate_env` at `target_env` would
    /// close a loop.
    fn would_cycle(target_env: &EnvRef, target_name: Symbol, candidate_env: &EnvRef) -> bool {
        let mut current_env = Rc::clone(target_env);
        let mut current_name = target_name;
        loop {
            if Rc::ptr_eq(&current_env, candidate_env) {
                return true;
            }
            let Some(raw) = Self::get_direct(&current_env, Namespace::Var, current_name) else {
                return false;
            };
            match raw {
                Value::Pointer(ptr) => {
                    current_env = Rc::clone(&ptr.target);
                    current_name = ptr.name;
                }
                _ => return false,
            }
        }
    }
}

/// Placeholder used where a `Symbol` needs to appear in an error message
/// without threading an `Interner` through every `env.rs` call site. Callers
/// that can resolve the real name (the evaluator, which always has an
/// `Interner` on hand) should prefer re-wrapping these errors with the
/// resolved name; see `eval/apply.rs`.
fn name_placeholder(name: Symbol) -> String {
    format!("#[symbol {}]", name.index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoLimitTracker;

    fn sym(n: u32) -> Symbol {
        Symbol::from_raw(n)
    }

    #[test]
    fn define_and_get_in_same_frame() {
        let env = Env::empty();
        Env::define(&env, Namespace::Var, sym(0), Value::Bool(true));
        assert!(Env::get(&env, Namespace::Var, sym(0)).unwrap().is_truthy());
    }

    #[test]
    fn get_walks_parent_chain() {
        let root = Env::empty();
        Env::define(&root, Namespace::Var, sym(1), Value::Integer(7.into()));
        let mut tracker = NoLimitTracker;
        let child = Env::extend(&root, &mut tracker).unwrap();
        assert!(Env::get(&child, Namespace::Var, sym(1)).is_ok());
    }

    #[test]
    fn shadowing_does_not_affect_parent() {
        let root = Env::empty();
        Env::define(&root, Namespace::Var, sym(2), Value::Integer(1.into()));
        let mut tracker = NoLimitTracker;
        let child = Env::extend(&root, &mut tracker).unwrap();
        Env::define(&child, Namespace::Var, sym(2), Value::Integer(2.into()));
        assert!(Env::get(&root, Namespace::Var, sym(2)).unwrap().eqv(&Value::Integer(1.into())));
        assert!(Env::get(&child, Namespace::Var, sym(2)).unwrap().eqv(&Value::Integer(2.into())));
    }

    #[test]
    fn set_through_alias_is_visible_from_original() {
        let frame_a = Env::empty();
        Env::define(&frame_a, Namespace::Var, sym(3), Value::Integer(1.into()));
        let mut tracker = NoLimitTracker;
        let frame_b = Env::extend(&frame_a, &mut tracker).unwrap();
        Env::alias(&frame_b, sym(4), &frame_a, sym(3)).unwrap();

        Env::set(&frame_b, Namespace::Var, sym(4), Value::Integer(99.into())).unwrap();

        assert!(Env::get(&frame_a, Namespace::Var, sym(3)).unwrap().eqv(&Value::Integer(99.into())));
        assert!(Env::get(&frame_b, Namespace::Var, sym(4)).unwrap().eqv(&Value::Integer(99.into())));
    }

    #[test]
    fn self_alias_is_rejected() {
        let env = Env::empty();
        Env::define(&env, Namespace::Var, sym(5), Value::Bool(false));
        assert!(Env::alias(&env, sym(5), &env, sym(5)).is_err());
    }

    #[test]
    fn set_relocates_old_value_to_first_alias() {
        let frame_a = Env::empty();
        Env::define(&frame_a, Namespace::Var, sym(10), Value::Integer(1.into()));
        let mut tracker = NoLimitTracker;
        let frame_b = Env::extend(&frame_a, &mut tracker).unwrap();
        Env::alias(&frame_b, sym(11), &frame_a, sym(10)).unwrap();

        Env::set(&frame_a, Namespace::Var, sym(10), Value::Integer(2.into())).unwrap();

        assert!(Env::get(&frame_a, Namespace::Var, sym(10)).unwrap().eqv(&Value::Integer(2.into())));
        assert!(Env::get(&frame_b, Namespace::Var, sym(11)).unwrap().eqv(&Value::Integer(1.into())));
    }

    #[test]
    fn define_over_an_aliased_binding_also_relocates() {
        let frame_a = Env::empty();
        Env::define(&frame_a, Namespace::Var, sym(12), Value::Integer(1.into()));
        let mut tracker = NoLimitTracker;
        let frame_b = Env::extend(&frame_a, &mut tracker).unwrap();
        Env::alias(&frame_b, sym(13), &frame_a, sym(12)).unwrap();

        Env::define(&frame_a, Namespace::Var, sym(12), Value::Integer(7.into()));

        assert!(Env::get(&frame_a, Namespace::Var, sym(12)).unwrap().eqv(&Value::Integer(7.into())));
        assert!(Env::get(&frame_b, Namespace::Var, sym(13)).unwrap().eqv(&Value::Integer(1.into())));
    }

    #[test]
    fn copy_carries_forward_reverse_alias_bookkeeping() {
        let frame_a = Env::empty();
        Env::define(&frame_a, Namespace::Var, sym(14), Value::Integer(5.into()));
        let mut tracker = NoLimitTracker;
        let frame_b = Env::extend(&frame_a, &mut tracker).unwrap();
        Env::alias(&frame_b, sym(15), &frame_a, sym(14)).unwrap();

        let copy_a = Env::copy(&frame_a);
        Env::set(&copy_a, Namespace::Var, sym(14), Value::Integer(9.into())).unwrap();

        // The alias recorded against frame_a's binding follows the copy:
        // setting through the copy still relocates the old value onto
        // frame_b's alias, rather than the copy silently dropping it.
        assert!(Env::get(&frame_b, Namespace::Var, sym(15)).unwrap().eqv(&Value::Integer(5.into())));
        assert!(Env::get(&copy_a, Namespace::Var, sym(14)).unwrap().eqv(&Value::Integer(9.into())));
    }
}
