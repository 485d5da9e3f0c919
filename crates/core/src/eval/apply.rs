//! Application.
//!
//! Arguments are always fully evaluated and dereferenced before reaching here; `Continuation` application is
//! handled directly in the trampoline (`eval/mod.rs`) since invoking a
//! continuation replaces the whole pending-work stack, which this function
//! has no access to.

use std::rc::Rc;

use crate::{
    env::{Env, Namespace},
    error::SchemeError,
    resource::ResourceTracker,
    value::Value,
};

/// What happens after a procedure is applied to its (already evaluated)
/// arguments.
pub(crate) enum Applied {
    /// A primitive ran synchronously and produced a value.
    Value(Value),
    /// A closure was entered: the trampoline should continue evaluating
    /// `body` in `env`, in tail position relative to the call — no new pending-work frame is pushed for this.
    TailEval { body: Vec<Value>, env: crate::env::EnvRef },
}

pub(crate) fn apply(callee: &Value, args: Vec<Value>, tracker: &mut dyn ResourceTracker) -> crate::error::RunResult<Applied> {
    match callee {
        Value::PrimFn(f) => {
            f.arity.check(args.len())?;
            (f.func)(&args).map(Applied::Value)
        }
        Value::IoFn(f) => {
            f.arity.check(args.len())?;
            (f.func)(&args).map(Applied::Value)
        }
        Value::Closure(closure) => {
            let frame = Env::extend(&closure.captured, tracker)?;
            bind_params(closure, &args, &frame, tracker)?;
            Ok(Applied::TailEval { body: closure.body.clone(), env: frame })
        }
        Value::Continuation(_) => {
            // The trampoline intercepts a direct `(k ...)` call before ever
            // reaching here (`eval/mod.rs::step_apply`). Getting here means
            // a continuation was applied from some other context, such as a
            // macro transformer position, that has no pending-work stack to
            // replace.
            Err(SchemeError::not_function("continuation applied outside direct call position"))
        }
        other => Err(SchemeError::not_function(other.type_name())),
    }
}

fn bind_params(closure: &crate::value::Closure, args: &[Value], frame: &crate::env::EnvRef, tracker: &mut dyn ResourceTracker) -> crate::error::RunResult<()> {
    let min = closure.params.len();
    if closure.rest.is_some() {
        if args.len() < min {
            return Err(SchemeError::num_args(crate::error::Arity::AtLeast(min), args.len()));
        }
    } else if args.len() != min {
        return Err(SchemeError::num_args(crate::error::Arity::Exactly(min), args.len()));
    }
    for (param, arg) in closure.params.iter().zip(args.iter()) {
        Env::define(frame, Namespace::Var, *param, arg.clone());
    }
    if let Some(rest) = closure.rest {
        let rest_values: Vec<Value> = args[min..].to_vec();
        // A fresh list is allocated for every call to a variadic closure, so
        // this is the one aggregate the evaluator itself constructs on a
        // hot path (as opposed to a primitive's own body) — charge it here
        // rather than leaving variadic calls as a free allocation.
        tracker.on_allocate(std::mem::size_of::<Value>() * (rest_values.len() + 1))?;
        Env::define(frame, Namespace::Var, rest, Value::list(rest_values));
    }
    Ok(())
}

/// Builds the closure `Value` for a `lambda` form.
pub(crate) fn make_closure(params: Vec<crate::intern::Symbol>, rest: Option<crate::intern::Symbol>, body: Vec<Value>, captured: crate::env::EnvRef) -> Value {
    Value::Closure(Rc::new(crate::value::Closure { params, rest, body, captured }))
}
