//! `quasiquote`/`unquote`/`unquote-splicing` expansion.
//!
//! Expansion recurses over the *static* shape of the template, not over an
//! unbounded runtime loop, so ordinary Rust recursion is appropriate here
//! (unlike the trampoline in `eval/mod.rs`, which exists specifically to
//! avoid Rust recursion for unbounded tail loops). Each `unquote`d
//! subexpression is evaluated by running a fresh, independent trampoline to
//! completion (`Interpreter::eval_sync`) and splicing in the resulting
//! value.

use crate::{
    env::EnvRef,
    error::{RunResult, SchemeError},
    value::Value,
};

use super::Interpreter;

pub(crate) fn expand(template: &Value, depth: u32, interp: &mut Interpreter, env: &EnvRef) -> RunResult<Value> {
    match template {
        Value::List(items) => {
            let items = items.borrow().clone();
            if let [Value::Symbol(head), inner] = items.as_slice() {
                if *head == interp.specials.unquote {
                    return if depth == 1 {
                        interp.eval_sync(inner.clone(), env.clone())
                    } else {
                        Ok(Value::list(vec![Value::Symbol(*head), expand(inner, depth - 1, interp, env)?]))
                    };
                }
                if *head == interp.specials.quasiquote {
                    return Ok(Value::list(vec![Value::Symbol(*head), expand(inner, depth + 1, interp, env)?]));
                }
            }
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                if depth == 1
                    && let Some(spliced_expr) = splice_target(item, interp)
                {
                    match interp.eval_sync(spliced_expr, env.clone())? {
                        Value::List(spliced) => out.extend(spliced.borrow().iter().cloned()),
                        other => return Err(SchemeError::type_mismatch("list", other.type_name())),
                    }
                    continue;
                }
                out.push(expand(item, depth, interp, env)?);
            }
            interp.heap().make_list(out)
        }
        Value::Vector(items) => {
            let expanded: RunResult<Vec<Value>> = items.borrow().iter().map(|item| expand(item, depth, interp, env)).collect();
            interp.heap().make_vector(expanded?)
        }
        other => Ok(other.clone()),
    }
}

/// If `item` is `(unquote-splicing expr)`, returns `expr` (cloned out before
/// the borrow on `item`'s inner list ends).
fn splice_target(item: &Value, interp: &Interpreter) -> Option<Value> {
    let Value::List(inner) = item else { return None };
    let inner = inner.borrow();
    if inner.len() != 2 {
        return None;
    }
    let Value::Symbol(head) = &inner[0] else { return None };
    (*head == interp.specials.unquote_splicing).then(|| inner[1].clone())
}
