//! A minimal primitive table, registered on demand rather than baked into
//! `Interpreter::new`.
//!
//! One `PrimFn` per standard procedure, arity-checked up front before the
//! body runs. Primitives only ever see `&[Value]` — no `Interner` access —
//! so anything needing to print a `Symbol` by name is out of scope here;
//! that belongs to the host's reader/printer.

use std::{cell::RefCell, rc::Rc};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use crate::{
    error::{RunResult, SchemeError},
    eval::Interpreter,
    value::{ArityCheck, PairData, PrimFn, Value, make_rational},
};

/// Registers the procedures below into `interp`'s global frame. Idempotent:
/// calling it twice just redefines the same names.
pub fn install(interp: &mut Interpreter) {
    def(interp, "+", ArityCheck::AtLeast(0), prim_add);
    def(interp, "-", ArityCheck::AtLeast(1), prim_sub);
    def(interp, "*", ArityCheck::AtLeast(0), prim_mul);
    def(interp, "/", ArityCheck::AtLeast(1), prim_div);
    def(interp, "=", ArityCheck::AtLeast(1), prim_num_eq);
    def(interp, "<", ArityCheck::AtLeast(1), |args| prim_num_order(args, std::cmp::Ordering::is_lt));
    def(interp, ">", ArityCheck::AtLeast(1), |args| prim_num_order(args, std::cmp::Ordering::is_gt));
    def(interp, "<=", ArityCheck::AtLeast(1), |args| prim_num_order(args, |o| !o.is_gt()));
    def(interp, ">=", ArityCheck::AtLeast(1), |args| prim_num_order(args, |o| !o.is_lt()));

    def(interp, "cons", ArityCheck::Exactly(2), |args| Ok(Value::cons(args[0].clone(), args[1].clone())));
    def(interp, "car", ArityCheck::Exactly(1), prim_car);
    def(interp, "cdr", ArityCheck::Exactly(1), prim_cdr);
    def(interp, "list", ArityCheck::AtLeast(0), |args| Ok(Value::list(args.to_vec())));
    def(interp, "null?", ArityCheck::Exactly(1), |args| Ok(Value::Bool(is_empty_list(&args[0]))));
    def(interp, "pair?", ArityCheck::Exactly(1), |args| Ok(Value::Bool(is_pair(&args[0]))));

    def(interp, "vector", ArityCheck::AtLeast(0), |args| Ok(Value::vector(args.to_vec())));
    def(interp, "make-vector", ArityCheck::AtLeast(1), prim_make_vector);
    def(interp, "vector-ref", ArityCheck::Exactly(2), prim_vector_ref);
    def(interp, "vector-set!", ArityCheck::Exactly(3), prim_vector_set);
    def(interp, "vector-length", ArityCheck::Exactly(1), prim_vector_length);

    def(interp, "eq?", ArityCheck::Exactly(2), |args| Ok(Value::Bool(args[0].eqv(&args[1]))));
    def(interp, "eqv?", ArityCheck::Exactly(2), |args| Ok(Value::Bool(args[0].eqv(&args[1]))));
    def(interp, "equal?", ArityCheck::Exactly(2), |args| Ok(Value::Bool(args[0].equal(&args[1]))));
    def(interp, "not", ArityCheck::Exactly(1), |args| Ok(Value::Bool(args[0].is_false())));
}

fn def(interp: &mut Interpreter, name: &str, arity: ArityCheck, func: impl Fn(&[Value]) -> RunResult<Value> + 'static) {
    let prim = Value::PrimFn(Rc::new(PrimFn { name: Rc::from(name), arity, func: Box::new(func) }));
    interp.define_primitive(name, prim);
}

fn is_empty_list(v: &Value) -> bool {
    matches!(v, Value::List(items) if items.borrow().is_empty())
}

fn is_pair(v: &Value) -> bool {
    match v {
        Value::Pair(_) => true,
        Value::List(items) => !items.borrow().is_empty(),
        _ => false,
    }
}

fn prim_car(args: &[Value]) -> RunResult<Value> {
    match &args[0] {
        Value::List(items) => {
            items.borrow().first().cloned().ok_or_else(|| SchemeError::type_mismatch("non-empty list", "empty list"))
        }
        Value::Pair(pair) => Ok(pair.borrow().head[0].clone()),
        other => Err(SchemeError::type_mismatch("pair", other.type_name())),
    }
}

fn prim_cdr(args: &[Value]) -> RunResult<Value> {
    match &args[0] {
        Value::List(items) => {
            let items = items.borrow();
            if items.is_empty() {
                return Err(SchemeError::type_mismatch("non-empty list", "empty list"));
            }
            Ok(Value::list(items[1..].to_vec()))
        }
        Value::Pair(pair) => {
            let pair = pair.borrow();
            if pair.head.len() == 1 {
                Ok(pair.tail.clone())
            } else {
                Ok(Value::Pair(Rc::new(RefCell::new(PairData { head: pair.head[1..].to_vec(), tail: pair.tail.clone() }))))
            }
        }
        other => Err(SchemeError::type_mismatch("pair", other.type_name())),
    }
}

fn prim_make_vector(args: &[Value]) -> RunResult<Value> {
    let n = as_usize(&args[0])?;
    let fill = args.get(1).cloned().unwrap_or(Value::Unspecified);
    Ok(Value::vector(vec![fill; n]))
}

fn prim_vector_ref(args: &[Value]) -> RunResult<Value> {
    let Value::Vector(items) = &args[0] else {
        return Err(SchemeError::type_mismatch("vector", args[0].type_name()));
    };
    let idx = as_usize(&args[1])?;
    items.borrow().get(idx).cloned().ok_or_else(|| SchemeError::type_mismatch("in-bounds index", "out-of-bounds index"))
}

fn prim_vector_set(args: &[Value]) -> RunResult<Value> {
    let Value::Vector(items) = &args[0] else {
        return Err(SchemeError::type_mismatch("vector", args[0].type_name()));
    };
    let idx = as_usize(&args[1])?;
    let mut items = items.borrow_mut();
    if idx >= items.len() {
        return Err(SchemeError::type_mismatch("in-bounds index", "out-of-bounds index"));
    }
    items[idx] = args[2].clone();
    Ok(Value::Unspecified)
}

fn prim_vector_length(args: &[Value]) -> RunResult<Value> {
    let Value::Vector(items) = &args[0] else {
        return Err(SchemeError::type_mismatch("vector", args[0].type_name()));
    };
    Ok(Value::Integer(BigInt::from(items.borrow().len())))
}

fn as_usize(v: &Value) -> RunResult<usize> {
    v.as_integer().and_then(BigInt::to_usize).ok_or_else(|| SchemeError::type_mismatch("non-negative integer index", v.type_name()))
}

/// Exact (`Integer`/`Rational`) arithmetic stays exact; anything touching a
/// `Real` falls back to `f64`. This is the numeric-tower promotion lattice:
/// `Integer` ⊂ `Rational` ⊂ `Real`, each op performed at the least
/// general level both operands fit.
fn prim_add(args: &[Value]) -> RunResult<Value> {
    args.iter().try_fold(Value::Integer(BigInt::zero()), |acc, v| binop(&acc, v, |a, b| a + b, |a, b| a + b, |a, b| a + b))
}

fn prim_sub(args: &[Value]) -> RunResult<Value> {
    if args.len() == 1 {
        return binop(&Value::Integer(BigInt::zero()), &args[0], |a, b| a - b, |a, b| a - b, |a, b| a - b);
    }
    let mut iter = args.iter();
    let first = iter.next().unwrap().clone();
    iter.try_fold(first, |acc, v| binop(&acc, v, |a, b| a - b, |a, b| a - b, |a, b| a - b))
}

fn prim_mul(args: &[Value]) -> RunResult<Value> {
    args.iter().try_fold(Value::Integer(BigInt::from(1)), |acc, v| binop(&acc, v, |a, b| a * b, |a, b| a * b, |a, b| a * b))
}

fn prim_div(args: &[Value]) -> RunResult<Value> {
    let mut iter = args.iter();
    let first = if args.len() == 1 { Value::Integer(BigInt::from(1)) } else { iter.next().unwrap().clone() };
    iter.try_fold(first, |acc, v| numeric_div(&acc, v))
}

/// Applies `int_op`/`rat_op`/`real_op` at the promotion level the operand
/// pair requires: both exact integers stay `Integer`; either side exact but
/// non-integer promotes both to `Rational`; either side `Real`/`Complex`
/// promotes both to `f64`.
fn binop(
    a: &Value,
    b: &Value,
    int_op: impl Fn(BigInt, BigInt) -> BigInt,
    rat_op: impl Fn(BigRational, BigRational) -> BigRational,
    real_op: impl Fn(f64, f64) -> f64,
) -> RunResult<Value> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(Value::Integer(int_op(x.clone(), y.clone()))),
        (Value::Integer(_) | Value::Rational(_), Value::Integer(_) | Value::Rational(_)) => {
            let result = rat_op(to_rational(a), to_rational(b));
            Ok(make_rational(result.numer().clone(), result.denom().clone()))
        }
        _ => Ok(Value::Real(real_op(as_f64(a)?, as_f64(b)?))),
    }
}

fn to_rational(v: &Value) -> BigRational {
    match v {
        Value::Integer(i) => BigRational::from_integer(i.clone()),
        Value::Rational(r) => r.clone(),
        _ => unreachable!("to_rational called on an inexact value"),
    }
}

fn as_f64(v: &Value) -> RunResult<f64> {
    v.as_f64().ok_or_else(|| SchemeError::type_mismatch("number", v.type_name()))
}

fn prim_num_eq(args: &[Value]) -> RunResult<Value> {
    let first = as_f64(&args[0])?;
    for v in &args[1..] {
        if as_f64(v)? != first {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn prim_num_order(args: &[Value], accept: impl Fn(std::cmp::Ordering) -> bool) -> RunResult<Value> {
    for pair in args.windows(2) {
        let (a, b) = (as_f64(&pair[0])?, as_f64(&pair[1])?);
        let ord = a.partial_cmp(&b).ok_or_else(|| SchemeError::type_mismatch("comparable number", "NaN"))?;
        if !accept(ord) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn numeric_div(a: &Value, b: &Value) -> RunResult<Value> {
    match (a, b) {
        (Value::Integer(_) | Value::Rational(_), Value::Integer(_) | Value::Rational(_)) => {
            let denom = to_rational(b);
            if denom.is_zero() {
                return Err(SchemeError::DivideByZero);
            }
            let result = to_rational(a) / denom;
            Ok(make_rational(result.numer().clone(), result.denom().clone()))
        }
        _ => {
            // Inexact division by zero is not `DivideByZero`: native `f64`
            // division already produces the IEEE-754 result (`+inf.0`,
            // `-inf.0`, or `+nan.0`) that an inexact zero denominator calls for.
            let (x, y) = (as_f64(a)?, as_f64(b)?);
            Ok(Value::Real(x / y))
        }
    }
}
