//! Integration-level evaluator scenarios: one test per observable
//! behaviour, driven entirely through the public embedding API (no access
//! to `eval`'s internals).

use pretty_assertions::assert_eq;
use screme_core::{Interpreter, ResourceLimits, Value, show};

fn run(src: &str) -> Value {
    let mut interp = Interpreter::new(ResourceLimits::new());
    screme_core::install_prelude(&mut interp);
    let mut last = Value::Unspecified;
    for form in forms(src, &mut interp) {
        last = interp.eval_top(form).unwrap_or_else(|e| panic!("eval error on {src:?}: {e}"));
    }
    last
}

/// A tiny reader, inlined here rather than pulled from the `cli` crate
/// (this crate has no dependency on its sibling binary crate): enough to
/// turn the handful of literal forms these tests use into `Value`.
fn forms(src: &str, interp: &mut Interpreter) -> Vec<Value> {
    let mut chars = src.chars().peekable();
    let mut out = Vec::new();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            return out;
        }
        out.push(read_form(&mut chars, interp));
    }
}

fn read_form(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, interp: &mut Interpreter) -> Value {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    match chars.peek().copied() {
        Some('(') => {
            chars.next();
            let mut items = Vec::new();
            loop {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                if chars.peek() == Some(&')') {
                    chars.next();
                    return Value::list(items);
                }
                items.push(read_form(chars, interp));
            }
        }
        Some('\'') => {
            chars.next();
            let quoted = read_form(chars, interp);
            let q = interp.intern("quote");
            Value::list(vec![Value::Symbol(q), quoted])
        }
        Some('"') => {
            chars.next();
            let mut s = String::new();
            while let Some(c) = chars.next() {
                if c == '"' {
                    break;
                }
                s.push(c);
            }
            Value::string(s)
        }
        _ => {
            let mut text = String::new();
            while chars.peek().is_some_and(|c| !c.is_whitespace() && *c != '(' && *c != ')') {
                text.push(chars.next().unwrap());
            }
            if let Ok(i) = text.parse::<num_bigint::BigInt>() {
                Value::Integer(i)
            } else {
                Value::Symbol(interp.intern(&text))
            }
        }
    }
}

#[test]
fn arithmetic_left_to_right_sum() {
    let result = run("(+ 1 2 3)");
    assert!(result.eqv(&Value::Integer(6.into())));
}

#[test]
fn recursive_accumulation() {
    // Non-tail recursion (each call adds after the recursive call
    // returns), exercising ordinary Rust-stack-bounded recursion through
    // the trampoline rather than its tail-call path.
    let result = run("(define f (lambda (n) (if (= n 0) 0 (+ n (f (- n 1)))))) (f 5)");
    assert!(result.eqv(&Value::Integer(15.into())));
}

#[test]
fn call_cc_idempotence() {
    // `(call/cc (lambda (k) (k v)))` evaluates to `v`.
    let result = run("(call/cc (lambda (k) (k 42)))");
    assert!(result.eqv(&Value::Integer(42.into())));
}

#[test]
fn call_cc_reinvocation_after_return() {
    // A captured continuation can be invoked again after its `call/cc`
    // has already returned, yielding a fresh reduction of the same
    // "rest of the computation".
    let result = run(
        "(define k #f)
         (define first (+ 1 (call/cc (lambda (c) (set! k c) 10))))
         (k 100)",
    );
    assert!(result.eqv(&Value::Integer(101.into())));
}

#[test]
fn proper_tail_calls_do_not_exhaust_the_stack() {
    // A deep tail-recursive loop must not grow Rust's call stack.
    let result = run(
        "(define loop (lambda (n a) (if (= n 0) a (loop (- n 1) (+ a 1)))))
         (loop 200000 0)",
    );
    assert!(result.eqv(&Value::Integer(200_000.into())));
}

#[test]
fn argument_evaluation_is_left_to_right() {
    // Both operands' side effects run before application, in
    // left-to-right order.
    let result = run(
        "(define log (list))
         (define a (begin (set! log (cons 1 log)) 'x))
         (define b (begin (set! log (cons 2 log)) 'y))
         log",
    );
    let Value::List(items) = result else { unreachable!() };
    let items = items.borrow();
    assert_eq!(items.len(), 2);
    assert!(items[0].eqv(&Value::Integer(2.into())));
    assert!(items[1].eqv(&Value::Integer(1.into())));
}

#[test]
fn aliasing_via_vector_sharing_is_visible_through_define() {
    // `define` binding the same `Rc`-backed vector twice means
    // mutating through either name is visible through the other.
    let result = run(
        "(define v (make-vector 3 0))
         (define w v)
         (vector-set! w 1 42)
         v",
    );
    let Value::Vector(items) = result else { unreachable!() };
    let items = items.borrow();
    assert!(items[0].eqv(&Value::Integer(0.into())));
    assert!(items[1].eqv(&Value::Integer(42.into())));
    assert!(items[2].eqv(&Value::Integer(0.into())));
}

#[test]
fn alias_special_form_redirects_set_to_the_original_binding() {
    // The `alias` special form (named binding-aliasing, distinct from the
    // vector-sharing test above): `set!` through the alias must be visible
    // when reading the original name.
    let result = run(
        "(define a 1)
         (define f (lambda () (alias b a) (set! b 99) a))
         (f)",
    );
    assert!(result.eqv(&Value::Integer(99.into())));
}

#[test]
fn set_through_original_relocates_old_value_onto_the_alias() {
    // `(alias b a)` makes `b` an alias of `a`. `(set! a v2)` must not make
    // `b` read `v2` too: the old value becomes `b`'s own value, and `a`
    // moves on independently.
    let result = run(
        "(define a 1)
         (define f (lambda () (alias b a) (set! a 2) b))
         (f)",
    );
    assert!(result.eqv(&Value::Integer(1.into())));
}

#[test]
fn rational_canonicalisation_matches_reduced_fraction() {
    // `(eqv? 1/2 (/ 2 4))`. No rational literal syntax in this
    // minimal reader, so both sides are built via `/`.
    let result = run("(eqv? (/ 1 2) (/ 2 4))");
    assert!(result.eqv(&Value::Bool(true)));
}

#[test]
fn shadowing_and_set_through_extended_frame() {
    // A child frame's `define` shadows, but `set!` from a
    // child frame without its own binding mutates the ancestor's.
    let result = run(
        "(define x 1)
         (define f (lambda () (set! x 2) x))
         (f)
         x",
    );
    assert!(result.eqv(&Value::Integer(2.into())));
}

#[test]
fn quasiquote_splices_unquoted_values_into_a_fresh_list() {
    let result = run("(quasiquote (1 2 (unquote (+ 1 2))))");
    let Value::List(items) = result else { unreachable!() };
    let items = items.borrow();
    assert_eq!(items.len(), 3);
    assert!(items[2].eqv(&Value::Integer(3.into())));
}

#[test]
fn show_round_trips_simple_values() {
    let mut interp = Interpreter::new(ResourceLimits::new());
    let value = Value::list(vec![Value::Integer(1.into()), Value::Integer(2.into()), Value::Bool(true)]);
    assert_eq!(show(&value, interp.interner()), "(1 2 #t)");
    let _ = &mut interp;
}

#[test]
fn resource_limit_on_allocation_count_is_enforced() {
    // Binding a variadic closure's rest parameter allocates a fresh list on
    // every call (`eval/apply.rs`'s `bind_params`), charged through the same
    // tracker `max_allocations` configures; a low ceiling must surface as an
    // error rather than being silently ignored.
    let limits = ResourceLimits::new().max_allocations(2);
    let mut interp = Interpreter::new(limits);
    screme_core::install_prelude(&mut interp);
    let mut result = Ok(Value::Unspecified);
    for form in forms("(define f (lambda args args)) (f 1) (f 2) (f 3) (f 4)", &mut interp) {
        result = interp.eval_top(form);
        if result.is_err() {
            break;
        }
    }
    assert!(result.is_err(), "expected an allocation-limit resource error, got {result:?}");
}
