//! The value domain: every Scheme datum this core knows how to hold, in one
//! tagged sum.
//!
//! Aggregates (`List`, `Pair`, `Vector`, `HashTable`, `Str`) live directly as
//! `Rc<RefCell<_>>` payloads inside the enum rather than behind an arena of
//! indirect handles — this core has no garbage collector to coordinate with,
//! so a plain reference count already gives the sharing behaviour a Scheme
//! program depends on (mutating a vector through one alias is visible
//! through every other `Rc` to it) without an intermediate index table. See
//! DESIGN.md for the full rationale. The separate `Env`-binding `Pointer`
//! alias mechanism (named-binding aliasing, not aggregate sharing) lives in
//! `env.rs`.

use std::{cell::RefCell, cmp::Ordering, fmt, rc::Rc};

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::{
    env::EnvRef,
    error::{Arity, RunResult, SchemeError},
    eval::continuation::Continuation,
    intern::{Interner, Symbol},
};

/// One entry of the reverse-alias set, or the payload of a `Pointer` value.
///
/// `target` is a strong reference: a `Pointer` keeps the frame it aliases
/// alive, the same way a `Closure` keeps its captured environment alive.
/// The *reverse* bookkeeping stored on the pointed-to binding (`Env`'s
/// `pointers` map) holds a `Weak` back to the aliasing frame instead, so the
/// pair doesn't form a guaranteed reference cycle in the common case — see
/// `env.rs`.
#[derive(Debug)]
pub struct PointerData {
    pub name: Symbol,
    pub target: EnvRef,
}

/// A host-provided primitive: `(Vec<V>) -> Result<V, Err>`.
///
/// Primitives receive fully dereferenced arguments and run
/// synchronously; `func` may re-enter the evaluator via `apply`.
pub struct PrimFn {
    pub name: Rc<str>,
    pub arity: ArityCheck,
    pub func: Box<dyn Fn(&[Value]) -> RunResult<Value>>,
}

impl fmt::Debug for PrimFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimFn({})", self.name)
    }
}

/// A host-provided I/O-capable primitive: `(Vec<V>) -> IO Result<V, Err>`.
///
/// Distinct from `PrimFn` only in that it is allowed to touch `Port`
/// values; the uniform call signature is otherwise identical.
pub struct IoFn {
    pub name: Rc<str>,
    pub arity: ArityCheck,
    pub func: Box<dyn Fn(&[Value]) -> RunResult<Value>>,
}

impl fmt::Debug for IoFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IoFn({})", self.name)
    }
}

/// Arity contract a `PrimFn`/`IoFn` advertises, used to raise `NumArgs`
/// before `func` is even called.
#[derive(Debug, Clone, Copy)]
pub enum ArityCheck {
    Exactly(usize),
    AtLeast(usize),
}

impl ArityCheck {
    pub fn check(self, given: usize) -> RunResult<()> {
        let ok = match self {
            Self::Exactly(n) => given == n,
            Self::AtLeast(n) => given >= n,
        };
        if ok {
            Ok(())
        } else {
            let expected = match self {
                Self::Exactly(n) => Arity::Exactly(n),
                Self::AtLeast(n) => Arity::AtLeast(n),
            };
            Err(SchemeError::num_args(expected, given))
        }
    }
}

/// An improper list `(a b . c)`: a non-empty head sequence plus a tail that
/// is not itself a `List`.
#[derive(Debug)]
pub struct PairData {
    pub head: Vec<Value>,
    pub tail: Value,
}

/// A compiled lambda: parameter names, optional rest binding, a body
/// (sequence of forms), the environment it closes over, and whether it was
/// produced directly by `lambda` in tail position.
#[derive(Debug)]
pub struct Closure {
    pub params: Vec<Symbol>,
    pub rest: Option<Symbol>,
    /// Body forms, evaluated in order; code is data, so each element is
    /// just the `Value` the reader produced — a list whose head names a
    /// special form or names a procedure to apply.
    pub body: Vec<Value>,
    pub captured: EnvRef,
}

/// An opaque, host-managed I/O handle. The evaluator never
/// inspects or closes a port itself; `close` is invoked once when the last
/// `Value::Port` referencing this handle is dropped.
pub struct PortHandle {
    pub label: String,
    close: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl fmt::Debug for PortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortHandle({})", self.label)
    }
}

impl PortHandle {
    pub fn new(label: impl Into<String>, close: impl FnOnce() + 'static) -> Self {
        Self { label: label.into(), close: RefCell::new(Some(Box::new(close))) }
    }
}

impl Drop for PortHandle {
    fn drop(&mut self) {
        if let Some(close) = self.close.borrow_mut().take() {
            close();
        }
    }
}

/// A mapping from `Value` to `Value`, keyed by `eqv?`.
///
/// Bucketed by a structural hash (`eqv_hash`) with linear probing inside a
/// bucket via `Value::eqv` on collision — simpler than a from-scratch open
/// addressing table, and adequate since this core makes no promise about
/// hash-table performance, only about `eqv?`-keying and iteration stability
/// across non-mutating calls.
#[derive(Debug, Default)]
pub struct HashTable {
    buckets: indexmap::IndexMap<u64, Vec<(Value, Value)>>,
    len: usize,
}

impl HashTable {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        let bucket = self.buckets.get(&key.eqv_hash())?;
        bucket.iter().find(|(k, _)| k.eqv(key)).map(|(_, v)| v.clone())
    }

    pub fn set(&mut self, key: Value, value: Value) {
        let bucket = self.buckets.entry(key.eqv_hash()).or_default();
        if let Some(slot) = bucket.iter_mut().find(|(k, _)| k.eqv(&key)) {
            slot.1 = value;
        } else {
            bucket.push((key, value));
            self.len += 1;
        }
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let bucket = self.buckets.get_mut(&key.eqv_hash())?;
        let idx = bucket.iter().position(|(k, _)| k.eqv(key))?;
        self.len -= 1;
        Some(bucket.remove(idx).1)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.buckets
            .get(&key.eqv_hash())
            .is_some_and(|bucket| bucket.iter().any(|(k, _)| k.eqv(key)))
    }

    /// Iterates in the table's internal bucket order. This order is
    /// unspecified but stable across calls that do not mutate the table.
    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.buckets.values().flatten()
    }
}

/// The tagged sum of Scheme values.
///
/// `Nil` is the internal sentinel the table describes — never produced by
/// `eval` and never shown to user code. The empty list is `List` with an
/// empty vector, not a separate variant ("empty list is distinguished" means
/// distinguishable by content, not by tag).
#[derive(Debug, Clone)]
pub enum Value {
    Symbol(Symbol),
    Bool(bool),
    Integer(BigInt),
    Rational(BigRational),
    Real(f64),
    Complex(f64, f64),
    Str(Rc<RefCell<String>>),
    Char(char),
    List(Rc<RefCell<Vec<Value>>>),
    Pair(Rc<RefCell<PairData>>),
    Vector(Rc<RefCell<Vec<Value>>>),
    HashTable(Rc<RefCell<HashTable>>),
    PrimFn(Rc<PrimFn>),
    IoFn(Rc<IoFn>),
    Port(Rc<PortHandle>),
    Closure(Rc<Closure>),
    Continuation(Rc<Continuation>),
    Pointer(Rc<PointerData>),
    /// The unspecified value produced by `set!`/`define` and similar forms
    /// with no useful result. Distinct from the internal-only `Nil` sentinel.
    Unspecified,
    /// Internal sentinel; never returned from `eval` to user code.
    Nil,
}

impl Value {
    pub fn symbol(sym: Symbol) -> Self {
        Self::Symbol(sym)
    }

    pub fn empty_list() -> Self {
        Self::List(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::Str(Rc::new(RefCell::new(s.into())))
    }

    pub fn vector(items: Vec<Value>) -> Self {
        Self::Vector(Rc::new(RefCell::new(items)))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Self::List(Rc::new(RefCell::new(items)))
    }

    /// Builds a proper or improper list the way `cons` would: if `tail` is
    /// itself a proper list, the result is a (longer) proper list; otherwise
    /// the result is a `Pair`.
    pub fn cons(head: Value, tail: Value) -> Self {
        match tail {
            Self::List(items) => {
                let mut items = items.borrow().clone();
                items.insert(0, head);
                Self::list(items)
            }
            Self::Pair(pair) => {
                let pair = pair.borrow();
                let mut new_head = Vec::with_capacity(pair.head.len() + 1);
                new_head.push(head);
                new_head.extend(pair.head.iter().cloned());
                Self::Pair(Rc::new(RefCell::new(PairData { head: new_head, tail: pair.tail.clone() })))
            }
            other => Self::Pair(Rc::new(RefCell::new(PairData { head: vec![head], tail: other }))),
        }
    }

    pub fn hash_table() -> Self {
        Self::HashTable(Rc::new(RefCell::new(HashTable::default())))
    }

    /// `is-object(v)`: only these variants can be the target of the
    /// `Env` aliasing protocol.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::List(_) | Self::Pair(_) | Self::Str(_) | Self::Vector(_) | Self::HashTable(_) | Self::Pointer(_))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Self::Bool(false))
    }

    pub fn is_truthy(&self) -> bool {
        !self.is_false()
    }

    /// A short, stable name for the value's variant, used in error messages
    /// where showing the full printed form would be misleading (e.g. "not a
    /// procedure: #(1 2 3)" reads worse than naming the type).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Symbol(_) => "symbol",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Rational(_) => "rational",
            Self::Real(_) => "real",
            Self::Complex(..) => "complex",
            Self::Str(_) => "string",
            Self::Char(_) => "char",
            Self::List(_) => "list",
            Self::Pair(_) => "pair",
            Self::Vector(_) => "vector",
            Self::HashTable(_) => "hash-table",
            Self::PrimFn(_) => "primitive",
            Self::IoFn(_) => "primitive",
            Self::Port(_) => "port",
            Self::Closure(_) => "procedure",
            Self::Continuation(_) => "continuation",
            Self::Pointer(_) => "pointer",
            Self::Unspecified => "unspecified",
            Self::Nil => "nil",
        }
    }

    /// Discriminant used for the between-variant stable ordering and
    /// for `HashTable` bucketing. Lower tags sort first.
    fn variant_tag(&self) -> u8 {
        match self {
            Self::Nil => 0,
            Self::Unspecified => 1,
            Self::Bool(_) => 2,
            Self::Integer(_) => 3,
            Self::Rational(_) => 4,
            Self::Real(_) => 5,
            Self::Complex(..) => 6,
            Self::Char(_) => 7,
            Self::Str(_) => 8,
            Self::Symbol(_) => 9,
            Self::List(_) => 10,
            Self::Pair(_) => 11,
            Self::Vector(_) => 12,
            Self::HashTable(_) => 13,
            Self::PrimFn(_) => 14,
            Self::IoFn(_) => 15,
            Self::Port(_) => 16,
            Self::Closure(_) => 17,
            Self::Continuation(_) => 18,
            Self::Pointer(_) => 19,
        }
    }

    /// `equal?`: structural equality, recursing into aggregates.
    pub fn equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equal(y))
            }
            (Self::Pair(a), Self::Pair(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.head.len() == b.head.len()
                    && a.head.iter().zip(b.head.iter()).all(|(x, y)| x.equal(y))
                    && a.tail.equal(&b.tail)
            }
            (Self::Vector(a), Self::Vector(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equal(y))
            }
            (Self::Str(a), Self::Str(b)) => *a.borrow() == *b.borrow(),
            (Self::HashTable(a), Self::HashTable(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return false;
                }
                a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| bv.equal(v)))
            }
            (Self::Pointer(a), Self::Pointer(b)) => a.name == b.name && Rc::ptr_eq(&a.target, &b.target),
            _ => self.eqv(other),
        }
    }

    /// `eqv?`: equal for primitive values of the same concrete type;
    /// delegates to `equal?` for aggregates; heterogeneous types compare
    /// unequal; identity comparison for procedures/ports/continuations.
    pub fn eqv(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) | (Self::Unspecified, Self::Unspecified) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Rational(a), Self::Rational(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::Complex(ar, ai), Self::Complex(br, bi)) => ar.to_bits() == br.to_bits() && ai.to_bits() == bi.to_bits(),
            (Self::List(_) | Self::Pair(_) | Self::Vector(_) | Self::Str(_) | Self::HashTable(_), _) => self.equal(other),
            (Self::PrimFn(a), Self::PrimFn(b)) => Rc::ptr_eq(a, b),
            (Self::IoFn(a), Self::IoFn(b)) => Rc::ptr_eq(a, b),
            (Self::Port(a), Self::Port(b)) => Rc::ptr_eq(a, b),
            (Self::Closure(a), Self::Closure(b)) => Rc::ptr_eq(a, b),
            (Self::Continuation(a), Self::Continuation(b)) => Rc::ptr_eq(a, b),
            (Self::Pointer(a), Self::Pointer(b)) => a.name == b.name && Rc::ptr_eq(&a.target, &b.target),
            _ => false,
        }
    }

    /// A structural hash consistent with `eqv?`: `a.eqv(b)` implies
    /// `a.eqv_hash() == b.eqv_hash()`. Used to bucket `HashTable` entries.
    pub fn eqv_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = ahash::AHasher::default();
        self.variant_tag().hash(&mut hasher);
        match self {
            Self::Nil | Self::Unspecified => {}
            Self::Bool(b) => b.hash(&mut hasher),
            Self::Symbol(s) => s.hash(&mut hasher),
            Self::Char(c) => c.hash(&mut hasher),
            Self::Integer(i) => i.hash(&mut hasher),
            Self::Rational(r) => r.hash(&mut hasher),
            Self::Real(f) => f.to_bits().hash(&mut hasher),
            Self::Complex(re, im) => {
                re.to_bits().hash(&mut hasher);
                im.to_bits().hash(&mut hasher);
            }
            Self::Str(s) => s.borrow().hash(&mut hasher),
            Self::List(items) => {
                for item in items.borrow().iter() {
                    item.eqv_hash().hash(&mut hasher);
                }
            }
            Self::Pair(pair) => {
                let pair = pair.borrow();
                for item in &pair.head {
                    item.eqv_hash().hash(&mut hasher);
                }
                pair.tail.eqv_hash().hash(&mut hasher);
            }
            Self::Vector(items) => {
                for item in items.borrow().iter() {
                    item.eqv_hash().hash(&mut hasher);
                }
            }
            Self::HashTable(table) => table.borrow().len().hash(&mut hasher),
            Self::PrimFn(f) => (Rc::as_ptr(f) as usize).hash(&mut hasher),
            Self::IoFn(f) => (Rc::as_ptr(f) as usize).hash(&mut hasher),
            Self::Port(p) => (Rc::as_ptr(p) as usize).hash(&mut hasher),
            Self::Closure(c) => (Rc::as_ptr(c) as usize).hash(&mut hasher),
            Self::Continuation(c) => (Rc::as_ptr(c) as usize).hash(&mut hasher),
            Self::Pointer(p) => {
                p.name.hash(&mut hasher);
                (Rc::as_ptr(&p.target) as usize).hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Total order for use as a sort key / hash-table key ordering.
    /// Natural order within a variant; stable tag order between variants;
    /// aggregates and procedures without a natural order fall back to
    /// lexicographic comparison of `show`.
    pub fn cmp_key(&self, other: &Self, interner: &Interner) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Rational(a), Self::Rational(b)) => a.cmp(b),
            (Self::Real(a), Self::Real(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Char(a), Self::Char(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.borrow().cmp(&b.borrow()),
            (Self::Symbol(a), Self::Symbol(b)) => interner.resolve(*a).cmp(interner.resolve(*b)),
            (a, b) if a.variant_tag() == b.variant_tag() => show(a, interner).cmp(&show(b, interner)),
            (a, b) => a.variant_tag().cmp(&b.variant_tag()),
        }
    }

    /// Walks lists, pairs, vectors, and hash tables, dereferencing every
    /// `Pointer` leaf. Called only when handing values to primitives that
    /// need concrete data, not on every read.
    pub fn deref_deep(&self) -> Value {
        match self {
            Self::Pointer(ptr) => {
                let resolved = crate::env::Env::get_direct(&ptr.target, crate::env::Namespace::Var, ptr.name);
                resolved.map(|v| v.deref_deep()).unwrap_or_else(|| self.clone())
            }
            Self::List(items) => {
                let deref: Vec<Value> = items.borrow().iter().map(Value::deref_deep).collect();
                Self::list(deref)
            }
            Self::Pair(pair) => {
                let pair = pair.borrow();
                let head: Vec<Value> = pair.head.iter().map(Value::deref_deep).collect();
                Self::Pair(Rc::new(RefCell::new(PairData { head, tail: pair.tail.deref_deep() })))
            }
            Self::Vector(items) => {
                let deref: Vec<Value> = items.borrow().iter().map(Value::deref_deep).collect();
                Self::vector(deref)
            }
            Self::HashTable(table) => {
                let table = table.borrow();
                let mut deref = HashTable::default();
                for (k, v) in table.iter() {
                    deref.set(k.deref_deep(), v.deref_deep());
                }
                Self::HashTable(Rc::new(RefCell::new(deref)))
            }
            other => other.clone(),
        }
    }

    /// `deref`: returns `self` unless it is a `Pointer`, in which case
    /// the pointed-to binding is read (one level only; the binding itself
    /// cannot hold another un-dereferenced `Pointer` thanks to the
    /// define/set protocol always storing a fully-resolved target).
    pub fn deref(&self) -> Value {
        match self {
            Self::Pointer(ptr) => crate::env::Env::get_direct(&ptr.target, crate::env::Namespace::Var, ptr.name).unwrap_or_else(|| self.clone()),
            other => other.clone(),
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => i.to_f64(),
            Self::Rational(r) => r.to_f64(),
            Self::Real(f) => Some(*f),
            _ => None,
        }
    }
}

/// Canonicalises a rational: reduce by gcd, make the denominator positive,
/// and collapse to `Integer` when the denominator is 1 (so that
/// `(eqv? 1/2 (/ 2 4))` holds via `Integer`/`Rational` promotion).
pub fn make_rational(num: BigInt, den: BigInt) -> Value {
    assert!(!den.is_zero(), "make_rational: zero denominator (caller must raise DivideByZero first)");
    let (num, den) = if den.is_negative() { (-num, -den) } else { (num, den) };
    let gcd = num.gcd(&den);
    let (num, den) = if gcd.is_zero() { (num, den) } else { (num / &gcd, den / &gcd) };
    if den == BigInt::from(1) { Value::Integer(num) } else { Value::Rational(BigRational::new(num, den)) }
}

/// Canonical `show`: produces Scheme syntax. Round-trips with a
/// conforming reader for every value that has source-text form.
pub fn show(value: &Value, interner: &Interner) -> String {
    let mut out = String::new();
    write_value(value, interner, &mut out);
    out
}

fn write_value(value: &Value, interner: &Interner, out: &mut String) {
    match value {
        Value::Nil => {}
        Value::Unspecified => out.push_str(""),
        Value::Symbol(sym) => out.push_str(interner.resolve(*sym)),
        Value::Bool(true) => out.push_str("#t"),
        Value::Bool(false) => out.push_str("#f"),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Rational(r) => out.push_str(&format!("{}/{}", r.numer(), r.denom())),
        Value::Real(f) => write_real(*f, out),
        Value::Complex(re, im) => {
            write_real(*re, out);
            if *im >= 0.0 {
                out.push('+');
            }
            write_real(*im, out);
            out.push('i');
        }
        Value::Char(c) => out.push(*c),
        Value::Str(s) => {
            out.push('"');
            for c in s.borrow().chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    _ => out.push(c),
                }
            }
            out.push('"');
        }
        Value::List(items) => {
            out.push('(');
            let items = items.borrow();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(item, interner, out);
            }
            out.push(')');
        }
        Value::Pair(pair) => {
            out.push('(');
            let pair = pair.borrow();
            for (i, item) in pair.head.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(item, interner, out);
            }
            out.push_str(" . ");
            write_value(&pair.tail, interner, out);
            out.push(')');
        }
        Value::Vector(items) => {
            out.push_str("#(");
            let items = items.borrow();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(item, interner, out);
            }
            out.push(')');
        }
        Value::HashTable(table) => {
            out.push_str("#[hash-table ");
            out.push_str(&table.borrow().len().to_string());
            out.push(']');
        }
        Value::PrimFn(f) => out.push_str(&format!("<primitive {}>", f.name)),
        Value::IoFn(f) => out.push_str(&format!("<primitive {}>", f.name)),
        Value::Port(_) => out.push_str("<IO port>"),
        Value::Closure(c) => {
            out.push_str("(lambda (");
            for (i, p) in c.params.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(interner.resolve(*p));
            }
            if let Some(rest) = c.rest {
                if !c.params.is_empty() {
                    out.push(' ');
                }
                out.push_str(". ");
                out.push_str(interner.resolve(rest));
            }
            out.push_str(") ...)");
        }
        Value::Continuation(_) => out.push_str("<continuation>"),
        Value::Pointer(ptr) => out.push_str(interner.resolve(ptr.name)),
    }
}

fn write_real(f: f64, out: &mut String) {
    if f.fract() == 0.0 && f.is_finite() {
        out.push_str(&format!("{f:.1}"));
    } else {
        out.push_str(&format!("{f}"));
    }
}
