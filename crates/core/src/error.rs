//! The error taxonomy this core's evaluator and environment can raise.
//!
//! A single enum with structured fields per variant, a hand-written
//! `Display` (no derive-macro error crate — the categories are few and
//! fixed enough that a derive buys little), and `From` conversions at the
//! boundaries that produce errors (`Env`, resource tracking).

use std::fmt;

use crate::resource::ResourceError;

/// Crate-wide result alias.
pub type RunResult<T> = Result<T, SchemeError>;

/// How many arguments a callable expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Every failure category the evaluator can surface.
#[derive(Debug, Clone)]
pub enum SchemeError {
    /// Arity mismatch at application.
    NumArgs { expected: Arity, given: usize },
    /// A primitive or special form received a value of the wrong type.
    TypeMismatch { expected: &'static str, got: String },
    /// Surfaced from an external parser; the evaluator never produces this itself.
    Parser(String),
    /// Syntactic misuse of a special form.
    BadSpecialForm { msg: String, form: String },
    /// Attempted to apply a non-procedure.
    NotFunction { msg: String, name: String },
    /// `get`/`set` of an unknown variable.
    UnboundVar { msg: String, name: String },
    /// Arithmetic division by an exact zero.
    DivideByZero,
    /// A recognised but unimplemented feature gap.
    NotImplemented(String),
    /// Fallback for errors that don't fit the other variants.
    Default(String),
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumArgs { expected, given } => {
                write!(f, "wrong number of arguments: expected {expected}, given {given}")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::Parser(msg) => write!(f, "parse error: {msg}"),
            Self::BadSpecialForm { msg, form } => write!(f, "{msg}: {form}"),
            Self::NotFunction { msg, name } => write!(f, "{msg}: {name}"),
            Self::UnboundVar { msg, name } => write!(f, "{msg}: {name}"),
            Self::DivideByZero => write!(f, "division by zero"),
            Self::NotImplemented(msg) => write!(f, "not implemented: {msg}"),
            Self::Default(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SchemeError {}

impl SchemeError {
    #[must_use]
    pub fn num_args(expected: Arity, given: usize) -> Self {
        Self::NumArgs { expected, given }
    }

    #[must_use]
    pub fn type_mismatch(expected: &'static str, got: impl Into<String>) -> Self {
        Self::TypeMismatch { expected, got: got.into() }
    }

    #[must_use]
    pub fn unbound_var(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::UnboundVar { msg: "unbound variable".to_owned(), name }
    }

    #[must_use]
    pub fn not_function(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::NotFunction { msg: "not a procedure".to_owned(), name }
    }

    #[must_use]
    pub fn bad_special_form(msg: impl Into<String>, form: impl Into<String>) -> Self {
        Self::BadSpecialForm { msg: msg.into(), form: form.into() }
    }
}

impl From<ResourceError> for SchemeError {
    fn from(err: ResourceError) -> Self {
        Self::Default(err.to_string())
    }
}
