//! Special-form classification.
//!
//! Precomputes a handful of well-known interned handles once rather than
//! string-comparing keywords on every dispatch. The keyword set is small
//! and fixed, so `Specials` interns each one exactly
//! once at interpreter construction and the evaluator's hot path compares
//! `Symbol`s (a `u32` equality check) instead of strings.

use crate::intern::{Interner, Symbol};

/// One interned handle per recognised special-form keyword.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Specials {
    pub quote: Symbol,
    pub quasiquote: Symbol,
    pub unquote: Symbol,
    pub unquote_splicing: Symbol,
    pub if_: Symbol,
    pub define: Symbol,
    pub set_bang: Symbol,
    pub lambda: Symbol,
    pub begin: Symbol,
    pub and: Symbol,
    pub or: Symbol,
    pub call_cc: Symbol,
    pub alias: Symbol,
    pub define_macro: Symbol,
}

impl Specials {
    pub fn new(interner: &mut Interner) -> Self {
        Self {
            quote: interner.intern("quote"),
            quasiquote: interner.intern("quasiquote"),
            unquote: interner.intern("unquote"),
            unquote_splicing: interner.intern("unquote-splicing"),
            if_: interner.intern("if"),
            define: interner.intern("define"),
            set_bang: interner.intern("set!"),
            lambda: interner.intern("lambda"),
            begin: interner.intern("begin"),
            and: interner.intern("and"),
            or: interner.intern("or"),
            call_cc: interner.intern("call/cc"),
            alias: interner.intern("alias"),
            define_macro: interner.intern("define-macro"),
        }
    }
}

/// Which special form a list headed by `head` names, or `None` if `head`
/// should be treated as an ordinary operator expression (a variable
/// reference to evaluate, then apply).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecialForm {
    Quote,
    Quasiquote,
    If,
    Define,
    SetBang,
    Lambda,
    Begin,
    And,
    Or,
    CallCc,
    Alias,
    DefineMacro,
}

pub(crate) fn classify(head: Symbol, specials: &Specials) -> Option<SpecialForm> {
    let s = specials;
    if head == s.quote {
        Some(SpecialForm::Quote)
    } else if head == s.quasiquote {
        Some(SpecialForm::Quasiquote)
    } else if head == s.if_ {
        Some(SpecialForm::If)
    } else if head == s.define {
        Some(SpecialForm::Define)
    } else if head == s.set_bang {
        Some(SpecialForm::SetBang)
    } else if head == s.lambda {
        Some(SpecialForm::Lambda)
    } else if head == s.begin {
        Some(SpecialForm::Begin)
    } else if head == s.and {
        Some(SpecialForm::And)
    } else if head == s.or {
        Some(SpecialForm::Or)
    } else if head == s.call_cc {
        Some(SpecialForm::CallCc)
    } else if head == s.alias {
        Some(SpecialForm::Alias)
    } else if head == s.define_macro {
        Some(SpecialForm::DefineMacro)
    } else {
        None
    }
}
