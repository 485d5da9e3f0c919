//! The evaluator: a continuation-passing tree walker
//! driven by an explicit trampoline instead of the Rust call stack.
//!
//! A bytecode VM typically drives itself through a `step`-style loop
//! rather than recursing per opcode; this module does the analogous thing
//! one level up, at the tree-walking level. A natively-recursive
//! `eval(expr, env) -> Value` can give you neither proper tail calls
//! (unbounded, not just deep-but-bounded) nor first-class continuations
//! that can be invoked more than once — including after their capturing
//! call has returned — in Rust. The "rest of the computation" at any point
//! during `run()` is exactly `Vec<ContFrame>`; capturing it is a
//! `Continuation`.

pub(crate) mod apply;
pub(crate) mod continuation;
pub(crate) mod form;
pub(crate) mod quasiquote;

use std::rc::Rc;

use crate::{
    config::InterpreterConfig,
    env::{Env, EnvRef, Namespace},
    error::{RunResult, SchemeError},
    heap::Heap,
    intern::{Interner, Symbol},
    resource::{ResourceLimits, ResourceTracker},
    value::Value,
};

use continuation::Continuation;
use form::{Specials, SpecialForm, classify};

/// Pending work: what the trampoline should do with the value a subterm
/// reduces to, once it has one.
#[derive(Debug, Clone)]
pub enum ContFrame {
    /// Evaluate the forms in `queue` in order, discarding their results, then
    /// evaluate `tail` — in tail position relative to whatever is below this
    /// frame (`begin`/closure-body sequencing).
    Seq { queue: Vec<Value>, tail: Value, env: EnvRef },
    /// Choose `then_branch`/`else_branch` based on the incoming value; the
    /// chosen branch is evaluated in tail position (this frame is simply
    /// not replaced with anything once resumed).
    If { then_branch: Value, else_branch: Value, env: EnvRef },
    /// The operator of a call has just been evaluated (the incoming value);
    /// still need to evaluate `arg_exprs` left to right.
    EvalOperator { arg_exprs: Vec<Value>, env: EnvRef },
    /// One more operand has just been evaluated (the incoming value, pushed
    /// onto `evaluated`); `remaining` still need evaluating, left to right.
    EvalOperands { callee: Value, evaluated: Vec<Value>, remaining: Vec<Value>, env: EnvRef },
    /// A `define`'s value expression has just been evaluated; bind it.
    Define { ns: Namespace, name: Symbol, env: EnvRef },
    /// A `set!`'s value expression has just been evaluated; mutate the
    /// existing binding.
    SetBang { ns: Namespace, name: Symbol, env: EnvRef },
    /// `and`: short-circuits to `#f` on the first false incoming value;
    /// otherwise continues with `remaining`, the last in tail position.
    And { remaining: Vec<Value>, env: EnvRef },
    /// `or`: short-circuits to the first truthy incoming value; otherwise
    /// continues with `remaining`, the last in tail position.
    Or { remaining: Vec<Value>, env: EnvRef },
    /// `call/cc`'s operand has just been evaluated to a procedure value;
    /// the stack at this point (after this frame is popped) *is* the
    /// continuation to reify and pass to it.
    CallCc,
}

/// What the trampoline does next.
enum Control {
    Eval(Value, EnvRef),
    Apply(Value, Vec<Value>),
    Return(Value),
}

/// Owns interning, the global frame, and resource accounting for one
/// interpreter instance: constructed once per program, then driven through
/// `eval_sync`/`eval_top`.
pub struct Interpreter {
    pub(crate) interner: Interner,
    pub(crate) specials: Specials,
    pub(crate) globals: EnvRef,
    pub(crate) heap: Heap,
}

impl Interpreter {
    pub fn new(limits: ResourceLimits) -> Self {
        Self::with_config(InterpreterConfig::new().limits(limits))
    }

    pub fn unrestricted() -> Self {
        Self::with_tracker(Box::new(crate::resource::NoLimitTracker), 0)
    }

    /// Builds an interpreter from a full `InterpreterConfig`,
    /// rather than just a `ResourceLimits`.
    pub fn with_config(config: InterpreterConfig) -> Self {
        Self::with_tracker(Box::new(crate::resource::LimitedTracker::new(config.limits)), config.root_namespace_capacity)
    }

    fn with_tracker(tracker: Box<dyn ResourceTracker>, root_namespace_capacity: usize) -> Self {
        let mut interner = Interner::new();
        let specials = Specials::new(&mut interner);
        Self { interner, specials, globals: Env::empty_with_capacity(root_namespace_capacity), heap: Heap::new(tracker) }
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    pub(crate) fn heap(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Defines a primitive in the global frame's variable namespace.
    pub fn define_primitive(&mut self, name: &str, value: Value) {
        let sym = self.intern(name);
        Env::define(&self.globals, Namespace::Var, sym, value);
    }

    pub fn eval_top(&mut self, expr: Value) -> RunResult<Value> {
        let globals = Rc::clone(&self.globals);
        self.eval_sync(expr, globals)
    }

    /// Runs a fresh trampoline to completion and returns its final value.
    /// Safe to call reentrantly (e.g. from a primitive like `map`, or from
    /// `quasiquote` expansion) since each call owns its own `Vec<ContFrame>`
    /// independent of any outer `run()` in progress.
    pub fn eval_sync(&mut self, expr: Value, env: EnvRef) -> RunResult<Value> {
        let mut stack: Vec<ContFrame> = Vec::new();
        let mut control = Control::Eval(expr, env);
        loop {
            control = match control {
                Control::Return(value) => match stack.pop() {
                    None => return Ok(value),
                    Some(frame) => self.resume(frame, value, &mut stack)?,
                },
                Control::Eval(expr, env) => self.step_eval(expr, env, &mut stack)?,
                Control::Apply(callee, args) => self.step_apply(callee, args, &mut stack)?,
            };
        }
    }

    /// Dispatches one expression: self-evaluating literals return
    /// immediately; symbols look themselves up; lists are either a special
    /// form, a macro use, or an application.
    fn step_eval(&mut self, expr: Value, env: EnvRef, stack: &mut Vec<ContFrame>) -> RunResult<Control> {
        match expr {
            Value::Symbol(sym) => Ok(Control::Return(Env::get(&env, Namespace::Var, sym).map_err(|_| self.unbound_var_error(sym))?)),
            Value::List(items) => {
                let items = items.borrow().clone();
                self.step_list(items, env, stack)
            }
            // Everything else (numbers, strings, booleans, chars, vectors,
            // procedures already constructed, …) is self-evaluating.
            other => Ok(Control::Return(other)),
        }
    }

    fn step_list(&mut self, items: Vec<Value>, env: EnvRef, stack: &mut Vec<ContFrame>) -> RunResult<Control> {
        let Some((head, rest)) = items.split_first() else {
            // `()` evaluates to itself; it is not an application of nothing.
            return Ok(Control::Return(Value::empty_list()));
        };
        let rest = rest.to_vec();

        if let Value::Symbol(head_sym) = head {
            if let Some(form) = classify(*head_sym, &self.specials) {
                return self.step_special(form, rest, env, stack);
            }
            if Env::is_rec_bound(&env, Namespace::Macro, *head_sym) {
                let transformer = Env::get(&env, Namespace::Macro, *head_sym)?;
                let expanded = self.apply_transformer(transformer, rest)?;
                return Ok(Control::Eval(expanded, env));
            }
        }

        // Ordinary application: evaluate the operator, then the operands
        // left to right, then apply.
        stack.push(ContFrame::EvalOperator { arg_exprs: rest, env: env.clone() });
        Ok(Control::Eval(head.clone(), env))
    }

    /// Runs a macro transformer (a `Closure` or `PrimFn`) on the *unevaluated*
    /// argument forms, synchronously, and returns the expansion. Full
    /// hygienic macro expansion is outside this core's scope; this is
    /// the minimal hook that makes the `"m"` namespace meaningful on its own.
    fn apply_transformer(&mut self, transformer: Value, raw_args: Vec<Value>) -> RunResult<Value> {
        match apply::apply(&transformer, raw_args, self.heap.tracker_mut())? {
            apply::Applied::Value(v) => Ok(v),
            apply::Applied::TailEval { body, env } => self.eval_body_sync(body, env),
        }
    }

    fn eval_body_sync(&mut self, body: Vec<Value>, env: EnvRef) -> RunResult<Value> {
        let Some((last, init)) = body.split_last() else {
            return Ok(Value::Unspecified);
        };
        for form in init {
            self.eval_sync(form.clone(), env.clone())?;
        }
        self.eval_sync(last.clone(), env)
    }

    fn step_special(&mut self, form: SpecialForm, args: Vec<Value>, env: EnvRef, stack: &mut Vec<ContFrame>) -> RunResult<Control> {
        match form {
            SpecialForm::Quote => {
                let [value] = take_exact(args, "quote")?;
                Ok(Control::Return(value))
            }
            SpecialForm::Quasiquote => {
                let [template] = take_exact(args, "quasiquote")?;
                let expanded = quasiquote::expand(&template, 1, self, &env)?;
                Ok(Control::Return(expanded))
            }
            SpecialForm::If => {
                let mut args = args.into_iter();
                let cond = args.next().ok_or_else(|| SchemeError::bad_special_form("if requires a condition", "if"))?;
                let then_branch = args.next().ok_or_else(|| SchemeError::bad_special_form("if requires a consequent", "if"))?;
                let else_branch = args.next().unwrap_or(Value::Unspecified);
                stack.push(ContFrame::If { then_branch, else_branch, env: env.clone() });
                Ok(Control::Eval(cond, env))
            }
            SpecialForm::Define => self.step_define(args, env, stack),
            SpecialForm::SetBang => self.step_set(args, env, stack),
            SpecialForm::Lambda => self.step_lambda(args, env),
            SpecialForm::Begin => Ok(self.step_seq(args, env, stack)),
            SpecialForm::And => Ok(self.step_and(args, env, stack)),
            SpecialForm::Or => Ok(self.step_or(args, env, stack)),
            SpecialForm::CallCc => self.step_call_cc(args, env, stack),
            SpecialForm::Alias => self.step_alias(args, env),
            SpecialForm::DefineMacro => self.step_define_macro(args, env),
        }
    }

    fn step_define(&mut self, args: Vec<Value>, env: EnvRef, stack: &mut Vec<ContFrame>) -> RunResult<Control> {
        let mut args = args.into_iter();
        let target = args.next().ok_or_else(|| SchemeError::bad_special_form("define requires a name", "define"))?;
        match target {
            Value::Symbol(name) => {
                let value_expr = args.next().unwrap_or(Value::Unspecified);
                stack.push(ContFrame::Define { ns: Namespace::Var, name, env: env.clone() });
                Ok(Control::Eval(value_expr, env))
            }
            // `(define (f a b) body...)` sugar for `(define f (lambda (a b) body...))`.
            Value::List(sig) => {
                let sig_items = sig.borrow().clone();
                let Some((Value::Symbol(name), params)) = sig_items.split_first().map(|(h, t)| (h.clone(), t.to_vec())) else {
                    return Err(SchemeError::bad_special_form("define's signature must start with a name", "define"));
                };
                let body: Vec<Value> = args.collect();
                let closure = self.step_lambda_value(params, body, env.clone())?;
                Env::define(&env, Namespace::Var, name, closure);
                Ok(Control::Return(Value::Unspecified))
            }
            other => Err(SchemeError::type_mismatch("symbol or signature list", other.type_name())),
        }
    }

    fn step_set(&mut self, args: Vec<Value>, env: EnvRef, stack: &mut Vec<ContFrame>) -> RunResult<Control> {
        let mut args = args.into_iter();
        let name = match args.next() {
            Some(Value::Symbol(name)) => name,
            _ => return Err(SchemeError::bad_special_form("set! requires a bound name", "set!")),
        };
        let value_expr = args.next().ok_or_else(|| SchemeError::bad_special_form("set! requires a value", "set!"))?;
        stack.push(ContFrame::SetBang { ns: Namespace::Var, name, env: env.clone() });
        Ok(Control::Eval(value_expr, env))
    }

    fn step_lambda(&mut self, args: Vec<Value>, env: EnvRef) -> RunResult<Control> {
        let mut args = args.into_iter();
        let params_form = args.next().ok_or_else(|| SchemeError::bad_special_form("lambda requires a parameter list", "lambda"))?;
        let body: Vec<Value> = args.collect();
        Ok(Control::Return(self.step_lambda_value_from_form(params_form, body, env)?))
    }

    /// Accepts the three shapes a `lambda` parameter spec can take: a proper
    /// `List` of fixed names, a `Pair` `(a b . rest)` mixing fixed names with
    /// a rest binding, or a bare `Symbol` binding the whole argument list
    ///.
    fn step_lambda_value_from_form(&mut self, params_form: Value, body: Vec<Value>, env: EnvRef) -> RunResult<Value> {
        let (params, rest) = match params_form {
            Value::List(items) => (parse_param_names(&items.borrow())?, None),
            Value::Pair(pair) => {
                let pair = pair.borrow();
                let fixed = parse_param_names(&pair.head)?;
                let Value::Symbol(rest) = pair.tail else {
                    return Err(SchemeError::type_mismatch("rest parameter name", pair.tail.type_name()));
                };
                (fixed, Some(rest))
            }
            Value::Symbol(rest) => (Vec::new(), Some(rest)),
            other => return Err(SchemeError::type_mismatch("parameter list", other.type_name())),
        };
        Ok(apply::make_closure(params, rest, body, env))
    }

    fn step_lambda_value(&mut self, params: Vec<Value>, body: Vec<Value>, env: EnvRef) -> RunResult<Value> {
        let fixed = parse_param_names(&params)?;
        Ok(apply::make_closure(fixed, None, body, env))
    }

    fn step_seq(&mut self, mut body: Vec<Value>, env: EnvRef, stack: &mut Vec<ContFrame>) -> Control {
        let Some(tail) = body.pop() else {
            return Control::Return(Value::Unspecified);
        };
        if body.is_empty() {
            Control::Eval(tail, env)
        } else {
            let first = body.remove(0);
            stack.push(ContFrame::Seq { queue: body, tail, env: env.clone() });
            Control::Eval(first, env)
        }
    }

    fn step_and(&mut self, mut forms: Vec<Value>, env: EnvRef, stack: &mut Vec<ContFrame>) -> Control {
        if forms.is_empty() {
            return Control::Return(Value::Bool(true));
        }
        let first = forms.remove(0);
        if forms.is_empty() {
            Control::Eval(first, env)
        } else {
            stack.push(ContFrame::And { remaining: forms, env: env.clone() });
            Control::Eval(first, env)
        }
    }

    fn step_or(&mut self, mut forms: Vec<Value>, env: EnvRef, stack: &mut Vec<ContFrame>) -> Control {
        if forms.is_empty() {
            return Control::Return(Value::Bool(false));
        }
        let first = forms.remove(0);
        if forms.is_empty() {
            Control::Eval(first, env)
        } else {
            stack.push(ContFrame::Or { remaining: forms, env: env.clone() });
            Control::Eval(first, env)
        }
    }

    /// `(call/cc proc)`: evaluates `proc`, then reifies the
    /// stack at the point of application (what happens after `call/cc`
    /// would ordinarily return) as a first-class continuation and applies
    /// `proc` to it in tail position.
    fn step_call_cc(&mut self, args: Vec<Value>, env: EnvRef, stack: &mut Vec<ContFrame>) -> RunResult<Control> {
        let [proc_expr] = take_exact(args, "call/cc")?;
        stack.push(ContFrame::CallCc);
        Ok(Control::Eval(proc_expr, env))
    }

    fn step_alias(&mut self, args: Vec<Value>, env: EnvRef) -> RunResult<Control> {
        let [new_name_expr, target_expr] = take_exact(args, "alias")?;
        let Value::Symbol(new_name) = new_name_expr else {
            return Err(SchemeError::bad_special_form("alias requires a name to bind", "alias"));
        };
        let Value::Symbol(target_name) = target_expr else {
            return Err(SchemeError::bad_special_form("alias requires a name to alias", "alias"));
        };
        let target_env = Env::find_env(&env, Namespace::Var, target_name).ok_or_else(|| SchemeError::unbound_var(self.resolve(target_name)))?;
        Env::alias(&env, new_name, &target_env, target_name)?;
        Ok(Control::Return(Value::Unspecified))
    }

    fn step_define_macro(&mut self, args: Vec<Value>, env: EnvRef) -> RunResult<Control> {
        let mut args_iter = args.into_iter();
        let name_expr = args_iter.next().ok_or_else(|| SchemeError::bad_special_form("define-macro requires a name", "define-macro"))?;
        let Value::Symbol(name) = name_expr else {
            return Err(SchemeError::bad_special_form("define-macro requires a name", "define-macro"));
        };
        let transformer_expr =
            args_iter.next().ok_or_else(|| SchemeError::bad_special_form("define-macro requires a transformer", "define-macro"))?;
        let transformer = self.eval_sync(transformer_expr, env.clone())?;
        Env::define(&env, Namespace::Macro, name, transformer);
        Ok(Control::Return(Value::Unspecified))
    }

    fn step_apply(&mut self, callee: Value, args: Vec<Value>, stack: &mut Vec<ContFrame>) -> RunResult<Control> {
        if let Value::Continuation(k) = &callee {
            let [value] = take_exact(args, "continuation")?;
            tracing::debug!(depth = k.stack.len(), "invoked continuation");
            *stack = k.stack.clone();
            return Ok(Control::Return(value));
        }
        let args = args.into_iter().map(|v| v.deref_deep()).collect::<Vec<_>>();
        match apply::apply(&callee, args, self.heap.tracker_mut())? {
            apply::Applied::Value(value) => Ok(Control::Return(value)),
            apply::Applied::TailEval { body, env } => Ok(self.step_seq(body, env, stack)),
        }
    }

    fn resume(&mut self, frame: ContFrame, value: Value, stack: &mut Vec<ContFrame>) -> RunResult<Control> {
        match frame {
            ContFrame::Seq { mut queue, tail, env } => {
                if queue.is_empty() {
                    Ok(Control::Eval(tail, env))
                } else {
                    let next = queue.remove(0);
                    stack.push(ContFrame::Seq { queue, tail, env: env.clone() });
                    Ok(Control::Eval(next, env))
                }
            }
            ContFrame::If { then_branch, else_branch, env } => {
                Ok(Control::Eval(if value.is_truthy() { then_branch } else { else_branch }, env))
            }
            ContFrame::EvalOperator { mut arg_exprs, env } => {
                if arg_exprs.is_empty() {
                    Ok(Control::Apply(value, Vec::new()))
                } else {
                    let first = arg_exprs.remove(0);
                    stack.push(ContFrame::EvalOperands { callee: value, evaluated: Vec::new(), remaining: arg_exprs, env: env.clone() });
                    Ok(Control::Eval(first, env))
                }
            }
            ContFrame::EvalOperands { callee, mut evaluated, mut remaining, env } => {
                evaluated.push(value);
                if remaining.is_empty() {
                    Ok(Control::Apply(callee, evaluated))
                } else {
                    let next = remaining.remove(0);
                    stack.push(ContFrame::EvalOperands { callee, evaluated, remaining, env: env.clone() });
                    Ok(Control::Eval(next, env))
                }
            }
            ContFrame::Define { ns, name, env } => {
                Env::define(&env, ns, name, value.deref_deep());
                Ok(Control::Return(Value::Unspecified))
            }
            ContFrame::SetBang { ns, name, env } => {
                Env::set(&env, ns, name, value.deref_deep()).map_err(|_| self.unbound_var_error(name))?;
                Ok(Control::Return(Value::Unspecified))
            }
            ContFrame::And { mut remaining, env } => {
                if value.is_false() {
                    return Ok(Control::Return(Value::Bool(false)));
                }
                if remaining.is_empty() {
                    Ok(Control::Return(value))
                } else {
                    let next = remaining.remove(0);
                    stack.push(ContFrame::And { remaining, env: env.clone() });
                    Ok(Control::Eval(next, env))
                }
            }
            ContFrame::Or { mut remaining, env } => {
                if value.is_truthy() {
                    return Ok(Control::Return(value));
                }
                if remaining.is_empty() {
                    Ok(Control::Return(value))
                } else {
                    let next = remaining.remove(0);
                    stack.push(ContFrame::Or { remaining, env: env.clone() });
                    Ok(Control::Eval(next, env))
                }
            }
            ContFrame::CallCc => {
                tracing::debug!(depth = stack.len(), "captured continuation");
                let k = Value::Continuation(Rc::new(Continuation { stack: stack.clone() }));
                Ok(Control::Apply(value, vec![k]))
            }
        }
    }

    fn unbound_var_error(&self, sym: Symbol) -> SchemeError {
        SchemeError::unbound_var(self.resolve(sym))
    }
}

fn parse_param_names(items: &[Value]) -> RunResult<Vec<Symbol>> {
    items
        .iter()
        .map(|item| match item {
            Value::Symbol(sym) => Ok(*sym),
            other => Err(SchemeError::type_mismatch("parameter name", other.type_name())),
        })
        .collect()
}

fn take_exact<const N: usize>(args: Vec<Value>, form: &str) -> RunResult<[Value; N]> {
    let len = args.len();
    args.try_into().map_err(|_| SchemeError::bad_special_form(format!("expected {N} operand(s), got {len}"), form))
}
