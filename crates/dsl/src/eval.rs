//! Tree-walking evaluator
//!
//! Evaluates an [`Expr`] against the [`Scope`] exposed by a [`Context`].
//! Failures surface as [`EvalError`]; each carries the [`Signal`] it
//! escalates as, so hosts can translate them without inspecting variants.
//!
//! [`Signal`]: simctl_foundation::Signal

use simctl_foundation::Signal;
use tracing::trace;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::builtins::{self, BuiltinDescriptor, Implementation};
use crate::error::EvalError;
use crate::scope::{Binding, Scope};
use crate::value::Value;

/// Default bound on nested evaluation, catches self-referential delayed bindings
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Symbols with fixed meaning that cannot be rebound
const PROTECTED: &[&str] = &["True", "False", "Null", "Pi", "E"];

/// Host environment for evaluation
pub trait Context {
    fn scope(&self) -> &Scope;
    fn scope_mut(&mut self) -> &mut Scope;
    /// Receives the text produced by `Print`.
    fn print(&mut self, text: &str);
}

/// Evaluate with the default recursion limit.
pub fn evaluate(expr: &Expr, ctx: &mut dyn Context) -> Result<Value, EvalError> {
    evaluate_with_limit(expr, ctx, DEFAULT_MAX_DEPTH)
}

pub fn evaluate_with_limit(
    expr: &Expr,
    ctx: &mut dyn Context,
    max_depth: usize,
) -> Result<Value, EvalError> {
    Evaluator {
        ctx,
        depth: 0,
        max_depth,
    }
    .eval(expr)
}

fn constant(name: &str) -> Option<Value> {
    match name {
        "True" => Some(Value::Bool(true)),
        "False" => Some(Value::Bool(false)),
        "Null" => Some(Value::Null),
        "Pi" => Some(Value::Number(std::f64::consts::PI)),
        "E" => Some(Value::Number(std::f64::consts::E)),
        _ => None,
    }
}

struct Evaluator<'a> {
    ctx: &'a mut dyn Context,
    depth: usize,
    max_depth: usize,
}

impl Evaluator<'_> {
    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        if self.depth >= self.max_depth {
            return Err(EvalError::RecursionLimit(self.max_depth));
        }
        self.depth += 1;
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Number(v) => Ok(Value::Number(*v)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Symbol(name) => self.lookup(name),
            Expr::List(items) => self.eval_all(items).map(Value::List),
            Expr::Call { head, args } => self.call(head, args),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                unary(*op, value)
            }
            Expr::Binary { op, left, right } => self.binary(*op, left, right),
            Expr::Assign {
                name,
                value,
                delayed,
            } => self.assign(name, value, *delayed),
            Expr::Compound(items) => {
                let mut last = Value::Null;
                for item in items {
                    last = self.eval(item)?;
                }
                Ok(last)
            }
        }
    }

    fn eval_all(&mut self, items: &[Expr]) -> Result<Vec<Value>, EvalError> {
        items.iter().map(|item| self.eval(item)).collect()
    }

    fn lookup(&mut self, name: &str) -> Result<Value, EvalError> {
        if let Some(value) = constant(name) {
            return Ok(value);
        }
        match self.ctx.scope().get(name) {
            Some(Binding::Value(value)) => Ok(value.clone()),
            Some(Binding::Delayed(expr)) => {
                let expr = expr.clone();
                self.eval(&expr)
            }
            None => Ok(Value::Symbol(name.to_string())),
        }
    }

    fn assign(&mut self, name: &str, value: &Expr, delayed: bool) -> Result<Value, EvalError> {
        if PROTECTED.contains(&name) {
            return Err(EvalError::Protected(name.to_string()));
        }
        if delayed {
            trace!(name, "delayed binding");
            self.ctx.scope_mut().set_delayed(name, value.clone());
            return Ok(Value::Null);
        }
        let value = self.eval(value)?;
        trace!(name, %value, "binding");
        self.ctx.scope_mut().set(name, value.clone());
        Ok(value)
    }

    fn binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value, EvalError> {
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let context = op.symbol();
            let lhs = self.eval(left)?;
            let lhs = lhs
                .as_bool()
                .ok_or_else(|| EvalError::type_mismatch(context, "Bool", &lhs))?;
            // Short-circuit
            if (op == BinaryOp::And && !lhs) || (op == BinaryOp::Or && lhs) {
                return Ok(Value::Bool(lhs));
            }
            let rhs = self.eval(right)?;
            return rhs
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| EvalError::type_mismatch(context, "Bool", &rhs));
        }

        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;
        arithmetic(op, lhs, rhs)
    }

    fn call(&mut self, head: &str, args: &[Expr]) -> Result<Value, EvalError> {
        let builtin =
            builtins::get(head).ok_or_else(|| EvalError::UnknownFunction(head.to_string()))?;
        if !builtin.arity.accepts(args.len()) {
            return Err(EvalError::Arity {
                function: head.to_string(),
                signature: builtin.signature,
                expected: builtin.arity,
                found: args.len(),
            });
        }

        match builtin.implementation {
            Implementation::Numeric(f) => {
                let mut numbers = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.eval(arg)?;
                    let n = value
                        .as_number()
                        .ok_or_else(|| EvalError::type_mismatch(head, "Number", &value))?;
                    numbers.push(n);
                }
                let result = f(&numbers);
                if result.is_nan() {
                    return Err(EvalError::Domain {
                        function: head.to_string(),
                    });
                }
                Ok(Value::Number(result))
            }
            Implementation::Special => self.special(builtin, args),
        }
    }

    fn special(
        &mut self,
        builtin: &BuiltinDescriptor,
        args: &[Expr],
    ) -> Result<Value, EvalError> {
        match builtin.name {
            "Print" => {
                let values = self.eval_all(args)?;
                let text: String = values.iter().map(|v| v.to_string()).collect();
                self.ctx.print(&text);
                Ok(values.into_iter().last().unwrap_or_default())
            }
            "If" => {
                let condition = self.eval(&args[0])?;
                match condition.as_bool() {
                    Some(true) => self.eval(&args[1]),
                    Some(false) => match args.get(2) {
                        Some(otherwise) => self.eval(otherwise),
                        None => Ok(Value::Null),
                    },
                    None => Err(EvalError::type_mismatch("If", "Bool", &condition)),
                }
            }
            "Do" => self.repeat(&args[0], &args[1]),
            "List" => self.eval_all(args).map(Value::List),
            "Length" => match self.eval(&args[0])? {
                Value::List(items) => Ok(Value::Number(items.len() as f64)),
                Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
                _ => Ok(Value::Number(0.0)),
            },
            "Clear" => {
                for arg in args {
                    match arg {
                        Expr::Symbol(name) => {
                            self.ctx.scope_mut().clear(name);
                        }
                        other => {
                            return Err(EvalError::Type {
                                context: "Clear".to_string(),
                                expected: "Symbol",
                                found: other.to_string(),
                            })
                        }
                    }
                }
                Ok(Value::Null)
            }
            "Abort" => self.raise(Signal::Abort, args),
            "Exit" => self.raise(Signal::Exit, args),
            other => Err(EvalError::UnknownFunction(other.to_string())),
        }
    }

    /// `Do[body, n]` or `Do[body, {i, n}]`, binding `i` to 1..=n
    fn repeat(&mut self, body: &Expr, spec: &Expr) -> Result<Value, EvalError> {
        let (counter, bound) = match spec {
            Expr::List(items) if items.len() == 2 => match &items[0] {
                Expr::Symbol(name) => (Some(name.clone()), &items[1]),
                other => {
                    return Err(EvalError::Type {
                        context: "Do".to_string(),
                        expected: "Symbol",
                        found: other.to_string(),
                    })
                }
            },
            other => (None, other),
        };

        let bound = self.eval(bound)?;
        let count = bound
            .as_count()
            .ok_or_else(|| EvalError::type_mismatch("Do", "non-negative integer", &bound))?;

        for i in 1..=count {
            if let Some(name) = &counter {
                self.ctx.scope_mut().set(name.clone(), Value::Number(i as f64));
            }
            self.eval(body)?;
        }
        Ok(Value::Null)
    }

    fn raise(&mut self, signal: Signal, args: &[Expr]) -> Result<Value, EvalError> {
        let reason = match args.first() {
            Some(arg) => Some(self.eval(arg)?.to_string()),
            None => None,
        };
        Err(EvalError::Raised { signal, reason })
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match (op, &value) {
        (UnaryOp::Neg, Value::Number(v)) => Ok(Value::Number(-v)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, _) => Err(EvalError::type_mismatch("-", "Number", &value)),
        (UnaryOp::Not, _) => Err(EvalError::type_mismatch("!", "Bool", &value)),
    }
}

fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => return Ok(Value::Bool(lhs != rhs)),
        _ => {}
    }

    if let (BinaryOp::Add, Value::String(a), Value::String(b)) = (op, &lhs, &rhs) {
        return Ok(Value::String(format!("{}{}", a, b)));
    }

    let context = op.symbol();
    let a = lhs
        .as_number()
        .ok_or_else(|| EvalError::type_mismatch(context, "Number", &lhs))?;
    let b = rhs
        .as_number()
        .ok_or_else(|| EvalError::type_mismatch(context, "Number", &rhs))?;

    let result = match op {
        BinaryOp::Add => Value::Number(a + b),
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Value::Number(a / b)
        }
        BinaryOp::Pow => {
            let power = a.powf(b);
            if power.is_nan() {
                return Err(EvalError::Domain {
                    function: context.to_string(),
                });
            }
            Value::Number(power)
        }
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::And | BinaryOp::Or => {
            unreachable!("handled above")
        }
    };
    Ok(result)
}
