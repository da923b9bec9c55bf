//! Built-in function registry.
//!
//! Every callable head is described by a [`BuiltinDescriptor`] in a static
//! table. Numeric built-ins carry their implementation directly and receive
//! already-evaluated numeric arguments. Special forms control evaluation of
//! their own arguments and are dispatched by the evaluator.
//!
//! # Example Lookup
//!
//! ```
//! use simctl_dsl::builtins::{get, Implementation};
//!
//! let sqrt = get("Sqrt").unwrap();
//! assert_eq!(sqrt.signature, "Sqrt[x]");
//! if let Implementation::Numeric(f) = sqrt.implementation {
//!     assert_eq!(f(&[9.0]), 3.0);
//! }
//! ```

use std::fmt;

/// Signature for numeric built-ins
pub type NumericFn = fn(&[f64]) -> f64;

/// How a built-in is evaluated
#[derive(Clone, Copy)]
pub enum Implementation {
    /// Arguments are evaluated to numbers before the call
    Numeric(NumericFn),
    /// Evaluator handles the form and its unevaluated arguments
    Special,
}

/// Accepted argument count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments
    Fixed(usize),
    /// Inclusive range of argument counts
    Between(usize, usize),
    /// Any number of arguments
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Fixed(n) => count == n,
            Arity::Between(min, max) => (min..=max).contains(&count),
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Between(min, max) => write!(f, "{} to {}", min, max),
            Arity::Variadic => write!(f, "any number"),
        }
    }
}

/// Descriptor for a built-in function
pub struct BuiltinDescriptor {
    /// Head name as written in source (e.g. "Sqrt", "Print")
    pub name: &'static str,
    /// Signature string shown in arity diagnostics
    pub signature: &'static str,
    pub arity: Arity,
    pub implementation: Implementation,
}

fn sqrt(a: &[f64]) -> f64 {
    a[0].sqrt()
}

fn sin(a: &[f64]) -> f64 {
    a[0].sin()
}

fn cos(a: &[f64]) -> f64 {
    a[0].cos()
}

fn tan(a: &[f64]) -> f64 {
    a[0].tan()
}

fn exp(a: &[f64]) -> f64 {
    a[0].exp()
}

fn log(a: &[f64]) -> f64 {
    a[0].ln()
}

fn abs(a: &[f64]) -> f64 {
    a[0].abs()
}

fn floor(a: &[f64]) -> f64 {
    a[0].floor()
}

fn ceiling(a: &[f64]) -> f64 {
    a[0].ceil()
}

fn round(a: &[f64]) -> f64 {
    a[0].round()
}

fn power(a: &[f64]) -> f64 {
    a[0].powf(a[1])
}

fn modulo(a: &[f64]) -> f64 {
    a[0].rem_euclid(a[1])
}

fn min(a: &[f64]) -> f64 {
    a.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(a: &[f64]) -> f64 {
    a.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

macro_rules! numeric {
    ($name:literal, $sig:literal, $arity:expr, $f:path) => {
        BuiltinDescriptor {
            name: $name,
            signature: $sig,
            arity: $arity,
            implementation: Implementation::Numeric($f),
        }
    };
}

macro_rules! special {
    ($name:literal, $sig:literal, $arity:expr) => {
        BuiltinDescriptor {
            name: $name,
            signature: $sig,
            arity: $arity,
            implementation: Implementation::Special,
        }
    };
}

/// All built-ins, in lookup order
pub static BUILTINS: &[BuiltinDescriptor] = &[
    numeric!("Sqrt", "Sqrt[x]", Arity::Fixed(1), sqrt),
    numeric!("Sin", "Sin[x]", Arity::Fixed(1), sin),
    numeric!("Cos", "Cos[x]", Arity::Fixed(1), cos),
    numeric!("Tan", "Tan[x]", Arity::Fixed(1), tan),
    numeric!("Exp", "Exp[x]", Arity::Fixed(1), exp),
    numeric!("Log", "Log[x]", Arity::Fixed(1), log),
    numeric!("Abs", "Abs[x]", Arity::Fixed(1), abs),
    numeric!("Floor", "Floor[x]", Arity::Fixed(1), floor),
    numeric!("Ceiling", "Ceiling[x]", Arity::Fixed(1), ceiling),
    numeric!("Round", "Round[x]", Arity::Fixed(1), round),
    numeric!("Power", "Power[x, y]", Arity::Fixed(2), power),
    numeric!("Mod", "Mod[x, m]", Arity::Fixed(2), modulo),
    numeric!("Min", "Min[x, ...]", Arity::Variadic, min),
    numeric!("Max", "Max[x, ...]", Arity::Variadic, max),
    special!("Print", "Print[expr, ...]", Arity::Variadic),
    special!("If", "If[cond, then, else]", Arity::Between(2, 3)),
    special!("Do", "Do[body, n] | Do[body, {i, n}]", Arity::Fixed(2)),
    special!("List", "List[expr, ...]", Arity::Variadic),
    special!("Length", "Length[expr]", Arity::Fixed(1)),
    special!("Clear", "Clear[symbol, ...]", Arity::Variadic),
    special!("Abort", "Abort[reason]", Arity::Between(0, 1)),
    special!("Exit", "Exit[reason]", Arity::Between(0, 1)),
];

/// Look up a built-in by head name.
pub fn get(name: &str) -> Option<&'static BuiltinDescriptor> {
    BUILTINS.iter().find(|b| b.name == name)
}
