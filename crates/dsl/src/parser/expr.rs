//! Expression parser
//!
//! Precedence, loosest first: assignment (`=`, `:=`, right associative),
//! `||`, `&&`, comparisons, `+ -`, `* /`, prefix `- !`, `^` (right
//! associative), atoms.

use chumsky::prelude::*;

use crate::ast::{BinaryOp, Expr, UnaryOp};

use super::primitives::{ident, number, string_lit, ws};
use super::SyntaxError;

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Expression parser
pub fn expr<'src>() -> impl Parser<'src, &'src str, Expr, extra::Err<SyntaxError<'src>>> + Clone {
    recursive(|expr| {
        let args = expr
            .clone()
            .separated_by(just(',').padded_by(ws()))
            .allow_trailing()
            .collect::<Vec<_>>()
            .padded_by(ws());

        let call_or_symbol = ident()
            .then(args.clone().delimited_by(just('['), just(']')).or_not())
            .map(|(name, args)| match args {
                Some(args) => Expr::Call { head: name, args },
                None => Expr::Symbol(name),
            });

        let atom = choice((
            number().map(Expr::Number),
            string_lit().map(Expr::String),
            args.delimited_by(just('{'), just('}')).map(Expr::List),
            expr.clone()
                .padded_by(ws())
                .delimited_by(just('('), just(')')),
            call_or_symbol,
        ))
        .padded_by(ws());

        let unary = recursive(|unary| {
            let power = atom
                .clone()
                .then(just('^').padded_by(ws()).ignore_then(unary).or_not())
                .map(|(base, exponent)| match exponent {
                    Some(exponent) => binary(BinaryOp::Pow, base, exponent),
                    None => base,
                });

            choice((just('-').to(UnaryOp::Neg), just('!').to(UnaryOp::Not)))
                .padded_by(ws())
                .repeated()
                .foldr(power, |op, operand| Expr::Unary {
                    op,
                    operand: Box::new(operand),
                })
        });

        let product = unary.clone().foldl(
            choice((just('*').to(BinaryOp::Mul), just('/').to(BinaryOp::Div)))
                .padded_by(ws())
                .then(unary.clone())
                .repeated(),
            |left, (op, right)| binary(op, left, right),
        );

        let sum = product.clone().foldl(
            choice((just('+').to(BinaryOp::Add), just('-').to(BinaryOp::Sub)))
                .padded_by(ws())
                .then(product.clone())
                .repeated(),
            |left, (op, right)| binary(op, left, right),
        );

        let comparison = sum.clone().foldl(
            choice((
                just("==").to(BinaryOp::Eq),
                just("!=").to(BinaryOp::Ne),
                just("<=").to(BinaryOp::Le),
                just(">=").to(BinaryOp::Ge),
                just('<').to(BinaryOp::Lt),
                just('>').to(BinaryOp::Gt),
            ))
            .padded_by(ws())
            .then(sum.clone())
            .repeated(),
            |left, (op, right)| binary(op, left, right),
        );

        let conjunction = comparison.clone().foldl(
            just("&&")
                .to(BinaryOp::And)
                .padded_by(ws())
                .then(comparison.clone())
                .repeated(),
            |left, (op, right)| binary(op, left, right),
        );

        let disjunction = conjunction.clone().foldl(
            just("||")
                .to(BinaryOp::Or)
                .padded_by(ws())
                .then(conjunction.clone())
                .repeated(),
            |left, (op, right)| binary(op, left, right),
        );

        // `x == 1` first tries assignment, fails on the second '=' and backtracks
        let assignment = ident()
            .padded_by(ws())
            .then(choice((just(":=").to(true), just('=').to(false))))
            .then(expr.clone())
            .map(|((name, delayed), value)| Expr::Assign {
                name,
                value: Box::new(value),
                delayed,
            });

        choice((assignment, disjunction))
    })
}
