//! Parser for the simctl expression language
//!
//! Uses Chumsky for direct string parsing. A source is a `;`-separated list
//! of statements and always parses to an [`Expr::Compound`] root.

use std::path::Path;

use chumsky::prelude::*;
use tracing::debug;

use crate::ast::Expr;
use crate::error::ParseError;

mod expr;
mod primitives;

pub use expr::expr;
use primitives::ws;

/// Chumsky error type for this grammar
pub type SyntaxError<'src> = Rich<'src, char>;

fn program<'src>() -> impl Parser<'src, &'src str, Expr, extra::Err<SyntaxError<'src>>> {
    ws().ignore_then(
        expr()
            .separated_by(just(';').padded_by(ws()))
            .allow_trailing()
            .collect::<Vec<_>>(),
    )
    .then_ignore(ws())
    .then_ignore(end())
    .map(Expr::Compound)
}

/// Parse source text into a compound expression tree.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    parse_named(source, "<input>")
}

/// Parse a configuration file.
///
/// Unreadable files are reported as [`ParseError::Io`].
pub fn parse_file(path: &Path) -> Result<Expr, ParseError> {
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = parse_named(&source, &path.display().to_string())?;
    debug!(
        path = %path.display(),
        statements = tree.statements().len(),
        "configuration parsed"
    );
    Ok(tree)
}

fn parse_named(source: &str, origin: &str) -> Result<Expr, ParseError> {
    program()
        .parse(source)
        .into_result()
        .map_err(|errors| ParseError::Syntax {
            diagnostics: errors
                .iter()
                .map(|e| {
                    let (line, column) = line_column(source, e.span().start);
                    format!("{}:{}:{}: {}", origin, line, column, e)
                })
                .collect(),
        })
}

/// 1-based line and column of a byte offset
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let prefix = &source[..offset.min(source.len())];
    let line = prefix.matches('\n').count() + 1;
    let column = prefix
        .rfind('\n')
        .map_or(prefix.chars().count(), |nl| prefix[nl + 1..].chars().count())
        + 1;
    (line, column)
}
