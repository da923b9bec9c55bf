//! Primitive parser combinators

use chumsky::prelude::*;

use super::SyntaxError;

/// Whitespace and comments
pub fn ws<'src>() -> impl Parser<'src, &'src str, (), extra::Err<SyntaxError<'src>>> + Clone {
    let hash_comment = just("#")
        .then(any().and_is(just('\n').not()).repeated())
        .padded();
    let block_comment = just("(*")
        .then(any().and_is(just("*)").not()).repeated())
        .then(just("*)"))
        .padded();

    choice((
        hash_comment.ignored(),
        block_comment.ignored(),
        text::whitespace().at_least(1).ignored(),
    ))
    .repeated()
    .ignored()
}

/// Identifier
pub fn ident<'src>() -> impl Parser<'src, &'src str, String, extra::Err<SyntaxError<'src>>> + Clone
{
    text::ascii::ident().map(|s: &str| s.to_string())
}

/// String literal
pub fn string_lit<'src>(
) -> impl Parser<'src, &'src str, String, extra::Err<SyntaxError<'src>>> + Clone {
    let escape = just('\\').ignore_then(choice((
        just('n').to('\n'),
        just('t').to('\t'),
        any(),
    )));

    none_of("\"\\")
        .or(escape)
        .repeated()
        .collect::<String>()
        .delimited_by(just('"'), just('"'))
}

/// Unsigned number: 3, 2.5, 1e-3
pub fn number<'src>() -> impl Parser<'src, &'src str, f64, extra::Err<SyntaxError<'src>>> + Clone {
    text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .then(
            one_of("eE")
                .then(one_of("+-").or_not())
                .then(text::digits(10))
                .or_not(),
        )
        .to_slice()
        .try_map(|s: &str, span| {
            s.parse::<f64>()
                .map_err(|e| Rich::custom(span, format!("invalid number '{}': {}", s, e)))
        })
}
