/*
Copyright 2021 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The filter grammar's parser.
//!
//! Grounded in `examples/original_source/src/parser.h`, which builds the
//! same grammar out of `boost::spirit::x3` rule combinators. `nom`
//! combinators are the idiomatic Rust equivalent (see
//! `other_examples/.../boilmaster-src-http-api1-query.rs` for the same
//! `all_consuming`/`escaped_transform`/`separated_list1` idiom applied to a
//! comparable small query-string grammar) — small composable parser
//! functions, no grammar-wide allocation beyond the final `Vec<Expr>`.
//!
//! ```text
//! exprs  := expr ( ',' expr )*
//! expr   := ( path | glob ) op? rhs?
//! path   := alpha+ ( '.' alpha+ )*
//! glob   := '*'
//! op     := '<' | '==' | '>' | 'in' | 'fzf'
//! rhs    := number | single_quoted_string
//! ```
//!
//! `op` and `rhs` always co-occur: a lone `op` with no following `rhs`
//! fails the whole parse, and a lone `rhs` with no preceding `op` is never
//! attempted in the first place.

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag};
use nom::character::complete::{alpha1, char, multispace0};
use nom::combinator::{all_consuming, map, opt, value};
use nom::multi::separated_list1;
use nom::number::complete::double;
use nom::sequence::preceded;
use nom::IResult;

use crate::expr::{Expr, Op};
use crate::path::Path;
use crate::value::Value;

fn glob(input: &str) -> IResult<&str, Path> {
    map(char('*'), |_| Path::wildcard())(input)
}

fn path(input: &str) -> IResult<&str, Path> {
    map(separated_list1(char('.'), alpha1), |segs: Vec<&str>| {
        Path::new(segs.into_iter().map(str::to_string).collect())
    })(input)
}

fn path_or_glob(input: &str) -> IResult<&str, Path> {
    alt((glob, path))(input)
}

fn op(input: &str) -> IResult<&str, Op> {
    // "==" must be tried before the single-char operators would otherwise
    // be unambiguous anyway, but ordering them longest-first keeps the
    // intent obvious.
    alt((
        value(Op::Eq, tag("==")),
        value(Op::Lt, tag("<")),
        value(Op::Gt, tag(">")),
        value(Op::In, tag("in")),
        value(Op::Fzf, tag("fzf")),
    ))(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    let body = opt(escaped_transform(
        is_not("\\'"),
        '\\',
        alt((value("'", char('\'')), value("\\", char('\\')))),
    ));
    nom::sequence::delimited(
        char('\''),
        map(body, |s: Option<String>| s.unwrap_or_default()),
        char('\''),
    )(input)
}

fn rhs(input: &str) -> IResult<&str, Value> {
    alt((
        map(double, Value::Number),
        map(quoted_string, Value::String),
    ))(input)
}

fn expr(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    let (input, path) = path_or_glob(input)?;
    let (input, _) = multispace0(input)?;
    let (input, maybe_op) = opt(op)(input)?;
    match maybe_op {
        Some(op) => {
            let (input, _) = multispace0(input)?;
            let (input, rhs) = rhs(input)?;
            Ok((input, Expr::comparison(path, op, rhs)))
        }
        None => Ok((input, Expr::presence(path))),
    }
}

fn comma(input: &str) -> IResult<&str, char> {
    preceded(multispace0, char(','))(input)
}

/// Parse a single filter atom. The entire input (modulo surrounding
/// whitespace) must be consumed or the parse fails.
pub fn parse_expr(input: &str) -> Option<Expr> {
    let mut parser = all_consuming(nom::sequence::delimited(multispace0, expr, multispace0));
    parser(input).ok().map(|(_, e)| e)
}

/// Parse a comma-separated list of filter atoms. Invoked on every
/// keystroke by the UI, so this is allocation-light (the only allocation
/// is the returned `Vec<Expr>` and any owned strings/segments within it)
/// and linear in input length.
pub fn parse_exprs(input: &str) -> Option<Vec<Expr>> {
    let mut parser = all_consuming(nom::sequence::delimited(
        multispace0,
        separated_list1(comma, expr),
        multispace0,
    ));
    parser(input).ok().map(|(_, exprs)| exprs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_path() {
        let e = parse_expr("msg").unwrap();
        assert_eq!(e.path, Path::new(vec!["msg".into()]));
        assert_eq!(e.op(), None);
    }

    #[test]
    fn parses_dotted_path() {
        let e = parse_expr("foo.bar").unwrap();
        assert_eq!(e.path, Path::new(vec!["foo".into(), "bar".into()]));
    }

    #[test]
    fn parses_string_comparison() {
        let e = parse_expr("foo.bar == 'hi'").unwrap();
        assert_eq!(e.op(), Some(Op::Eq));
        assert_eq!(e.rhs(), Some(&Value::String("hi".into())));
    }

    #[test]
    fn parses_numeric_comparisons() {
        for (src, op) in [("foo.bar == 1", Op::Eq), ("foo.bar < 1", Op::Lt), ("foo.bar > 1", Op::Gt)] {
            let e = parse_expr(src).unwrap();
            assert_eq!(e.op(), Some(op));
            assert_eq!(e.rhs(), Some(&Value::Number(1.0)));
        }
    }

    #[test]
    fn glob_parses_to_wildcard() {
        let e = parse_expr("*").unwrap();
        assert!(e.path.is_wildcard());
        assert_eq!(e.op(), None);
    }

    #[test]
    fn rejects_lone_op_without_rhs() {
        assert!(parse_expr("foo.bar > >").is_none());
        assert!(parse_expr("foo.bar >").is_none());
    }

    #[test]
    fn rejects_unconsumed_trailing_input() {
        assert!(parse_expr("foo.bar 1").is_none());
    }

    #[test]
    fn rejects_trailing_comma() {
        assert!(parse_exprs("msg,").is_none());
    }

    #[test]
    fn parses_expr_list() {
        let exprs = parse_exprs("msg, x == 2").unwrap();
        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[0].path, Path::new(vec!["msg".into()]));
        assert_eq!(exprs[1].op(), Some(Op::Eq));
        assert_eq!(exprs[1].rhs(), Some(&Value::Number(2.0)));
    }

    #[test]
    fn tolerates_whitespace_between_tokens() {
        let exprs = parse_exprs("  msg  ,  x  ==  2  ").unwrap();
        assert_eq!(exprs.len(), 2);
    }

    #[test]
    fn escaped_quotes_in_string_rhs() {
        let e = parse_expr(r"msg == 'it\'s \\ok'").unwrap();
        assert_eq!(e.rhs(), Some(&Value::String("it's \\ok".into())));
    }

    #[test]
    fn round_trip_preserves_meaning() {
        for src in ["msg", "foo.bar == 1", "foo.bar < 1", "*", "a.b.c > 3.5"] {
            let first = parse_expr(src).unwrap();
            let reprinted = first.to_dotted_string();
            let second = parse_expr(&reprinted).unwrap();
            assert_eq!(first, second);
        }
    }
}
