use crate::parser::error::{INVALID_NUMBER, ParseError, ParseErrorKind, convert_pest_error};
use crate::syntax::{CompareOp, Literal, Span, Syntax, SyntaxKind, UnaryOp};
use crate::values::Logical;
use crate::{Box, String, ToString, Vec};
use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::prefix(Rule::not))                       // `!`
        .op(
            Op::infix(Rule::eq, Assoc::Left) |
            Op::infix(Rule::neq, Assoc::Left) |
            Op::infix(Rule::lt, Assoc::Left) |
            Op::infix(Rule::le, Assoc::Left) |
            Op::infix(Rule::gt, Assoc::Left) |
            Op::infix(Rule::ge, Assoc::Left)
        )                                               // `==`, `!=`, `<`, ...
        .op(Op::prefix(Rule::neg))                       // `-`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/expression.pest"]
pub struct ExpressionParser;

type PestResult<T> = Result<T, pest::error::Error<Rule>>;

/// Parses a whole program into a [`SyntaxKind::Block`] of its statements.
pub fn parse(source: &str) -> Result<Syntax, ParseError> {
    let mut pairs = ExpressionParser::parse(Rule::main, source).map_err(convert_pest_error)?;
    let whole = Span::new(0, source.len());
    let main = pairs.next().ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::Other {
                message: "empty parse result".to_string(),
            },
            whole.clone(),
        )
    })?;
    let statements = expect(main.clone().into_inner().next(), &main).map_err(convert_pest_error)?;
    let body = parse_statements(statements).map_err(convert_pest_error)?;
    Ok(Syntax::new(SyntaxKind::Block(body), whole))
}

fn custom_error(message: String, pair: &Pair<Rule>) -> pest::error::Error<Rule> {
    pest::error::Error::new_from_span(
        pest::error::ErrorVariant::CustomError { message },
        pair.as_span(),
    )
}

fn expect<'i>(next: Option<Pair<'i, Rule>>, parent: &Pair<'i, Rule>) -> PestResult<Pair<'i, Rule>> {
    next.ok_or_else(|| custom_error("missing expected pair in rule".to_string(), parent))
}

fn parse_statements(pair: Pair<Rule>) -> PestResult<Vec<Syntax>> {
    pair.into_inner().map(parse_statement).collect()
}

fn parse_statement(pair: Pair<Rule>) -> PestResult<Syntax> {
    match pair.as_rule() {
        Rule::assignment => {
            let span = Span::from(pair.as_span());
            let mut inner = pair.clone().into_inner();
            let name = expect(inner.next(), &pair)?;
            let value = parse_statement(expect(inner.next(), &pair)?)?;
            Ok(Syntax::new(
                SyntaxKind::Assign {
                    name: name.as_str().into(),
                    value: Box::new(value),
                },
                span,
            ))
        }
        Rule::expression => parse_expression(pair.into_inner()),
        _ => parse_primary(pair),
    }
}

fn parse_expression(pairs: Pairs<Rule>) -> PestResult<Syntax> {
    PRATT_PARSER
        .map_primary(parse_primary)
        .map_prefix(|op, rhs| {
            let rhs = rhs?;
            let unary = match op.as_rule() {
                Rule::not => UnaryOp::Not,
                Rule::neg => UnaryOp::Neg,
                rule => return Err(custom_error(format_rule("prefix operator", rule), &op)),
            };
            let span = Span::new(op.as_span().start(), rhs.span.0.end);
            Ok(Syntax::new(
                SyntaxKind::Unary {
                    op: unary,
                    operand: Box::new(rhs),
                },
                span,
            ))
        })
        .map_infix(|lhs, op, rhs| {
            let (lhs, rhs) = (lhs?, rhs?);
            let compare = match op.as_rule() {
                Rule::eq => CompareOp::Eq,
                Rule::neq => CompareOp::Neq,
                Rule::lt => CompareOp::Lt,
                Rule::le => CompareOp::Le,
                Rule::gt => CompareOp::Gt,
                Rule::ge => CompareOp::Ge,
                rule => return Err(custom_error(format_rule("infix operator", rule), &op)),
            };
            let span = Span::combine(&lhs.span, &rhs.span);
            Ok(Syntax::new(
                SyntaxKind::Compare {
                    op: compare,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                span,
            ))
        })
        .parse(pairs)
}

fn format_rule(what: &str, rule: Rule) -> String {
    crate::format!("unknown {}: {:?}", what, rule)
}

fn parse_primary(pair: Pair<Rule>) -> PestResult<Syntax> {
    let span = Span::from(pair.as_span());
    let kind = match pair.as_rule() {
        Rule::expression => return parse_expression(pair.into_inner()),
        Rule::assignment => return parse_statement(pair),

        Rule::if_expr => {
            let mut inner = pair.clone().into_inner();
            let cond = parse_expression(expect(inner.next(), &pair)?.into_inner())?;
            let then_branch = parse_statement(expect(inner.next(), &pair)?)?;
            let else_branch = match inner.next() {
                Some(clause) => {
                    let statement = clause
                        .clone()
                        .into_inner()
                        .find(|p| p.as_rule() != Rule::else_kw);
                    Some(Box::new(parse_statement(expect(statement, &clause)?)?))
                }
                None => None,
            };
            SyntaxKind::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch,
            }
        }

        Rule::block => {
            let statements = expect(pair.clone().into_inner().next(), &pair)?;
            SyntaxKind::Block(parse_statements(statements)?)
        }

        Rule::call => {
            let mut inner = pair.clone().into_inner();
            let callee = expect(inner.next(), &pair)?.as_str().into();
            let args = inner
                .map(|arg| parse_expression(arg.into_inner()))
                .collect::<PestResult<Vec<_>>>()?;
            SyntaxKind::Call { callee, args }
        }

        Rule::ident => SyntaxKind::Ident(pair.as_str().into()),
        Rule::null => SyntaxKind::Literal(Literal::Null),
        Rule::na => SyntaxKind::Literal(Literal::Logical(Logical::Na)),
        Rule::boolean => SyntaxKind::Literal(Literal::Logical(Logical::from(
            pair.as_str() == "TRUE",
        ))),
        Rule::integer => {
            let text = pair.as_str();
            let digits = text.trim_end_matches('L');
            match digits.parse::<i32>() {
                Ok(value) => SyntaxKind::Literal(Literal::Int(value)),
                Err(_) => return Err(custom_error(crate::format!("{}{}", INVALID_NUMBER, text), &pair)),
            }
        }
        Rule::double => match pair.as_str().parse::<f64>() {
            Ok(value) => SyntaxKind::Literal(Literal::Double(value)),
            Err(_) => {
                return Err(custom_error(
                    crate::format!("{}{}", INVALID_NUMBER, pair.as_str()),
                    &pair,
                ));
            }
        },

        rule => return Err(custom_error(format_rule("expression", rule), &pair)),
    };
    Ok(Syntax::new(kind, span))
}
