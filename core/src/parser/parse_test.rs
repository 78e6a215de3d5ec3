use super::parser::parse;
use super::{ParseError, ParseErrorKind};
use crate::syntax::{CompareOp, Literal, Span, Syntax, SyntaxKind, UnaryOp};
use crate::values::Logical;
use crate::{String, format};
use pretty_assertions::assert_eq;

// Renders the tree as an s-expression without spans, so two sources that
// differ only in parenthesization can be compared.
fn sexpr(syntax: &Syntax) -> String {
    match &syntax.kind {
        SyntaxKind::Literal(Literal::Null) => "NULL".into(),
        SyntaxKind::Literal(Literal::Logical(l)) => format!("{}", l),
        SyntaxKind::Literal(Literal::Int(i)) => format!("{}L", i),
        SyntaxKind::Literal(Literal::Double(d)) => format!("{}", d),
        SyntaxKind::Ident(name) => name.to_string(),
        SyntaxKind::Unary { op, operand } => {
            let op = match op {
                UnaryOp::Neg => "-",
                UnaryOp::Not => "!",
            };
            format!("({} {})", op, sexpr(operand))
        }
        SyntaxKind::Compare { op, left, right } => {
            let op = match op {
                CompareOp::Eq => "==",
                CompareOp::Neq => "!=",
                CompareOp::Lt => "<",
                CompareOp::Le => "<=",
                CompareOp::Gt => ">",
                CompareOp::Ge => ">=",
            };
            format!("({} {} {})", op, sexpr(left), sexpr(right))
        }
        SyntaxKind::Call { callee, args } => {
            let mut out = format!("(call {}", callee);
            for arg in args {
                out.push(' ');
                out.push_str(&sexpr(arg));
            }
            out.push(')');
            out
        }
        SyntaxKind::Assign { name, value } => format!("(<- {} {})", name, sexpr(value)),
        SyntaxKind::If {
            cond,
            then_branch,
            else_branch,
        } => match else_branch {
            Some(otherwise) => format!(
                "(if {} {} {})",
                sexpr(cond),
                sexpr(then_branch),
                sexpr(otherwise)
            ),
            None => format!("(if {} {})", sexpr(cond), sexpr(then_branch)),
        },
        SyntaxKind::Block(items) => {
            let mut out = String::from("{");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                out.push_str(&sexpr(item));
            }
            out.push('}');
            out
        }
    }
}

fn program(source: &str) -> String {
    let parsed = parse(source)
        .unwrap_or_else(|e| panic!("Program parsing failed: {}\n{}", source, e));
    sexpr(&parsed)
}

fn error(source: &str) -> ParseError {
    match parse(source) {
        Ok(parsed) => panic!("expected a parse error for {:?}, got {}", source, sexpr(&parsed)),
        Err(e) => e,
    }
}

#[test]
fn test_literals() {
    assert_eq!(program("NULL"), "{NULL}");
    assert_eq!(program("NA"), "{NA}");
    assert_eq!(program("TRUE; FALSE"), "{TRUE; FALSE}");
    assert_eq!(program("3L"), "{3L}");
    assert_eq!(program("3"), "{3}");
    assert_eq!(program("2.5e1"), "{25}");
    assert_eq!(program(".5"), "{0.5}");
}

#[test]
fn test_keywords_are_not_identifiers() {
    assert_eq!(program("TRUEish"), "{TRUEish}");
    assert_eq!(program("NA_count"), "{NA_count}");
    assert_eq!(program("iffy(1)"), "{(call iffy 1)}");
    assert_eq!(program("is.na(x)"), "{(call is.na x)}");
}

#[test]
fn test_comparison_vs_unary() {
    assert_eq!(program("-x == 1"), program("(-x) == 1"));
    assert_eq!(program("!x == 1"), program("!(x == 1)"));
    assert_eq!(program("a < b == c"), program("(a < b) == c"));
}

#[test]
fn test_assignment_vs_less_than() {
    assert_eq!(program("x <- 1"), "{(<- x 1)}");
    assert_eq!(program("x < -1"), "{(< x (- 1))}");
    assert_eq!(program("x <- y <- 2L"), "{(<- x (<- y 2L))}");
}

#[test]
fn test_if_forms() {
    assert_eq!(program("if (x) 1"), "{(if x 1)}");
    assert_eq!(program("if (x) 1 else 2"), "{(if x 1 2)}");
    assert_eq!(
        program("if (x == 3) { y <- 1; y } else { 2 }"),
        "{(if (== x 3) {(<- y 1); y} {2})}"
    );
    assert_eq!(program("if (x) 1\nelse 2"), "{(if x 1 2)}");
    // `else` must stand on its own.
    assert_eq!(program("if (x) 1\nelsewhere"), "{(if x 1); elsewhere}");
}

#[test]
fn test_statement_separators_and_comments() {
    let source = "\n# leading comment\nx <- 1 # trailing\n\ny <- c(1L,\n  2L)\n;x\n";
    assert_eq!(program(source), "{(<- x 1); (<- y (call c 1L 2L)); x}");
    assert_eq!(program(""), "{}");
    assert_eq!(program("f()"), "{(call f)}");
}

#[test]
fn test_return_tail_shape() {
    let source = "if (x) {\n  y <- 1\n  return(y)\n}\nz";
    assert_eq!(
        program(source),
        "{(if x {(<- y 1); (call return y)}); z}"
    );
}

#[test]
fn test_spans_cover_source() {
    let source = "x <- a == 3";
    let parsed = parse(source).unwrap();
    assert_eq!(parsed.span, Span(0..source.len()));
    let SyntaxKind::Block(items) = &parsed.kind else {
        panic!("expected block");
    };
    let SyntaxKind::Assign { value, .. } = &items[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.span.str_of(source), "a == 3");
    let SyntaxKind::Compare { right, .. } = &value.kind else {
        panic!("expected comparison");
    };
    assert_eq!(right.kind, SyntaxKind::Literal(Literal::Double(3.0)));
    assert_eq!(right.span, Span(10..11));
}

#[test]
fn test_na_literal_is_logical() {
    let parsed = parse("NA").unwrap();
    let SyntaxKind::Block(items) = parsed.kind else {
        panic!("expected block");
    };
    assert_eq!(items[0].kind, SyntaxKind::Literal(Literal::Logical(Logical::Na)));
}

#[test]
fn test_errors() {
    let err = error("x <- ");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("P001"));

    let err = error("if x 1");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));

    let err = error("x <- 99999999999L");
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidNumber {
            text: "99999999999L".into()
        }
    );
    assert_eq!(err.span, Span(5..17));
}
