// Tests for desugaring of AST expressions
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of MLANG.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

use super::*;
use crate::{
    ast::{Declaration, RegleFormula},
    parse::parse_source,
    span::dummy::DUMMY_CONTEXT,
};

fn ast(src: &str) -> Expression {
    let text = format!("regle 1:\napplication: batch;\nX = {src};\n");
    let decls = parse_source(&text, DUMMY_CONTEXT)
        .unwrap_or_else(|e| panic!("failed to parse `{src}`: {e:?}"));

    match decls.into_iter().next() {
        Some(Declaration::Regle(mut regle)) => match regle.formulas.remove(0) {
            RegleFormula::Single(f) => f.expression,
            other => panic!("unexpected formula {other:?}"),
        },
        other => panic!("unexpected declaration {other:?}"),
    }
}

/// Desugar `src` and render the result.
fn canon(src: &str) -> String {
    desugar(&ast(src)).unwrap().to_string()
}

fn sym(name: &str) -> Expr {
    Expr::Symbol(name.into())
}

#[test]
fn atoms() {
    assert_eq!(desugar(&ast("A")), Ok(sym("A")));
    assert_eq!(desugar(&ast("3")), Ok(Expr::Literal(3.0)));
    assert_eq!(desugar(&ast("0.25")), Ok(Expr::Literal(0.25)));
}

#[test]
fn subtraction_is_negated_summand() {
    assert_eq!(
        desugar(&ast("a - b + c")),
        Ok(Expr::Call(
            Op::Add,
            vec![sym("a"), Expr::Call(Op::Neg, vec![sym("b")]), sym("c")],
        ))
    );
}

#[test]
fn subtracted_literal_flips_sign() {
    assert_eq!(canon("a - 2"), "+(a, -2)");
    assert_eq!(canon("a - -2"), "+(a, 2)");
}

#[test]
fn division_is_inverted_factor() {
    assert_eq!(
        desugar(&ast("a / b * c")),
        Ok(Expr::Call(
            Op::Mul,
            vec![sym("a"), Expr::Call(Op::Inverse, vec![sym("b")]), sym("c")],
        ))
    );
}

#[test]
fn unary_operators() {
    assert_eq!(canon("-a"), "unary:-(a)");
    assert_eq!(canon("-(a + 1)"), "unary:-(+(a, 1))");
    assert_eq!(canon("non a"), "unary:non(a)");
}

#[test]
fn ternaries() {
    assert_eq!(canon("si a alors b finsi"), "si(a, b)");
    assert_eq!(canon("si a alors b sinon c finsi"), "ternary(a, b, c)");
}

#[test]
fn comparisons() {
    assert_eq!(canon("a >= 1"), "operator:>=(a, 1)");
    assert_eq!(canon("a != b"), "operator:!=(a, b)");
}

#[test]
fn boolean_single_operator_is_flat() {
    assert_eq!(canon("a et b et c"), "boolean:et(a, b, c)");
    assert_eq!(canon("a ou b ou c"), "boolean:ou(a, b, c)");
}

#[test]
fn boolean_mixed_operators_group_et() {
    assert_eq!(canon("a et b ou c"), "boolean:ou(boolean:et(a, b), c)");
    assert_eq!(
        canon("a ou b et c et d ou e"),
        "boolean:ou(a, boolean:et(b, c, d), e)"
    );
    assert_eq!(
        canon("a et b ou c et d"),
        "boolean:ou(boolean:et(a, b), boolean:et(c, d))"
    );
}

#[test]
fn parenthesized_boolean_nests() {
    assert_eq!(
        canon("(a ou b) et c"),
        "boolean:et(boolean:ou(a, b), c)"
    );
}

#[test]
fn dans_expands_enumeration() {
    assert_eq!(canon("a dans (1..3, 7)"), "dans(a, 7, 1, 2, 3)");
    assert_eq!(canon("a dans (V, 2)"), "dans(a, V, 2)");
    assert_eq!(canon("a non dans (1, 2)"), "unary:non(dans(a, 1, 2))");

    // Enumeration symbols remain symbols.
    assert_eq!(
        desugar(&ast("a dans (V)")),
        Ok(Expr::Call(Op::Dans, vec![sym("a"), sym("V")]))
    );
}

#[test]
fn somme_over_loop_is_sum_of_clones() {
    assert_eq!(canon("somme(i = 1..3 : Vi)"), "+(V1, V2, V3)");

    match desugar(&ast("somme(i = 0..9 : Vi * 2)")) {
        Ok(Expr::Call(Op::Add, args)) => assert_eq!(args.len(), 10),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn somme_substitutes_inside_nested_calls() {
    assert_eq!(
        canon("somme(i = V, C : max(0, Ri - Pi))"),
        "+(max(0, +(RV, unary:-(PV))), max(0, +(RC, unary:-(PC))))"
    );
}

#[test]
fn loop_argument_of_other_function_expands_inline() {
    assert_eq!(canon("max(i = 1, 2 : Ai)"), "max(A1, A2)");
    assert_eq!(canon("min(0, i = 1..2 : Ai)"), "min(0, A1, A2)");
}

#[test]
fn loop_variable_alone_becomes_literal() {
    assert_eq!(
        desugar(&ast("somme(i = 1, 2 : i)")),
        Ok(Expr::Call(
            Op::Add,
            vec![Expr::Literal(1.0), Expr::Literal(2.0)]
        ))
    );
}

#[test]
fn ordinary_function_call() {
    assert_eq!(canon("arr(a * 2)"), "arr(*(a, 2))");
    assert_eq!(canon("present(a)"), "present(a)");
}

#[test]
fn empty_loop_is_an_error() {
    assert_eq!(
        desugar(&ast("somme(i = 3..1 : Vi)")),
        Err(DesugarError::EmptyCall("somme".into()))
    );
}

#[test]
fn deep_nesting_does_not_recurse() {
    // Construct the AST directly;
    //   the parser itself is recursive.
    let depth = 100_000;
    let mut expr = Expression::Symbol("A".into());

    for _ in 0..depth {
        expr = Expression::Unary {
            operator: UnaryOp::Non,
            expression: Box::new(expr),
        };
    }

    let mut result = desugar(&expr).unwrap();
    let mut seen = 0;

    // Dismantle iteratively to avoid recursive drops.
    loop {
        match result {
            Expr::Call(Op::Not, mut args) => {
                seen += 1;
                result = args.remove(0);
            }
            other => {
                assert_eq!(other, sym("A"));
                break;
            }
        }
    }

    assert_eq!(seen, depth);

    let mut expr = expr;
    while let Expression::Unary { expression, .. } = expr {
        expr = *expression;
    }
}
