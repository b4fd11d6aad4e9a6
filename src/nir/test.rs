// Tests for NIR
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

#[test]
fn numeric_names_are_literals() {
    assert_eq!(Expr::from_name("12".into()), Expr::Literal(12.0));
    assert_eq!(Expr::from_name("V12".into()), Expr::Symbol("V12".into()));
    assert_eq!(Expr::from_name("1E5".into()), Expr::Symbol("1E5".into()));
    assert_eq!(Expr::from_name("".into()), Expr::Symbol("".into()));
}

#[test]
fn display_nested_calls() {
    let expr = Expr::call(
        Op::Add,
        vec![
            Expr::Symbol("a".into()),
            Expr::call(Op::Neg, vec![Expr::Symbol("b".into())]),
            Expr::call(
                Op::Cmp(CmpOp::Le),
                vec![Expr::Literal(1.5), Expr::Literal(-2.0)],
            ),
            Expr::call(Op::Function("arr".into()), vec![Expr::Literal(0.0)]),
        ],
    );

    assert_eq!(
        expr.to_string(),
        "+(a, unary:-(b), operator:<=(1.5, -2), arr(0))"
    );
}

#[test]
fn display_operators() {
    let ops = [
        (Op::Mul, "*"),
        (Op::Inverse, "inverse"),
        (Op::Not, "unary:non"),
        (Op::And, "boolean:et"),
        (Op::Or, "boolean:ou"),
        (Op::Dans, "dans"),
        (Op::Si, "si"),
        (Op::Ternary, "ternary"),
    ];

    for (op, expected) in ops {
        assert_eq!(op.to_string(), expected);
    }
}

#[test]
fn comparison_operators_are_distinct_keys() {
    let ops: std::collections::HashSet<Op> = [
        Op::Cmp(CmpOp::Lt),
        Op::Cmp(CmpOp::Le),
        Op::Cmp(CmpOp::Lt),
        Op::Function("arr".into()),
    ]
    .into_iter()
    .collect();

    assert_eq!(ops.len(), 3);
    assert!(ops.contains(&Op::Cmp(CmpOp::Le)));
}
