// Desugaring of AST expressions into NIR
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

//! Desugar AST [`Expression`]s into canonical [`Expr`]s.
//!
//! | Source             | Canonical form                          |
//! |--------------------|-----------------------------------------|
//! | `a - b + c`        | `+(a, unary:-(b), c)`                   |
//! | `a / b * c`        | `*(a, inverse(b), c)`                   |
//! | `a et b et c`      | `boolean:et(a, b, c)`                   |
//! | `a et b ou c`      | `boolean:ou(boolean:et(a, b), c)`       |
//! | `a >= b`           | `operator:>=(a, b)`                     |
//! | `a dans (1..2, X)` | `dans(a, X, 1, 2)`                      |
//! | `a non dans (1)`   | `unary:non(dans(a, 1))`                 |
//! | `si c alors t finsi` | `si(c, t)`                            |
//! | `si c alors t sinon e finsi` | `ternary(c, t, e)`            |
//! | `somme(i = 1..2 : Vi)` | `+(V1, V2)`                         |
//! | `f(i = 1..2 : Vi)` | `f(V1, V2)`                             |
//!
//! A subtracted or negated numeric literal has its sign flipped rather
//!   than being wrapped in `unary:-`.
//!
//! The walk uses an explicit stack rather than native recursion,
//!   since expressions of real corpora nest deeply enough to exhaust the
//!   call stack.

use super::{
    unloop::{cartesian, flatten_domain, substitute},
    Expr, Op,
};
use crate::ast::{
    Argument, BoolOp, CmpOp, DomainPart, Expression, ProductOp, SumOp,
    UnaryOp,
};
use std::{error::Error, fmt::Display};

/// Name of the aggregation function whose loop arguments become a sum.
const SOMME: &str = "somme";

/// Work remaining for the desugaring of an expression.
///
/// Each `Visit` of a compound node schedules a build step followed by a
///   visit of each of its children;
///     the build step runs once all children have been desugared and
///     consumes their results from the output stack.
enum Task<'a> {
    Visit(&'a Expression, usize),
    Sum(&'a [SumOp], usize),
    Product(&'a [ProductOp], usize),
    Boolean(&'a [BoolOp], usize),
    Comparison(CmpOp),
    Dans(&'a [DomainPart], bool),
    Unary(UnaryOp),
    Ternary(bool),
    Call(&'a str, &'a [Argument]),
}

/// Desugar an AST expression into its canonical form.
pub fn desugar(expr: &Expression) -> Result<Expr, DesugarError> {
    let mut tasks = vec![Task::Visit(expr, 0)];
    let mut out: Vec<Expr> = Vec::new();

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(node, depth) => {
                visit(node, depth, &mut tasks, &mut out)
            }

            Task::Sum(ops, n) => {
                let args = take(&mut out, n)
                    .into_iter()
                    .enumerate()
                    .map(|(i, arg)| match i.checked_sub(1).map(|j| ops.get(j)) {
                        Some(Some(SumOp::Sub)) => negate(arg),
                        _ => arg,
                    })
                    .collect();

                out.push(Expr::Call(Op::Add, args));
            }

            Task::Product(ops, n) => {
                let args = take(&mut out, n)
                    .into_iter()
                    .enumerate()
                    .map(|(i, arg)| match i.checked_sub(1).map(|j| ops.get(j)) {
                        Some(Some(ProductOp::Div)) => {
                            Expr::Call(Op::Inverse, vec![arg])
                        }
                        _ => arg,
                    })
                    .collect();

                out.push(Expr::Call(Op::Mul, args));
            }

            Task::Boolean(ops, n) => {
                let args = take(&mut out, n);
                out.push(boolean(ops, args));
            }

            Task::Comparison(op) => {
                let args = take(&mut out, 2);
                out.push(Expr::Call(Op::Cmp(op), args));
            }

            Task::Dans(enumeration, negated) => {
                let mut args = take(&mut out, 1);
                let values = flatten_domain(enumeration);
                args.extend(values.into_iter().map(Expr::from_name));

                let dans = Expr::Call(Op::Dans, args);

                out.push(if negated {
                    Expr::Call(Op::Not, vec![dans])
                } else {
                    dans
                });
            }

            Task::Unary(UnaryOp::Minus) => {
                let arg = take(&mut out, 1);
                out.extend(arg.into_iter().map(negate));
            }

            Task::Unary(UnaryOp::Non) => {
                let args = take(&mut out, 1);
                out.push(Expr::Call(Op::Not, args));
            }

            Task::Ternary(has_else) => {
                let (op, n) = if has_else {
                    (Op::Ternary, 3)
                } else {
                    (Op::Si, 2)
                };

                let args = take(&mut out, n);
                out.push(Expr::Call(op, args));
            }

            Task::Call(name, arguments) => {
                let results = take(&mut out, arguments.len());
                out.push(call(name, arguments, results)?);
            }
        }
    }

    out.pop().ok_or(DesugarError::Empty)
}

/// Schedule the desugaring of `node`.
///
/// Children are pushed in reverse so that they are desugared,
///   and their results placed on the output stack,
///   in source order.
fn visit<'a>(
    node: &'a Expression,
    depth: usize,
    tasks: &mut Vec<Task<'a>>,
    out: &mut Vec<Expr>,
) {
    #[cfg(feature = "desugar-trace")]
    tracing::trace!(depth, ?node, "desugar");

    let child = depth + 1;

    match node {
        Expression::Symbol(name) => out.push(Expr::Symbol(name.clone())),
        Expression::Integer(i) => out.push(Expr::Literal(*i as f64)),
        Expression::Float(f) => out.push(Expr::Literal(*f)),

        Expression::Sum {
            operands,
            operators,
        } => {
            tasks.push(Task::Sum(operators, operands.len()));
            push_all(tasks, operands, child);
        }

        Expression::Product {
            operands,
            operators,
        } => {
            tasks.push(Task::Product(operators, operands.len()));
            push_all(tasks, operands, child);
        }

        Expression::Boolean {
            operands,
            operators,
        } => {
            tasks.push(Task::Boolean(operators, operands.len()));
            push_all(tasks, operands, child);
        }

        Expression::Comparison {
            left,
            operator,
            right,
        } => {
            tasks.push(Task::Comparison(*operator));
            tasks.push(Task::Visit(right, child));
            tasks.push(Task::Visit(left, child));
        }

        Expression::Dans {
            expression,
            enumeration,
            negated,
        } => {
            tasks.push(Task::Dans(enumeration, *negated));
            tasks.push(Task::Visit(expression, child));
        }

        Expression::Unary {
            operator,
            expression,
        } => {
            tasks.push(Task::Unary(*operator));
            tasks.push(Task::Visit(expression, child));
        }

        Expression::Ternary {
            condition,
            if_true,
            if_false,
        } => {
            tasks.push(Task::Ternary(if_false.is_some()));

            if let Some(if_false) = if_false {
                tasks.push(Task::Visit(if_false, child));
            }

            tasks.push(Task::Visit(if_true, child));
            tasks.push(Task::Visit(condition, child));
        }

        Expression::Call { name, arguments } => {
            tasks.push(Task::Call(name, arguments));

            for arg in arguments.iter().rev() {
                match arg {
                    Argument::Expression(expr) => {
                        tasks.push(Task::Visit(expr, child))
                    }
                    Argument::Loop(lexpr) => {
                        tasks.push(Task::Visit(&lexpr.expression, child))
                    }
                }
            }
        }
    }
}

fn push_all<'a>(
    tasks: &mut Vec<Task<'a>>,
    operands: &'a [Expression],
    depth: usize,
) {
    tasks.extend(operands.iter().rev().map(|op| Task::Visit(op, depth)));
}

/// Take the last `n` results from the output stack,
///   in the order in which they were produced.
fn take(out: &mut Vec<Expr>, n: usize) -> Vec<Expr> {
    out.split_off(out.len().saturating_sub(n))
}

/// Negate an expression,
///   flipping the sign of a literal.
fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Literal(value) => Expr::Literal(-value),
        _ => Expr::Call(Op::Neg, vec![expr]),
    }
}

/// Combine boolean operands.
///
/// If all operators are the same,
///   the result is a single flat call.
/// Otherwise `et` binds tighter than `ou`:
///   consecutive `et`-joined operands are grouped into a
///   `boolean:et` call,
///     and the groups are the operands of a single `boolean:ou` call.
fn boolean(ops: &[BoolOp], args: Vec<Expr>) -> Expr {
    match ops.first() {
        Some(first) if ops.iter().all(|op| op == first) => {
            let op = match first {
                BoolOp::Et => Op::And,
                BoolOp::Ou => Op::Or,
            };

            return Expr::Call(op, args);
        }
        None => return Expr::Call(Op::Or, args),
        _ => (),
    }

    let mut groups = Vec::new();
    let mut conj = Vec::new();

    fn flush(conj: &mut Vec<Expr>, groups: &mut Vec<Expr>) {
        match conj.len() {
            0 => (),
            1 => groups.extend(conj.drain(..)),
            _ => groups.push(Expr::Call(Op::And, std::mem::take(conj))),
        }
    }

    let mut args = args.into_iter();
    conj.extend(args.next());

    for (op, arg) in ops.iter().zip(args) {
        if *op == BoolOp::Ou {
            flush(&mut conj, &mut groups);
        }

        conj.push(arg);
    }

    flush(&mut conj, &mut groups);

    Expr::Call(Op::Or, groups)
}

/// Build a function call from its desugared arguments,
///   unrolling loop arguments.
///
/// Each loop argument is replaced by one clone of its expression per
///   tuple of loop values.
/// `somme` becomes a sum of all of its arguments;
///   any other function receives the clones in place of the loop
///   argument.
fn call(
    name: &str,
    arguments: &[Argument],
    results: Vec<Expr>,
) -> Result<Expr, DesugarError> {
    let mut args = Vec::with_capacity(results.len());

    for (arg, result) in arguments.iter().zip(results) {
        match arg {
            Argument::Expression(_) => args.push(result),
            Argument::Loop(lexpr) => args.extend(
                cartesian(&lexpr.loop_variables)
                    .iter()
                    .map(|bindings| substitute(&result, bindings)),
            ),
        }
    }

    if args.is_empty() {
        return Err(DesugarError::EmptyCall(name.to_string()));
    }

    let op = match name {
        SOMME => Op::Add,
        _ => Op::Function(name.to_string()),
    };

    Ok(Expr::Call(op, args))
}

/// An expression could not be desugared.
#[derive(Debug, PartialEq, Eq)]
pub enum DesugarError {
    /// A function call has no arguments after its loop arguments were
    ///   unrolled over empty domains.
    EmptyCall(String),

    /// Desugaring produced no expression.
    Empty,
}

impl Display for DesugarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCall(name) => write!(
                f,
                "call to `{name}` has no arguments after unrolling its loop"
            ),
            Self::Empty => write!(f, "expression desugared to nothing"),
        }
    }
}

impl Error for DesugarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod test;
