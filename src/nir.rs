// Normalized IR
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

//! Normalized intermediate representation (NIR).
//!
//! NIR is the canonical form of M expressions after desugaring.
//! Where the [`ast`](crate::ast) has a node for every syntactic construct,
//!   NIR has only three:
//!
//!   - [`Expr::Symbol`], a reference to another name;
//!   - [`Expr::Literal`], a numeric constant; and
//!   - [`Expr::Call`], an [`Op`] applied to one or more arguments.
//!
//! Every operator of the source language is expressed as a [`Call`] of
//!   some [`Op`],
//!     and every loop has been unrolled into concrete expressions or
//!     formulas.
//!
//! Lowering proceeds in three steps:
//!
//!   1. [`desugar`] rewrites a single AST expression into NIR,
//!        unrolling loop arguments of function calls;
//!   2. [`unloop`] provides the domain flattening and name substitution
//!        used to unroll `pour` formulas and loop arguments; and
//!   3. [`ProgramBuilder`] folds the declarations of every source file
//!        into a [`Program`],
//!          selecting the formulas of the requested applications.
//!
//! [`Call`]: Expr::Call

mod desugar;
mod simplify;
pub mod unloop;

pub use desugar::{desugar, DesugarError};
pub use simplify::{
    Calculee, DeclCounts, Input, Program, ProgramBuilder, Selector,
    SimplifyError,
};

use crate::ast::CmpOp;
use fxhash::FxBuildHasher;
use indexmap::{IndexMap, IndexSet};
use std::fmt::Display;

/// Map keyed by name that iterates in insertion order.
///
/// Every name-keyed collection of the compiler preserves insertion order so
///   that output is reproducible;
///     hash order is never observable.
pub type NameMap<V> = IndexMap<String, V, FxBuildHasher>;

/// Set of names that iterates in insertion order.
pub type NameSet = IndexSet<String, FxBuildHasher>;

/// A canonical expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Symbol(String),
    Literal(f64),

    /// Application of an operator to its arguments.
    ///
    /// Calls produced by desugaring always have at least one argument.
    Call(Op, Vec<Expr>),
}

impl Expr {
    /// A symbol whose name is entirely numeric is a literal.
    ///
    /// This arises when a loop value is substituted for a symbol that
    ///   consisted only of the loop variable.
    pub fn from_name(name: String) -> Self {
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = name.parse() {
                return Self::Literal(value);
            }
        }

        Self::Symbol(name)
    }

    pub fn call(op: Op, args: Vec<Expr>) -> Self {
        Self::Call(op, args)
    }
}

impl Display for Expr {
    /// Render an expression as `op(arg, ...)`.
    ///
    /// This is used for diagnostics and for the textual form of
    ///   expressions in object files,
    ///     and so must not recurse natively.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        enum Item<'a> {
            Expr(&'a Expr),
            Text(&'static str),
        }

        let mut stack = vec![Item::Expr(self)];

        while let Some(item) = stack.pop() {
            match item {
                Item::Text(s) => f.write_str(s)?,
                Item::Expr(Expr::Symbol(name)) => f.write_str(name)?,
                Item::Expr(Expr::Literal(value)) => write!(f, "{value}")?,
                Item::Expr(Expr::Call(op, args)) => {
                    write!(f, "{op}(")?;
                    stack.push(Item::Text(")"));

                    for (i, arg) in args.iter().enumerate().rev() {
                        stack.push(Item::Expr(arg));
                        if i > 0 {
                            stack.push(Item::Text(", "));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Operator of an [`Expr::Call`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    /// n-ary sum.
    Add,
    /// n-ary product.
    Mul,
    /// Multiplicative inverse of a divisor.
    Inverse,
    /// Arithmetic negation.
    Neg,
    /// Boolean negation.
    Not,
    Cmp(CmpOp),
    And,
    Or,
    /// Membership of the first argument among the remaining arguments.
    Dans,
    /// Conditional without an alternative.
    Si,
    /// Conditional with an alternative.
    Ternary,
    /// A library function.
    Function(String),
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Mul => write!(f, "*"),
            Self::Inverse => write!(f, "inverse"),
            Self::Neg => write!(f, "unary:-"),
            Self::Not => write!(f, "unary:non"),
            Self::Cmp(op) => write!(f, "operator:{op}"),
            Self::And => write!(f, "boolean:et"),
            Self::Or => write!(f, "boolean:ou"),
            Self::Dans => write!(f, "dans"),
            Self::Si => write!(f, "si"),
            Self::Ternary => write!(f, "ternary"),
            Self::Function(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod test;
