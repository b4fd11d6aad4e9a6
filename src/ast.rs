// Abstract syntax tree of M source files
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

//! Rich syntax tree produced by [`crate::parse`].
//!
//! This tree mirrors the concrete syntax of the language closely:
//!   operator chains are kept as flat operand/operator lists,
//!   loops are kept as templates,
//!   and every declaration carries the [`Span`] of its source text.
//! It is lowered into canonical expressions by [`crate::nir`].
//!
//! Expression nodes do not carry spans;
//!   diagnostics always refer to the declaration that contains them.

use crate::span::Span;
use std::fmt::Display;

/// A top-level declaration of a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Application(Application),
    Enchaineur(Enchaineur),
    Variable(Variable),
    Erreur(Erreur),
    Regle(Regle),
    Verif(Verif),
}

impl Declaration {
    pub fn span(&self) -> Span {
        match self {
            Self::Application(x) => x.span,
            Self::Enchaineur(x) => x.span,
            Self::Variable(x) => x.span(),
            Self::Erreur(x) => x.span,
            Self::Regle(x) => x.span,
            Self::Verif(x) => x.span,
        }
    }
}

/// `application NAME ;`
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub name: String,
    pub span: Span,
}

/// `enchaineur NAME : application : A1, A2 ;`
#[derive(Debug, Clone, PartialEq)]
pub struct Enchaineur {
    pub name: String,
    pub applications: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Const(ConstVariable),
    Calculee(CalculeeVariable),
    Saisie(SaisieVariable),
}

impl Variable {
    pub fn name(&self) -> &str {
        match self {
            Self::Const(x) => &x.name,
            Self::Calculee(x) => &x.name,
            Self::Saisie(x) => &x.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Const(x) => x.span,
            Self::Calculee(x) => x.span,
            Self::Saisie(x) => x.span,
        }
    }
}

/// `NAME : const = VALUE ;`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstVariable {
    pub name: String,
    pub value: f64,
    pub span: Span,
}

/// A variable whose value is computed by a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculeeVariable {
    pub name: String,
    pub base: bool,
    pub restituee: bool,

    /// Dimension of the `tableau` qualifier,
    ///   if the variable is an array.
    pub tableau: Option<u32>,

    pub description: String,
    pub value_type: Option<String>,
    pub span: Span,
}

/// An input variable supplied externally.
#[derive(Debug, Clone, PartialEq)]
pub struct SaisieVariable {
    pub name: String,
    pub subtype: String,
    pub alias: Option<String>,

    /// `NAME = INT` attributes,
    ///   sorted by name.
    pub attributes: Vec<(String, i64)>,

    pub restituee: bool,
    pub description: String,
    pub value_type: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErreurKind {
    Anomalie,
    Discordance,
    Informative,
}

impl ErreurKind {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw {
            "anomalie" => Some(Self::Anomalie),
            "discordance" => Some(Self::Discordance),
            "informative" => Some(Self::Informative),
            _ => None,
        }
    }
}

impl Display for ErreurKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anomalie => write!(f, "anomalie"),
            Self::Discordance => write!(f, "discordance"),
            Self::Informative => write!(f, "informative"),
        }
    }
}

/// `NAME : anomalie : "s1" : "s2" : "s3" : "description" : "s5" ;`
///
/// The fourth string is the description;
///   the others are codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Erreur {
    pub name: String,
    pub kind: ErreurKind,
    pub codes: Vec<String>,
    pub description: String,
    pub span: Span,
}

/// A named block of formulas targeting a set of applications.
#[derive(Debug, Clone, PartialEq)]
pub struct Regle {
    pub name: String,
    pub tags: Vec<String>,
    pub applications: Vec<String>,
    pub enchaineur: Option<String>,

    /// Plain and `pour` formulas in source order.
    pub formulas: Vec<RegleFormula>,

    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegleFormula {
    Single(Formula),
    Pour(PourFormula),
}

/// `NAME [ '[' INDEX ']' ] = EXPR ;`
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    pub name: String,
    pub index: Option<Index>,
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    Integer(i64),
    Symbol(String),
}

impl Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => Display::fmt(i, f),
            Self::Symbol(s) => Display::fmt(s, f),
        }
    }
}

/// `pour LOOPVARS : FORMULA`
#[derive(Debug, Clone, PartialEq)]
pub struct PourFormula {
    pub loop_variables: Vec<LoopVariable>,
    pub formula: Formula,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopVariable {
    pub name: String,
    pub domain: Vec<DomainPart>,
}

/// A part of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPart {
    /// Explicit values in source order.
    Values(Vec<LoopValue>),

    /// Integer range,
    ///   both ends inclusive.
    Interval { first: i64, last: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopValue {
    Integer(i64),
    Symbol(String),
}

impl Display for LoopValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => Display::fmt(i, f),
            Self::Symbol(s) => Display::fmt(s, f),
        }
    }
}

/// `verif TAG... NAME : application : A1, A2 ; CONDITION...`
#[derive(Debug, Clone, PartialEq)]
pub struct Verif {
    pub name: String,
    pub tags: Vec<String>,
    pub applications: Vec<String>,
    pub conditions: Vec<VerifCondition>,
    pub span: Span,
}

/// `si EXPR alors erreur ERR [VAR] ;`
#[derive(Debug, Clone, PartialEq)]
pub struct VerifCondition {
    pub expression: Expression,
    pub error_name: String,
    pub variable_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Symbol(String),
    Integer(i64),
    Float(f64),

    /// `a + b - c`;
    ///   `operators.len() == operands.len() - 1`.
    Sum {
        operands: Vec<Expression>,
        operators: Vec<SumOp>,
    },

    /// `a * b / c`;
    ///   `operators.len() == operands.len() - 1`.
    Product {
        operands: Vec<Expression>,
        operators: Vec<ProductOp>,
    },

    /// `a et b ou c`;
    ///   `operators.len() == operands.len() - 1`.
    Boolean {
        operands: Vec<Expression>,
        operators: Vec<BoolOp>,
    },

    Comparison {
        left: Box<Expression>,
        operator: CmpOp,
        right: Box<Expression>,
    },

    /// `EXPR [non] dans (ENUM)`
    Dans {
        expression: Box<Expression>,
        enumeration: Vec<DomainPart>,
        negated: bool,
    },

    Unary {
        operator: UnaryOp,
        expression: Box<Expression>,
    },

    /// `si C alors T [sinon E] finsi`
    Ternary {
        condition: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Option<Box<Expression>>,
    },

    Call {
        name: String,
        arguments: Vec<Argument>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Expression(Expression),
    Loop(LoopExpression),
}

/// `LOOPVARS : EXPR` as the argument of a function call.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopExpression {
    pub loop_variables: Vec<LoopVariable>,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOp {
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Et,
    Ou,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Non,
}

impl SumOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        match tok {
            "+" => Some(Self::Add),
            "-" => Some(Self::Sub),
            _ => None,
        }
    }
}

impl ProductOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        match tok {
            "*" => Some(Self::Mul),
            "/" => Some(Self::Div),
            _ => None,
        }
    }
}

impl BoolOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        match tok {
            "et" => Some(Self::Et),
            "ou" => Some(Self::Ou),
            _ => None,
        }
    }
}

impl CmpOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        match tok {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            ">" => Some(Self::Gt),
            "<=" => Some(Self::Le),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }
}

impl UnaryOp {
    pub fn from_token(tok: &str) -> Option<Self> {
        match tok {
            "-" => Some(Self::Minus),
            "non" => Some(Self::Non),
            _ => None,
        }
    }
}

impl Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Et => write!(f, "et"),
            Self::Ou => write!(f, "ou"),
        }
    }
}

impl Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Gt => write!(f, ">"),
            Self::Le => write!(f, "<="),
            Self::Ge => write!(f, ">="),
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minus => write!(f, "-"),
            Self::Non => write!(f, "non"),
        }
    }
}
