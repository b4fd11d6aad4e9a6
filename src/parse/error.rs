// Errors produced while parsing M source files
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

use super::Rule;
use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic},
    span::{Context, Span},
};
use pest::error::{ErrorVariant, InputLocation};
use std::{error::Error, fmt::Display};

/// A source file could not be parsed.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The source file is not valid UTF-8.
    ///
    /// The span begins at the first invalid byte.
    Encoding { span: Span },

    /// The source text does not match the grammar.
    ///
    /// `expected` lists the grammar rules that could have matched at the
    ///   point of failure,
    ///     and may be empty if the grammar could not say.
    Syntax {
        span: Span,
        expected: Vec<Rule>,
        message: Option<String>,
    },

    /// A numeric token matched by the grammar could not be represented.
    InvalidNumber { span: Span, text: String },

    /// The builder encountered a grammar rule that it does not know how to
    ///   handle at this position.
    UnexpectedRule { rule: Rule, span: Span },

    /// A grammar rule did not contain a child that the builder requires.
    MissingChild { parent: Rule, span: Span },
}

impl ParseError {
    /// Convert a pest error into a [`ParseError::Syntax`] located within
    ///   `ctx`.
    pub fn from_pest(e: pest::error::Error<Rule>, ctx: Context) -> Self {
        let span = match e.location {
            InputLocation::Pos(pos) => ctx.span_or_zz(pos, 0),
            InputLocation::Span((start, end)) => {
                ctx.span_or_zz(start, end.saturating_sub(start))
            }
        };

        match e.variant {
            ErrorVariant::ParsingError { positives, .. } => Self::Syntax {
                span,
                expected: positives,
                message: None,
            },
            ErrorVariant::CustomError { message } => Self::Syntax {
                span,
                expected: vec![],
                message: Some(message),
            },
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Encoding { span }
            | Self::Syntax { span, .. }
            | Self::InvalidNumber { span, .. }
            | Self::UnexpectedRule { span, .. }
            | Self::MissingChild { span, .. } => *span,
        }
    }
}

/// Human-readable name of a grammar rule.
fn rule_name(rule: &Rule) -> String {
    format!("{rule:?}").replace('_', " ")
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding { .. } => write!(f, "source is not valid UTF-8"),
            Self::Syntax {
                message: Some(msg), ..
            } => write!(f, "syntax error: {msg}"),
            Self::Syntax { .. } => write!(f, "syntax error"),
            Self::InvalidNumber { text, .. } => {
                write!(f, "invalid number `{text}`")
            }
            Self::UnexpectedRule { rule, .. } => {
                write!(f, "unexpected grammar rule `{rule:?}`")
            }
            Self::MissingChild { parent, .. } => {
                write!(f, "missing child of grammar rule `{parent:?}`")
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl Diagnostic for ParseError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::Encoding { span } => {
                span.error("invalid byte sequence begins here").into()
            }

            Self::Syntax { span, expected, .. } if expected.is_empty() => {
                span.mark_error().into()
            }
            Self::Syntax { span, expected, .. } => {
                let names =
                    expected.iter().map(rule_name).collect::<Vec<_>>();

                span.error(format!("expected {}", names.join(" or ")))
                    .into()
            }

            Self::InvalidNumber { span, .. } => span
                .error("this number cannot be represented")
                .into(),

            Self::UnexpectedRule { span, .. }
            | Self::MissingChild { span, .. } => span
                .bug("the syntax tree builder does not expect this")
                .into(),
        }
    }
}
