// Parsing of M source files
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

//! Parse M source text into an [`ast`](crate::ast).
//!
//! Parsing happens in two steps:
//!
//!   1. The PEG grammar in `parse/mlang.pest` matches the source text and
//!        yields a raw tree of [`Rule`] pairs; and
//!   2. [`AstBuilder`] walks that tree and materializes typed
//!        [`Declaration`]s.
//!
//! The builder matches exhaustively on [`Rule`] at every level.
//! A rule that the builder does not expect at some position means that
//!   the grammar and the builder have diverged;
//!     that is reported as an internal error
//!     ([`ParseError::UnexpectedRule`]),
//!     not as a syntax error in the user's source.
//!
//! A file either parses completely or not at all;
//!   there is no error recovery.

mod build;
mod error;

pub use build::AstBuilder;
pub use error::ParseError;

use crate::{ast::Declaration, span::Context};
use pest::Parser;
use pest_derive::Parser;

/// Parser generated from the grammar of the M language.
#[derive(Parser)]
#[grammar = "parse/mlang.pest"]
pub struct MParser;

/// Interpret the bytes of a source file as text.
///
/// Sources must be UTF-8;
///   the span of the error marks the first byte that is not.
pub fn decode_source(
    bytes: &[u8],
    ctx: Context,
) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| ParseError::Encoding {
        span: ctx.span_or_zz(e.valid_up_to(), e.error_len().unwrap_or(1)),
    })
}

/// Parse the complete source text of a single file.
///
/// All spans of the resulting declarations are associated with `ctx`.
pub fn parse_source(
    src: &str,
    ctx: Context,
) -> Result<Vec<Declaration>, ParseError> {
    let mut pairs = MParser::parse(Rule::m_source_file, src)
        .map_err(|e| ParseError::from_pest(e, ctx))?;

    let file = pairs.next().ok_or(ParseError::MissingChild {
        parent: Rule::m_source_file,
        span: ctx.span(0, 0),
    })?;

    AstBuilder::new(ctx).source_file(file)
}
