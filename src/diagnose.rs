// Diagnostic system
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

//! Diagnostic reports for errors in M sources.
//!
//! An error describes itself as a series of [`AnnotatedSpan`]s
//!   (see [`Diagnostic`]),
//!     each pointing at a declaration of the corpus with a severity
//!     [`Level`] and an optional label.
//! Spans are cheap and carry no position information beyond byte offsets;
//!   a [`Reporter`] resolves them against the source files only when a
//!   report is rendered,
//!     which happens rarely.
//!
//! The rendered output is modeled after that of `rustc`.

mod report;
mod resolver;

pub use report::{Report, Reporter, VisualReporter};
pub use resolver::{
    BufSpanResolver, Column, FsSpanResolver, ResolvedSpan, SpanResolver,
    SpanResolverError,
};

use std::{borrow::Cow, error::Error, fmt};

use crate::span::Span;

/// Help attached to internal errors.
pub const BUG_HELP: &str = "this is a bug in the compiler; please report it";

/// An error that can describe where in the corpus it occurred.
pub trait Diagnostic: Error + Sized {
    /// Source locations related to the error,
    ///   most relevant first.
    ///
    /// An error with no locations is rendered using only its
    ///   [`Display`](fmt::Display).
    fn describe(&self) -> Vec<AnnotatedSpan>;
}

/// Severity of a report or of one of its spans.
///
/// Variants are ordered from most to least severe.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub enum Level {
    /// The compiler itself is at fault.
    InternalError,

    /// The corpus is at fault.
    #[default]
    Error,

    Warning,

    /// Context for another span,
    ///   such as the first definition of a redefined formula.
    Note,

    /// Advice for resolving the problem.
    Help,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InternalError => "internal error",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Note => "note",
            Self::Help => "help",
        })
    }
}

/// Text displayed alongside a span.
pub type Label<'l> = Cow<'l, str>;

/// A [`Span`] annotated with a [`Level`] and optional [`Label`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AnnotatedSpan<'l> {
    span: Span,
    level: Level,
    label: Option<Label<'l>>,
}

impl<'l> AnnotatedSpan<'l> {
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Follow this annotation with help for the same span.
    pub fn with_help<L: Into<Label<'l>>>(
        self,
        label: L,
    ) -> [AnnotatedSpan<'l>; 2] {
        let help = self.span.help(label);
        [self, help]
    }
}

impl<'l> From<AnnotatedSpan<'l>> for Vec<AnnotatedSpan<'l>> {
    fn from(aspan: AnnotatedSpan<'l>) -> Self {
        vec![aspan]
    }
}

/// Annotation of spans.
///
/// This is implemented for anything that converts into a [`Span`].
pub trait Annotate: Into<Span> {
    fn annotate<'l>(
        self,
        level: Level,
        label: Option<Label<'l>>,
    ) -> AnnotatedSpan<'l> {
        AnnotatedSpan {
            span: self.into(),
            level,
            label,
        }
    }

    fn internal_error<'l, L: Into<Label<'l>>>(
        self,
        label: L,
    ) -> AnnotatedSpan<'l> {
        self.annotate(Level::InternalError, Some(label.into()))
    }

    /// An internal error followed by [`BUG_HELP`].
    fn bug<'l, L: Into<Label<'l>>>(self, label: L) -> [AnnotatedSpan<'l>; 2] {
        self.internal_error(label).with_help(BUG_HELP)
    }

    fn error<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedSpan<'l> {
        self.annotate(Level::Error, Some(label.into()))
    }

    /// Underline the span as an error without a label,
    ///   for when the message of the report says it all.
    fn mark_error(self) -> AnnotatedSpan<'static> {
        self.annotate(Level::Error, None)
    }

    fn warning<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedSpan<'l> {
        self.annotate(Level::Warning, Some(label.into()))
    }

    fn note<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedSpan<'l> {
        self.annotate(Level::Note, Some(label.into()))
    }

    fn help<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedSpan<'l> {
        self.annotate(Level::Help, Some(label.into()))
    }
}

impl<S: Into<Span>> Annotate for S {}
