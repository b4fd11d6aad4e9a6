// Source spans
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

//! Mapping of declarations to source locations.
//!
//! A [`Span`] is a byte interval within a [`Context`].
//! A context is nothing more than the index of a source file in the table
//!   of files loaded for a compilation run
//!     (see [`crate::fs::SourceFiles`]);
//!   resolving a span into a path, line, and column is deferred until a
//!   diagnostic actually needs to be rendered
//!     (see [`crate::diagnose`]).
//!
//! Spans are attached to every named declaration
//!   (rules, formulas, variables, errors, verifications)
//!   so that diagnostic reports can point back to the source corpus.
//! Expression-internal nodes do not carry spans;
//!   a corpus expands into tens of thousands of formulas after loop
//!   unrolling,
//!     and only the declaration that produced a formula is ever reported.
//!
//! Size
//! ====
//! A span must remain small enough to be copied freely.
//! Its three fields fit into a single [`u64`]:
//!
//! ```text
//!  0        16           32                         64
//! | ctx(16) |  len(16)    |        offset(32)         |
//! ```
//!
//! The length of a span is therefore limited to 64KiB;
//!   a construct longer than that
//!     (which would be an unusually large `regle` block)
//!   is represented with a zero-length span at its starting offset,
//!     which is still enough for a user to locate it.

use crate::global;
use std::fmt::Display;

/// Starting byte offset of a [`Span`] within its [`Context`].
pub type SpanOffsetSize = global::SourceOffsetSize;

/// Length of a [`Span`] in bytes.
pub type SpanLenSize = global::SourceTokenLength;

/// Description of a source location and byte interval for some object.
///
/// Spans are totally ordered first by context,
///   then by offset,
///   then by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Context onto which byte offsets are mapped,
    ///   such as a source file.
    ctx: Context,

    /// Starting 0-indexed byte position, inclusive.
    offset: SpanOffsetSize,

    /// Token length (ending byte offset - `offset`).
    len: SpanLenSize,
}

assert_eq_size!(Span, u64);

impl Span {
    /// Create a new span from its constituent parts.
    pub const fn new(
        offset: SpanOffsetSize,
        len: SpanLenSize,
        ctx: Context,
    ) -> Self {
        Self { ctx, offset, len }
    }

    /// Byte offset of the beginning of the span relative to its context.
    pub fn offset(&self) -> SpanOffsetSize {
        self.offset
    }

    /// Length of the span in bytes.
    ///
    /// The interval of the span is `[offset, offset+len)`.
    pub fn len(&self) -> SpanLenSize {
        self.len
    }

    /// Whether the span has a length of zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The context to which the span applies.
    pub fn context(&self) -> Context {
        self.ctx
    }

    /// Byte offset one past the end of the span,
    ///   saturating at [`SpanOffsetSize::MAX`].
    pub fn end_offset(&self) -> SpanOffsetSize {
        self.offset.saturating_add(self.len as SpanOffsetSize)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} offset {}-{}]",
            self.ctx,
            self.offset,
            self.end_offset()
        )
    }
}

/// A placeholder span indicating that a span is expected but is not yet
///   known.
pub const UNKNOWN_SPAN: Span = Span::new(0, 0, UNKNOWN_CONTEXT);

/// Context for byte offsets (e.g. a source file).
///
/// The context is the index of the file in the
///   [`SourceFiles`](crate::fs::SourceFiles) table of the current run.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Context(global::SourceFileIdSize);

impl Context {
    /// Context for the source file at index `id` of the file table.
    ///
    /// The largest representable index is reserved for
    ///   [`UNKNOWN_CONTEXT`];
    ///     [`None`] is returned if `id` cannot be represented.
    pub fn from_index(id: usize) -> Option<Self> {
        global::SourceFileIdSize::try_from(id)
            .ok()
            .filter(|&id| id != UNKNOWN_CONTEXT.0)
            .map(Self)
    }

    /// Index of this context within the file table.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Produce a [`Span`] within the given context.
    #[inline]
    pub const fn span(self, offset: SpanOffsetSize, len: SpanLenSize) -> Span {
        Span::new(offset, len, self)
    }

    /// Attempt to produce a [`Span`] of the given length at the given
    ///   offset,
    ///     otherwise fall back to a `(0,0)` (ZZ) span.
    ///
    /// If the offset cannot be stored,
    ///   then the length will always be `0` even if it could otherwise be
    ///   represented;
    ///     `(0,0)` indicates no span,
    ///       whereas `(0,N)` would indicate a span of length `N` at
    ///       offset `0`,
    ///         which would not be true.
    ///
    /// If the offset can be represented but not the length,
    ///   then a zero-length span at that offset will be produced.
    #[inline]
    pub fn span_or_zz(self, offset: usize, len: usize) -> Span {
        match SpanOffsetSize::try_from(offset) {
            Ok(offset) => self.span(offset, len.try_into().unwrap_or(0)),
            Err(_) => self.span(0, 0),
        }
    }
}

/// A placeholder context indicating that a context is expected but is not
///   yet known.
pub const UNKNOWN_CONTEXT: Context = Context(global::SourceFileIdSize::MAX);

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == UNKNOWN_CONTEXT {
            write!(f, "<unknown>")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}


#[cfg(test)]
mod test {
    use super::{dummy::*, *};

    #[test]
    fn span_accessors() {
        let ctx = Context::from_index(3).unwrap();
        let sut = ctx.span(10, 5);

        assert_eq!(10, sut.offset());
        assert_eq!(5, sut.len());
        assert_eq!(15, sut.end_offset());
        assert_eq!(ctx, sut.context());
        assert_eq!(3, ctx.index());
    }

    #[test]
    fn unknown_context_index_is_reserved() {
        assert_eq!(
            None,
            Context::from_index(global::SourceFileIdSize::MAX as usize)
        );
        assert_eq!(
            None,
            Context::from_index(global::SourceFileIdSize::MAX as usize + 1)
        );
    }

    #[test]
    fn span_or_zz_falls_back() {
        let ctx = DUMMY_CONTEXT;

        assert_eq!(ctx.span(5, 2), ctx.span_or_zz(5, 2));

        // Length too large: zero-length span at the offset.
        assert_eq!(ctx.span(5, 0), ctx.span_or_zz(5, usize::MAX));

        // Offset too large: no span at all.
        assert_eq!(ctx.span(0, 0), ctx.span_or_zz(usize::MAX, 2));
    }

    #[test]
    fn display_unknown() {
        assert_eq!("[<unknown> offset 0-0]", UNKNOWN_SPAN.to_string());
        assert_eq!("[#7 offset 2-4]", Context(7).span(2, 2).to_string());
    }
}
