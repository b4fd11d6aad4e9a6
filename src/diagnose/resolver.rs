// Diagnostic span resolver
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

//! Mapping of [`Span`]s back to lines and columns of their sources.
//!
//! Spans record only byte offsets into a source file identified by its
//!   [`Context`].
//! Lines and columns are computed on demand by re-reading the source,
//!   so a [`Context`] must name something that can be read again.

use crate::span::{Context, Span};
use std::{
    error::Error,
    fmt::Display,
    fs, io,
    num::NonZeroU32,
    path::PathBuf,
};
use unicode_width::UnicodeWidthChar;

pub trait SpanResolver {
    fn resolve(
        &mut self,
        span: Span,
    ) -> Result<ResolvedSpan, SpanResolverError>;
}

/// Location of the first line of a [`Span`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ResolvedSpan {
    span: Span,

    /// Path or other name of the source.
    source: String,

    line_num: NonZeroU32,

    /// [`None`] if the line is not valid UTF-8.
    column: Option<Column>,

    /// Bytes of the line without its line terminator.
    text: Vec<u8>,
}

impl ResolvedSpan {
    /// 1-indexed line of the first byte of the span.
    pub fn line_num(&self) -> NonZeroU32 {
        self.line_num
    }

    pub fn col_num(&self) -> Option<Column> {
        self.column
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn unresolved_span(&self) -> Span {
        self.span
    }

    pub fn line_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.text).ok()
    }
}

/// Terminal columns occupied by a span on its first line.
///
/// Columns are 1-indexed and count display cells,
///   so a wide character occupies two.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Column {
    /// First and last column, inclusive.
    Endpoints(NonZeroU32, NonZeroU32),

    /// Position of an empty span.
    Before(NonZeroU32),
}

impl Column {
    /// First column and number of columns to underline.
    pub fn extent(&self) -> (u32, u32) {
        match self {
            Self::Endpoints(start, end) => {
                (start.get(), end.get() - start.get() + 1)
            }
            Self::Before(at) => (at.get(), 1),
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (first, _) = self.extent();
        write!(f, "{first}")
    }
}

/// Resolve a [`Span`] against a complete in-memory source buffer.
///
/// The resolver is bound to a single [`Context`];
///   spans of any other context are rejected.
pub struct BufSpanResolver<B: AsRef<[u8]>> {
    buf: B,
    ctx: Context,
    source: String,
}

impl<B: AsRef<[u8]>> BufSpanResolver<B> {
    pub fn new<S: Into<String>>(buf: B, ctx: Context, source: S) -> Self {
        Self {
            buf,
            ctx,
            source: source.into(),
        }
    }
}

impl<B: AsRef<[u8]>> SpanResolver for BufSpanResolver<B> {
    fn resolve(
        &mut self,
        span: Span,
    ) -> Result<ResolvedSpan, SpanResolverError> {
        if self.ctx != span.context() {
            return Err(SpanResolverError::ContextMismatch {
                given: span.context(),
                expected: self.ctx,
            });
        }

        resolve_in(self.buf.as_ref(), span, &self.source)
    }
}

/// Resolve spans by reading [`Context`]s from a filesystem.
///
/// The resolver holds the table of paths loaded for the run;
///   a [`Context`] is an index into that table.
/// Each resolution re-reads the file,
///   which is acceptable since reports are rare.
pub struct FsSpanResolver {
    paths: Vec<PathBuf>,
}

impl FsSpanResolver {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl SpanResolver for FsSpanResolver {
    fn resolve(
        &mut self,
        span: Span,
    ) -> Result<ResolvedSpan, SpanResolverError> {
        let ctx = span.context();
        let path = self
            .paths
            .get(ctx.index())
            .ok_or(SpanResolverError::UnknownContext(ctx))?;

        let buf = fs::read(path)?;

        resolve_in(&buf, span, &path.display().to_string())
    }
}

/// Locate the first line of `span` within `buf`.
fn resolve_in(
    buf: &[u8],
    span: Span,
    source: &str,
) -> Result<ResolvedSpan, SpanResolverError> {
    let offset = span.offset() as usize;

    if span.end_offset() as usize > buf.len() {
        return Err(SpanResolverError::OutOfRange(buf.len()));
    }

    let before = &buf[..offset];
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let newlines = before.iter().filter(|&&b| b == b'\n').count();
    let line_num = NonZeroU32::new(newlines.saturating_add(1) as u32)
        .unwrap_or(NonZeroU32::MIN);

    let line_end = buf[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| offset + i)
        .unwrap_or(buf.len());

    let mut text = buf[line_start..line_end].to_vec();
    if text.last() == Some(&b'\r') {
        text.pop();
    }

    let column = std::str::from_utf8(&text)
        .ok()
        .map(|line| resolve_columns(line, line_start, span));

    Ok(ResolvedSpan {
        span,
        source: source.to_string(),
        line_num,
        column,
        text,
    })
}

/// Determine the 1-indexed column number for each [`Span`] endpoint,
///   relative to the start of the line.
///
/// A span continuing past the end of its first line has its end column
///   clamped to the end of that line.
fn resolve_columns(line: &str, line_start: usize, span: Span) -> Column {
    let rel_start = (span.offset() as usize).saturating_sub(line_start);

    // The max(1) here is intended to accommodate zero-length spans.
    let rel_end = (span.offset() as usize + span.len().max(1) as usize - 1)
        .saturating_sub(line_start);

    let (start, end) = line.char_indices().fold(
        (1usize, 0usize),
        |(start, end), (i, c)| {
            let width = c.width().unwrap_or(0);
            (
                if i < rel_start { start + width } else { start },
                if i <= rel_end { end + width } else { end },
            )
        },
    );

    let col_start = NonZeroU32::new(start.try_into().unwrap_or(0))
        .unwrap_or(NonZeroU32::MIN);
    let col_end = NonZeroU32::new(end.try_into().unwrap_or(0))
        .unwrap_or(NonZeroU32::MIN);

    if span.is_empty() {
        Column::Before(col_start)
    } else {
        Column::Endpoints(col_start, col_end.max(col_start))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SpanResolverError {
    Io(io::ErrorKind),

    /// A [`BufSpanResolver`] was given a span of another source.
    ContextMismatch { given: Context, expected: Context },

    /// No source was loaded for the [`Context`].
    UnknownContext(Context),

    /// The span ends past the end of the source,
    ///   whose length is given.
    OutOfRange(usize),
}

impl From<io::Error> for SpanResolverError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

impl Display for SpanResolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(kind) => Display::fmt(kind, f),
            Self::ContextMismatch { given, expected } => write!(
                f,
                "attempted to read context {given} \
                   using a resolver for context {expected}"
            ),
            Self::UnknownContext(ctx) => {
                write!(f, "context {ctx} does not reference a source file")
            }
            Self::OutOfRange(len) => {
                write!(f, "span exceeds context size of {len} bytes")
            }
        }
    }
}

impl Error for SpanResolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
