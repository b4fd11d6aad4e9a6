// Diagnostic system rendering
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

//! Rendering of diagnostic reports.
//!
//! A report begins with the [`Level`] and message of the diagnostic,
//!   followed by one section per distinct span:
//!
//! ```text
//! error: `A` redefined
//!   --> src/chap-1.m:4:1
//!   |
//! 4 | A = B + 1;
//!   | ^^^^^^^^^^
//!       error: redefined here
//! ```

use super::{
    resolver::{ResolvedSpan, SpanResolver},
    AnnotatedSpan, Diagnostic, Label, Level,
};
use crate::span::Span;
use std::fmt::{self, Display};

pub trait Reporter {
    /// Render a report for `diagnostic`.
    ///
    /// Rendering never fails;
    ///   a span that cannot be resolved is rendered by its offsets along
    ///   with the reason,
    ///     so that the diagnostic itself is never lost.
    ///
    /// Render the report to a string before writing it out so that it is
    ///   not interleaved with log output.
    fn render<'d, D: Diagnostic>(&mut self, diagnostic: &'d D)
        -> Report<'d, D>;
}

/// Reporter that renders the source line of each span,
///   underlined.
pub struct VisualReporter<R: SpanResolver> {
    resolver: R,
}

impl<R: SpanResolver> VisualReporter<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    fn section<'d>(&mut self, aspan: AnnotatedSpan<'d>) -> Section<'d> {
        let AnnotatedSpan { span, level, label } = aspan;
        let mut labels = Vec::new();

        let (heading, excerpt) = match self.resolver.resolve(span) {
            Ok(rspan) => {
                if rspan.col_num().is_none() {
                    labels.push(SpanLabel(
                        Level::Help,
                        "unable to calculate columns because the line is \
                            not a valid UTF-8 string"
                            .into(),
                    ));
                }

                (heading_of(&rspan), Excerpt::new(&rspan))
            }

            Err(e) => {
                labels.push(SpanLabel(
                    Level::Help,
                    format!(
                        "an error occurred while trying to look up \
                            information about this span: {e}"
                    )
                    .into(),
                ));

                let heading = format!(
                    "{} offset {}--{}",
                    span.context(),
                    span.offset(),
                    span.end_offset()
                );

                (heading, None)
            }
        };

        labels.extend(label.map(|label| SpanLabel(level, label)));

        Section {
            heading,
            excerpt,
            labels,
            level,
            span,
        }
    }
}

fn heading_of(rspan: &ResolvedSpan) -> String {
    let (source, line) = (rspan.source(), rspan.line_num());

    match rspan.col_num() {
        Some(col) => format!("{source}:{line}:{col}"),
        None => format!("{source}:{line}"),
    }
}

impl<R: SpanResolver> Reporter for VisualReporter<R> {
    fn render<'d, D: Diagnostic>(
        &mut self,
        diagnostic: &'d D,
    ) -> Report<'d, D> {
        let mut report = Report {
            diagnostic,
            secs: Vec::new(),
            level: None,
        };

        for aspan in diagnostic.describe() {
            let sec = self.section(aspan);
            report.push(sec);
        }

        report
    }
}

#[derive(Debug)]
pub struct Report<'d, D: Diagnostic> {
    diagnostic: &'d D,
    secs: Vec<Section<'d>>,
    level: Option<Level>,
}

impl<'d, D: Diagnostic> Report<'d, D> {
    /// Most severe level of any span of the report,
    ///   or [`Level::Error`] if there are none.
    pub fn level(&self) -> Level {
        self.level.unwrap_or_default()
    }

    /// Add a section,
    ///   merging its labels into the last section if both describe the
    ///   same span.
    ///
    /// Only adjacent sections are merged,
    ///   so that a report may return to a span it described earlier.
    fn push(&mut self, sec: Section<'d>) {
        self.level = Some(self.level.map_or(sec.level, |l| l.min(sec.level)));

        match self.secs.last_mut() {
            Some(last) if last.span == sec.span => {
                last.labels.extend(sec.labels)
            }
            _ => self.secs.push(sec),
        }
    }
}

impl<'d, D: Diagnostic> Display for Report<'d, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.level(), self.diagnostic)?;
        self.secs.iter().try_for_each(|sec| sec.fmt(f))
    }
}

/// The portion of a [`Report`] describing a single [`Span`].
#[derive(Debug, PartialEq, Eq)]
struct Section<'d> {
    heading: String,
    excerpt: Option<Excerpt>,
    labels: Vec<SpanLabel<'d>>,
    level: Level,
    span: Span,
}

impl<'d> Display for Section<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  --> {}", self.heading)?;

        if let Some(excerpt) = &self.excerpt {
            excerpt.fmt(f)?;
        }

        self.labels
            .iter()
            .try_for_each(|label| writeln!(f, "{label}"))
    }
}

/// First source line of a span with the span underlined.
#[derive(Debug, PartialEq, Eq)]
struct Excerpt {
    line_num: u32,
    text: String,
    col: u32,
    width: u32,
}

impl Excerpt {
    fn new(rspan: &ResolvedSpan) -> Option<Self> {
        let text = rspan.line_text()?;
        let (col, width) = rspan.col_num()?.extent();

        Some(Self {
            line_num: rspan.line_num().get(),
            text: text.replace('\t', " "),
            col,
            width,
        })
    }
}

impl Display for Excerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gutter = self.line_num.to_string().len();
        let pad = self.col.saturating_sub(1) as usize;

        writeln!(f, "{:gutter$} |", "")?;
        writeln!(f, "{} | {}", self.line_num, self.text)?;
        writeln!(
            f,
            "{:gutter$} | {:pad$}{}",
            "",
            "",
            "^".repeat(self.width as usize),
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
struct SpanLabel<'d>(Level, Label<'d>);

impl<'d> Display for SpanLabel<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(level, label) = self;
        write!(f, "      {level}: {label}")
    }
}

#[cfg(test)]
mod test;
