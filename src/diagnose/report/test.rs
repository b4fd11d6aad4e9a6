// Tests for diagnostic report rendering
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

//! These tests assert,
//!   byte-for-byte,
//!   against the report output that will be rendered to the user.
//! This makes the tests more fragile,
//!   but the cost is intentional:
//!     presentation matters,
//!       and the slightest misrendering could change the meaning of the
//!       output.
//!
//! Do not interpret these tests as providing a stable diagnostic output
//!   format.

use super::*;
use crate::{
    diagnose::{resolver::BufSpanResolver, Annotate},
    span::Context,
};
use std::error::Error;

#[derive(Debug)]
struct StubError(String, Vec<AnnotatedSpan<'static>>);

impl Display for StubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for StubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl Diagnostic for StubError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        self.1.clone()
    }
}

const FILE_FOO_BAR: &str =
    "foo/bar line 1\nfoo/bar line 2\nfoo/bar line 3\nfoo/bar line 4";
//    |-------+--+-|  |-------+--+-|  |-------+--+-|  |-------+--+-|
//    0       |  |13  15      |  |28  30      |  |43  45      |  |58
//            8 11           23  26          38  41          53  56

fn ctx() -> Context {
    Context::from_index(0).unwrap()
}

fn render(msg: &str, aspans: Vec<AnnotatedSpan<'static>>) -> String {
    let resolver = BufSpanResolver::new(FILE_FOO_BAR, ctx(), "foo/bar");
    let mut sut = VisualReporter::new(resolver);

    let err = StubError(msg.into(), aspans);
    let report = sut.render(&err).to_string();
    report
}

#[test]
fn no_spans() {
    assert_eq!(render("no spans", vec![]), "error: no spans\n");
}

#[test]
fn single_span_with_label() {
    assert_eq!(
        render("single span", vec![ctx().span(15, 7).error("label here")]),
        "\
error: single span
  --> foo/bar:2:1
  |
2 | foo/bar line 2
  | ^^^^^^^
      error: label here
"
    );
}

#[test]
fn span_within_line_is_offset() {
    assert_eq!(
        render("offset span", vec![ctx().span(38, 4).mark_error()]),
        "\
error: offset span
  --> foo/bar:3:9
  |
3 | foo/bar line 3
  |         ^^^^
"
    );
}

#[test]
fn adjacent_identical_spans_are_squashed() {
    let span = ctx().span(0, 3);
    let [err, help] = span.error("primary").with_help("try this");

    assert_eq!(
        render("squashed", vec![err, help]),
        "\
error: squashed
  --> foo/bar:1:1
  |
1 | foo/bar line 1
  | ^^^
      error: primary
      help: try this
"
    );
}

#[test]
fn multiple_spans_produce_sections() {
    assert_eq!(
        render(
            "redefined",
            vec![
                ctx().span(45, 7).error("second definition"),
                ctx().span(0, 7).note("first defined here"),
            ]
        ),
        "\
error: redefined
  --> foo/bar:4:1
  |
4 | foo/bar line 4
  | ^^^^^^^
      error: second definition
  --> foo/bar:1:1
  |
1 | foo/bar line 1
  | ^^^^^^^
      note: first defined here
"
    );
}

#[test]
fn most_severe_level_titles_report() {
    assert_eq!(
        render(
            "internal",
            vec![
                ctx().span(0, 1).note("context"),
                ctx().span(15, 1).internal_error("broken"),
            ]
        )
        .lines()
        .next(),
        Some("internal error: internal"),
    );

    assert_eq!(
        render("careful", vec![ctx().span(0, 1).warning("odd")])
            .lines()
            .next(),
        Some("warning: careful"),
    );
}

#[test]
fn bug_is_internal_error_with_help() {
    assert_eq!(
        render("broken", ctx().span(30, 7).bug("while here").into()),
        "\
internal error: broken
  --> foo/bar:3:1
  |
3 | foo/bar line 3
  | ^^^^^^^
      internal error: while here
      help: this is a bug in the compiler; please report it
"
    );
}

#[test]
fn unresolved_span_falls_back_to_offsets() {
    let other = Context::from_index(1).unwrap();

    assert_eq!(
        render("unresolved", vec![other.span(3, 2).error("here")]),
        "\
error: unresolved
  --> #1 offset 3--5
      help: an error occurred while trying to look up information \
about this span: attempted to read context #1 using a resolver for \
context #0
      error: here
"
    );
}
