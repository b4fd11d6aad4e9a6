// Compilation pipeline
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

//! Stages of a complete compiler run.
//!
//! A run proceeds as follows:
//!
//!   1. [`load`] reads every source file into memory;
//!   2. [`compile`] parses all sources in parallel and then folds their
//!        declarations,
//!          in input order,
//!          into a single [`Program`],
//!        from which the [`Dependencies`] of each formula are extracted;
//!   3. [`crate::ld::link`] prunes and orders the program for its roots.
//!
//! File reads happen only in the first stage;
//!   no stage after it performs I/O until output is written.
//!
//! A source file that cannot be read,
//!   is not valid UTF-8,
//!   or fails to parse is reported through a callback and skipped,
//!     unless the run is configured to fail fast,
//!       in which case the first such failure
//!         (in input order)
//!         aborts the run.

use crate::{
    asg::{extract, Dependencies},
    ast::Declaration,
    diagnose::{AnnotatedSpan, Diagnostic},
    fs::{expand_inputs, Loaded, ReadError, SourceFiles, SourceFilesystem},
    ld::{Linked, PruneError},
    nir::{Program, ProgramBuilder, Selector, SimplifyError},
    obj::WriterError,
    parse::{decode_source, parse_source, ParseError},
};
use rayon::prelude::*;
use std::{
    error::Error,
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

/// Read the source files named by `inputs`.
///
/// Directories are expanded
///   (see [`expand_inputs`]);
///     a directory that cannot be listed aborts the run.
/// Files that cannot be read are returned as errors in their place and
///   are handled by [`compile`].
pub fn load<P: AsRef<Path>>(
    files: &mut SourceFiles,
    inputs: &[P],
) -> Result<Vec<Loaded>, PipelineError> {
    let paths = expand_inputs(inputs).map_err(SourceError::Read)?;
    let mut fs = SourceFilesystem::new();

    let loaded = files.load(&mut fs, &paths);

    tracing::info!(
        files = loaded.len(),
        distinct = fs.seen_count(),
        unreadable = loaded.iter().filter(|l| l.is_err()).count(),
        "loaded sources",
    );

    Ok(loaded)
}

/// A source file that could not be compiled.
///
/// Unless failing fast,
///   the file is skipped and the run continues.
#[derive(Debug)]
pub enum SourceError {
    Read(ReadError),
    Parse(ParseError),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(e) => Display::fmt(e, f),
            Self::Parse(e) => Display::fmt(e, f),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl Diagnostic for SourceError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            // The error names its path.
            Self::Read(_) => vec![],
            Self::Parse(e) => e.describe(),
        }
    }
}

/// Decode and parse a single loaded source.
fn parse_loaded(
    loaded: Loaded,
) -> (PathBuf, Result<Vec<Declaration>, SourceError>) {
    match loaded {
        Ok(src) => {
            let result = decode_source(&src.bytes, src.ctx)
                .and_then(|text| parse_source(text, src.ctx))
                .map_err(SourceError::Parse);

            (src.path, result)
        }
        Err(e) => (e.path.clone(), Err(SourceError::Read(e))),
    }
}

/// A compiled [`Program`] and the dependencies of its formulas.
#[derive(Debug)]
pub struct Compiled {
    pub program: Program,
    pub deps: Dependencies,

    /// Sources that were successfully parsed.
    pub parsed: usize,

    /// Sources that could not be read or parsed and were skipped.
    pub failed: Vec<PathBuf>,
}

/// Parse every source and fold the results into a [`Program`].
///
/// Sources are decoded and parsed in parallel,
///   but their declarations are folded in the order of `sources` so that
///   the result does not depend on scheduling.
/// Each failed source is passed to `report`;
///   if `fail_fast` is set,
///     the first failure is returned instead.
/// A run in which no source could be parsed fails with
///   [`PipelineError::NoSources`].
pub fn compile<F>(
    sources: Vec<Loaded>,
    selector: Selector,
    fail_fast: bool,
    mut report: F,
) -> Result<Compiled, PipelineError>
where
    F: FnMut(&Path, &SourceError),
{
    let results = sources
        .into_par_iter()
        .map(parse_loaded)
        .collect::<Vec<_>>();

    let mut builder = ProgramBuilder::new(selector);
    let mut parsed = 0;
    let mut failed = Vec::new();

    for (path, result) in results {
        match result {
            Ok(decls) => {
                tracing::debug!(
                    path = %path.display(),
                    declarations = decls.len(),
                    "parsed",
                );

                builder.add_declarations(decls)?;
                parsed += 1;
            }

            Err(e) if fail_fast => return Err(e.into()),

            Err(e) => {
                tracing::warn!(path = %path.display(), "skipping file");

                report(&path, &e);
                failed.push(path);
            }
        }
    }

    if parsed == 0 {
        return Err(PipelineError::NoSources);
    }

    let program = builder.finish();
    let deps = extract(&program);

    for unknown in &deps.unknowns {
        tracing::warn!(name = %unknown, "reference to undefined name");
    }

    Ok(Compiled {
        program,
        deps,
        parsed,
        failed,
    })
}

/// Aggregate counts of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub files_parsed: usize,
    pub files_failed: usize,
    pub regles: usize,
    pub formulas: usize,
    pub constants: usize,
    pub inputs: usize,
    pub unknowns: usize,
    pub useful_formulas: usize,
    pub useful_constants: usize,
    pub useful_inputs: usize,
    pub useful_unknowns: usize,
    pub order: usize,
    pub cycles: usize,
}

impl Summary {
    pub fn new(compiled: &Compiled, linked: Option<&Linked>) -> Self {
        let program = &compiled.program;

        let mut summary = Self {
            files_parsed: compiled.parsed,
            files_failed: compiled.failed.len(),
            regles: program.counts.regles,
            formulas: program.formulas.len(),
            constants: program.constants.len(),
            inputs: program.inputs.len(),
            unknowns: compiled.deps.unknowns.len(),
            ..Default::default()
        };

        if let Some(linked) = linked {
            let useful = &linked.pruned.useful;

            summary.useful_formulas = useful.formulas.len();
            summary.useful_constants = useful.constants.len();
            summary.useful_inputs = useful.inputs.len();
            summary.useful_unknowns = useful.unknowns.len();
            summary.order = linked.order.len();
            summary.cycles = linked.cycles.len();
        }

        summary
    }

    pub fn log(&self) {
        tracing::info!(
            files_parsed = self.files_parsed,
            files_failed = self.files_failed,
            regles = self.regles,
            formulas = self.formulas,
            constants = self.constants,
            inputs = self.inputs,
            unknowns = self.unknowns,
            "compiled",
        );

        if self.order > 0 || self.useful_formulas > 0 {
            tracing::info!(
                formulas = self.useful_formulas,
                constants = self.useful_constants,
                inputs = self.useful_inputs,
                unknowns = self.useful_unknowns,
                order = self.order,
                cycles = self.cycles,
                "linked",
            );
        }
    }
}

/// Error that aborts a run.
#[derive(Debug)]
pub enum PipelineError {
    /// A source could not be compiled while failing fast,
    ///   or an input directory could not be listed.
    Source(SourceError),
    Simplify(SimplifyError),
    Link(PruneError),

    /// The output file could not be created or written.
    Io(PathBuf, io::Error),
    Write(WriterError),

    /// No source file could be parsed.
    NoSources,
}

impl From<SourceError> for PipelineError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

impl From<SimplifyError> for PipelineError {
    fn from(e: SimplifyError) -> Self {
        Self::Simplify(e)
    }
}

impl From<PruneError> for PipelineError {
    fn from(e: PruneError) -> Self {
        Self::Link(e)
    }
}

impl From<WriterError> for PipelineError {
    fn from(e: WriterError) -> Self {
        Self::Write(e)
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(e) => Display::fmt(e, f),
            Self::Simplify(e) => Display::fmt(e, f),
            Self::Link(e) => Display::fmt(e, f),
            Self::Io(path, e) => write!(f, "`{}`: {e}", path.display()),
            Self::Write(e) => Display::fmt(e, f),
            Self::NoSources => write!(f, "no source file could be parsed"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Io(_, e) => Some(e),
            Self::Simplify(e) => Some(e),
            Self::Link(e) => Some(e),
            Self::Write(e) => Some(e),
            Self::NoSources => None,
        }
    }
}

impl Diagnostic for PipelineError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::Source(e) => e.describe(),
            Self::Simplify(e) => e.describe(),
            Self::Link(e) => e.describe(),

            // Falls back to rendering just the error `Display`.
            Self::Io(..) | Self::Write(_) | Self::NoSources => vec![],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{fs::Source, span::Context};

    fn source(i: usize, bytes: &[u8]) -> Loaded {
        Ok(Source {
            ctx: Context::from_index(i).unwrap(),
            path: format!("{i}.m").into(),
            bytes: bytes.to_vec(),
        })
    }

    fn sources(texts: &[&str]) -> Vec<Loaded> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| source(i, text.as_bytes()))
            .collect()
    }

    fn unreadable(path: &str) -> Loaded {
        Err(ReadError::new(
            path,
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ))
    }

    const GOOD: &str = "regle R:\napplication: batch;\nA = B + 1;\n";
    const ALSO_GOOD: &str = "regle S:\napplication: batch;\nB = 2;\n";
    const BAD: &str = "regle :\n";
    const LATIN1: &[u8] = b"X : calculee : \"r\xe9sultat\" ;\n";

    #[test]
    fn folds_sources_in_order() -> Result<(), PipelineError> {
        let compiled = compile(
            sources(&[GOOD, ALSO_GOOD]),
            Selector::default(),
            false,
            |_, _| panic!("unexpected parse failure"),
        )?;

        assert_eq!(
            compiled.program.formulas.keys().collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert_eq!(compiled.parsed, 2);
        assert!(compiled.failed.is_empty());
        assert!(compiled.deps.unknowns.is_empty());

        Ok(())
    }

    #[test]
    fn parse_failure_is_skipped_and_reported() -> Result<(), PipelineError> {
        let mut reported = vec![];

        let compiled = compile(
            sources(&[GOOD, BAD, ALSO_GOOD]),
            Selector::default(),
            false,
            |path, _| reported.push(path.to_path_buf()),
        )?;

        assert_eq!(reported, vec![PathBuf::from("1.m")]);
        assert_eq!(compiled.failed, vec![PathBuf::from("1.m")]);
        assert_eq!(compiled.parsed, 2);
        assert_eq!(compiled.program.formulas.len(), 2);

        Ok(())
    }

    #[test]
    fn parse_failure_is_fatal_when_failing_fast() {
        let result = compile(
            sources(&[GOOD, BAD]),
            Selector::default(),
            true,
            |_, _| (),
        );

        assert!(matches!(
            result,
            Err(PipelineError::Source(SourceError::Parse(_)))
        ));
    }

    #[test]
    fn non_utf8_source_is_skipped_and_reported() -> Result<(), PipelineError>
    {
        let mut reported = vec![];

        let compiled = compile(
            vec![source(0, GOOD.as_bytes()), source(1, LATIN1)],
            Selector::default(),
            false,
            |path, e| reported.push((path.to_path_buf(), e.to_string())),
        )?;

        assert_eq!(
            reported,
            vec![(PathBuf::from("1.m"), "source is not valid UTF-8".into())]
        );
        assert_eq!(compiled.parsed, 1);
        assert_eq!(compiled.failed, vec![PathBuf::from("1.m")]);

        Ok(())
    }

    #[test]
    fn unreadable_source_is_skipped_and_reported(
    ) -> Result<(), PipelineError> {
        let mut reported = vec![];

        let compiled = compile(
            vec![unreadable("gone.m"), source(1, GOOD.as_bytes())],
            Selector::default(),
            false,
            |path, e| reported.push((path.to_path_buf(), e.to_string())),
        )?;

        assert_eq!(
            reported,
            vec![(
                PathBuf::from("gone.m"),
                "cannot read `gone.m`: denied".into()
            )]
        );
        assert_eq!(compiled.parsed, 1);

        Ok(())
    }

    #[test]
    fn unreadable_source_is_fatal_when_failing_fast() {
        let result = compile(
            vec![source(0, GOOD.as_bytes()), unreadable("gone.m")],
            Selector::default(),
            true,
            |_, _| (),
        );

        match result {
            Err(PipelineError::Source(SourceError::Read(e))) => {
                assert_eq!(e.path, PathBuf::from("gone.m"));
            }
            other => panic!("expected read failure, got {other:?}"),
        }
    }

    #[test]
    fn no_parsed_source_fails_run() {
        let result = compile(
            vec![unreadable("gone.m"), source(1, LATIN1)],
            Selector::default(),
            false,
            |_, _| (),
        );

        assert!(matches!(result, Err(PipelineError::NoSources)));
    }

    #[test]
    fn load_directory_with_non_utf8_file() -> Result<(), PipelineError> {
        let dir = std::env::temp_dir()
            .join(format!("mlang-pipeline-{}-latin1", std::process::id()));

        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.m"), GOOD).unwrap();
        std::fs::write(dir.join("b.m"), LATIN1).unwrap();

        let mut files = SourceFiles::new();
        let loaded = load(&mut files, &[&dir])?;

        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(Result::is_ok));

        let mut reported = vec![];
        let compiled =
            compile(loaded, Selector::default(), false, |path, _| {
                reported.push(path.to_path_buf())
            })?;

        assert_eq!(compiled.parsed, 1);
        assert_eq!(compiled.program.formulas.keys().collect::<Vec<_>>(), ["A"]);
        assert_eq!(reported.len(), 1);
        assert!(reported[0].ends_with("b.m"));

        Ok(())
    }

    #[test]
    fn summary_counts() -> Result<(), Box<dyn Error>> {
        let compiled = compile(
            sources(&[GOOD, BAD]),
            Selector::default(),
            false,
            |_, _| (),
        )?;
        let linked =
            crate::ld::link(&compiled.program, &compiled.deps, &["A"])?;

        let summary = Summary::new(&compiled, Some(&linked));

        assert_eq!(summary.files_parsed, 1);
        assert_eq!(summary.files_failed, 1);
        assert_eq!(summary.formulas, 1);
        assert_eq!(summary.unknowns, 1);
        assert_eq!(summary.useful_unknowns, 1);
        assert_eq!(summary.order, 1);

        Ok(())
    }
}
