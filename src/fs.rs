// Light filesystem abstractions
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

//! Access to the source files of a corpus.
//!
//! Files are opened through a [`Filesystem`] so that tests may substitute
//!   their own [`File`]s.
//! Sources are read through [`VisitOnce`],
//!   which yields [`Visit::Again`] for any path that canonicalizes to one
//!   already opened;
//!     a source named twice on the command line
//!       (perhaps once directly and once through its directory)
//!       is therefore read only once.
//!
//! [`SourceFiles`] is the table of sources of a run;
//!   the index of a file in that table is its [`Context`].

use fxhash::FxBuildHasher;
use std::collections::hash_map::RandomState;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;
use std::fs;
use std::hash::BuildHasher;
use std::io::{self, BufReader, Read, Result};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::span::Context;

/// Something that can be opened by path and read.
pub trait File: Read + Sized {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;
}

impl File for fs::File {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path)
    }
}

impl<F: File> File for BufReader<F> {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        F::open(path).map(BufReader::new)
    }
}

/// A [`File`] paired with the path it was opened by.
#[derive(Debug, PartialEq)]
pub struct PathFile<F: File>(pub PathBuf, pub F);

impl<F: File> File for PathFile<F> {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        F::open(path).map(|file| Self(path.to_path_buf(), file))
    }
}

impl<F: File> Read for PathFile<F> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.1.read(buf)
    }
}

pub trait Filesystem<F: File>: Sized {
    fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<F> {
        F::open(path)
    }
}

/// Result of opening a path through [`VisitOnce`].
#[derive(Debug, PartialEq)]
pub enum Visit<F: File> {
    First(F),

    /// The path was opened before;
    ///   reads yield nothing.
    Again,
}

impl<F: File> File for Visit<F> {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        F::open(path).map(Self::First)
    }
}

impl<F: File> Read for Visit<F> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Self::First(file) => file.read(buf),
            Self::Again => Ok(0),
        }
    }
}

/// Filesystem that opens each canonical path at most once.
pub struct VisitOnce<C: Canonicalizer, S: BuildHasher = RandomState> {
    seen: HashSet<PathBuf, S>,
    _canon: PhantomData<C>,
}

impl<C: Canonicalizer, S: BuildHasher + Default> VisitOnce<C, S> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::default(),
            _canon: PhantomData,
        }
    }

    /// Number of distinct paths opened.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl<C, S, F> Filesystem<Visit<F>> for VisitOnce<C, S>
where
    C: Canonicalizer,
    S: BuildHasher,
    F: File,
{
    /// A path is recorded only once it has been opened successfully,
    ///   so a failed open may be retried.
    fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<Visit<F>> {
        let canonical = C::canonicalize(path)?;

        if self.seen.contains(&canonical) {
            return Ok(Visit::Again);
        }

        let file = Visit::open(&canonical)?;
        self.seen.insert(canonical);

        Ok(file)
    }
}

pub trait Canonicalizer {
    fn canonicalize<P: AsRef<Path>>(path: P) -> Result<PathBuf>;
}

/// Canonicalization by [`fs::canonicalize`],
///   which requires that the path exist.
pub struct FsCanonicalizer;

impl Canonicalizer for FsCanonicalizer {
    fn canonicalize<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        fs::canonicalize(path)
    }
}

/// Expand each input path into the source files it names.
///
/// A directory names every regular file directly within it,
///   sorted by file name;
///     subdirectories are not descended into.
/// Any other path names itself,
///   whether or not it exists.
pub fn expand_inputs<P: AsRef<Path>>(
    inputs: &[P],
) -> std::result::Result<Vec<PathBuf>, ReadError> {
    let mut paths = Vec::new();

    for input in inputs {
        let input: &Path = input.as_ref();

        if !input.is_dir() {
            paths.push(input.to_path_buf());
            continue;
        }

        let mut entries = fs::read_dir(input)
            .and_then(|dir| {
                dir.map(|entry| entry.map(|e| e.path()))
                    .collect::<Result<Vec<_>>>()
            })
            .map_err(|error| ReadError::new(input, error))?;

        entries.retain(|path| path.is_file());
        entries.sort();

        paths.extend(entries);
    }

    Ok(paths)
}

/// A source file read into memory.
///
/// The bytes are not yet known to be text.
#[derive(Debug, PartialEq, Eq)]
pub struct Source {
    pub ctx: Context,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// A source path that could not be read.
#[derive(Debug)]
pub struct ReadError {
    pub path: PathBuf,
    pub error: io::Error,
}

impl ReadError {
    pub fn new<P: AsRef<Path>>(path: P, error: io::Error) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            error,
        }
    }
}

impl Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot read `{}`: {}", self.path.display(), self.error)
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Outcome of loading a single source path.
pub type Loaded = std::result::Result<Source, ReadError>;

/// Table of the source files of a run.
///
/// The [`Context`] of a file is its index in this table,
///   which allows spans to be resolved back to paths when rendering
///   diagnostics.
#[derive(Debug, Default)]
pub struct SourceFiles {
    paths: Vec<PathBuf>,
}

impl SourceFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` and allocate its [`Context`].
    pub fn add(&mut self, path: PathBuf) -> Result<Context> {
        let ctx = Context::from_index(self.paths.len()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "too many source files")
        })?;

        self.paths.push(path);
        Ok(ctx)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Read every file of `paths` that has not yet been read.
    ///
    /// Files are read in the order given.
    /// A path that resolves to a file that was already read is skipped.
    /// A path that cannot be read yields a [`ReadError`] in its place and
    ///   does not prevent the remaining paths from being read.
    pub fn load<F, P>(&mut self, fs: &mut F, paths: &[P]) -> Vec<Loaded>
    where
        F: Filesystem<Visit<PathFile<BufReader<fs::File>>>>,
        P: AsRef<Path>,
    {
        let mut loaded = Vec::with_capacity(paths.len());

        for path in paths {
            let path: &Path = path.as_ref();

            match self.read(fs, path) {
                Ok(Some(src)) => loaded.push(Ok(src)),
                Ok(None) => tracing::debug!(
                    path = %path.display(),
                    "skipping already-visited file",
                ),
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "cannot read source file",
                    );
                    loaded.push(Err(ReadError::new(path, error)));
                }
            }
        }

        loaded
    }

    fn read<F>(&mut self, fs: &mut F, path: &Path) -> Result<Option<Source>>
    where
        F: Filesystem<Visit<PathFile<BufReader<fs::File>>>>,
    {
        let PathFile(path, mut file) = match fs.open(path)? {
            Visit::First(file) => file,
            Visit::Again => return Ok(None),
        };

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let ctx = self.add(path.clone())?;
        Ok(Some(Source { ctx, path, bytes }))
    }
}

/// The filesystem used to load source files.
pub type SourceFilesystem = VisitOnce<FsCanonicalizer, FxBuildHasher>;
