// Global constants across the entirety of MLANG
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

//! System-wide static configuration.
//!
//! This module provides a system-wide configuration.
//! Subsystems should reference these values rather than defining their own
//!   and risk incompatibilities or maintenance issues as requirements
//!   change.
//!
//! By convention,
//!   import this entire module rather than individual members and reference
//!   them as `global::foo` to emphasize their nature and risk.

/// A size capable of representing every source file of a corpus.
///
/// The largest value is reserved for an unknown context
///   (see [`crate::span::UNKNOWN_CONTEXT`]).
pub type SourceFileIdSize = u16;

/// A size capable of representing any byte offset within a single source
///   file.
pub type SourceOffsetSize = u32;

/// A size capable of representing the byte length of any single
///   declaration.
///
/// See [`crate::span`] for what happens to longer declarations.
pub type SourceTokenLength = u16;

/// A size capable of representing the index of every identifier of a
///   program
///     (formulas, constants, inputs, and unknown names)
///   within the dependency graph.
///
/// A full corpus expands into tens of thousands of formulas once loops are
///   unrolled.
pub type ProgIdentSize = u32;

/// Expected number of identifiers in a complete corpus,
///   used to pre-size graphs and maps.
pub const PROG_IDENT_CAPACITY: usize = 65536;

/// Expected number of dependency edges in a complete corpus.
pub const PROG_DEP_CAPACITY: usize = 262144;

/// Roots used when the caller does not provide any.
///
/// These are the principal outputs of the income tax computation.
pub const DEFAULT_ROOTS: &[&str] = &[
    "NBPT", "REVKIRE", "BCSG", "BRDS", "IBM23", "TXMOYIMP", "NAPTIR",
    "IINET", "RRRBG", "RNI", "IDRS3", "IAVIM",
];

/// Application selected when the caller does not provide any.
pub const DEFAULT_APPLICATION: &str = "batch";
