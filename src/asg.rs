// Abstract semantic graph of formula dependencies
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

//! Dependencies between the names of a [`Program`].
//!
//! Every name referenced by a formula is an _identifier_ of one
//!   [`IdentKind`]:
//!     a formula,
//!     a constant,
//!     an input,
//!     or,
//!       if none of those define it,
//!       an unknown name.
//! Unknown names are defects in the source corpus,
//!   but they do not prevent compilation.
//!
//! [`extract`] derives the direct dependencies of each formula from its
//!   canonical expression.
//! [`Asg`] holds those dependencies as a directed graph once the program
//!   has been pruned by the [linker](crate::ld).
//!
//! [`Program`]: crate::nir::Program

mod deps;
mod graph;

pub use deps::{children_of, extract, Classifier, Dependencies};
pub use graph::{Asg, Ident, ObjectRef};

use std::fmt::Display;

/// Kind of an identifier.
///
/// When a name is defined more than once across kinds,
///   the first of these kinds that applies wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentKind {
    Formula,
    Const,
    Input,
    Unknown,
}

impl Display for IdentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Formula => write!(f, "formula"),
            Self::Const => write!(f, "constant"),
            Self::Input => write!(f, "input"),
            Self::Unknown => write!(f, "unknown name"),
        }
    }
}
