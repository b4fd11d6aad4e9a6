// Object files
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

//! Object files emitted by the compiler.
//!
//! Two formats are produced,
//!   both XML:
//!
//!   - [`xmlo`] holds the compiled program before linking;
//!       every formula of the selected applications is present along
//!       with its direct dependencies.
//!   - [`xmle`] holds the linked program:
//!       the formulas needed to compute the roots,
//!       in evaluation order.
//!
//! Object files are a boundary of the compiler;
//!   nothing in the compiler reads them back.

mod writer;

pub mod xmle;
pub mod xmlo;

pub use writer::{Result, WriterError};
