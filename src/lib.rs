// MLANG compiler library
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

//! A compiler for the M tax-computation language.
//!
//! Source files are lowered through the following stages:
//!
//!   1. [`parse`] produces the [`ast`] of each file;
//!   2. [`nir`] desugars and simplifies declarations into a [`nir::Program`]
//!        of canonical formulas,
//!          unrolling loops;
//!   3. [`asg`] extracts the dependencies of each formula;
//!   4. [`ld`] prunes the program to what its roots need and orders it for
//!        evaluation.
//!
//! [`pipeline`] composes these stages and [`obj`] writes their results.

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;

pub mod asg;
pub mod ast;
pub mod diagnose;
pub mod fs;
pub mod ld;
pub mod nir;
pub mod obj;
pub mod parse;
pub mod pipeline;
pub mod span;
