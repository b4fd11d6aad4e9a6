// xmlo object files
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

//! `xmlo` object file construction.
//!
//! An `xmlo` file holds the compiled,
//!   unlinked program:
//!     every selected formula with its canonical expression and its direct
//!       dependencies (as [adjacency lists][]),
//!     every constant,
//!     every input,
//!     and the names that are referenced but never defined.
//!
//! [adjacency lists]: https://en.wikipedia.org/wiki/Adjacency_list
//!
//! For example:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <object>
//!   <formulas>
//!     <formula name="A" expr="+(K, B)">
//!       <dep name="K"/>
//!       <dep name="B"/>
//!     </formula>
//!     <formula name="B" expr="3"/>
//!   </formulas>
//!   <constants>
//!     <const name="K" value="2"/>
//!   </constants>
//!   <inputs>
//!     <input name="V_0AC" alias="AC"/>
//!   </inputs>
//!   <unknowns/>
//! </object>
//! ```

use super::writer::{ElementWriter, Result};
use crate::{asg::Dependencies, nir::Program};
use std::io::Write;

pub struct XmloWriter<W: Write> {
    writer: ElementWriter<W>,
}

impl<W: Write> XmloWriter<W> {
    pub fn new(write: W) -> Self {
        Self {
            writer: ElementWriter::new(write),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Write `program` along with its dependencies.
    pub fn write(&mut self, program: &Program, deps: &Dependencies) -> Result {
        self.writer.write_decl()?.write_element("object", &[], |w| {
            w.write_element("formulas", &[], |w| {
                for (name, expr) in &program.formulas {
                    let expr = expr.to_string();
                    let attrs =
                        [("name", name.as_str()), ("expr", expr.as_str())];

                    match deps.children(name) {
                        Some(children) if !children.is_empty() => {
                            w.write_element("formula", &attrs, |w| {
                                for child in children {
                                    w.write_empty(
                                        "dep",
                                        &[("name", child.as_str())],
                                    )?;
                                }

                                Ok(())
                            })?
                        }
                        _ => w.write_empty("formula", &attrs)?,
                    };
                }

                Ok(())
            })?;

            w.write_element("constants", &[], |w| {
                for (name, value) in &program.constants {
                    let value = value.to_string();
                    w.write_empty(
                        "const",
                        &[("name", name.as_str()), ("value", value.as_str())],
                    )?;
                }

                Ok(())
            })?;

            w.write_element("inputs", &[], |w| {
                for input in &program.inputs {
                    match &input.alias {
                        Some(alias) => w.write_empty(
                            "input",
                            &[
                                ("name", input.name.as_str()),
                                ("alias", alias.as_str()),
                            ],
                        )?,
                        None => w.write_empty(
                            "input",
                            &[("name", input.name.as_str())],
                        )?,
                    };
                }

                Ok(())
            })?;

            w.write_names("unknowns", "unknown", &deps.unknowns)?;

            Ok(())
        })?;

        Ok(())
    }
}
