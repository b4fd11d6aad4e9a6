// xmle object files
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

//! `xmle` file construction.
//!
//! An `xmle` file holds a [`Linked`] program,
//!   which is everything needed to evaluate its roots:
//!
//!   - `l:exec` holds the useful formulas in evaluation order,
//!       each with its formula-only dependencies;
//!   - `l:constants` holds the useful constants and the formulas affected
//!       by each;
//!   - `l:inputs` and `l:unknowns` hold the useful inputs and the
//!       referenced names that have no definition;
//!   - `l:cycles` holds any cyclic dependencies among formulas.
//!
//! For example:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <program xmlns:l="http://www.lovullo.com/mlang/linker" roots="A">
//!   <l:exec>
//!     <l:formula name="B" expr="3"/>
//!     <l:formula name="A" expr="*(K, B)">
//!       <l:dep name="B"/>
//!     </l:formula>
//!   </l:exec>
//!   <l:constants>
//!     <l:const name="K" value="2">
//!       <l:affects name="A"/>
//!     </l:const>
//!   </l:constants>
//!   <l:inputs/>
//!   <l:unknowns/>
//!   <l:cycles/>
//! </program>
//! ```

use super::writer::{ElementWriter, Result};
use crate::ld::Linked;
use std::io::Write;

const NS_LINKER: &str = "http://www.lovullo.com/mlang/linker";

pub struct XmleWriter<W: Write> {
    writer: ElementWriter<W>,
}

impl<W: Write> XmleWriter<W> {
    pub fn new(write: W) -> Self {
        Self {
            writer: ElementWriter::new(write),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Write a linked program.
    ///
    /// `roots` are recorded as given,
    ///   including any that were missing.
    pub fn write<S: AsRef<str>>(
        &mut self,
        linked: &Linked,
        roots: &[S],
    ) -> Result {
        let roots = roots
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");

        let attrs = [("xmlns:l", NS_LINKER), ("roots", roots.as_str())];

        self.writer.write_decl()?.write_element("program", &attrs, |w| {
            Self::write_exec(w, linked)?;
            Self::write_constants(w, linked)?;

            let inputs = linked.pruned.inputs.iter().map(|input| &input.name);
            w.write_names("l:inputs", "l:input", inputs)?;
            w.write_names(
                "l:unknowns",
                "l:unknown",
                &linked.pruned.useful.unknowns,
            )?;

            if linked.cycles.is_empty() {
                w.write_empty("l:cycles", &[])?;
                return Ok(());
            }

            w.write_element("l:cycles", &[], |w| {
                for cycle in &linked.cycles {
                    w.write_names("l:cycle", "l:formula", cycle)?;
                }

                Ok(())
            })?;

            Ok(())
        })?;

        Ok(())
    }

    fn write_exec(w: &mut ElementWriter<W>, linked: &Linked) -> Result {
        let pruned = &linked.pruned;

        w.write_element("l:exec", &[], |w| {
            for name in &linked.order {
                let Some(expr) = pruned.formulas.get(name) else {
                    continue;
                };

                let expr = expr.to_string();
                let attrs =
                    [("name", name.as_str()), ("expr", expr.as_str())];

                match pruned.children.get(name) {
                    Some(deps) if !deps.is_empty() => {
                        w.write_element("l:formula", &attrs, |w| {
                            for dep in deps {
                                w.write_empty(
                                    "l:dep",
                                    &[("name", dep.as_str())],
                                )?;
                            }

                            Ok(())
                        })?
                    }
                    _ => w.write_empty("l:formula", &attrs)?,
                };
            }

            Ok(())
        })?;

        Ok(())
    }

    fn write_constants(w: &mut ElementWriter<W>, linked: &Linked) -> Result {
        w.write_element("l:constants", &[], |w| {
            for (name, sig) in &linked.signatures {
                let value = sig.value.to_string();
                let attrs =
                    [("name", name.as_str()), ("value", value.as_str())];

                w.write_names_with(
                    "l:const",
                    &attrs,
                    "l:affects",
                    &sig.formulas,
                )?;
            }

            Ok(())
        })?;

        Ok(())
    }
}
