// MLANG linker
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

//! The linker reduces a compiled [`Program`] to a computation plan for a
//!   set of root variables.
//!
//! Linking happens in stages:
//!
//!   1. [`prune`] discards every name that is not reachable from the
//!        roots and classifies the rest;
//!   2. the useful formulas and their dependencies are placed on an
//!        [`Asg`];
//!   3. [`sort`] derives an evaluation order from the graph,
//!        and [`check_cycles`] reports any cyclic dependencies;
//!   4. [`signatures`] records which formulas are affected by each
//!        constant.
//!
//! The pruned maps together with the order are sufficient to evaluate
//!   every useful formula exactly once,
//!     dependencies first.

mod prune;
mod signature;
mod topo;

pub use prune::{prune, PruneError, Pruned, Useful};
pub use signature::{signatures, ConstSignature};
pub use topo::{check_cycles, sort, TopoPostOrderDfs};

use crate::{
    asg::{Asg, Classifier, Dependencies, IdentKind},
    nir::{NameMap, Program},
};

/// Result of linking a [`Program`].
#[derive(Debug)]
pub struct Linked {
    pub pruned: Pruned,
    pub asg: Asg,

    /// Useful formulas in evaluation order.
    pub order: Vec<String>,

    pub signatures: NameMap<ConstSignature>,

    /// Cyclic dependencies among useful formulas.
    pub cycles: Vec<Vec<String>>,
}

/// Link `program` for the given `roots`.
pub fn link<S: AsRef<str>>(
    program: &Program,
    deps: &Dependencies,
    roots: &[S],
) -> Result<Linked, PruneError> {
    let pruned = prune(program, deps, roots)?;
    let asg = build_asg(program, &pruned, deps);

    tracing::debug!(?asg, "linking");

    let cycles = check_cycles(&asg);
    for cycle in &cycles {
        tracing::warn!(cycle = %cycle.join(" -> "), "cyclic dependency");
    }

    let order = sort(&asg, roots);
    let signatures = signatures(&asg, &order, &pruned.constants);

    Ok(Linked {
        pruned,
        asg,
        order,
        signatures,
        cycles,
    })
}

/// Place the useful formulas of `pruned` and their direct dependencies on
///   a graph.
fn build_asg(program: &Program, pruned: &Pruned, deps: &Dependencies) -> Asg {
    let classifier = Classifier::new(program);
    let mut asg = Asg::with_capacity(
        pruned.useful.formulas.len()
            + pruned.useful.constants.len()
            + pruned.useful.inputs.len()
            + pruned.useful.unknowns.len(),
        deps.edge_count(),
    );

    for name in pruned.formulas.keys() {
        let from = asg.declare(name, IdentKind::Formula);

        for child in deps.children(name).into_iter().flatten() {
            let kind = classifier.classify(child).unwrap_or(IdentKind::Unknown);
            let to = asg.declare(child, kind);

            asg.add_dep(from, to);
        }
    }

    asg
}
