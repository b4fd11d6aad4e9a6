// Constant signatures
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

//! Formulas affected by each constant.

use crate::{
    asg::{Asg, IdentKind},
    nir::NameMap,
};
use fixedbitset::FixedBitSet;

/// A useful constant and the formulas whose value depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstSignature {
    pub value: f64,

    /// Formulas depending on the constant directly or transitively,
    ///   in evaluation order.
    pub formulas: Vec<String>,
}

/// Compute the signature of each constant of `constants`.
///
/// `order` must be an evaluation order of the formulas of `asg`
///   (see [`super::sort`]);
///     the constants of each formula are derived from those of the
///     formulas preceding it.
/// Formulas of a cycle see only the constants of cycle members that
///   precede them.
pub fn signatures(
    asg: &Asg,
    order: &[String],
    constants: &NameMap<f64>,
) -> NameMap<ConstSignature> {
    let nconst = constants.len();

    // Constants reaching each formula on the graph,
    //   indexed by node.
    let mut reach =
        vec![FixedBitSet::with_capacity(nconst); asg.object_count()];

    for name in order {
        let Some(objref) = asg.lookup(name) else {
            continue;
        };

        let mut bits = FixedBitSet::with_capacity(nconst);

        for dep in asg.dependencies(objref) {
            let Some(ident) = asg.get(dep) else {
                continue;
            };

            match ident.kind() {
                IdentKind::Const => {
                    if let Some(i) = constants.get_index_of(ident.name()) {
                        bits.insert(i);
                    }
                }
                IdentKind::Formula => bits.union_with(&reach[dep.index()]),
                IdentKind::Input | IdentKind::Unknown => (),
            }
        }

        reach[objref.index()] = bits;
    }

    let mut sigs = constants
        .iter()
        .map(|(name, &value)| {
            let sig = ConstSignature {
                value,
                formulas: vec![],
            };

            (name.clone(), sig)
        })
        .collect::<NameMap<_>>();

    for name in order {
        let Some(objref) = asg.lookup(name) else {
            continue;
        };

        for i in reach[objref.index()].ones() {
            if let Some((_, sig)) = sigs.get_index_mut(i) {
                sig.formulas.push(name.clone());
            }
        }
    }

    sigs
}
