// Reachability pruning of formulas
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

//! Restrict a [`Program`] to what is needed to compute a set of roots.
//!
//! Starting from the roots,
//!   every name reachable through the [`Dependencies`] of formulas is
//!   classified as a formula,
//!     constant,
//!     input,
//!     or unknown name.
//! Everything else is discarded.

use crate::{
    asg::{Classifier, Dependencies, IdentKind},
    diagnose::{Annotate, AnnotatedSpan, Diagnostic},
    nir::{Expr, Input, NameMap, NameSet, Program},
    span::Span,
};
use std::{error::Error, fmt::Display};

/// Names reachable from the roots,
///   partitioned by kind.
///
/// Each set is in order of discovery.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Useful {
    /// Formulas in the order in which their dependencies were processed.
    pub formulas: NameSet,
    pub constants: NameSet,

    /// Input names or aliases as they were referenced.
    pub inputs: NameSet,
    pub unknowns: NameSet,
}

/// The portion of a [`Program`] reachable from the roots.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pruned {
    pub useful: Useful,

    /// Useful formulas in program order.
    pub formulas: NameMap<Expr>,

    /// Useful constants in program order.
    pub constants: NameMap<f64>,

    /// Descriptors of useful inputs in program order.
    pub inputs: Vec<Input>,

    /// Children of each useful formula restricted to useful formulas.
    pub children: NameMap<NameSet>,

    /// Requested roots that are not formulas.
    pub missing_roots: Vec<String>,
}

/// Compute the names of `program` reachable from `roots`.
///
/// Roots that do not name a formula are logged and recorded in
///   [`Pruned::missing_roots`];
///     they are not an error.
pub fn prune<S: AsRef<str>>(
    program: &Program,
    deps: &Dependencies,
    roots: &[S],
) -> Result<Pruned, PruneError> {
    let classifier = Classifier::new(program);
    let mut missing_roots = Vec::new();
    let mut queued = NameSet::default();

    for root in roots.iter().map(AsRef::as_ref) {
        if program.formulas.contains_key(root) {
            queued.insert(root.to_string());
        } else {
            tracing::warn!(root, "root is not a formula; skipping");
            missing_roots.push(root.to_string());
        }
    }

    // LIFO;
    //   the first root is processed first.
    let mut stack = queued.iter().rev().cloned().collect::<Vec<_>>();
    let mut useful = Useful::default();

    while let Some(name) = stack.pop() {
        if useful.formulas.contains(&name) {
            continue;
        }

        let span = program.formula_spans.get(&name).copied();

        let children = deps.children(&name).ok_or_else(|| {
            PruneError::MissingDependencies(name.clone(), span)
        })?;

        for child in children {
            match classifier.classify(child) {
                Some(IdentKind::Formula) => {
                    if !useful.formulas.contains(child)
                        && queued.insert(child.clone())
                    {
                        stack.push(child.clone());
                    }
                }
                Some(IdentKind::Const) => {
                    useful.constants.insert(child.clone());
                }
                Some(IdentKind::Input) => {
                    useful.inputs.insert(child.clone());
                }
                None | Some(IdentKind::Unknown)
                    if deps.unknowns.contains(child) =>
                {
                    useful.unknowns.insert(child.clone());
                }
                None | Some(IdentKind::Unknown) => {
                    return Err(PruneError::Unclassified {
                        name: child.clone(),
                        parent: name,
                        span,
                    })
                }
            }
        }

        useful.formulas.insert(name);
    }

    Ok(restrict(program, deps, useful, missing_roots))
}

/// Restrict the collections of `program` to the `useful` sets.
fn restrict(
    program: &Program,
    deps: &Dependencies,
    useful: Useful,
    missing_roots: Vec<String>,
) -> Pruned {
    let formulas = program
        .formulas
        .iter()
        .filter(|(name, _)| useful.formulas.contains(*name))
        .map(|(name, expr)| (name.clone(), expr.clone()))
        .collect::<NameMap<_>>();

    let constants = program
        .constants
        .iter()
        .filter(|(name, _)| useful.constants.contains(*name))
        .map(|(name, value)| (name.clone(), *value))
        .collect();

    let inputs = program
        .inputs
        .iter()
        .filter(|input| {
            useful.inputs.contains(&input.name)
                || input
                    .alias
                    .as_ref()
                    .map_or(false, |alias| useful.inputs.contains(alias))
        })
        .cloned()
        .collect();

    let children = formulas
        .keys()
        .map(|name| {
            let light = deps
                .children(name)
                .into_iter()
                .flatten()
                .filter(|child| useful.formulas.contains(*child))
                .cloned()
                .collect();

            (name.clone(), light)
        })
        .collect();

    Pruned {
        useful,
        formulas,
        constants,
        inputs,
        children,
        missing_roots,
    }
}

/// Inconsistency between a [`Program`] and its [`Dependencies`].
///
/// These errors cannot be caused by source input;
///   they indicate a defect in the compiler.
#[derive(Debug, PartialEq, Eq)]
pub enum PruneError {
    /// A reachable name is neither defined nor recorded as unknown.
    Unclassified {
        name: String,
        parent: String,
        span: Option<Span>,
    },

    /// A reachable formula has no recorded dependencies.
    MissingDependencies(String, Option<Span>),
}

impl Display for PruneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unclassified { name, parent, .. } => write!(
                f,
                "internal error: `{name}` referenced by `{parent}` \
                    has no classification",
            ),
            Self::MissingDependencies(name, _) => write!(
                f,
                "internal error: missing dependencies of formula `{name}`",
            ),
        }
    }
}

impl Error for PruneError {}

impl Diagnostic for PruneError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::Unclassified {
                name,
                span: Some(span),
                ..
            } => span
                .bug(format!("reference to `{name}` is unclassified"))
                .into(),

            Self::MissingDependencies(_, Some(span)) => span
                .bug("dependencies of this formula were not extracted")
                .into(),

            _ => vec![],
        }
    }
}

#[cfg(test)]
mod test;
