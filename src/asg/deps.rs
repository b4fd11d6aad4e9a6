// Dependency extraction
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

//! Extraction of the direct dependencies of formulas.

use super::IdentKind;
use crate::nir::{Expr, NameMap, NameSet, Program};

/// Classifies names of a [`Program`] by [`IdentKind`].
///
/// Inputs are recognized by either their name or their alias.
#[derive(Debug)]
pub struct Classifier<'a> {
    program: &'a Program,
    inputs: NameSet,
}

impl<'a> Classifier<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            inputs: program.input_names(),
        }
    }

    /// Kind of the definition of `name`,
    ///   if it is defined at all.
    ///
    /// This never yields [`IdentKind::Unknown`];
    ///   an undefined name yields [`None`].
    pub fn classify(&self, name: &str) -> Option<IdentKind> {
        if self.program.formulas.contains_key(name) {
            Some(IdentKind::Formula)
        } else if self.program.constants.contains_key(name) {
            Some(IdentKind::Const)
        } else if self.inputs.contains(name) {
            Some(IdentKind::Input)
        } else {
            None
        }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }
}

/// Dependencies of every formula of a [`Program`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dependencies {
    /// Names referenced directly by each formula,
    ///   in order of first reference.
    pub children: NameMap<NameSet>,

    /// Referenced names that have no definition,
    ///   in order of discovery.
    pub unknowns: NameSet,

    /// Formulas referencing each name directly.
    pub parents: NameMap<NameSet>,
}

impl Dependencies {
    pub fn children(&self, name: &str) -> Option<&NameSet> {
        self.children.get(name)
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(NameSet::len).sum()
    }
}

/// Distinct names referenced anywhere within `expr`.
///
/// Names are ordered by a left-to-right pre-order walk of the expression.
pub fn children_of(expr: &Expr) -> NameSet {
    let mut names = NameSet::default();
    let mut stack = vec![expr];

    while let Some(node) = stack.pop() {
        match node {
            Expr::Symbol(name) => {
                names.insert(name.clone());
            }
            Expr::Literal(_) => (),
            Expr::Call(_, args) => stack.extend(args.iter().rev()),
        }
    }

    names
}

/// Extract the dependencies of every formula of `program`.
///
/// Names with no definition are recorded as unknown;
///   this is not an error.
pub fn extract(program: &Program) -> Dependencies {
    let classifier = Classifier::new(program);
    let mut deps = Dependencies::default();

    for (name, expr) in &program.formulas {
        let children = children_of(expr);

        for child in &children {
            if classifier.classify(child).is_none()
                && deps.unknowns.insert(child.clone())
            {
                tracing::debug!(
                    name = %child,
                    formula = %name,
                    "reference to unknown name",
                );
            }

            deps.parents
                .entry(child.clone())
                .or_default()
                .insert(name.clone());
        }

        deps.children.insert(name.clone(), children);
    }

    deps
}
