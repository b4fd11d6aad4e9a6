// Simplification of declarations into a program
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

//! Fold the declarations of all source files into a [`Program`].
//!
//! Only formulas of rules that target one of the selected applications
//!   are kept (see [`Selector`]).
//! When the same name is defined by more than one selected rule,
//!   a definition from a rule targeting the _preferred_ application
//!   replaces any other;
//!     otherwise the first definition encountered is kept.
//! Two definitions from preferred rules are an error.
//!
//! Files must be folded in a deterministic order
//!   (the order of the command line)
//!   for "first definition" to be meaningful.

use super::{
    desugar,
    unloop::{cartesian, substitute, substitute_name},
    DesugarError, Expr, NameMap, NameSet,
};
use crate::{
    ast::{
        Declaration, Formula, Index, PourFormula, Regle, RegleFormula,
        Variable,
    },
    diagnose::{Annotate, AnnotatedSpan, Diagnostic},
    global::DEFAULT_APPLICATION,
    span::Span,
};
use std::{error::Error, fmt::Display};

/// Applications whose rules are compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    applications: NameSet,
    preferred: Option<String>,
}

impl Selector {
    pub fn new<I, S>(applications: I, preferred: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            applications: applications.into_iter().map(Into::into).collect(),
            preferred,
        }
    }

    /// Whether a rule targeting `apps` is compiled.
    pub fn selects(&self, apps: &[String]) -> bool {
        apps.iter().any(|app| self.applications.contains(app))
    }

    /// Whether a rule targeting `apps` targets the preferred application.
    pub fn prefers(&self, apps: &[String]) -> bool {
        match &self.preferred {
            Some(pref) => apps.iter().any(|app| app == pref),
            None => false,
        }
    }

    pub fn applications(&self) -> impl Iterator<Item = &str> {
        self.applications.iter().map(String::as_str)
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new([DEFAULT_APPLICATION], Some(DEFAULT_APPLICATION.into()))
    }
}

/// An input variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

/// Declared properties of a computed variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculee {
    pub base: bool,
    pub restituee: bool,
    pub tableau: Option<u32>,
    pub span: Span,
}

/// Number of declarations of each kind that were folded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeclCounts {
    pub applications: usize,
    pub enchaineurs: usize,
    pub regles: usize,
    pub regles_selected: usize,
    pub pour_formulas: usize,
    pub verifs: usize,
    pub erreurs: usize,
}

/// Formulas,
///   constants,
///   and inputs of all source files.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Program {
    /// Canonical expression of each formula,
    ///   keyed by the name it defines.
    ///
    /// Indexed formulas are keyed `NAME[INDEX]`.
    pub formulas: NameMap<Expr>,

    /// Span of the definition of each formula.
    pub formula_spans: NameMap<Span>,

    pub constants: NameMap<f64>,
    pub inputs: Vec<Input>,
    pub calculees: NameMap<Calculee>,
    pub counts: DeclCounts,
}

impl Program {
    /// Names of all inputs along with their aliases.
    pub fn input_names(&self) -> NameSet {
        self.inputs
            .iter()
            .flat_map(|input| {
                std::iter::once(input.name.clone()).chain(input.alias.clone())
            })
            .collect()
    }
}

/// Incrementally folds declarations into a [`Program`].
#[derive(Debug)]
pub struct ProgramBuilder {
    selector: Selector,
    program: Program,

    /// Formulas whose current definition comes from a preferred rule.
    preferred: NameSet,

    const_spans: NameMap<Span>,
}

impl ProgramBuilder {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            program: Program::default(),
            preferred: NameSet::default(),
            const_spans: NameMap::default(),
        }
    }

    /// Fold the declarations of a single source file.
    pub fn add_declarations<I: IntoIterator<Item = Declaration>>(
        &mut self,
        decls: I,
    ) -> Result<(), SimplifyError> {
        decls.into_iter().try_for_each(|decl| self.add(decl))
    }

    fn add(&mut self, decl: Declaration) -> Result<(), SimplifyError> {
        let counts = &mut self.program.counts;

        match decl {
            Declaration::Application(_) => counts.applications += 1,
            Declaration::Enchaineur(_) => counts.enchaineurs += 1,
            Declaration::Verif(_) => counts.verifs += 1,
            Declaration::Erreur(_) => counts.erreurs += 1,
            Declaration::Variable(var) => return self.add_variable(var),
            Declaration::Regle(regle) => return self.add_regle(regle),
        }

        Ok(())
    }

    fn add_variable(&mut self, var: Variable) -> Result<(), SimplifyError> {
        match var {
            Variable::Const(c) => match self.program.constants.get(&c.name) {
                None => {
                    self.const_spans.insert(c.name.clone(), c.span);
                    self.program.constants.insert(c.name, c.value);
                }
                Some(&value) if value == c.value => {
                    tracing::debug!(
                        constant = %c.name,
                        "constant declared more than once with the same value",
                    );
                }
                Some(&value) => {
                    let first = self
                        .const_spans
                        .get(&c.name)
                        .copied()
                        .unwrap_or(c.span);

                    return Err(SimplifyError::ConstantConflict {
                        name: c.name,
                        first: (first, value),
                        second: (c.span, c.value),
                    });
                }
            },

            Variable::Calculee(c) => {
                self.program.calculees.entry(c.name).or_insert(Calculee {
                    base: c.base,
                    restituee: c.restituee,
                    tableau: c.tableau,
                    span: c.span,
                });
            }

            Variable::Saisie(s) => self.program.inputs.push(Input {
                name: s.name,
                alias: s.alias,
                span: s.span,
            }),
        }

        Ok(())
    }

    fn add_regle(&mut self, regle: Regle) -> Result<(), SimplifyError> {
        self.program.counts.regles += 1;

        if !self.selector.selects(&regle.applications) {
            tracing::trace!(regle = %regle.name, "rule not selected");
            return Ok(());
        }

        self.program.counts.regles_selected += 1;
        let preferred = self.selector.prefers(&regle.applications);

        for formula in regle.formulas {
            match formula {
                RegleFormula::Single(f) => self.add_formula(f, preferred)?,
                RegleFormula::Pour(p) => self.add_pour(p, preferred)?,
            }
        }

        Ok(())
    }

    fn add_formula(
        &mut self,
        f: Formula,
        preferred: bool,
    ) -> Result<(), SimplifyError> {
        let expr = desugar(&f.expression).map_err(|e| {
            SimplifyError::Desugar(f.name.clone(), f.span, e)
        })?;

        let key = match f.index {
            Some(index) => format!("{}[{index}]", f.name),
            None => f.name,
        };

        self.define(key, expr, f.span, preferred)
    }

    /// Unroll a `pour` formula into one formula per tuple of loop values.
    fn add_pour(
        &mut self,
        p: PourFormula,
        preferred: bool,
    ) -> Result<(), SimplifyError> {
        self.program.counts.pour_formulas += 1;

        let template = &p.formula;
        let expr = desugar(&template.expression).map_err(|e| {
            SimplifyError::Desugar(template.name.clone(), p.span, e)
        })?;

        for bindings in cartesian(&p.loop_variables) {
            let name = substitute_name(&template.name, &bindings);

            let key = match &template.index {
                Some(Index::Symbol(sym)) => {
                    format!("{name}[{}]", substitute_name(sym, &bindings))
                }
                Some(Index::Integer(i)) => format!("{name}[{i}]"),
                None => name,
            };

            self.define(key, substitute(&expr, &bindings), p.span, preferred)?;
        }

        Ok(())
    }

    fn define(
        &mut self,
        name: String,
        expr: Expr,
        span: Span,
        preferred: bool,
    ) -> Result<(), SimplifyError> {
        let Some(&first) = self.program.formula_spans.get(&name) else {
            if preferred {
                self.preferred.insert(name.clone());
            }

            self.program.formula_spans.insert(name.clone(), span);
            self.program.formulas.insert(name, expr);

            return Ok(());
        };

        match (self.preferred.contains(&name), preferred) {
            (true, true) => Err(SimplifyError::Redefinition(name, first, span)),

            (false, true) => {
                tracing::debug!(
                    formula = %name,
                    "preferred definition replaces earlier definition",
                );

                self.preferred.insert(name.clone());
                self.program.formula_spans.insert(name.clone(), span);
                self.program.formulas.insert(name, expr);

                Ok(())
            }

            (_, false) => {
                tracing::debug!(
                    formula = %name,
                    "ignoring redefinition; keeping first definition",
                );

                Ok(())
            }
        }
    }

    pub fn finish(self) -> Program {
        self.program
    }
}

/// Error while simplifying declarations.
#[derive(Debug, PartialEq)]
pub enum SimplifyError {
    /// A formula was defined twice by rules of the preferred application.
    ///
    /// The spans are of the first and second definitions respectively.
    Redefinition(String, Span, Span),

    /// The expression of a formula could not be desugared.
    Desugar(String, Span, DesugarError),

    /// A constant was declared twice with different values.
    ConstantConflict {
        name: String,
        first: (Span, f64),
        second: (Span, f64),
    },
}

impl Display for SimplifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redefinition(name, _, _) => {
                write!(f, "formula `{name}` is defined more than once")
            }
            Self::Desugar(name, _, e) => {
                write!(f, "in formula `{name}`: {e}")
            }
            Self::ConstantConflict { name, .. } => {
                write!(f, "conflicting values for constant `{name}`")
            }
        }
    }
}

impl Error for SimplifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Desugar(_, _, e) => Some(e),
            _ => None,
        }
    }
}

impl Diagnostic for SimplifyError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::Redefinition(name, first, second) => vec![
                first.note(format!("`{name}` first defined here")),
                second.error("redefined here"),
                second.help(
                    "a formula may be defined only once by rules of the \
                        preferred application",
                ),
            ],

            Self::Desugar(_, span, _) => {
                span.error("while desugaring this formula").into()
            }

            Self::ConstantConflict {
                first: (first, a),
                second: (second, b),
                ..
            } => vec![
                first.note(format!("first declared with value {a}")),
                second.error(format!("redeclared with value {b}")),
            ],
        }
    }
}
