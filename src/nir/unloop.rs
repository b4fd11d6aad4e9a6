// Loop unrolling
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

//! Unrolling of loop variables.
//!
//! A loop variable ranges over a domain of values.
//! Unrolling clones a template once per value
//!   (or per tuple of values for multiple variables)
//!   and substitutes each value for the loop variable _textually_ within
//!   names:
//!     given `i` ranging over `1, 2`,
//!       the symbol `Vi` becomes `V1` and then `V2`.
//!
//! Substitution replaces _every_ occurrence of the loop variable within a
//!   name,
//!     one loop variable at a time in declaration order.
//! A name that contains a loop variable twice thus has both occurrences
//!   replaced.

use super::Expr;
use crate::ast::{DomainPart, LoopVariable};

/// A loop variable bound to one value of its domain.
pub type Binding<'a> = (&'a str, String);

/// Values of a domain as substitution tokens,
///   in order.
///
/// Intervals are expanded eagerly;
///   an interval whose last value precedes its first is empty.
pub fn flatten_domain(domain: &[DomainPart]) -> Vec<String> {
    let mut tokens = Vec::new();

    for part in domain {
        match part {
            DomainPart::Values(values) => {
                tokens.extend(values.iter().map(ToString::to_string))
            }
            DomainPart::Interval { first, last } => {
                tokens.extend((*first..=*last).map(|i| i.to_string()))
            }
        }
    }

    tokens
}

/// Every combination of values of `vars`.
///
/// Tuples are produced in lexicographic order:
///   the first variable varies slowest and the last fastest.
/// The number of tuples is the product of the sizes of all domains,
///   which is zero if any domain is empty.
pub fn cartesian(vars: &[LoopVariable]) -> Vec<Vec<Binding>> {
    vars.iter().fold(vec![vec![]], |tuples, var| {
        let values = flatten_domain(&var.domain);

        tuples
            .into_iter()
            .flat_map(|prefix| {
                values.iter().map(move |value| {
                    let mut tuple = prefix.clone();
                    tuple.push((var.name.as_str(), value.clone()));
                    tuple
                })
            })
            .collect()
    })
}

/// Substitute each binding into `name`,
///   replacing all occurrences of each loop variable.
pub fn substitute_name(name: &str, bindings: &[Binding]) -> String {
    bindings
        .iter()
        .fold(name.to_string(), |name, (var, value)| {
            if var.is_empty() {
                name
            } else {
                name.replace(var, value)
            }
        })
}

/// Clone `expr`,
///   substituting `bindings` into every symbol name.
///
/// A symbol that becomes entirely numeric is replaced by a literal
///   (see [`Expr::from_name`]).
pub fn substitute(expr: &Expr, bindings: &[Binding]) -> Expr {
    let mut out = expr.clone();
    let mut stack = vec![&mut out];

    while let Some(node) = stack.pop() {
        match node {
            Expr::Symbol(name) => {
                let new = substitute_name(name, bindings);
                if new != *name {
                    *node = Expr::from_name(new);
                }
            }
            Expr::Literal(_) => (),
            Expr::Call(_, args) => stack.extend(args.iter_mut()),
        }
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ast::LoopValue, nir::Op};

    fn var(name: &str, domain: Vec<DomainPart>) -> LoopVariable {
        LoopVariable {
            name: name.into(),
            domain,
        }
    }

    fn interval(first: i64, last: i64) -> DomainPart {
        DomainPart::Interval { first, last }
    }

    fn values(syms: &[&str]) -> DomainPart {
        DomainPart::Values(
            syms.iter().map(|s| LoopValue::Symbol(s.to_string())).collect(),
        )
    }

    #[test]
    fn flatten_values_then_intervals() {
        let domain = vec![
            DomainPart::Values(vec![
                LoopValue::Integer(9),
                LoopValue::Symbol("V".into()),
            ]),
            interval(1, 3),
            interval(5, 4),
        ];

        assert_eq!(flatten_domain(&domain), vec!["9", "V", "1", "2", "3"]);
    }

    #[test]
    fn cartesian_cardinality_is_product_of_domains() {
        let vars = vec![
            var("i", vec![interval(1, 3)]),
            var("j", vec![values(&["V", "C", "P"]), interval(0, 1)]),
        ];

        let tuples = cartesian(&vars);
        assert_eq!(tuples.len(), 3 * 5);

        // First variable varies slowest.
        assert_eq!(
            tuples[0],
            vec![("i", "1".to_string()), ("j", "V".to_string())]
        );
        assert_eq!(
            tuples[1],
            vec![("i", "1".to_string()), ("j", "C".to_string())]
        );
        assert_eq!(
            tuples[14],
            vec![("i", "3".to_string()), ("j", "1".to_string())]
        );
    }

    #[test]
    fn cartesian_with_empty_domain_is_empty() {
        let vars = vec![var("i", vec![interval(1, 3)]), var("j", vec![])];

        assert!(cartesian(&vars).is_empty());
    }

    #[test]
    fn cartesian_of_no_variables_is_single_empty_tuple() {
        assert_eq!(cartesian(&[]), vec![Vec::<Binding>::new()]);
    }

    #[test]
    fn substitute_name_replaces_all_occurrences() {
        let bindings = [("i", "3".to_string())];

        assert_eq!(substitute_name("PiRi", &bindings), "P3R3");
        assert_eq!(substitute_name("PRN", &bindings), "PRN");
    }

    #[test]
    fn substitute_name_one_variable_at_a_time() {
        let bindings = [("i", "j".to_string()), ("j", "5".to_string())];

        // `i` becomes `j`,
        //   which is then itself substituted.
        assert_eq!(substitute_name("Xij", &bindings), "X55");
    }

    #[test]
    fn substitute_into_expression() {
        let expr = Expr::Call(
            Op::Add,
            vec![
                Expr::Symbol("Vi".into()),
                Expr::Symbol("i".into()),
                Expr::Literal(2.0),
                Expr::Call(
                    Op::Function("max".into()),
                    vec![Expr::Symbol("Wi".into())],
                ),
            ],
        );

        assert_eq!(
            substitute(&expr, &[("i", "7".to_string())]),
            Expr::Call(
                Op::Add,
                vec![
                    Expr::Symbol("V7".into()),
                    Expr::Literal(7.0),
                    Expr::Literal(2.0),
                    Expr::Call(
                        Op::Function("max".into()),
                        vec![Expr::Symbol("W7".into())]
                    ),
                ],
            )
        );
    }
}
