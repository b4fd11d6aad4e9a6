// Evaluation order of formulas
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

//! Topological ordering of the formulas of an [`Asg`].
//!
//! This is a depth-first post-order traversal from each root in turn;
//!   a formula is emitted only after all formulas it depends on.
//! Each formula is emitted at most once,
//!   which also guarantees termination in the presence of cycles;
//!     cycles are reported separately by [`check_cycles`].

use crate::asg::{Asg, IdentKind, ObjectRef};
use fixedbitset::FixedBitSet;
use petgraph::algo::tarjan_scc;
use std::vec::IntoIter;

/// Depth-first post-order traversal of formulas.
///
/// Only dependencies of kind [`IdentKind::Formula`] are visited;
///   constants,
///   inputs,
///   and unknown names impose no ordering.
///
/// This uses an explicit stack so that long dependency chains cannot
///   exhaust the native stack.
pub struct TopoPostOrderDfs<'a> {
    asg: &'a Asg,
    roots: IntoIter<ObjectRef>,

    /// Nodes whose dependencies are being visited,
    ///   along with the dependencies not yet visited.
    stack: Vec<(ObjectRef, IntoIter<ObjectRef>)>,

    /// Nodes that have been pushed onto the stack at some point.
    discovered: FixedBitSet,
}

impl<'a> TopoPostOrderDfs<'a> {
    pub fn new<I>(asg: &'a Asg, roots: I) -> Self
    where
        I: IntoIterator<Item = ObjectRef>,
    {
        Self {
            asg,
            roots: roots.into_iter().collect::<Vec<_>>().into_iter(),
            stack: Vec::new(),
            discovered: FixedBitSet::with_capacity(asg.object_count()),
        }
    }

    fn is_formula(&self, objref: ObjectRef) -> bool {
        self.asg
            .get(objref)
            .map_or(false, |ident| ident.kind() == IdentKind::Formula)
    }

    /// Push `objref` unless it has already been discovered.
    fn visit(&mut self, objref: ObjectRef) {
        if !self.is_formula(objref) || self.discovered.put(objref.index()) {
            return;
        }

        tracing::trace!(
            depth = self.stack.len(),
            formula = self.asg.name_of(objref),
            "visit",
        );

        let deps = self.asg.dependencies(objref).into_iter();
        self.stack.push((objref, deps));
    }
}

impl<'a> Iterator for TopoPostOrderDfs<'a> {
    type Item = ObjectRef;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next_dep = self
                .stack
                .last_mut()
                .map(|(objref, deps)| deps.next().ok_or(*objref));

            match next_dep {
                Some(Ok(dep)) => self.visit(dep),
                Some(Err(done)) => {
                    self.stack.pop();
                    return Some(done);
                }
                None => {
                    let root = self.roots.next()?;
                    self.visit(root);
                }
            }
        }
    }
}

/// Names of the formulas reachable from `roots` in evaluation order.
///
/// Roots that are not on the graph are ignored.
pub fn sort<S: AsRef<str>>(asg: &Asg, roots: &[S]) -> Vec<String> {
    let roots = roots.iter().filter_map(|root| asg.lookup(root.as_ref()));

    TopoPostOrderDfs::new(asg, roots)
        .map(|objref| asg.name_of(objref).to_string())
        .collect()
}

/// Strongly connected components of the graph that form cycles.
///
/// A single formula forms a cycle only if it depends on itself.
/// Cycles are not fatal:
///   the formulas of a cycle are still ordered,
///     but the order cannot satisfy all of their dependencies.
pub fn check_cycles(asg: &Asg) -> Vec<Vec<String>> {
    let graph = asg.graph();

    tarjan_scc(graph)
        .into_iter()
        .filter(|scc| {
            scc.len() > 1 || graph.neighbors(scc[0]).any(|nx| nx == scc[0])
        })
        .map(|scc| {
            // `tarjan_scc` yields nodes in reverse topological order.
            scc.into_iter()
                .rev()
                .map(|nx| asg.name_of(nx.into()).to_string())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn graph(edges: &[(&str, &str)], consts: &[&str]) -> Asg {
        let mut asg = Asg::new();

        for (from, to) in edges {
            let kind = if consts.contains(to) {
                IdentKind::Const
            } else {
                IdentKind::Formula
            };

            let from = asg.declare(from, IdentKind::Formula);
            let to = asg.declare(to, kind);
            asg.add_dep(from, to);
        }

        asg
    }

    fn position(order: &[String], name: &str) -> usize {
        order
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("`{name}` missing from order"))
    }

    #[test]
    fn dependencies_first() {
        let asg = graph(&[("A", "K"), ("A", "B")], &["K"]);

        assert_eq!(sort(&asg, &["A"]), vec!["B", "A"]);
    }

    #[test]
    fn diamond_emitted_once() {
        let asg = graph(
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
            &[],
        );

        assert_eq!(sort(&asg, &["A"]), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn roots_in_order_without_duplicates() {
        let asg = graph(&[("A", "C"), ("B", "C"), ("B", "A")], &[]);

        let order = sort(&asg, &["A", "B", "A", "MISSING"]);

        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn every_formula_follows_its_dependencies() {
        let edges = [
            ("R", "A"),
            ("R", "B"),
            ("A", "C"),
            ("A", "D"),
            ("B", "D"),
            ("B", "E"),
            ("D", "F"),
            ("E", "F"),
            ("C", "K"),
        ];
        let asg = graph(&edges, &["K"]);

        let order = sort(&asg, &["R"]);

        assert_eq!(order.len(), 7);
        for (from, to) in edges.iter().filter(|(_, to)| *to != "K") {
            assert!(position(&order, to) < position(&order, from));
        }
    }

    #[test]
    fn cycle_terminates_and_is_reported() {
        let asg = graph(&[("A", "B"), ("B", "C"), ("C", "B"), ("D", "D")], &[]);

        let order = sort(&asg, &["A", "D"]);
        assert_eq!(order, vec!["C", "B", "A", "D"]);

        let mut cycles = check_cycles(&asg);
        cycles.iter_mut().for_each(|c| c.sort());
        cycles.sort();

        assert_eq!(cycles, vec![vec!["B", "C"], vec!["D"]]);
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let asg = graph(&[("A", "B"), ("B", "C")], &[]);

        assert!(check_cycles(&asg).is_empty());
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let mut asg = Asg::new();
        let mut prev = asg.declare("F0", IdentKind::Formula);

        for i in 1..100_000 {
            let next = asg.declare(&format!("F{i}"), IdentKind::Formula);
            asg.add_dep(next, prev);
            prev = next;
        }

        let order = sort(&asg, &["F99999"]);

        assert_eq!(order.len(), 100_000);
        assert_eq!(order.first().map(String::as_str), Some("F0"));
        assert_eq!(order.last().map(String::as_str), Some("F99999"));
    }
}
