// Graph of identifiers and their dependencies
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

//! Directed graph of identifiers.
//!
//! An edge `A -> B` means that formula `A` references `B`.
//! Only formulas have outgoing edges.

use super::IdentKind;
use crate::{global, nir::NameMap};
use petgraph::graph::{DiGraph, NodeIndex};
use std::fmt::Debug;

type Ix = global::ProgIdentSize;

/// Index of an identifier on the [`Asg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef(NodeIndex<Ix>);

impl ObjectRef {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl From<NodeIndex<Ix>> for ObjectRef {
    fn from(index: NodeIndex<Ix>) -> Self {
        Self(index)
    }
}

impl From<ObjectRef> for NodeIndex<Ix> {
    fn from(objref: ObjectRef) -> Self {
        objref.0
    }
}

/// A named identifier on the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    name: String,
    kind: IdentKind,
}

impl Ident {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> IdentKind {
        self.kind
    }
}

/// Abstract semantic graph of identifiers.
///
/// Identifiers are declared once by name;
///   declaring an existing name yields the existing node.
/// The dependencies of a node are yielded in the order in which they were
///   added.
pub struct Asg {
    graph: DiGraph<Ident, (), Ix>,
    index: NameMap<ObjectRef>,
}

impl Default for Asg {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Asg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[ASG: {} identifiers, {} edges]",
            self.graph.node_count(),
            self.graph.edge_count(),
        )
    }
}

impl Asg {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn with_capacity(objects: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(objects, edges),
            index: NameMap::with_capacity_and_hasher(
                objects,
                Default::default(),
            ),
        }
    }

    /// Declare an identifier,
    ///   or retrieve the existing identifier of the same name.
    ///
    /// The kind of an existing identifier is not changed.
    pub fn declare(&mut self, name: &str, kind: IdentKind) -> ObjectRef {
        if let Some(&objref) = self.index.get(name) {
            return objref;
        }

        let objref = ObjectRef(self.graph.add_node(Ident {
            name: name.to_string(),
            kind,
        }));

        self.index.insert(name.to_string(), objref);
        objref
    }

    /// Record that `from` depends on `to`.
    pub fn add_dep(&mut self, from: ObjectRef, to: ObjectRef) {
        self.graph.add_edge(from.0, to.0, ());
    }

    pub fn lookup(&self, name: &str) -> Option<ObjectRef> {
        self.index.get(name).copied()
    }

    pub fn get(&self, objref: ObjectRef) -> Option<&Ident> {
        self.graph.node_weight(objref.0)
    }

    /// Name of the identifier,
    ///   or the empty string if it does not exist.
    pub fn name_of(&self, objref: ObjectRef) -> &str {
        self.get(objref).map(Ident::name).unwrap_or_default()
    }

    /// Direct dependencies of `objref` in the order they were added.
    pub fn dependencies(&self, objref: ObjectRef) -> Vec<ObjectRef> {
        // petgraph yields the most recently added edge first.
        let mut deps = self
            .graph
            .neighbors(objref.0)
            .map(ObjectRef)
            .collect::<Vec<_>>();

        deps.reverse();
        deps
    }

    pub fn object_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &DiGraph<Ident, (), Ix> {
        &self.graph
    }
}
