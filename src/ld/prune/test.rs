// Tests for reachability pruning
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

use super::*;
use crate::{
    asg::extract,
    nir::{Op, ProgramBuilder, Selector},
    parse::parse_source,
    span::dummy::DUMMY_CONTEXT,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn program(src: &str) -> Program {
    let decls = parse_source(src, DUMMY_CONTEXT)
        .unwrap_or_else(|e| panic!("failed to parse: {e:?}"));

    let mut builder = ProgramBuilder::new(Selector::default());
    builder
        .add_declarations(decls)
        .unwrap_or_else(|e| panic!("failed to simplify: {e:?}"));

    builder.finish()
}

fn regle(formulas: &str) -> String {
    format!("regle R:\napplication: batch;\n{formulas}")
}

fn names(set: &NameSet) -> Vec<&str> {
    set.iter().map(String::as_str).collect()
}

fn sym(name: &str) -> Expr {
    Expr::Symbol(name.into())
}

#[test]
fn const_and_formula_chain() -> TestResult {
    let p = program(&format!(
        "K : const = 2;\n{}",
        regle("A = K * B;\nB = 3;\nC = 4;\n")
    ));
    let deps = extract(&p);

    let pruned = prune(&p, &deps, &["A"])?;

    assert_eq!(pruned.constants.get("K"), Some(&2.0));
    assert_eq!(pruned.constants.len(), 1);
    assert_eq!(
        pruned.formulas.get("A"),
        Some(&Expr::Call(Op::Mul, vec![sym("K"), sym("B")]))
    );
    assert_eq!(pruned.formulas.get("B"), Some(&Expr::Literal(3.0)));

    // Unreachable.
    assert!(!pruned.formulas.contains_key("C"));

    assert!(pruned.inputs.is_empty());
    assert!(pruned.useful.unknowns.is_empty());
    assert!(pruned.missing_roots.is_empty());

    assert_eq!(names(&pruned.children["A"]), vec!["B"]);
    assert!(pruned.children["B"].is_empty());

    Ok(())
}

#[test]
fn unknown_name_is_tolerated() -> TestResult {
    let p = program(&regle("A = X + 1;\n"));
    let deps = extract(&p);

    let pruned = prune(&p, &deps, &["A"])?;

    assert_eq!(names(&pruned.useful.unknowns), vec!["X"]);
    assert_eq!(names(&pruned.useful.formulas), vec!["A"]);
    assert_eq!(
        pruned.formulas.get("A"),
        Some(&Expr::Call(Op::Add, vec![sym("X"), Expr::Literal(1.0)]))
    );

    Ok(())
}

#[test]
fn inputs_by_name_or_alias() -> TestResult {
    let p = program(&format!(
        "V_0AC : saisie famille alias AC : \"x\";\n\
         V_0AM : saisie famille alias AM : \"y\";\n\
         V_0AX : saisie famille : \"z\";\n{}",
        regle("A = AC + V_0AX;\n")
    ));
    let deps = extract(&p);

    let pruned = prune(&p, &deps, &["A"])?;

    assert_eq!(names(&pruned.useful.inputs), vec!["AC", "V_0AX"]);
    assert_eq!(
        pruned.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
        vec!["V_0AC", "V_0AX"]
    );

    Ok(())
}

#[test]
fn missing_root_is_skipped() -> TestResult {
    let p = program(&format!("K : const = 1;\n{}", regle("A = 1;\n")));
    let deps = extract(&p);

    let pruned = prune(&p, &deps, &["NOPE", "A", "K"])?;

    assert_eq!(pruned.missing_roots, vec!["NOPE", "K"]);
    assert_eq!(names(&pruned.useful.formulas), vec!["A"]);

    // A root that is only a constant does not make it useful.
    assert!(pruned.constants.is_empty());

    Ok(())
}

#[test]
fn pruning_is_deterministic() -> TestResult {
    let p = program(&format!(
        "K : const = 1;\nL : const = 2;\n{}",
        regle(
            "A = B + C + K;\nB = D * L;\nC = D + X;\nD = Y;\nE = A;\n\
             pour i = 1..3 : Fi = Ai + K;\n",
        )
    ));
    let deps = extract(&p);
    let roots = ["A", "F2"];

    let first = prune(&p, &deps, &roots)?;
    let second = prune(&p, &deps, &roots)?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn pruning_is_sound_and_complete() -> TestResult {
    let p = program(&format!(
        "K : const = 1;\n{}",
        regle(
            "A = B + C;\nB = D;\nC = D + K;\nD = 1;\n\
             U = V;\nV = W + K;\nW = U;\n",
        )
    ));
    let deps = extract(&p);

    let pruned = prune(&p, &deps, &["A"])?;

    // Reachable set computed independently by fixpoint.
    let mut reachable = NameSet::default();
    reachable.insert("A".to_string());

    loop {
        let before = reachable.len();
        let next = reachable
            .iter()
            .flat_map(|name| deps.children(name).into_iter().flatten())
            .filter(|child| p.formulas.contains_key(*child))
            .cloned()
            .collect::<Vec<_>>();

        reachable.extend(next);

        if reachable.len() == before {
            break;
        }
    }

    let mut useful = names(&pruned.useful.formulas);
    let mut expected = names(&reachable);
    useful.sort_unstable();
    expected.sort_unstable();

    assert_eq!(useful, expected);
    assert!(!pruned.formulas.contains_key("U"));

    Ok(())
}

#[test]
fn pruned_maps_keep_program_order() -> TestResult {
    let p = program(&regle("C = 1;\nB = 2;\nA = B + C;\n"));
    let deps = extract(&p);

    let pruned = prune(&p, &deps, &["A"])?;

    assert_eq!(
        pruned.formulas.keys().collect::<Vec<_>>(),
        vec!["C", "B", "A"]
    );

    Ok(())
}

#[test]
fn self_reference_terminates() -> TestResult {
    let p = program(&regle("A = A + 1;\n"));
    let deps = extract(&p);

    let pruned = prune(&p, &deps, &["A"])?;

    assert_eq!(names(&pruned.useful.formulas), vec!["A"]);
    assert_eq!(names(&pruned.children["A"]), vec!["A"]);

    Ok(())
}

#[test]
fn unclassified_name_is_internal_error() {
    let p = program(&regle("A = 1;\n"));

    // Dependencies that disagree with the program.
    let mut deps = Dependencies::default();
    deps.children
        .insert("A".into(), ["GHOST".to_string()].into_iter().collect());

    match prune(&p, &deps, &["A"]) {
        Err(PruneError::Unclassified { name, parent, .. }) => {
            assert_eq!(name, "GHOST");
            assert_eq!(parent, "A");
        }
        other => panic!("expected unclassified name, got {other:?}"),
    }
}

#[test]
fn missing_dependencies_is_internal_error() {
    let p = program(&regle("A = 1;\n"));

    assert!(matches!(
        prune(&p, &Dependencies::default(), &["A"]),
        Err(PruneError::MissingDependencies(name, Some(_))) if name == "A"
    ));
}
