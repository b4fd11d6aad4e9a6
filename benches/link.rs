// Linker benchmarks
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

// A full corpus unrolls into tens of thousands of formulas with long
// dependency chains; these benchmarks approximate that shape with a single
// chain plus a fan-in on every tenth formula.

#[macro_use]
extern crate criterion;
extern crate mlang;

use criterion::{black_box, Criterion};
use mlang::{
    asg::{extract, Dependencies},
    ld::{link, prune},
    nir::{Program, ProgramBuilder, Selector},
    parse::parse_source,
    span::Context,
};
use std::fmt::Write;

const CHAIN_LEN: usize = 20_000;

fn corpus(n: usize) -> String {
    let mut src = String::from("K : const = 2;\n");
    src.push_str("regle 1:\napplication: batch;\nF0 = K;\n");

    for i in 1..n {
        let _ = if i % 10 == 0 {
            writeln!(src, "F{i} = F{} + F{} * K;", i - 1, i / 2)
        } else {
            writeln!(src, "F{i} = F{} + 1;", i - 1)
        };
    }

    src
}

fn program(n: usize) -> (Program, Dependencies) {
    let ctx = Context::from_index(0).expect("no context");
    let decls = parse_source(&corpus(n), ctx).expect("corpus failed to parse");

    let mut builder = ProgramBuilder::new(Selector::default());
    builder.add_declarations(decls).expect("corpus failed to simplify");

    let program = builder.finish();
    let deps = extract(&program);

    (program, deps)
}

fn bench_extract(c: &mut Criterion) {
    let (program, _) = program(CHAIN_LEN);

    c.bench_function("extract_chain", |b| {
        b.iter(|| extract(black_box(&program)))
    });
}

fn bench_prune(c: &mut Criterion) {
    let (program, deps) = program(CHAIN_LEN);
    let roots = [format!("F{}", CHAIN_LEN - 1)];

    c.bench_function("prune_chain", |b| {
        b.iter(|| prune(black_box(&program), &deps, &roots))
    });
}

fn bench_link(c: &mut Criterion) {
    let (program, deps) = program(CHAIN_LEN);
    let roots = [format!("F{}", CHAIN_LEN - 1)];

    c.bench_function("link_chain", |b| {
        b.iter(|| link(black_box(&program), &deps, &roots))
    });
}

criterion_group!(link_benches, bench_extract, bench_prune, bench_link);
criterion_main!(link_benches);
