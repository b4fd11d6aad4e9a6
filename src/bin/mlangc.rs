// MLANG compiler
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

//! This is the MLANG compiler.
//!
//! `mlangc` compiles a corpus of M source files into either an `xmlo`
//!   object file holding every selected formula,
//!   or an `xmle` file holding only what is needed to compute the
//!   requested roots,
//!     in evaluation order.

extern crate mlang;

use getopts::{Fail, Options};
use mlang::{
    diagnose::{FsSpanResolver, Reporter, VisualReporter},
    fs::SourceFiles,
    global,
    ld::{link, Linked},
    nir::Selector,
    obj::{xmle::XmleWriter, xmlo::XmloWriter},
    pipeline::{compile, load, Compiled, PipelineError, Summary},
};
use std::{
    env,
    fs::File,
    io::{self, BufWriter, Write},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Types of commands
#[derive(Debug)]
enum Command {
    Compile(Config),
    Usage,
}

/// Type of object file to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    /// Every selected formula,
    ///   unpruned and unordered.
    Xmlo,

    /// Formulas needed by the roots,
    ///   in evaluation order.
    Xmle,
}

/// Configuration of a compiler run.
#[derive(Debug, PartialEq)]
struct Config {
    inputs: Vec<String>,
    output: String,
    emit: Emit,
    applications: Vec<String>,
    preferred: String,
    roots: Vec<String>,
    fail_fast: bool,
    verbosity: usize,
}

impl Config {
    fn selector(&self) -> Selector {
        Selector::new(
            self.applications.iter().cloned(),
            Some(self.preferred.clone()),
        )
    }
}

/// Compile the sources of `config`,
///   writing to its output path.
///
/// Source failures that are not fatal are rendered to stderr as they are
///   encountered.
fn run(
    config: &Config,
    files: &mut SourceFiles,
) -> Result<(), PipelineError> {
    let sources = load(files, &config.inputs)?;

    let mut reporter =
        VisualReporter::new(FsSpanResolver::new(files.paths().to_vec()));

    let compiled = compile(
        sources,
        config.selector(),
        config.fail_fast,
        |path, e| {
            // Rendering to a string ensures buffering so that the report is
            //   not interleaved with log output.
            let report = reporter.render(e).to_string();
            eprintln!("{report}\nwarning: skipping `{}`", path.display());
        },
    )?;

    let linked = emit(config, &compiled)?;

    Summary::new(&compiled, linked.as_ref()).log();

    Ok(())
}

/// Write `compiled` to the output path of `config`,
///   linking it first if requested.
///
/// The output file is created only once there is something to write to
///   it.
fn emit(
    config: &Config,
    compiled: &Compiled,
) -> Result<Option<Linked>, PipelineError> {
    let io_err =
        |e: io::Error| PipelineError::Io(config.output.clone().into(), e);

    let create = || {
        File::create(&config.output)
            .map(BufWriter::new)
            .map_err(io_err)
    };

    match config.emit {
        Emit::Xmlo => {
            let mut writer = XmloWriter::new(create()?);
            writer.write(&compiled.program, &compiled.deps)?;
            writer.into_inner().flush().map_err(io_err)?;

            Ok(None)
        }
        Emit::Xmle => {
            let linked =
                link(&compiled.program, &compiled.deps, &config.roots)?;

            let mut writer = XmleWriter::new(create()?);
            writer.write(&linked, &config.roots)?;
            writer.into_inner().flush().map_err(io_err)?;

            Ok(Some(linked))
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity requested on the
///   command line.
fn init_tracing(verbosity: usize) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

/// Entrypoint for the compiler
pub fn main() {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = get_opts();
    let usage =
        opts.usage(&format!("Usage: {} [OPTIONS] INPUT...", program));

    match parse_options(opts, args) {
        Ok(Command::Compile(config)) => {
            init_tracing(config.verbosity);

            let mut files = SourceFiles::new();

            if let Err(e) = run(&config, &mut files) {
                let mut reporter = VisualReporter::new(FsSpanResolver::new(
                    files.paths().to_vec(),
                ));

                let report = reporter.render(&e).to_string();
                eprintln!(
                    "{report}\nfatal: failed to compile `{}`",
                    config.output
                );

                std::process::exit(1);
            }
        }
        Ok(Command::Usage) => {
            println!("{}", usage);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            eprintln!("{}", e);
            println!("{}", usage);
            std::process::exit(exitcode::USAGE);
        }
    }
}

/// Get 'Options'
///
/// ```
/// use getopts::Options;
///
/// let opts = get_opts();
/// ```
fn get_opts() -> Options {
    let mut opts = Options::new();
    opts.optopt("o", "output", "set output file name", "NAME");
    opts.optopt("", "emit", "set output type (default xmle)", "xmle|xmlo");
    opts.optmulti(
        "a",
        "application",
        "compile rules of application (default batch)",
        "NAME",
    );
    opts.optopt(
        "p",
        "prefer",
        "prefer definitions of application (default first -a)",
        "NAME",
    );
    opts.optmulti("r", "root", "compute variable", "NAME");
    opts.optflag("", "fail-fast", "abort on first unparsable file");
    opts.optflagmulti("v", "verbose", "increase log verbosity");
    opts.optflag("h", "help", "print this help menu");

    opts
}

/// Option parser
fn parse_options(opts: Options, args: Vec<String>) -> Result<Command, Fail> {
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            return Err(f);
        }
    };

    if matches.opt_present("h") {
        return Ok(Command::Usage);
    }

    if matches.free.is_empty() {
        return Err(Fail::OptionMissing(String::from("INPUT")));
    }

    let emit = match matches.opt_str("emit").as_deref() {
        None | Some("xmle") => Emit::Xmle,
        Some("xmlo") => Emit::Xmlo,
        Some(_) => {
            return Err(Fail::ArgumentMissing(String::from(
                "--emit xmle|xmlo",
            )))
        }
    };

    let output = match matches.opt_str("o") {
        Some(m) => m,
        None => return Err(Fail::OptionMissing(String::from("--output"))),
    };

    let mut applications = matches.opt_strs("a");
    if applications.is_empty() {
        applications.push(global::DEFAULT_APPLICATION.into());
    }

    let preferred = matches
        .opt_str("p")
        .unwrap_or_else(|| applications[0].clone());

    let mut roots = matches.opt_strs("r");
    if roots.is_empty() {
        roots = global::DEFAULT_ROOTS.iter().map(|&r| r.into()).collect();
    }

    let fail_fast = matches.opt_present("fail-fast");
    let verbosity = matches.opt_count("v");

    Ok(Command::Compile(Config {
        inputs: matches.free,
        output,
        emit,
        applications,
        preferred,
        roots,
        fail_fast,
        verbosity,
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use mlang::{fs::Source, span::Context};

    fn args(args: &[&str]) -> Vec<String> {
        std::iter::once("program")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    fn config(output: &std::path::Path, emit: Emit) -> Config {
        Config {
            inputs: vec![],
            output: output.display().to_string(),
            emit,
            applications: vec!["batch".into()],
            preferred: "batch".into(),
            roots: vec!["A".into()],
            fail_fast: false,
            verbosity: 0,
        }
    }

    fn compiled() -> Compiled {
        let src = Source {
            ctx: Context::from_index(0).unwrap(),
            path: "a.m".into(),
            bytes: b"regle 1:\napplication: batch;\nA = 1;\n".to_vec(),
        };

        compile(vec![Ok(src)], Selector::default(), false, |_, e| {
            panic!("unexpected failure: {e}")
        })
        .unwrap()
    }

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("mlangc-bin-{}-{name}", std::process::id()));

        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn emit_xmle_writes_linked_output() {
        let out = scratch("emit").join("out.xmle");

        let linked = emit(&config(&out, Emit::Xmle), &compiled()).unwrap();

        assert_eq!(linked.map(|l| l.order), Some(vec!["A".to_string()]));
        assert!(std::fs::read_to_string(&out).unwrap().contains("\"A\""));
    }

    #[test]
    fn failed_link_leaves_no_output() {
        let out = scratch("nolink").join("out.xmle");

        // Formulas without extracted dependencies cannot be linked.
        let mut compiled = compiled();
        compiled.deps = Default::default();

        let result = emit(&config(&out, Emit::Xmle), &compiled);

        assert!(matches!(result, Err(PipelineError::Link(_))));
        assert!(!out.exists());
    }

    #[test]
    fn output_error_names_path() {
        let out = scratch("nodir").join("missing").join("out.xmlo");

        match emit(&config(&out, Emit::Xmlo), &compiled()) {
            Err(e @ PipelineError::Io(..)) => {
                assert!(e.to_string().contains("out.xmlo"));
            }
            other => panic!("expected output error, got {other:?}"),
        }
    }

    #[test]
    fn parse_options_help() {
        let opts = get_opts();
        let result = parse_options(opts, args(&["-h"]));

        match result {
            Ok(Command::Usage) => {}
            _ => panic!("Help option did not parse"),
        }
    }

    #[test]
    fn parse_options_help_long() {
        let opts = get_opts();
        let result = parse_options(opts, args(&["--help"]));

        match result {
            Ok(Command::Usage) => {}
            _ => panic!("Long help option did not parse"),
        }
    }

    #[test]
    fn parse_options_invalid() {
        let opts = get_opts();
        let result = parse_options(opts, args(&["-q"]));

        match result {
            Err(Fail::UnrecognizedOption(_)) => {}
            _ => panic!("Invalid option not caught"),
        }
    }

    #[test]
    fn parse_options_missing_input() {
        let opts = get_opts();
        let result = parse_options(opts, args(&["-o", "out.xmle"]));

        match result {
            Err(Fail::OptionMissing(message)) => {
                assert_eq!("INPUT", message);
            }
            _ => panic!("Missing input not caught"),
        }
    }

    #[test]
    fn parse_options_missing_output() {
        let opts = get_opts();
        let result = parse_options(opts, args(&["src/"]));

        match result {
            Err(Fail::OptionMissing(message)) => {
                assert_eq!("--output", message);
            }
            _ => panic!("Missing output not caught"),
        }
    }

    #[test]
    fn parse_options_invalid_emit() {
        let opts = get_opts();
        let result = parse_options(
            opts,
            args(&["src/", "-o", "out", "--emit", "foo"]),
        );

        match result {
            Err(Fail::ArgumentMissing(message)) => {
                assert_eq!("--emit xmle|xmlo", message);
            }
            _ => panic!("Invalid emit not caught"),
        }
    }

    #[test]
    fn parse_options_defaults() {
        let opts = get_opts();
        let result = parse_options(opts, args(&["a.m", "b/", "-o", "out"]));

        match result {
            Ok(Command::Compile(config)) => {
                assert_eq!(config.inputs, vec!["a.m", "b/"]);
                assert_eq!(config.output, "out");
                assert_eq!(config.emit, Emit::Xmle);
                assert_eq!(config.applications, vec!["batch"]);
                assert_eq!(config.preferred, "batch");
                assert_eq!(config.roots, global::DEFAULT_ROOTS);
                assert!(!config.fail_fast);
                assert_eq!(config.verbosity, 0);
            }
            _ => panic!("Unexpected result"),
        }
    }

    #[test]
    fn parse_options_valid_custom() {
        let opts = get_opts();
        let result = parse_options(
            opts,
            args(&[
                "src/",
                "--output",
                "out.xmlo",
                "--emit",
                "xmlo",
                "-a",
                "iliad",
                "-a",
                "batch",
                "-r",
                "IRN",
                "--root",
                "NAPCR",
                "--fail-fast",
                "-vv",
            ]),
        );

        match result {
            Ok(Command::Compile(config)) => {
                assert_eq!(config.output, "out.xmlo");
                assert_eq!(config.emit, Emit::Xmlo);
                assert_eq!(config.applications, vec!["iliad", "batch"]);
                assert_eq!(config.preferred, "iliad");
                assert_eq!(config.roots, vec!["IRN", "NAPCR"]);
                assert!(config.fail_fast);
                assert_eq!(config.verbosity, 2);
            }
            _ => panic!("Unexpected result"),
        }
    }

    #[test]
    fn parse_options_explicit_preference() {
        let opts = get_opts();
        let result = parse_options(
            opts,
            args(&[
                "src/", "-o", "out", "-a", "iliad", "-a", "batch", "-p",
                "batch",
            ]),
        );

        match result {
            Ok(Command::Compile(config)) => {
                assert_eq!(config.preferred, "batch");
                assert!(config.selector().prefers(&["batch".into()]));
                assert!(!config.selector().prefers(&["iliad".into()]));
            }
            _ => panic!("Unexpected result"),
        }
    }
}
