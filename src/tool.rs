// Copyright (c) 2018 Fabian Schuiki
#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
extern crate lr0gen;
extern crate memmap;
extern crate stderrlog;

use std::fs::File;
use std::io::{self, Write};
use std::process;

use clap::{App, Arg, ArgMatches};
use memmap::Mmap;

use lr0gen::automaton::Automaton;
use lr0gen::codegen::generate_parser;
use lr0gen::parser;

fn main() {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all output"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("FILE")
                .help("Write the generated recognizer to FILE instead of stdout"),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .takes_value(true)
                .value_name("NAME")
                .help("Use NAME as the start symbol"),
        )
        .arg(
            Arg::with_name("dump-grammar")
                .long("dump-grammar")
                .help("Print the grammar to stderr"),
        )
        .arg(
            Arg::with_name("dump-states")
                .long("dump-states")
                .help("Print the LR(0) states to stderr"),
        )
        .arg(
            Arg::with_name("GRAMMAR")
                .help("The grammar description to process")
                .required(true)
                .index(1),
        )
        .get_matches();

    let logger = stderrlog::new()
        .module(module_path!())
        .quiet(matches.is_present("quiet"))
        .verbosity(matches.occurrences_of("verbosity") as usize + 1)
        .init();
    if let Err(e) = logger {
        eprintln!("cannot initialize logging: {}", e);
    }

    if let Err(msg) = run(&matches) {
        error!("{}", msg);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let path = matches.value_of("GRAMMAR").unwrap_or_default();
    let file = File::open(path).map_err(|e| format!("cannot open {}: {}", path, e))?;
    let len = file.metadata()
        .map_err(|e| format!("cannot stat {}: {}", path, e))?
        .len();

    // Mapping an empty file fails on some platforms.
    let mut grammar = if len == 0 {
        parser::load("")
    } else {
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| format!("cannot map {}: {}", path, e))?;
        let text = std::str::from_utf8(&mmap)
            .map_err(|e| format!("{} is not valid UTF-8: {}", path, e))?;
        parser::load(text)
    }.map_err(|e| format!("{}: {}", path, e))?;

    if let Some(name) = matches.value_of("start") {
        match grammar.symbol_by_name(name) {
            Some(id) => grammar.set_start(id),
            None => return Err(format!("unknown start symbol `{}`", name)),
        }
    }
    debug!(
        "loaded {} symbols and {} rules from {}",
        grammar.symbol_count(),
        grammar.rule_count(),
        path
    );
    if matches.is_present("dump-grammar") {
        eprint!("{}", grammar);
    }

    let automaton = Automaton::build(&grammar).map_err(|e| format!("cannot build states: {}", e))?;
    if matches.is_present("dump-states") {
        eprint!("{}", automaton.pretty(&grammar));
    }

    let conflicts = match matches.value_of("output") {
        Some(out) => {
            let mut f = File::create(out).map_err(|e| format!("cannot create {}: {}", out, e))?;
            generate_parser(&mut f, &grammar, &automaton)
                .and_then(|c| f.flush().map(|_| c))
                .map_err(|e| format!("cannot write {}: {}", out, e))?
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            generate_parser(&mut lock, &grammar, &automaton)
                .map_err(|e| format!("cannot write output: {}", e))?
        }
    };
    if !conflicts.is_empty() {
        info!(
            "{} conflicts in {} states",
            conflicts.len(),
            automaton.state_count()
        );
    }
    Ok(())
}
