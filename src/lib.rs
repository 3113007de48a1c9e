// Copyright (c) 2018 Fabian Schuiki

//! An LR(0) automaton builder and recognizer generator.
//!
//! A `grammar::Grammar` is populated with rules, either directly or from a
//! textual description via `parser::load`. `automaton::Automaton::build`
//! computes its canonical collection of LR(0) item sets, `conflict` reports
//! the ambiguities of that automaton, and `codegen` emits one recognizer
//! routine per state.

#![deny(missing_docs)]

extern crate bit_set;
extern crate indexmap;
#[macro_use]
extern crate log;

pub mod atom;
pub mod automaton;
mod build;
pub mod codegen;
pub mod conflict;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod table;

pub use error::{Error, Result};

/// A pretty printer.
pub struct Pretty<C, T> {
    ctx: C,
    item: T,
}

impl<C, T> Pretty<C, T> {
    pub(crate) fn new(ctx: C, item: T) -> Pretty<C, T> {
        Pretty { ctx, item }
    }
}
