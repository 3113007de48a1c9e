// Copyright (c) 2018 Fabian Schuiki

//! Generation of recognizer source code from an automaton.
//!
//! Each state becomes one C routine `parse_N`, numbered by the state's index.
//! A state that reduces returns `NT_<lhs>`. Any other state switches on the
//! next token to shift into a successor routine, then switches on the
//! nonterminal that routine produced to continue in the goto target. The
//! consuming runtime provides `struct parser` with a `lex` callback and an
//! integer constant for every `TOKEN_<name>` and `NT_<name>`.

use std::io::{Result, Write};

use automaton::{Automaton, StateId};
use conflict::{resolve_state, Action, Conflict};
use grammar::{Grammar, SymbolId};

/// Naming options for the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Prefix of terminal constants.
    pub token_prefix: String,
    /// Prefix of nonterminal constants.
    pub nonterminal_prefix: String,
    /// Name of the entry routine; state routines append `_N`.
    pub routine_prefix: String,
    /// The parser context type passed to every routine.
    pub context_type: String,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            token_prefix: "TOKEN_".into(),
            nonterminal_prefix: "NT_".into(),
            routine_prefix: "parse".into(),
            context_type: "struct parser".into(),
        }
    }
}

/// Turn a symbol name into a C identifier fragment.
pub fn mangle(name: &str) -> String {
    name.replace('-', "_")
}

struct Context<'a> {
    grammar: &'a Grammar,
    automaton: &'a Automaton,
    options: &'a Options,
}

impl<'a> Context<'a> {
    fn routine(&self, id: StateId) -> String {
        format!("{}_{}", self.options.routine_prefix, id)
    }

    fn token(&self, symbol: SymbolId) -> String {
        format!(
            "{}{}",
            self.options.token_prefix,
            mangle(self.grammar.name(symbol))
        )
    }

    fn nonterminal(&self, symbol: SymbolId) -> String {
        format!(
            "{}{}",
            self.options.nonterminal_prefix,
            mangle(self.grammar.name(symbol))
        )
    }
}

/// Generate the recognizer with default options.
///
/// Returns the conflicts encountered on the way.
pub fn generate_parser<W: Write>(
    into: &mut W,
    grammar: &Grammar,
    automaton: &Automaton,
) -> Result<Vec<Conflict>> {
    generate_parser_with(into, grammar, automaton, &Options::default())
}

/// Generate the recognizer with the given options.
///
/// Returns the conflicts encountered on the way. An automaton without a start
/// state produces no output.
pub fn generate_parser_with<W: Write>(
    into: &mut W,
    grammar: &Grammar,
    automaton: &Automaton,
    options: &Options,
) -> Result<Vec<Conflict>> {
    let ctx = Context {
        grammar: grammar,
        automaton: automaton,
        options: options,
    };
    let start = match automaton.start() {
        Some(start) => start,
        None => return Ok(Vec::new()),
    };

    for id in automaton.states() {
        write!(
            into,
            "static int {} ({} *c);\n",
            ctx.routine(id),
            options.context_type
        )?;
    }

    let mut conflicts = Vec::new();
    for id in automaton.states() {
        let (action, mut found) = resolve_state(grammar, automaton, id);
        generate_state(into, &ctx, id, action)?;
        conflicts.append(&mut found);
    }

    write!(
        into,
        "\nint {} ({} *c)\n{{\n\treturn {} (c);\n}}\n",
        options.routine_prefix,
        options.context_type,
        ctx.routine(start)
    )?;
    Ok(conflicts)
}

fn generate_state<W: Write>(into: &mut W, ctx: &Context, id: StateId, action: Action) -> Result<()> {
    write!(
        into,
        "\nstatic int {} ({} *c)\n{{\n",
        ctx.routine(id),
        ctx.options.context_type
    )?;
    match action {
        Action::Reduce(rule) => {
            let lhs = ctx.grammar.rule(rule).lhs();
            write!(into, "\treturn {};\n", ctx.nonterminal(lhs))?;
        }
        Action::Shift => {
            let state = ctx.automaton.state(id);
            write!(into, "\tint ret;\n")?;

            write!(into, "\n\tswitch (c->lex (c)) {{\n")?;
            for arrow in state.arrows().filter(|a| ctx.grammar.is_terminal(a.on())) {
                write!(
                    into,
                    "\tcase {}: ret = {} (c); break;\n",
                    ctx.token(arrow.on()),
                    ctx.routine(arrow.to())
                )?;
            }
            write!(into, "\tdefault: return -1;\n\t}}\n")?;

            write!(into, "\n\tswitch (ret) {{\n")?;
            for arrow in state.arrows().filter(|a| !ctx.grammar.is_terminal(a.on())) {
                write!(
                    into,
                    "\tcase {}: return {} (c);\n",
                    ctx.nonterminal(arrow.on()),
                    ctx.routine(arrow.to())
                )?;
            }
            write!(into, "\tdefault: return -1;\n\t}}\n")?;

            write!(into, "\n\treturn -1;  /* never be here */\n")?;
        }
    }
    write!(into, "}}\n")?;
    Ok(())
}
