// Copyright (c) 2018 Fabian Schuiki

//! A parser for grammar descriptions.
//!
//! The description language is
//!
//! ```text
//! desc := rule*
//! rule := IDENT ':' alt ('|' alt)* ';'
//! alt  := IDENT*
//! ```
//!
//! where an empty alternative denotes an epsilon rule.

use std::iter::Peekable;

use error::{Error, Result};
use grammar::Grammar;
use lexer::{Lexer, Token};

/// The abstract syntax tree of a grammar description.
pub mod ast {
    /// The root node of a grammar description.
    #[derive(Debug, PartialEq, Eq, Hash)]
    pub struct Desc {
        /// The rule declarations.
        pub rules: Vec<RuleDecl>,
    }

    /// A rule declaration.
    #[derive(Debug, PartialEq, Eq, Hash)]
    pub struct RuleDecl {
        /// The name of the rule.
        pub name: String,
        /// The different variants of the rule.
        pub variants: Vec<Vec<String>>,
    }
}

struct Parser<I: Iterator<Item = (usize, usize, Token)>> {
    input: Peekable<I>,
    end: usize,
}

impl<I: Iterator<Item = (usize, usize, Token)>> Parser<I> {
    fn error<T, S: Into<String>>(&mut self, message: S) -> Result<T> {
        let offset = match self.input.peek() {
            Some(&(offset, _, _)) => offset,
            None => self.end,
        };
        Err(Error::Syntax {
            offset: offset,
            message: message.into(),
        })
    }

    fn found(&mut self) -> String {
        match self.input.peek() {
            Some(&(_, _, ref tkn)) => format!("{}", tkn),
            None => "end of input".into(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let matches = match self.input.peek() {
            Some(&(_, _, ref tkn)) => *tkn == expected,
            None => false,
        };
        if !matches {
            let found = self.found();
            return self.error(format!("expected {}, found {}", expected, found));
        }
        self.input.next();
        Ok(())
    }

    fn ident(&mut self) -> Option<String> {
        match self.input.peek() {
            Some(&(_, _, Token::Ident(_))) => (),
            _ => return None,
        }
        match self.input.next() {
            Some((_, _, Token::Ident(name))) => Some(name),
            _ => None,
        }
    }

    fn parse_desc(&mut self) -> Result<ast::Desc> {
        let mut rules = Vec::new();
        while self.input.peek().is_some() {
            rules.push(self.parse_rule()?);
        }
        Ok(ast::Desc { rules: rules })
    }

    fn parse_rule(&mut self) -> Result<ast::RuleDecl> {
        let name = match self.ident() {
            Some(name) => name,
            None => {
                let found = self.found();
                return self.error(format!("expected rule name, found {}", found));
            }
        };
        self.expect(Token::Colon)?;
        let mut variants = vec![self.parse_sequence()];
        while let Some(&(_, _, Token::Pipe)) = self.input.peek() {
            self.input.next();
            variants.push(self.parse_sequence());
        }
        self.expect(Token::Semicolon)?;
        Ok(ast::RuleDecl {
            name: name,
            variants: variants,
        })
    }

    fn parse_sequence(&mut self) -> Vec<String> {
        let mut seq = Vec::new();
        while let Some(name) = self.ident() {
            seq.push(name);
        }
        seq
    }
}

/// Parse a sequence of tokens given by an iterator.
///
/// `end` is the offset reported for errors at the end of the input.
pub fn parse_iter<I>(input: I, end: usize) -> Result<ast::Desc>
where
    I: Iterator<Item = (usize, usize, Token)>,
{
    Parser {
        input: input.peekable(),
        end: end,
    }.parse_desc()
}

/// Parse a grammar description.
pub fn parse_str(input: &str) -> Result<ast::Desc> {
    parse_iter(Lexer::new(input.char_indices()), input.len())
}

/// Convert the grammar description into an actual grammar.
///
/// The first rule declared names the start symbol. Names that never appear on
/// the left of a rule are terminals.
pub fn make_grammar(desc: &ast::Desc) -> Result<Grammar> {
    let mut grammar = Grammar::new();
    for d in &desc.rules {
        grammar.add_symbol(&d.name)?;
    }
    for d in &desc.rules {
        for v in &d.variants {
            grammar.add_production(&d.name, &v[..])?;
        }
    }
    Ok(grammar)
}

/// Parse a grammar description and build the grammar it describes.
pub fn load(input: &str) -> Result<Grammar> {
    make_grammar(&parse_str(input)?)
}
