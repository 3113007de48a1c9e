// Copyright (c) 2018 Fabian Schuiki

//! Data structures representing a grammar.
//!
//! A grammar owns its symbols, and each nonterminal owns the rules whose
//! left-hand side it is. Rules refer to symbols by `SymbolId`. A symbol without
//! any rules is a terminal.

use std;
use std::fmt;

use Pretty;
use atom::{Atom, AtomTable};
use error::{Error, Result};
use table::{hash_usize, Policy, Table};

/// A grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    names: AtomTable,
    symbols: Table<Symbol, SymbolPolicy>,
    start: Option<SymbolId>,
}

/// A terminal or nonterminal symbol.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: Atom,
    rules: Option<Table<Rule, RulePolicy>>,
}

/// A single rule within a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    lhs: SymbolId,
    symbols: Vec<SymbolId>,
}

/// A unique symbol identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(usize);

/// A unique rule identifier: the left-hand side and the rule's index among
/// the rules of that symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId {
    symbol: SymbolId,
    index: usize,
}

/// Symbols are identified by their interned name.
#[derive(Debug, Clone)]
struct SymbolPolicy;

impl Policy<Symbol> for SymbolPolicy {
    fn hash(&self, o: &Symbol) -> u64 {
        hash_usize(0, o.name.as_usize())
    }

    fn eq(&self, a: &Symbol, b: &Symbol) -> bool {
        a.name == b.name
    }
}

/// Rules of the same nonterminal are identified by their right-hand side.
#[derive(Debug, Clone)]
struct RulePolicy;

impl Policy<Rule> for RulePolicy {
    fn hash(&self, o: &Rule) -> u64 {
        o.symbols
            .iter()
            .fold(0, |hash, s| hash_usize(hash, s.as_usize()))
    }

    fn eq(&self, a: &Rule, b: &Rule) -> bool {
        a.symbols == b.symbols
    }
}

impl Grammar {
    /// Create a new empty grammar.
    pub fn new() -> Grammar {
        Grammar {
            names: AtomTable::new(),
            symbols: Table::new(SymbolPolicy),
            start: None,
        }
    }

    /// Intern a name in the grammar's name table.
    pub fn add_name(&mut self, name: &str) -> Result<Atom> {
        self.names.intern(name)
    }

    /// Add a symbol, or return the existing symbol with that name.
    pub fn add_symbol(&mut self, name: &str) -> Result<SymbolId> {
        if let Some(id) = self.symbol_by_name(name) {
            return Ok(id);
        }
        let name = self.add_name(name)?;
        match self.symbols.insert(Symbol { name, rules: None }) {
            Ok(index) => Ok(SymbolId(index)),
            Err(Error::AlreadyExists(index)) => Ok(SymbolId(index)),
            Err(e) => Err(e),
        }
    }

    /// Find a symbol by name.
    pub fn symbol_by_name(&self, name: &str) -> Option<SymbolId> {
        let atom = self.names.get(name)?;
        self.symbols
            .find(hash_usize(0, atom.as_usize()), |s| s.name == atom)
            .map(SymbolId)
    }

    /// Attach a rule to a symbol.
    ///
    /// Fails with `Error::GrammarMismatch` if the rule's left-hand side is not
    /// `symbol`, and with `Error::AlreadyExists` if the symbol already has a
    /// rule with the same right-hand side. The first symbol to receive a rule
    /// becomes the start symbol unless one has been set explicitly.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` does not belong to this grammar.
    pub fn insert_rule(&mut self, symbol: SymbolId, rule: Rule) -> Result<RuleId> {
        if rule.lhs != symbol {
            return Err(Error::GrammarMismatch {
                rule: self.name(rule.lhs).to_string(),
                symbol: self.name(symbol).to_string(),
            });
        }
        let index = {
            let sym = match self.symbols.get_mut(symbol.0) {
                Some(sym) => sym,
                None => panic!("insert_rule() called with unknown symbol {:?}", symbol),
            };
            sym.rules
                .get_or_insert_with(|| Table::new(RulePolicy))
                .insert(rule)?
        };
        if self.start.is_none() {
            self.start = Some(symbol);
        }
        Ok(RuleId {
            symbol: symbol,
            index: index,
        })
    }

    /// Add a rule `lhs → symbols`, or return the identical existing rule.
    pub fn add_rule(&mut self, lhs: SymbolId, symbols: Vec<SymbolId>) -> Result<RuleId> {
        match self.insert_rule(lhs, Rule::new(lhs, symbols)) {
            Err(Error::AlreadyExists(index)) => Ok(RuleId {
                symbol: lhs,
                index: index,
            }),
            r => r,
        }
    }

    /// Add a rule given by names, interning all symbols on the way.
    pub fn add_production<S: AsRef<str>>(&mut self, lhs: &str, rhs: &[S]) -> Result<RuleId> {
        let lhs = self.add_symbol(lhs)?;
        let mut symbols = Vec::new();
        symbols.try_reserve_exact(rhs.len())?;
        for name in rhs {
            symbols.push(self.add_symbol(name.as_ref())?);
        }
        self.add_rule(lhs, symbols)
    }

    /// The start symbol.
    pub fn start(&self) -> Option<SymbolId> {
        self.start
    }

    /// Override the start symbol.
    pub fn set_start(&mut self, symbol: SymbolId) {
        self.start = Some(symbol);
    }

    /// Access a symbol.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    /// The name of a symbol.
    pub fn name(&self, id: SymbolId) -> &str {
        self.names.name(self.symbol(id).name)
    }

    /// The name table of this grammar.
    pub fn names(&self) -> &AtomTable {
        &self.names
    }

    /// Whether a symbol has no rules.
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.symbol(id).is_terminal()
    }

    /// The number of symbols in the grammar.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// All symbols of the grammar, in the order they were added.
    pub fn symbols(&self) -> Symbols {
        Symbols(0..self.symbols.len())
    }

    /// All terminals of the grammar.
    pub fn terminals<'a>(&'a self) -> impl Iterator<Item = SymbolId> + 'a {
        self.symbols().filter(move |&id| self.is_terminal(id))
    }

    /// All nonterminals of the grammar.
    pub fn nonterminals<'a>(&'a self) -> impl Iterator<Item = SymbolId> + 'a {
        self.symbols().filter(move |&id| !self.is_terminal(id))
    }

    /// Access a single rule of this grammar.
    ///
    /// Panics if the rule does not belong to this grammar.
    pub fn rule(&self, id: RuleId) -> &Rule {
        match self.symbol(id.symbol).rules {
            Some(ref rules) => &rules[id.index],
            None => panic!("rule() called with a rule id of terminal {:?}", id.symbol),
        }
    }

    /// The rules of a symbol. Empty for terminals.
    pub fn rules_for(&self, id: SymbolId) -> RuleIds {
        RuleIds {
            symbol: id,
            range: 0..self.symbol(id).rule_count(),
        }
    }

    /// All rules of the grammar, grouped by left-hand side.
    pub fn rules<'a>(&'a self) -> impl Iterator<Item = RuleId> + 'a {
        self.symbols().flat_map(move |id| self.rules_for(id))
    }

    /// The number of rules in the grammar.
    pub fn rule_count(&self) -> usize {
        self.symbols.iter().map(|s| s.rule_count()).sum()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.start {
            Some(id) => write!(f, "start symbol: {}\n", id.pretty(self))?,
            None => write!(f, "start symbol: <none>\n")?,
        }
        for rule in self.rules() {
            write!(f, "{}\n", rule.pretty(self))?;
        }
        Ok(())
    }
}

impl Symbol {
    /// The interned name of this symbol.
    pub fn name(&self) -> Atom {
        self.name
    }

    /// Whether this symbol has no rules.
    pub fn is_terminal(&self) -> bool {
        self.rules.is_none()
    }

    /// The number of rules of this symbol.
    pub fn rule_count(&self) -> usize {
        self.rules.as_ref().map(|r| r.len()).unwrap_or(0)
    }
}

impl Rule {
    /// Create a new rule.
    pub fn new(lhs: SymbolId, symbols: Vec<SymbolId>) -> Rule {
        Rule {
            lhs: lhs,
            symbols: symbols,
        }
    }

    /// The left-hand side of this rule.
    pub fn lhs(&self) -> SymbolId {
        self.lhs
    }

    /// The symbols in this production.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// The number of symbols in this production.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether this is an epsilon rule.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbol at `pos`, or `None` past the end of the rule.
    pub fn symbol_at(&self, pos: usize) -> Option<SymbolId> {
        self.symbols.get(pos).cloned()
    }
}

/// An iterator over the symbols of a grammar.
#[derive(Debug, Clone)]
pub struct Symbols(std::ops::Range<usize>);

impl Iterator for Symbols {
    type Item = SymbolId;

    fn next(&mut self) -> Option<SymbolId> {
        self.0.next().map(SymbolId)
    }
}

/// An iterator over the rules of a single symbol.
#[derive(Debug, Clone)]
pub struct RuleIds {
    symbol: SymbolId,
    range: std::ops::Range<usize>,
}

impl Iterator for RuleIds {
    type Item = RuleId;

    fn next(&mut self) -> Option<RuleId> {
        let symbol = self.symbol;
        self.range.next().map(|index| RuleId {
            symbol: symbol,
            index: index,
        })
    }
}

impl SymbolId {
    /// Create a symbol id from a usize.
    pub fn from_usize(id: usize) -> SymbolId {
        SymbolId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this symbol.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, SymbolId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.name(self.item))
    }
}

impl RuleId {
    /// The left-hand side of the rule.
    pub fn symbol(self) -> SymbolId {
        self.symbol
    }

    /// The index of the rule among the rules of its left-hand side.
    pub fn index(self) -> usize {
        self.index
    }

    /// Get a pretty printer for this rule.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, RuleId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rule = self.ctx.rule(self.item);
        write!(f, "{} →", rule.lhs().pretty(self.ctx))?;
        for &symbol in rule.symbols() {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}.{}", self.symbol.0, self.index)
    }
}
