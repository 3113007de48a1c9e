// Copyright (c) 2018 Fabian Schuiki

//! The LR(0) automaton: items, states, and the arrows between them.
//!
//! An `Automaton` owns two pools. The item pool holds exactly one `Item` per
//! (rule, position) pair, and states refer to items by `ItemId`. The state pool
//! holds exactly one `State` per distinct item set; two states with equal item
//! sets are the same state. Arrows are owned by their source state and name
//! their target by `StateId`, so discarding a candidate state never leaves an
//! arrow dangling.

use std;
use std::fmt;

use Pretty;
use error::{Error, Result};
use grammar::{Grammar, RuleId, SymbolId};
use table::{hash_usize, Policy, Table};

/// A position within a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    rule: RuleId,
    pos: usize,
}

/// A unique item identifier within an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(usize);

/// A unique state identifier within an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

/// A transition out of a state, labeled with a grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arrow {
    on: SymbolId,
    to: StateId,
}

/// A set of items together with the arrows leaving it.
#[derive(Debug, Clone)]
pub struct State {
    items: Table<ItemId, ItemIdPolicy>,
    arrows: Table<Arrow, ArrowPolicy>,
}

/// An LR(0) automaton.
#[derive(Debug, Clone)]
pub struct Automaton {
    items: Table<Item, ItemPolicy>,
    states: Table<State, StatePolicy>,
    start: Option<StateId>,
}

/// The outcome of submitting a state to the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The state was not known before and has been added to the pool.
    New(StateId),
    /// An equal state already existed; the submitted one was discarded.
    Merged(StateId),
}

#[derive(Debug, Clone)]
struct ItemPolicy;

impl Policy<Item> for ItemPolicy {
    fn hash(&self, o: &Item) -> u64 {
        let hash = hash_usize(0, o.rule.symbol().as_usize());
        let hash = hash_usize(hash, o.rule.index());
        hash_usize(hash, o.pos)
    }

    fn eq(&self, a: &Item, b: &Item) -> bool {
        a == b
    }
}

#[derive(Debug, Clone)]
struct ItemIdPolicy;

impl Policy<ItemId> for ItemIdPolicy {
    fn hash(&self, o: &ItemId) -> u64 {
        hash_usize(0, o.0)
    }

    fn eq(&self, a: &ItemId, b: &ItemId) -> bool {
        a == b
    }
}

/// Arrows are keyed by their label only.
#[derive(Debug, Clone)]
struct ArrowPolicy;

impl Policy<Arrow> for ArrowPolicy {
    fn hash(&self, o: &Arrow) -> u64 {
        hash_usize(0, o.on.as_usize())
    }

    fn eq(&self, a: &Arrow, b: &Arrow) -> bool {
        a.on == b.on
    }
}

/// States are keyed by their item set.
#[derive(Debug, Clone)]
struct StatePolicy;

impl Policy<State> for StatePolicy {
    fn hash(&self, o: &State) -> u64 {
        o.items.hash_sum()
    }

    fn eq(&self, a: &State, b: &State) -> bool {
        a.items.set_eq(&b.items)
    }
}

impl Item {
    /// The rule this item represents.
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// The position of the marker within the rule.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The symbol right after the marker, or `None` if the marker is at the
    /// end of the rule.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<SymbolId> {
        grammar.rule(self.rule).symbol_at(self.pos)
    }

    /// Whether the marker is at the end of the rule.
    pub fn is_reducible(&self, grammar: &Grammar) -> bool {
        self.next_symbol(grammar).is_none()
    }

    /// Get a pretty printer for this item.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Item> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rule = self.ctx.rule(self.item.rule);
        write!(f, "{} →", rule.lhs().pretty(self.ctx))?;
        let symbols = rule.symbols();
        for &symbol in &symbols[0..self.item.pos] {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        write!(f, " •")?;
        for &symbol in &symbols[self.item.pos..] {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl Arrow {
    /// The symbol this arrow is labeled with.
    pub fn on(&self) -> SymbolId {
        self.on
    }

    /// The state this arrow leads to.
    pub fn to(&self) -> StateId {
        self.to
    }
}

impl State {
    /// Create a new empty state.
    pub fn new() -> State {
        State {
            items: Table::new(ItemIdPolicy),
            arrows: Table::new(ArrowPolicy),
        }
    }

    /// Add an item to the state.
    ///
    /// Fails with `Error::AlreadyExists` if the item is already part of the
    /// state.
    pub fn add_item(&mut self, item: ItemId) -> Result<()> {
        self.items.insert(item).map(|_| ())
    }

    /// Add an arrow to the state.
    ///
    /// Fails with `Error::AlreadyExists` if an arrow with the same label is
    /// already present; its target is left unchanged.
    pub fn add_arrow(&mut self, on: SymbolId, to: StateId) -> Result<()> {
        self.arrows.insert(Arrow { on, to }).map(|_| ())
    }

    /// Whether the state contains an item.
    pub fn contains(&self, item: ItemId) -> bool {
        self.items.contains(&item)
    }

    /// The items of this state.
    pub fn items<'a>(&'a self) -> impl Iterator<Item = ItemId> + 'a {
        self.items.iter().cloned()
    }

    /// The number of items in this state.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// The arrows leaving this state.
    pub fn arrows(&self) -> std::slice::Iter<Arrow> {
        self.arrows.iter()
    }

    /// The number of arrows leaving this state.
    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }

    /// The target of the arrow labeled `on`.
    pub fn target(&self, on: SymbolId) -> Option<StateId> {
        self.arrows
            .find(hash_usize(0, on.as_usize()), |a| a.on == on)
            .map(|index| self.arrows[index].to)
    }

    /// Whether two states hold the same items.
    pub fn same_items(&self, other: &State) -> bool {
        StatePolicy.eq(self, other)
    }
}

impl Automaton {
    /// Create a new empty automaton.
    pub fn new() -> Automaton {
        Automaton {
            items: Table::new(ItemPolicy),
            states: Table::new(StatePolicy),
            start: None,
        }
    }

    /// Get the item for a rule and marker position, adding it to the pool if
    /// it does not exist yet.
    ///
    /// Fails with `Error::PositionOutOfRange` if `pos` lies beyond the end of
    /// the rule.
    pub fn add_item(&mut self, grammar: &Grammar, rule: RuleId, pos: usize) -> Result<ItemId> {
        let len = grammar.rule(rule).len();
        if pos > len {
            return Err(Error::PositionOutOfRange {
                rule: format!("{}", rule.pretty(grammar)),
                pos: pos,
                len: len,
            });
        }
        match self.items.insert(Item { rule, pos }) {
            Ok(index) | Err(Error::AlreadyExists(index)) => Ok(ItemId(index)),
            Err(e) => Err(e),
        }
    }

    /// Find the item for a rule and marker position.
    pub fn find_item(&self, rule: RuleId, pos: usize) -> Option<ItemId> {
        self.items.index_of(&Item { rule, pos }).map(ItemId)
    }

    /// Access an item.
    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.0]
    }

    /// The number of items in the pool.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Submit a state to the pool.
    ///
    /// If an equal state already exists, `state` is dropped and the existing
    /// state is returned. The first state ever admitted becomes the start
    /// state.
    pub fn add_state(&mut self, state: State) -> Result<Admission> {
        match self.states.insert(state) {
            Ok(index) => {
                let id = StateId(index);
                if self.start.is_none() {
                    self.start = Some(id);
                }
                Ok(Admission::New(id))
            }
            Err(Error::AlreadyExists(index)) => Ok(Admission::Merged(StateId(index))),
            Err(e) => Err(e),
        }
    }

    /// Add an arrow to a state in the pool.
    ///
    /// Returns `Error::AlreadyExists` if the state already has an arrow with
    /// that label.
    ///
    /// # Panics
    ///
    /// Panics if `from` does not name a state of this automaton.
    pub fn add_arrow(&mut self, from: StateId, on: SymbolId, to: StateId) -> Result<()> {
        match self.states.get_mut(from.0) {
            Some(state) => state.add_arrow(on, to),
            None => panic!("add_arrow() called with unknown state {}", from),
        }
    }

    /// The start state.
    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    /// Access a state.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    /// Find the state with the same item set as `state`.
    pub fn find_state(&self, state: &State) -> Option<StateId> {
        self.states.index_of(state).map(StateId)
    }

    /// All states, in the order they were admitted.
    pub fn states(&self) -> States {
        States(0..self.states.len())
    }

    /// The number of states in the pool.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The number of arrows across all states.
    pub fn arrow_count(&self) -> usize {
        self.states.iter().map(|s| s.arrow_count()).sum()
    }

    /// Get a pretty printer for this automaton.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Automaton> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for id in self.item.states() {
            write!(f, "{}", id.pretty(self.ctx, self.item))?;
        }
        Ok(())
    }
}

/// An iterator over the states of an automaton.
#[derive(Debug, Clone)]
pub struct States(std::ops::Range<usize>);

impl Iterator for States {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        self.0.next().map(StateId)
    }
}

impl ItemId {
    /// Create an item id from a usize.
    pub fn from_usize(id: usize) -> ItemId {
        ItemId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl StateId {
    /// Create a state id from a usize.
    pub fn from_usize(id: usize) -> StateId {
        StateId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this state.
    pub fn pretty<'a>(
        self,
        grammar: &'a Grammar,
        automaton: &'a Automaton,
    ) -> Pretty<(&'a Grammar, &'a Automaton), Self> {
        Pretty::new((grammar, automaton), self)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'a> fmt::Display for Pretty<(&'a Grammar, &'a Automaton), StateId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (grammar, automaton) = self.ctx;
        let state = automaton.state(self.item);
        write!(f, "state {}:\n", self.item)?;
        for id in state.items() {
            write!(f, "  {}\n", automaton.item(id).pretty(grammar))?;
        }
        write!(f, "arrows from {}:\n", self.item)?;
        for arrow in state.arrows() {
            write!(f, "  {} → {}\n", arrow.on.pretty(grammar), arrow.to)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> Grammar {
        let mut g = Grammar::new();
        g.add_production("E", &["(", "E", ")"]).unwrap();
        g.add_production("E", &["n"]).unwrap();
        g
    }

    #[test]
    fn items_are_interned() {
        let g = grammar();
        let e = g.symbol_by_name("E").unwrap();
        let r = g.rules_for(e).next().unwrap();
        let mut a = Automaton::new();
        let i0 = a.add_item(&g, r, 0).unwrap();
        let i1 = a.add_item(&g, r, 1).unwrap();
        assert_eq!(a.add_item(&g, r, 0).unwrap(), i0);
        assert!(i0 != i1);
        assert_eq!(a.item_count(), 2);
        assert_eq!(a.find_item(r, 1), Some(i1));
        assert_eq!(a.find_item(r, 2), None);
        assert_eq!(a.item(i1).pos(), 1);
    }

    #[test]
    fn item_beyond_rule_end() {
        let g = grammar();
        let e = g.symbol_by_name("E").unwrap();
        let rules: Vec<RuleId> = g.rules_for(e).collect();
        let mut a = Automaton::new();
        assert!(a.add_item(&g, rules[0], 3).is_ok());
        assert_eq!(
            a.add_item(&g, rules[1], 2),
            Err(Error::PositionOutOfRange {
                rule: "E → n".into(),
                pos: 2,
                len: 1,
            })
        );
        assert_eq!(a.find_item(rules[1], 2), None);
        assert_eq!(a.item_count(), 1);
    }

    #[test]
    fn states_merge_by_item_set() {
        let g = grammar();
        let e = g.symbol_by_name("E").unwrap();
        let rules: Vec<RuleId> = g.rules_for(e).collect();
        let mut a = Automaton::new();
        let i0 = a.add_item(&g, rules[0], 0).unwrap();
        let i1 = a.add_item(&g, rules[1], 0).unwrap();

        let mut s0 = State::new();
        s0.add_item(i0).unwrap();
        s0.add_item(i1).unwrap();
        assert_eq!(s0.add_item(i0), Err(Error::AlreadyExists(0)));
        let mut s1 = State::new();
        s1.add_item(i1).unwrap();
        s1.add_item(i0).unwrap();
        let mut s2 = State::new();
        s2.add_item(i1).unwrap();

        assert!(s0.same_items(&s1));
        assert_eq!(a.add_state(s0).unwrap(), Admission::New(StateId(0)));
        assert_eq!(a.add_state(s1).unwrap(), Admission::Merged(StateId(0)));
        assert_eq!(a.add_state(s2).unwrap(), Admission::New(StateId(1)));
        assert_eq!(a.start(), Some(StateId(0)));
        assert_eq!(a.state_count(), 2);
    }

    #[test]
    fn arrows_are_unique_per_label() {
        let g = grammar();
        let n = g.symbol_by_name("n").unwrap();
        let mut a = Automaton::new();
        let e = g.symbol_by_name("E").unwrap();
        let r = g.rules_for(e).next().unwrap();
        let i = a.add_item(&g, r, 0).unwrap();
        let mut s = State::new();
        s.add_item(i).unwrap();
        let id = match a.add_state(s).unwrap() {
            Admission::New(id) => id,
            Admission::Merged(_) => panic!("fresh automaton merged a state"),
        };
        a.add_arrow(id, n, StateId(7)).unwrap();
        assert_eq!(a.add_arrow(id, n, StateId(9)), Err(Error::AlreadyExists(0)));
        assert_eq!(a.state(id).target(n), Some(StateId(7)));
        assert_eq!(a.state(id).target(e), None);
        assert_eq!(a.arrow_count(), 1);
    }

    #[test]
    #[should_panic(expected = "unknown state")]
    fn arrow_from_unknown_state() {
        let g = grammar();
        let n = g.symbol_by_name("n").unwrap();
        let mut a = Automaton::new();
        let _ = a.add_arrow(StateId(3), n, StateId(0));
    }

    #[test]
    fn display_item() {
        let g = grammar();
        let e = g.symbol_by_name("E").unwrap();
        let r = g.rules_for(e).next().unwrap();
        let mut a = Automaton::new();
        let i = a.add_item(&g, r, 1).unwrap();
        assert_eq!(format!("{}", a.item(i).pretty(&g)), "E → ( • E )");
        let j = a.add_item(&g, r, 3).unwrap();
        assert_eq!(format!("{}", a.item(j).pretty(&g)), "E → ( E ) •");
    }
}
