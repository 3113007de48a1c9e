// Copyright (c) 2018 Fabian Schuiki

//! Construction of the canonical LR(0) collection of a grammar.
//!
//! The start state is the closure of all rules of the start symbol at position
//! zero. Every admitted state is expanded exactly once from a worklist: its
//! items are grouped by the symbol after the marker, each group is advanced
//! by one symbol and closed, and the resulting candidate state is submitted to
//! the automaton. A candidate equal to a known state is discarded in favour of
//! the known one; otherwise it is admitted and queued for expansion itself.

use std::collections::VecDeque;

use bit_set::BitSet;

use automaton::{Admission, Automaton, State, StateId};
use error::{Error, Result};
use grammar::{Grammar, RuleId, SymbolId};
use table::{hash_usize, Policy, Table};

/// A pending transition: the label and the kernel of its target state.
struct Goto {
    on: SymbolId,
    kernel: Vec<(RuleId, usize)>,
}

#[derive(Debug)]
struct GotoPolicy;

impl Policy<Goto> for GotoPolicy {
    fn hash(&self, o: &Goto) -> u64 {
        hash_usize(0, o.on.as_usize())
    }

    fn eq(&self, a: &Goto, b: &Goto) -> bool {
        a.on == b.on
    }
}

impl Automaton {
    /// Build the LR(0) automaton of a grammar.
    ///
    /// A grammar without a start symbol yields an automaton without states.
    pub fn build(grammar: &Grammar) -> Result<Automaton> {
        let mut automaton = Automaton::new();
        let start = match grammar.start() {
            Some(start) => start,
            None => return Ok(automaton),
        };

        let kernel: Vec<(RuleId, usize)> = grammar.rules_for(start).map(|r| (r, 0)).collect();
        let state = automaton.closure(grammar, &kernel)?;
        let mut todo = VecDeque::new();
        match automaton.add_state(state)? {
            Admission::New(id) => todo.push_back(id),
            Admission::Merged(id) => todo.push_back(id),
        }

        while let Some(id) = todo.pop_front() {
            automaton.expand(grammar, id, &mut todo)?;
        }

        debug!(
            "built automaton with {} states, {} items, {} arrows",
            automaton.state_count(),
            automaton.item_count(),
            automaton.arrow_count()
        );
        Ok(automaton)
    }

    /// Compute the closure of a kernel.
    ///
    /// Returns a fresh state holding the kernel items and, for every item whose
    /// next symbol is a nonterminal, all rules of that nonterminal at position
    /// zero. Items already in the state are skipped, which makes recursive
    /// grammars terminate.
    pub fn closure(&mut self, grammar: &Grammar, kernel: &[(RuleId, usize)]) -> Result<State> {
        let mut state = State::new();
        let mut expanded = BitSet::with_capacity(grammar.symbol_count());
        let mut stack = Vec::new();
        stack.try_reserve(kernel.len())?;
        stack.extend(kernel.iter().rev().cloned());

        while let Some((rule, pos)) = stack.pop() {
            let item = self.add_item(grammar, rule, pos)?;
            match state.add_item(item) {
                Ok(()) => (),
                Err(Error::AlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
            trace!("closure: {}", self.item(item).pretty(grammar));

            let next = match grammar.rule(rule).symbol_at(pos) {
                Some(next) => next,
                None => continue,
            };
            if grammar.is_terminal(next) || !expanded.insert(next.as_usize()) {
                continue;
            }
            stack.try_reserve(grammar.symbol(next).rule_count())?;
            let first = stack.len();
            stack.extend(grammar.rules_for(next).map(|r| (r, 0)));
            stack[first..].reverse();
        }

        Ok(state)
    }

    /// Compute the transitions out of state `id`, admitting new target states
    /// and queueing them in `todo`.
    fn expand(
        &mut self,
        grammar: &Grammar,
        id: StateId,
        todo: &mut VecDeque<StateId>,
    ) -> Result<()> {
        let mut gotos = Table::new(GotoPolicy);
        for item in self.state(id).items() {
            let item = *self.item(item);
            let on = match item.next_symbol(grammar) {
                Some(on) => on,
                None => continue,
            };
            let index = match gotos.insert(Goto {
                on: on,
                kernel: Vec::new(),
            }) {
                Ok(index) | Err(Error::AlreadyExists(index)) => index,
                Err(e) => return Err(e),
            };
            if let Some(goto) = gotos.get_mut(index) {
                goto.kernel.try_reserve(1)?;
                goto.kernel.push((item.rule(), item.pos() + 1));
            }
        }

        for goto in &gotos {
            let candidate = self.closure(grammar, &goto.kernel)?;
            let target = match self.add_state(candidate)? {
                Admission::New(target) => {
                    debug!(
                        "state {} admitted via {} from {}",
                        target,
                        goto.on.pretty(grammar),
                        id
                    );
                    todo.try_reserve(1)?;
                    todo.push_back(target);
                    target
                }
                Admission::Merged(target) => {
                    trace!(
                        "transition on {} from {} merged into {}",
                        goto.on.pretty(grammar),
                        id,
                        target
                    );
                    target
                }
            };
            self.add_arrow(id, goto.on, target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_grammar() -> Grammar {
        let mut g = Grammar::new();
        g.add_production("S", &["E"]).unwrap();
        g.add_production("E", &["T"]).unwrap();
        g.add_production("E", &["(", "E", ")"]).unwrap();
        g.add_production("T", &["n"]).unwrap();
        g.add_production("T", &["T", "+", "n"]).unwrap();
        g
    }

    fn items_of(g: &Grammar, a: &Automaton, id: StateId) -> Vec<String> {
        let mut items: Vec<String> = a.state(id)
            .items()
            .map(|i| format!("{}", a.item(i).pretty(g)))
            .collect();
        items.sort();
        items
    }

    #[test]
    fn closure_of_start_symbol() {
        let g = expr_grammar();
        let mut a = Automaton::new();
        let s = g.symbol_by_name("S").unwrap();
        let kernel: Vec<_> = g.rules_for(s).map(|r| (r, 0)).collect();
        let state = a.closure(&g, &kernel).unwrap();
        assert_eq!(state.item_count(), 5);
        assert_eq!(a.item_count(), 5);
    }

    #[test]
    fn closure_of_left_recursion_terminates() {
        let mut g = Grammar::new();
        g.add_production("L", &["L", "x"]).unwrap();
        g.add_production("L", &["x"]).unwrap();
        let a = Automaton::build(&g).unwrap();
        let start = a.start().unwrap();
        assert_eq!(items_of(&g, &a, start), vec!["L → • L x", "L → • x"]);
        assert_eq!(a.state_count(), 4);
    }

    #[test]
    fn start_state_of_expression_grammar() {
        let g = expr_grammar();
        let a = Automaton::build(&g).unwrap();
        let start = a.start().unwrap();
        assert_eq!(start, StateId::from_usize(0));
        assert_eq!(
            items_of(&g, &a, start),
            vec![
                "E → • ( E )",
                "E → • T",
                "S → • E",
                "T → • T + n",
                "T → • n",
            ]
        );
        for name in &["E", "T", "(", "n"] {
            let sym = g.symbol_by_name(name).unwrap();
            assert!(a.state(start).target(sym).is_some(), "no arrow on {}", name);
        }
        assert_eq!(a.state(start).arrow_count(), 4);
    }

    #[test]
    fn epsilon_rules_reduce_immediately() {
        let mut g = Grammar::new();
        g.add_production("A", &["B", "x"]).unwrap();
        g.add_production::<&str>("B", &[]).unwrap();
        let a = Automaton::build(&g).unwrap();
        let start = a.start().unwrap();
        assert_eq!(items_of(&g, &a, start), vec!["A → • B x", "B → •"]);
        assert_eq!(a.state_count(), 3);
    }

    #[test]
    fn empty_grammar_has_no_states() {
        let g = Grammar::new();
        let a = Automaton::build(&g).unwrap();
        assert_eq!(a.start(), None);
        assert_eq!(a.state_count(), 0);
    }
}
