// Copyright (c) 2018 Fabian Schuiki

//! Detection and resolution of LR(0) conflicts.
//!
//! A state whose items include more than one completed rule has a
//! reduce/reduce conflict; the last completed rule observed wins. A state that
//! has both completed rules and items that can still shift has a shift/reduce
//! conflict; shifting wins. Conflicts are reported but never abort.

use std::fmt;

use indexmap::IndexSet;

use Pretty;
use automaton::{Automaton, ItemId, StateId};
use grammar::{Grammar, RuleId};

/// What a state does with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Dispatch on the next token and on the nonterminal produced by the
    /// state shifted into.
    Shift,
    /// Reduce by the given rule.
    Reduce(RuleId),
}

/// The kind of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// A state can both shift and reduce.
    ShiftReduce,
    /// A state can reduce by more than one rule.
    ReduceReduce,
}

/// A conflict found in a state of an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    state: StateId,
    kind: ConflictKind,
    items: Vec<ItemId>,
    resolution: Action,
}

impl Conflict {
    /// The state in which the conflict occurs.
    pub fn state(&self) -> StateId {
        self.state
    }

    /// The kind of conflict.
    pub fn kind(&self) -> ConflictKind {
        self.kind
    }

    /// The items involved in the conflict.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// The action chosen for the state despite the conflict.
    pub fn resolution(&self) -> Action {
        self.resolution
    }

    /// The rules involved in the conflict.
    pub fn rules<'a>(&'a self, automaton: &'a Automaton) -> impl Iterator<Item = RuleId> + 'a {
        self.items.iter().map(move |&i| automaton.item(i).rule())
    }

    /// Get a pretty printer for this conflict.
    pub fn pretty<'a>(
        &'a self,
        grammar: &'a Grammar,
        automaton: &'a Automaton,
    ) -> Pretty<(&'a Grammar, &'a Automaton), &'a Self> {
        Pretty::new((grammar, automaton), self)
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
        }
    }
}

impl<'a> fmt::Display for Pretty<(&'a Grammar, &'a Automaton), &'a Conflict> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (grammar, automaton) = self.ctx;
        write!(
            f,
            "{} conflict in state {}:",
            self.item.kind, self.item.state
        )?;
        for &item in &self.item.items {
            write!(f, "\n  {}", automaton.item(item).pretty(grammar))?;
        }
        Ok(())
    }
}

/// Decide the action of a state and collect its conflicts.
///
/// Every conflict found is also logged as a warning.
pub fn resolve_state(
    grammar: &Grammar,
    automaton: &Automaton,
    id: StateId,
) -> (Action, Vec<Conflict>) {
    let state = automaton.state(id);
    let mut reducible: IndexSet<RuleId> = IndexSet::new();
    let mut completed = Vec::new();
    let mut shift = false;
    for item_id in state.items() {
        let item = automaton.item(item_id);
        if item.is_reducible(grammar) {
            reducible.insert(item.rule());
            completed.push(item_id);
        } else {
            shift = true;
        }
    }

    let action = match reducible.iter().last() {
        Some(&rule) if !shift => Action::Reduce(rule),
        _ => Action::Shift,
    };

    let mut conflicts = Vec::new();
    if reducible.len() > 1 {
        conflicts.push(Conflict {
            state: id,
            kind: ConflictKind::ReduceReduce,
            items: completed,
            resolution: action,
        });
    }
    if shift && !reducible.is_empty() {
        conflicts.push(Conflict {
            state: id,
            kind: ConflictKind::ShiftReduce,
            items: state.items().collect(),
            resolution: action,
        });
    }
    for conflict in &conflicts {
        warn!("{}", conflict.pretty(grammar, automaton));
    }
    (action, conflicts)
}

/// Find all conflicts in an automaton.
pub fn find_conflicts(grammar: &Grammar, automaton: &Automaton) -> Vec<Conflict> {
    automaton
        .states()
        .flat_map(|id| resolve_state(grammar, automaton, id).1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_reduce() {
        let mut g = Grammar::new();
        g.add_production("S", &["A"]).unwrap();
        g.add_production("S", &["B"]).unwrap();
        g.add_production("A", &["x"]).unwrap();
        g.add_production("B", &["x"]).unwrap();
        let a = Automaton::build(&g).unwrap();
        let conflicts = find_conflicts(&g, &a);
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.kind(), ConflictKind::ReduceReduce);
        let mut names: Vec<String> = c.rules(&a)
            .map(|r| format!("{}", r.pretty(&g)))
            .collect();
        names.sort();
        assert_eq!(names, vec!["A → x", "B → x"]);
        let last = a.item(*c.items().last().unwrap()).rule();
        assert_eq!(c.resolution(), Action::Reduce(last));
    }

    #[test]
    fn shift_reduce_prefers_shift() {
        let mut g = Grammar::new();
        g.add_production("S", &["x"]).unwrap();
        g.add_production("S", &["x", "y"]).unwrap();
        let a = Automaton::build(&g).unwrap();
        let conflicts = find_conflicts(&g, &a);
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.kind(), ConflictKind::ShiftReduce);
        assert_eq!(c.resolution(), Action::Shift);
        assert_eq!(c.items().len(), 2);
        let (action, _) = resolve_state(&g, &a, c.state());
        assert_eq!(action, Action::Shift);
    }

    #[test]
    fn single_reduction() {
        let mut g = Grammar::new();
        g.add_production("S", &["x"]).unwrap();
        let a = Automaton::build(&g).unwrap();
        let s = g.symbol_by_name("S").unwrap();
        let x = g.symbol_by_name("x").unwrap();
        let target = a.state(a.start().unwrap()).target(x).unwrap();
        let rule = g.rules_for(s).next().unwrap();
        assert_eq!(resolve_state(&g, &a, target), (Action::Reduce(rule), vec![]));
        assert!(find_conflicts(&g, &a).is_empty());
    }

    #[test]
    fn display_conflict() {
        let mut g = Grammar::new();
        g.add_production("S", &["A"]).unwrap();
        g.add_production("S", &["B"]).unwrap();
        g.add_production("A", &["x"]).unwrap();
        g.add_production("B", &["x"]).unwrap();
        let a = Automaton::build(&g).unwrap();
        let conflicts = find_conflicts(&g, &a);
        let text = format!("{}", conflicts[0].pretty(&g, &a));
        assert!(text.starts_with("reduce/reduce conflict in state "));
        assert!(text.contains("\n  A → x •"));
        assert!(text.contains("\n  B → x •"));
    }
}
