use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::debug;

use crate::error::Result;
use crate::grammar::Grammar;
use crate::item::{ItemId, ItemUniverse};
use crate::symbol::SymbolId;

/// Index of a state in the canonical collection.
pub type StateId = usize;

/// A state of the LR(1) automaton: a closed item set plus its GOTO
/// transitions.
#[derive(Debug)]
pub struct State {
    pub id: StateId,
    pub(crate) items: BTreeSet<ItemId>,
    pub(crate) transitions: BTreeMap<SymbolId, StateId>,
}

/// Two states are the same state iff their item sets are set-equal.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl State {
    fn new(id: StateId, items: BTreeSet<ItemId>) -> Self {
        Self {
            id,
            items,
            transitions: BTreeMap::new(),
        }
    }

    pub fn iter_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().copied()
    }

    pub fn iter_transitions(&self) -> impl Iterator<Item = (SymbolId, StateId)> + '_ {
        self.transitions.iter().map(|(&sym, &to)| (sym, to))
    }
}

/// The canonical LR(1) collection: every distinct closed item set reachable
/// from the initial state via GOTO.
#[derive(Debug)]
pub struct Automaton {
    pub(crate) states: Vec<State>,
}

impl Automaton {
    /// Discovers all states by worklist traversal.
    ///
    /// The initial state is the closure of `[<start> -> • S, EOF]`. For each
    /// pending state, GOTO is computed under every grammar symbol except
    /// EOF; a non-empty result either matches an existing state (set
    /// equality, not index) or becomes a new one. Terminates because the
    /// item universe is finite.
    pub fn build(grammar: &Grammar, universe: &ItemUniverse) -> Result<Self> {
        let start = universe.start_set(grammar)?;
        let mut automaton = Self {
            states: vec![State::new(0, start)],
        };

        let mut queue = VecDeque::from([0]);
        while let Some(id) = queue.pop_front() {
            let items = automaton.states[id].items.clone();

            for (sym, symbol) in grammar.iter_symbols() {
                if symbol.is_eof() {
                    continue;
                }

                let target = universe.goto(&items, sym);
                if target.is_empty() {
                    continue;
                }

                let to = match automaton.find(&target) {
                    Some(to) => to,
                    None => {
                        let to = automaton.states.len();
                        automaton.states.push(State::new(to, target));
                        queue.push_back(to);
                        to
                    }
                };

                automaton.states[id].transitions.insert(sym, to);
            }
        }

        debug!("canonical collection: {} states", automaton.states.len());
        Ok(automaton)
    }

    fn find(&self, items: &BTreeSet<ItemId>) -> Option<StateId> {
        self.states
            .iter()
            .find(|state| state.items == *items)
            .map(|state| state.id)
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn iter_states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_states_are_deduplicated() {
        let grammar = fixtures::balanced_grammar();
        let universe = ItemUniverse::build(&grammar).unwrap();
        let automaton = Automaton::build(&grammar, &universe).unwrap();

        for a in automaton.iter_states() {
            for b in automaton.iter_states() {
                if a.id != b.id {
                    assert_ne!(a, b, "states {} and {} share an item set", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn test_transitions_are_deterministic() {
        let grammar = fixtures::expr_grammar();
        let universe = ItemUniverse::build(&grammar).unwrap();
        let automaton = Automaton::build(&grammar, &universe).unwrap();

        // Every recorded transition is consistent with a fresh GOTO.
        for state in automaton.iter_states() {
            for (sym, to) in state.iter_transitions() {
                let target = universe.goto(&state.items, sym);
                assert_eq!(target, automaton.state(to).items);
            }
        }
    }

    #[test]
    fn test_initial_state_is_closed() {
        let grammar = fixtures::balanced_grammar();
        let universe = ItemUniverse::build(&grammar).unwrap();
        let automaton = Automaton::build(&grammar, &universe).unwrap();

        let mut items = automaton.state(0).items.clone();
        universe.close(&mut items);
        assert_eq!(items, automaton.state(0).items);
    }
}
