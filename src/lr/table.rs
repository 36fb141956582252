use prettytable::Table as PtTable;
use std::collections::HashMap;

use log::debug;

use crate::error::{ErrorKind, Result};
use crate::grammar::Grammar;
use crate::item::ItemUniverse;
use crate::symbol::SymbolId;

use super::{Action, Automaton, State, StateId};

#[derive(Debug, PartialEq, Eq)]
struct Row {
    actions: HashMap<SymbolId, Action>,
    goto: HashMap<SymbolId, StateId>,
}

impl Row {
    /// Converts one automaton state into a table row.
    ///
    /// Shift pass: terminal transitions become SHIFT actions, non-terminal
    /// transitions fill the GOTO map (always consistent, no check needed).
    /// Reduce pass: each exhausted item writes REDUCE under its lookahead,
    /// except the augmented start item under EOF, which writes ACCEPT.
    fn from_state(state: &State, grammar: &Grammar, universe: &ItemUniverse) -> Result<Self> {
        let mut row = Self {
            actions: HashMap::new(),
            goto: HashMap::new(),
        };

        for (sym, to) in state.iter_transitions() {
            if grammar.symbol(sym).is_terminal() {
                row.set_action(state.id, grammar, sym, Action::Shift(to))?;
            } else {
                row.goto.insert(sym, to);
            }
        }

        let start_rule = grammar.start_rule().ok_or(ErrorKind::MissingStart)?;
        for id in state.iter_items() {
            let item = universe.item(id);
            if !item.is_exhausted() {
                continue;
            }

            let action = if item.rule == start_rule && item.lookahead == Grammar::EOF {
                Action::Accept
            } else {
                Action::Reduce(item.rule)
            };
            row.set_action(state.id, grammar, item.lookahead, action)?;
        }

        Ok(row)
    }

    /// Writes a terminal action slot. Each (state, terminal) slot may be
    /// written at most once; a second write rejects the whole grammar.
    fn set_action(
        &mut self,
        state: StateId,
        grammar: &Grammar,
        sym: SymbolId,
        action: Action,
    ) -> Result<()> {
        if let Some(&existing) = self.actions.get(&sym) {
            let symbol = grammar.symbol(sym).name.clone();
            let conflict = [existing, action];
            let kind = if matches!(existing, Action::Shift(_)) || matches!(action, Action::Shift(_))
            {
                ErrorKind::ShiftReduceConflict {
                    state,
                    symbol,
                    conflict,
                }
            } else {
                ErrorKind::ReduceReduceConflict {
                    state,
                    symbol,
                    conflict,
                }
            };
            return Err(kind.into());
        }

        self.actions.insert(sym, action);
        Ok(())
    }
}

/// The action/goto table of an LR(1) grammar.
///
/// Construction either fully succeeds or fails; a failed build exposes no
/// table. A built table is immutable and may be shared by any number of
/// concurrent parses.
pub struct Table<'g> {
    grammar: &'g Grammar,
    rows: Vec<Row>,
}

impl<'g> Table<'g> {
    /// Runs the whole pipeline: item universe, canonical collection, rows.
    ///
    /// The grammar must have been analyzed first. Any shift/reduce or
    /// reduce/reduce conflict aborts construction: grammars that are not
    /// LR(1) are rejected, never resolved by precedence guessing.
    pub fn build(grammar: &'g Grammar) -> Result<Self> {
        if !grammar.is_analyzed() {
            return Err(ErrorKind::UnanalyzedGrammar.into());
        }

        let universe = ItemUniverse::build(grammar)?;
        let automaton = Automaton::build(grammar, &universe)?;

        let rows = automaton
            .iter_states()
            .map(|state| Row::from_state(state, grammar, &universe))
            .collect::<Result<Vec<_>>>()?;

        debug!("action/goto table built: {} states", rows.len());
        Ok(Self { grammar, rows })
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn action(&self, state: StateId, sym: SymbolId) -> Option<Action> {
        self.rows.get(state)?.actions.get(&sym).copied()
    }

    pub fn goto(&self, state: StateId, sym: SymbolId) -> Option<StateId> {
        self.rows.get(state)?.goto.get(&sym).copied()
    }

    /// The terminals for which `state` has any action, sorted by name: the
    /// "expected" set reported on a syntax error in that state.
    pub fn expected_terminals(&self, state: StateId) -> Vec<&str> {
        let mut expected: Vec<&str> = self.rows[state]
            .actions
            .keys()
            .map(|&sym| self.grammar.symbol(sym).name.as_str())
            .collect();
        expected.sort_unstable();
        expected
    }

    /// The number of rows (states) in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl std::fmt::Debug for Table<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let terminals: Vec<SymbolId> = self.grammar.iter_terminals().collect();
        let non_terminals: Vec<SymbolId> = self.grammar.iter_non_terminals().collect();

        let mut grid = PtTable::new();

        grid.add_row(
            ["#".to_string()]
                .into_iter()
                .chain(
                    terminals
                        .iter()
                        .chain(non_terminals.iter())
                        .map(|&sym| self.grammar.symbol(sym).name.clone()),
                )
                .collect(),
        );

        for (id, row) in self.rows.iter().enumerate() {
            grid.add_row(
                [id.to_string()]
                    .into_iter()
                    .chain(terminals.iter().map(|sym| {
                        row.actions
                            .get(sym)
                            .map(ToString::to_string)
                            .unwrap_or_default()
                    }))
                    .chain(non_terminals.iter().map(|sym| {
                        row.goto
                            .get(sym)
                            .map(ToString::to_string)
                            .unwrap_or_default()
                    }))
                    .collect(),
            );
        }

        write!(f, "{}", grid)
    }
}
