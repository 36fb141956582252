use std::collections::{BTreeSet, HashMap};

use itertools::Itertools as _;
use log::debug;

use crate::error::{ErrorKind, Result};
use crate::grammar::Grammar;
use crate::rule::RuleId;
use crate::symbol::SymbolId;

/// Handle of an item inside the [`ItemUniverse`].
pub type ItemId = usize;

/// An LR(1) item: a production with a dot position and a lookahead
/// terminal.
///
/// # Example
/// `[S -> a • S b, EOF]`
#[derive(Debug, Clone)]
pub struct Item {
    pub rule: RuleId,
    pub dot: usize,
    pub lookahead: SymbolId,
    /// The symbol right after the dot; `None` when the item is exhausted.
    pub next: Option<SymbolId>,
    /// Successor under `next` (same production and lookahead, dot advanced).
    advance: Option<ItemId>,
    /// Epsilon-introduced items for the non-terminal after the dot.
    closure: Vec<ItemId>,
}

impl Item {
    /// The dot has reached the end of the body.
    ///
    /// # Example
    /// `[S -> a S b •, EOF]`
    #[inline(always)]
    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }
}

/// Every LR(1) item of a grammar, materialized up front.
///
/// The universe holds one item per (production, dot position, lookahead
/// terminal) combination, with closure and advance edges precomputed
/// between them. Closure of an item set is then a plain edge traversal.
#[derive(Debug)]
pub struct ItemUniverse {
    items: Vec<Item>,
    terminals: Vec<SymbolId>,
    term_index: HashMap<SymbolId, usize>,
    rule_base: Vec<usize>,
}

impl ItemUniverse {
    /// Materializes the item universe of an analyzed grammar.
    pub fn build(grammar: &Grammar) -> Result<Self> {
        if !grammar.is_analyzed() {
            return Err(ErrorKind::UnanalyzedGrammar.into());
        }

        let terminals: Vec<SymbolId> = grammar.iter_terminals().collect();
        let term_index: HashMap<SymbolId, usize> = terminals
            .iter()
            .enumerate()
            .map(|(index, &sym)| (sym, index))
            .collect();

        let mut items = Vec::new();
        let mut rule_base = Vec::with_capacity(grammar.rule_count());
        for rule in grammar.iter_rules() {
            rule_base.push(items.len());
            for dot in 0..=rule.rhs.len() {
                let next = rule.rhs.get(dot).copied();
                for &lookahead in &terminals {
                    items.push(Item {
                        rule: rule.id,
                        dot,
                        lookahead,
                        next,
                        advance: None,
                        closure: Vec::new(),
                    });
                }
            }
        }

        let mut universe = Self {
            items,
            terminals,
            term_index,
            rule_base,
        };
        universe.link(grammar);

        debug!("item universe: {} items", universe.items.len());
        Ok(universe)
    }

    /// Computes the advance and closure edges over the whole universe.
    ///
    /// Advance: `[A -> α • X β, a]` links to `[A -> α X • β, a]` under `X`.
    /// Closure: `[A -> α • B β, a]` links to `[B -> • γ, b]` for every
    /// production of `B` and every `b ∈ FIRST(β a)`.
    fn link(&mut self, grammar: &Grammar) {
        for id in 0..self.items.len() {
            let (rule_id, dot, lookahead, next) = {
                let item = &self.items[id];
                (item.rule, item.dot, item.lookahead, item.next)
            };

            let Some(sym) = next else {
                continue;
            };

            let advance = self.item_id(rule_id, dot + 1, lookahead);
            self.items[id].advance = Some(advance);

            if grammar.symbol(sym).is_non_terminal() {
                let beta = &grammar.rule(rule_id).rhs[dot + 1..];
                let first = grammar.first_of_sequence(beta);
                let mut lookaheads = first.terminals;
                if first.nullable {
                    lookaheads.insert(lookahead);
                }

                let mut edges = Vec::new();
                for target in grammar.iter_rules_of(sym) {
                    for &b in &lookaheads {
                        edges.push(self.item_id(target.id, 0, b));
                    }
                }
                self.items[id].closure = edges;
            }
        }
    }

    /// Dense handle of the (production, dot, lookahead) item.
    pub fn item_id(&self, rule: RuleId, dot: usize, lookahead: SymbolId) -> ItemId {
        self.rule_base[rule] + dot * self.terminals.len() + self.term_index[&lookahead]
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The initial item set: closure of `[<start> -> • S, EOF]`.
    pub fn start_set(&self, grammar: &Grammar) -> Result<BTreeSet<ItemId>> {
        let rule = grammar.start_rule().ok_or(ErrorKind::MissingStart)?;
        let mut set = BTreeSet::from([self.item_id(rule, 0, Grammar::EOF)]);
        self.close(&mut set);
        Ok(set)
    }

    /// Saturates the set over closure edges.
    ///
    /// Terminates because the universe is finite; idempotent on closed sets.
    pub fn close(&self, set: &mut BTreeSet<ItemId>) {
        let mut stack: Vec<ItemId> = set.iter().copied().collect();

        while let Some(id) = stack.pop() {
            for &next in &self.items[id].closure {
                if set.insert(next) {
                    stack.push(next);
                }
            }
        }
    }

    /// GOTO over an item set: advance every item whose dot is at `sym`,
    /// then close. Empty result means GOTO is undefined here.
    pub fn goto(&self, set: &BTreeSet<ItemId>, sym: SymbolId) -> BTreeSet<ItemId> {
        let mut out: BTreeSet<ItemId> = set
            .iter()
            .filter(|&&id| self.items[id].next == Some(sym))
            .filter_map(|&id| self.items[id].advance)
            .collect();

        if !out.is_empty() {
            self.close(&mut out);
        }
        out
    }

    /// Renders an item for diagnostics, e.g. `[(1) S -> a • S b, EOF]`.
    pub fn render_item(&self, id: ItemId, grammar: &Grammar) -> String {
        let item = &self.items[id];
        let rule = grammar.rule(item.rule);

        let mut rhs = rule
            .rhs
            .iter()
            .map(|&sym| grammar.symbol(sym).to_string())
            .enumerate()
            .map(|(pos, mut s)| {
                if pos == item.dot {
                    s.insert_str(0, "• ");
                }
                s
            })
            .join(" ");

        if item.is_exhausted() {
            rhs.push_str(" •");
        }

        format!(
            "[({}) {} -> {}, {}]",
            rule.id,
            grammar.symbol(rule.lhs),
            rhs.trim(),
            grammar.symbol(item.lookahead)
        )
    }
}
