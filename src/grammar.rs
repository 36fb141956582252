use std::collections::{BTreeSet, HashMap};

use itertools::Itertools as _;
use log::debug;

use crate::error::{ErrorKind, Result};
use crate::rule::{Production, RuleId};
use crate::symbol::{self, is_non_terminal_name, Symbol, SymbolId, SymbolKind};

/// The FIRST set of a symbol or symbol sequence.
///
/// `nullable` is set when the symbol (or the whole sequence) can derive the
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: BTreeSet<SymbolId>,
    pub nullable: bool,
}

/// FIRST of a symbol sequence against a computed per-symbol table.
///
/// Unions FIRST of each symbol in turn, stopping at the first one that
/// cannot vanish; the result is nullable iff every symbol is.
fn sequence_first(table: &[FirstSet], sequence: &[SymbolId]) -> FirstSet {
    let mut out = FirstSet::default();

    for &sym in sequence {
        out.terminals.extend(table[sym].terminals.iter().copied());
        if !table[sym].nullable {
            return out;
        }
    }

    out.nullable = true;
    out
}

/// A context-free grammar under construction, and after [`Grammar::analyze`]
/// its derived FIRST and FOLLOW tables.
///
/// Symbols are classified by naming convention: a token whose first
/// character is uppercase is a non-terminal, anything else is a terminal.
/// The reserved terminal `EOF` and the augmented `<start>` symbol are
/// always present.
///
/// # Example
///
/// ```
/// use canonlr::Grammar;
///
/// let mut grammar = Grammar::new();
/// grammar.set_start("S").unwrap();
/// grammar.add_rules("S", &["a S b", ""]).unwrap();
/// grammar.analyze().unwrap();
/// ```
#[derive(Debug)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
    rules: Vec<Production>,
    start: Option<SymbolId>,
    start_rule: Option<RuleId>,
    first: Vec<FirstSet>,
    follow: Vec<BTreeSet<SymbolId>>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// Id of the reserved `EOF` terminal.
    pub const EOF: SymbolId = 0;
    /// Id of the augmented `<start>` symbol.
    pub const START: SymbolId = 1;

    pub fn new() -> Self {
        let mut grammar = Self {
            symbols: Vec::new(),
            by_name: HashMap::new(),
            rules: Vec::new(),
            start: None,
            start_rule: None,
            first: Vec::new(),
            follow: Vec::new(),
        };

        grammar.symbols.push(Symbol::eof());
        grammar.by_name.insert(symbol::EOF.to_string(), Self::EOF);
        grammar.symbols.push(Symbol::start());
        grammar
            .by_name
            .insert(symbol::START.to_string(), Self::START);

        grammar
    }

    /// Designates the start symbol and registers the augmented production
    /// `<start> -> name`.
    ///
    /// Fails if the name does not follow the non-terminal convention, or if
    /// a start symbol was already designated.
    pub fn set_start(&mut self, name: &str) -> Result<()> {
        if let Some(start) = self.start {
            return Err(ErrorKind::StartAlreadySet(self.symbols[start].name.clone()).into());
        }
        if !is_non_terminal_name(name) {
            return Err(ErrorKind::InvalidNonTerminal(name.to_string()).into());
        }

        let start = self.intern(name);
        let id = self.rules.len();
        self.rules.push(Production {
            id,
            lhs: Self::START,
            rhs: vec![start],
        });
        self.start = Some(start);
        self.start_rule = Some(id);

        Ok(())
    }

    /// Registers one production per alternative.
    ///
    /// Each alternative is a whitespace-delimited symbol sequence; an empty
    /// alternative is an epsilon production. The literal token `EOF` is
    /// permitted in a body and dropped (end of input is implicit).
    pub fn add_rules(&mut self, lhs: &str, alternatives: &[&str]) -> Result<()> {
        if !is_non_terminal_name(lhs) {
            return Err(ErrorKind::InvalidNonTerminal(lhs.to_string()).into());
        }
        let lhs = self.intern(lhs);

        for alternative in alternatives {
            let rhs = alternative
                .split_whitespace()
                .filter(|name| *name != symbol::EOF)
                .map(|name| self.intern(name))
                .collect();

            let id = self.rules.len();
            self.rules.push(Production { id, lhs, rhs });
        }

        Ok(())
    }

    fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }

        let kind = if is_non_terminal_name(name) {
            SymbolKind::NonTerminal
        } else {
            SymbolKind::Terminal
        };

        let id = self.symbols.len();
        self.symbols.push(Symbol::new(name, kind));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Checks the grammar's configuration invariants: a start symbol is
    /// designated, it has at least one production, and every non-terminal
    /// referenced in a body has one too.
    pub fn validate(&self) -> Result<()> {
        let start = self.start.ok_or(ErrorKind::MissingStart)?;

        if !self.rules.iter().any(|rule| rule.lhs == start) {
            return Err(ErrorKind::MissingStartRule(self.symbols[start].name.clone()).into());
        }

        for rule in &self.rules {
            for &sym in &rule.rhs {
                if self.symbols[sym].is_non_terminal()
                    && !self.rules.iter().any(|rule| rule.lhs == sym)
                {
                    return Err(
                        ErrorKind::UndefinedNonTerminal(self.symbols[sym].name.clone()).into(),
                    );
                }
            }
        }

        Ok(())
    }

    /// Validates the grammar and computes the FIRST and FOLLOW tables.
    ///
    /// Must run before table construction.
    pub fn analyze(&mut self) -> Result<()> {
        self.validate()?;
        self.compute_first();
        self.compute_follow();

        for rule in &self.rules {
            debug!("rule {}", self.render_rule(rule.id));
        }

        Ok(())
    }

    pub fn is_analyzed(&self) -> bool {
        !self.first.is_empty()
    }

    /// FIRST fixpoint: FIRST(t) = {t} for terminals, then for every
    /// production unions the FIRST of its body prefix into FIRST(lhs) until
    /// no set changes. A production whose whole body can vanish marks its
    /// head nullable.
    pub fn compute_first(&mut self) {
        let mut first = vec![FirstSet::default(); self.symbols.len()];
        for (id, sym) in self.symbols.iter().enumerate() {
            if sym.is_terminal() {
                first[id].terminals.insert(id);
            }
        }

        loop {
            let mut changed = false;

            for rule in &self.rules {
                let addition = sequence_first(&first, &rule.rhs);
                let dst = &mut first[rule.lhs];

                let before = dst.terminals.len();
                dst.terminals.extend(addition.terminals);
                changed |= dst.terminals.len() != before;

                if addition.nullable && !dst.nullable {
                    dst.nullable = true;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        self.first = first;
    }

    /// FOLLOW fixpoint, seeded with FOLLOW(`<start>`) = {EOF}.
    ///
    /// Not consulted by LR(1) construction (item lookaheads are exact);
    /// kept for diagnostics and grammar validation.
    ///
    /// Requires [`Grammar::compute_first`] to have run.
    pub fn compute_follow(&mut self) {
        let mut follow: Vec<BTreeSet<SymbolId>> = vec![BTreeSet::new(); self.symbols.len()];
        follow[Self::START].insert(Self::EOF);

        loop {
            let mut changed = false;

            for rule in &self.rules {
                for (pos, &sym) in rule.rhs.iter().enumerate() {
                    if self.symbols[sym].is_terminal() {
                        continue;
                    }

                    let suffix = sequence_first(&self.first, &rule.rhs[pos + 1..]);

                    let before = follow[sym].len();
                    follow[sym].extend(suffix.terminals);
                    if suffix.nullable {
                        let head: Vec<SymbolId> = follow[rule.lhs].iter().copied().collect();
                        follow[sym].extend(head);
                    }
                    changed |= follow[sym].len() != before;
                }
            }

            if !changed {
                break;
            }
        }

        self.follow = follow;
    }

    /// FIRST of an arbitrary symbol sequence, used for lookahead
    /// propagation during closure-edge computation.
    pub fn first_of_sequence(&self, sequence: &[SymbolId]) -> FirstSet {
        sequence_first(&self.first, sequence)
    }

    /// FIRST(sym). Panics if the grammar has not been analyzed.
    pub fn first(&self, sym: SymbolId) -> &FirstSet {
        &self.first[sym]
    }

    /// FOLLOW(sym). Panics if the grammar has not been analyzed.
    pub fn follow(&self, sym: SymbolId) -> &BTreeSet<SymbolId> {
        &self.follow[sym]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn rule(&self, id: RuleId) -> &Production {
        &self.rules[id]
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn start(&self) -> Option<SymbolId> {
        self.start
    }

    /// The augmented production `<start> -> S`, once the start symbol is
    /// designated.
    pub fn start_rule(&self) -> Option<RuleId> {
        self.start_rule
    }

    pub fn iter_symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate()
    }

    pub fn iter_terminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.iter_symbols()
            .filter(|(_, sym)| sym.is_terminal())
            .map(|(id, _)| id)
    }

    pub fn iter_non_terminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.iter_symbols()
            .filter(|(_, sym)| sym.is_non_terminal())
            .map(|(id, _)| id)
    }

    pub fn iter_rules(&self) -> impl Iterator<Item = &Production> {
        self.rules.iter()
    }

    pub fn iter_rules_of(&self, lhs: SymbolId) -> impl Iterator<Item = &Production> {
        self.rules.iter().filter(move |rule| rule.lhs == lhs)
    }

    pub fn render_rule(&self, id: RuleId) -> String {
        let rule = &self.rules[id];
        let rhs = if rule.is_epsilon() {
            "ε".to_string()
        } else {
            rule.rhs
                .iter()
                .map(|&sym| self.symbols[sym].name.as_str())
                .join(" ")
        };
        format!("({}) {} -> {}", rule.id, self.symbols[rule.lhs], rhs)
    }
}
