//! Canonical LR(1) table generation and shift-reduce parsing.
//!
//! A [`Grammar`] is declared from whitespace-delimited production strings,
//! analyzed (FIRST/FOLLOW fixpoints), compiled into an action/goto
//! [`Table`] through the canonical LR(1) collection, and finally driven by
//! the [`Parser`] against a token stream to produce a parse trace.

pub mod error;
pub mod grammar;
pub mod item;
pub mod lr;
pub mod rule;
pub mod span;
pub mod symbol;
pub mod token;

pub use error::{Error, ErrorKind, ExpectedSymbols, Result, SyntaxError};
pub use grammar::{FirstSet, Grammar};
pub use item::{Item, ItemId, ItemUniverse};
pub use lr::{Action, Automaton, Parser, State, StateId, Table};
pub use rule::{Production, RuleId};
pub use span::{Cursor, Span};
pub use symbol::{Symbol, SymbolId, SymbolKind};
pub use token::Token;

#[cfg(test)]
pub mod fixtures {
    use crate::{Cursor, Grammar, Span, Token};

    /// `S -> a S b | ε`
    pub fn balanced_grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar.set_start("S").unwrap();
        grammar.add_rules("S", &["a S b", ""]).unwrap();
        grammar.analyze().unwrap();
        grammar
    }

    /// `E -> E + T | T`, `T -> n | ( E )`
    pub fn expr_grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar.set_start("E").unwrap();
        grammar.add_rules("E", &["E + T", "T"]).unwrap();
        grammar.add_rules("T", &["n", "( E )"]).unwrap();
        grammar.analyze().unwrap();
        grammar
    }

    /// The dangling-else shape: `S -> i S | i S e S | x`. Not LR(1).
    pub fn dangling_grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar.set_start("S").unwrap();
        grammar.add_rules("S", &["i S", "i S e S", "x"]).unwrap();
        grammar.analyze().unwrap();
        grammar
    }

    /// `A -> x E y`, `E -> ε`: an epsilon production inside a longer body.
    pub fn nested_epsilon_grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar.set_start("A").unwrap();
        grammar.add_rules("A", &["x E y"]).unwrap();
        grammar.add_rules("E", &[""]).unwrap();
        grammar.analyze().unwrap();
        grammar
    }

    /// One token per kind, all on line 1, columns starting at 1.
    pub fn tokens(kinds: &[&str]) -> Vec<Token> {
        kinds
            .iter()
            .enumerate()
            .map(|(at, kind)| Token::new(*kind, *kind, Span::from(Cursor::new(1, at + 1))))
            .collect()
    }
}
