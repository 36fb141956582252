use log::trace;

use crate::error::{Error, ErrorKind, ExpectedSymbols, Result, SyntaxError};
use crate::grammar::Grammar;
use crate::rule::RuleId;
use crate::span::Span;
use crate::symbol::SymbolId;
use crate::token::Token;

mod action;
mod graph;
mod table;

pub use action::Action;
pub use graph::{Automaton, State, StateId};
pub use table::Table;

/// How many upcoming token texts a syntax error previews.
const PREVIEW_WINDOW: usize = 4;

/// The shift-reduce engine.
///
/// Drives a token stream against a built [`Table`] and produces the parse
/// trace: the ordered list of productions applied, from which a caller can
/// reconstruct the derivation tree bottom-up. The parser borrows the table
/// immutably; each parse owns its own state stack and trace, so independent
/// parses may run concurrently against the same table.
pub struct Parser<'g, 'table> {
    grammar: &'g Grammar,
    table: &'table Table<'g>,
}

impl<'g, 'table> Parser<'g, 'table> {
    pub fn new(table: &'table Table<'g>) -> Self {
        Self {
            grammar: table.grammar(),
            table,
        }
    }

    /// Parses a token stream to its reduction trace.
    ///
    /// End of input is implicit: running off the end of the slice behaves
    /// as the reserved `EOF` terminal.
    pub fn parse(&self, tokens: &[Token]) -> Result<Vec<RuleId>> {
        let mut states: Vec<StateId> = vec![0];
        let mut trace: Vec<RuleId> = Vec::new();
        let mut cursor = 0usize;

        loop {
            let state = *states.last().expect("state stack is never empty");

            let (sym, span, text) = match tokens.get(cursor) {
                Some(token) => {
                    let sym = self.terminal_id(token)?;
                    (sym, token.span, token.text.as_str())
                }
                None => (
                    Grammar::EOF,
                    tokens.last().map(|token| token.span).unwrap_or_default(),
                    "<eof>",
                ),
            };

            let Some(action) = self.table.action(state, sym) else {
                return Err(self.syntax_error(state, span, text, tokens, cursor, trace));
            };

            trace!("#{} {} :: {}", state, text, action);

            match action {
                Action::Shift(to) => {
                    states.push(to);
                    cursor += 1;
                }
                Action::Reduce(rule_id) => {
                    let rule = self.grammar.rule(rule_id);

                    // An epsilon production pops nothing.
                    states.truncate(states.len() - rule.rhs.len());
                    let top = *states.last().expect("state stack is never empty");

                    let to = self.table.goto(top, rule.lhs).unwrap_or_else(|| {
                        panic!(
                            "goto({}, {}) is undefined: the action table is inconsistent",
                            top,
                            self.grammar.symbol(rule.lhs)
                        )
                    });
                    states.push(to);
                    trace.push(rule_id);
                }
                Action::Accept => return Ok(trace),
            }
        }
    }

    /// Resolves a token's terminal symbol; token kinds that are not
    /// registered terminals of the grammar are rejected.
    fn terminal_id(&self, token: &Token) -> Result<SymbolId> {
        self.grammar
            .symbol_id(&token.kind)
            .filter(|&sym| self.grammar.symbol(sym).is_terminal())
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::UnknownSymbol(token.kind.clone()),
                    Some(token.span),
                )
            })
    }

    fn syntax_error(
        &self,
        state: StateId,
        span: Span,
        got: &str,
        tokens: &[Token],
        cursor: usize,
        trace: Vec<RuleId>,
    ) -> Error {
        let expected = ExpectedSymbols(
            self.table
                .expected_terminals(state)
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
        let preview = tokens
            .iter()
            .skip(cursor)
            .take(PREVIEW_WINDOW)
            .map(|token| token.text.clone())
            .collect();

        Error::new(
            ErrorKind::Syntax(SyntaxError {
                span,
                got: got.to_string(),
                expected,
                preview,
                trace,
            }),
            Some(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn trace_of(grammar: &Grammar, input: &[&str]) -> Result<Vec<RuleId>> {
        let table = Table::build(grammar)?;
        Parser::new(&table).parse(&fixtures::tokens(input))
    }

    #[test]
    fn test_accept_with_trace() {
        let grammar = fixtures::expr_grammar();

        // n + n: T -> n, E -> T, T -> n, E -> E + T
        let trace = trace_of(&grammar, &["n", "+", "n"]).unwrap();
        assert_eq!(trace, vec![3, 2, 3, 1]);
    }

    #[test]
    fn test_epsilon_reduction_pops_nothing() {
        let grammar = fixtures::nested_epsilon_grammar();

        // x y: E -> ε between the two shifts, then A -> x E y.
        let trace = trace_of(&grammar, &["x", "y"]).unwrap();
        assert_eq!(trace, vec![2, 1]);
    }

    #[test]
    fn test_empty_input_on_nullable_grammar() {
        let grammar = fixtures::balanced_grammar();

        let trace = trace_of(&grammar, &[]).unwrap();
        assert_eq!(trace, vec![2]);
    }

    #[test]
    fn test_syntax_error_reports_expected_set() {
        let grammar = fixtures::balanced_grammar();
        let table = Table::build(&grammar).unwrap();
        let parser = Parser::new(&table);

        // "aa" stops at end of input where only `a` or `b` may follow.
        let err = parser.parse(&fixtures::tokens(&["a", "a"])).unwrap_err();
        let ErrorKind::Syntax(syntax) = err.kind() else {
            panic!("expected a syntax error, got {err}");
        };

        assert_eq!(syntax.got, "<eof>");
        assert_eq!(syntax.expected.0, vec!["a", "b"]);
    }

    #[test]
    fn test_syntax_error_reports_position_and_preview() {
        let grammar = fixtures::balanced_grammar();
        let table = Table::build(&grammar).unwrap();
        let parser = Parser::new(&table);

        let err = parser
            .parse(&fixtures::tokens(&["a", "b", "b"]))
            .unwrap_err();
        assert_eq!(err.span().unwrap().from.column, 3);

        let ErrorKind::Syntax(syntax) = err.kind() else {
            panic!("expected a syntax error, got {err}");
        };
        assert_eq!(syntax.got, "b");
        assert_eq!(syntax.preview, vec!["b"]);
        // One reduction (the inner epsilon) already happened.
        assert_eq!(syntax.trace, vec![2]);
    }

    #[test]
    fn test_unknown_token_kind_is_rejected() {
        let grammar = fixtures::balanced_grammar();
        let table = Table::build(&grammar).unwrap();
        let parser = Parser::new(&table);

        let err = parser.parse(&fixtures::tokens(&["z"])).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnknownSymbol(name) if name == "z"
        ));
    }

    #[test]
    fn test_parses_are_independent() {
        let grammar = fixtures::balanced_grammar();
        let table = Table::build(&grammar).unwrap();
        let parser = Parser::new(&table);

        assert!(parser.parse(&fixtures::tokens(&["a", "a"])).is_err());
        // The failed parse leaves no residue behind.
        let trace = parser.parse(&fixtures::tokens(&["a", "b"])).unwrap();
        assert_eq!(trace, vec![2, 1]);
    }
}
