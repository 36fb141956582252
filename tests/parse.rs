use canonlr::{Cursor, ErrorKind, Grammar, Parser, Span, Table, Token};

fn tokens(kinds: &[&str]) -> Vec<Token> {
    kinds
        .iter()
        .enumerate()
        .map(|(at, kind)| Token::new(*kind, *kind, Span::from(Cursor::new(1, at + 1))))
        .collect()
}

fn balanced() -> Grammar {
    let mut grammar = Grammar::new();
    grammar.set_start("S").unwrap();
    grammar.add_rules("S", &["a S b", ""]).unwrap();
    grammar.analyze().unwrap();
    grammar
}

#[test]
fn balanced_grammar_round_trip() {
    let grammar = balanced();
    let table = Table::build(&grammar).unwrap();
    let parser = Parser::new(&table);

    // Rules: (1) S -> a S b, (2) S -> ε.
    assert_eq!(parser.parse(&tokens(&[])).unwrap(), vec![2]);
    assert_eq!(parser.parse(&tokens(&["a", "b"])).unwrap(), vec![2, 1]);
    assert_eq!(
        parser.parse(&tokens(&["a", "a", "b", "b"])).unwrap(),
        vec![2, 1, 1]
    );
}

#[test]
fn balanced_grammar_rejects_with_positions() {
    let grammar = balanced();
    let table = Table::build(&grammar).unwrap();
    let parser = Parser::new(&table);

    // "a" fails at end of input, after the token in column 1.
    let err = parser.parse(&tokens(&["a"])).unwrap_err();
    assert_eq!(err.span().unwrap().from, Cursor::new(1, 1));

    // "abb" fails on the second b, in column 3.
    let err = parser.parse(&tokens(&["a", "b", "b"])).unwrap_err();
    assert_eq!(err.span().unwrap().from, Cursor::new(1, 3));
}

#[test]
fn ambiguous_grammar_is_rejected_at_construction() {
    let mut grammar = Grammar::new();
    grammar.set_start("S").unwrap();
    grammar.add_rules("S", &["i S", "i S e S", "x"]).unwrap();
    grammar.analyze().unwrap();

    assert!(matches!(
        Table::build(&grammar).unwrap_err().kind(),
        ErrorKind::ShiftReduceConflict { .. }
    ));
}

#[test]
fn trace_reconstructs_the_derivation() {
    let mut grammar = Grammar::new();
    grammar.set_start("E").unwrap();
    grammar.add_rules("E", &["E + T", "T"]).unwrap();
    grammar.add_rules("T", &["n", "( E )"]).unwrap();
    grammar.analyze().unwrap();

    let table = Table::build(&grammar).unwrap();
    let parser = Parser::new(&table);

    let trace = parser
        .parse(&tokens(&["(", "n", ")", "+", "n"]))
        .unwrap();

    // Bottom-up: T -> n, E -> T, T -> ( E ), E -> T, T -> n, E -> E + T.
    assert_eq!(trace, vec![3, 2, 4, 2, 3, 1]);

    // Replaying the trace bottom-up rebuilds exactly one start symbol.
    let mut stack: Vec<&str> = Vec::new();
    let mut input = vec!["(", "n", ")", "+", "n"].into_iter().peekable();
    for &rule_id in &trace {
        let rule = grammar.rule(rule_id);
        // Shift until the body's terminals are available.
        while stack.len() < rule.rhs.len()
            || !rule
                .rhs
                .iter()
                .rev()
                .zip(stack.iter().rev())
                .all(|(&sym, &name)| grammar.symbol(sym).name == name)
        {
            stack.push(input.next().unwrap());
        }
        stack.truncate(stack.len() - rule.rhs.len());
        stack.push(grammar.symbol(rule.lhs).name.as_str());
    }
    assert!(input.peek().is_none());
    assert_eq!(stack, vec!["E"]);
}
