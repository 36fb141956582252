use std::hash::Hash;

/// Handle of an interned symbol inside a [`crate::Grammar`].
pub type SymbolId = usize;

/// Name of the reserved end-of-input terminal.
pub const EOF: &str = "EOF";

/// Name of the internal augmented start symbol.
pub const START: &str = "<start>";

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
    Start,
    Eof,
}

/// A grammar symbol.
///
/// Symbols are interned by the grammar: two symbols with the same name are
/// the same symbol, and equality and ordering go by name alone.
#[derive(Debug, Clone, Eq)]
pub struct Symbol {
    /// *Unique* name of the symbol.
    pub name: String,
    pub kind: SymbolKind,
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The end-of-input terminal ($).
    pub fn eof() -> Self {
        Self::new(EOF, SymbolKind::Eof)
    }

    /// The augmented start symbol.
    ///
    /// Its single production `<start> -> S` is added when the grammar's
    /// start symbol is designated.
    pub fn start() -> Self {
        Self::new(START, SymbolKind::Start)
    }

    #[inline(always)]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal | SymbolKind::Eof)
    }

    #[inline(always)]
    pub fn is_non_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::NonTerminal | SymbolKind::Start)
    }

    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, SymbolKind::Eof)
    }

    #[inline(always)]
    pub fn is_start(&self) -> bool {
        matches!(self.kind, SymbolKind::Start)
    }
}

/// Naming convention: non-terminals start with an uppercase letter,
/// terminals with a lowercase or symbolic character.
pub fn is_non_terminal_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_equality_is_by_name() {
        let a = Symbol::new("a", SymbolKind::Terminal);
        let b = Symbol::new("a", SymbolKind::Terminal);
        assert_eq!(a, b);
        assert!(a < Symbol::new("b", SymbolKind::Terminal));
    }

    #[test]
    fn test_naming_convention() {
        assert!(is_non_terminal_name("Expr"));
        assert!(!is_non_terminal_name("ident"));
        assert!(!is_non_terminal_name("+"));
        assert!(!is_non_terminal_name(""));
    }
}
