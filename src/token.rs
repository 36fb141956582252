use crate::span::Span;

/// An input token, as handed over by the lexical analyzer.
///
/// `kind` is the name of the terminal symbol the token matches; `text` is
/// the literal slice of source it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: String,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new<K, T>(kind: K, text: T, span: Span) -> Self
    where
        K: ToString,
        T: ToString,
    {
        Self {
            kind: kind.to_string(),
            text: text.to_string(),
            span,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.kind, self.text)
    }
}
