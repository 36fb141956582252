use crate::symbol::SymbolId;

/// The production's identifier in the grammar.
///
/// Reductions in a parse trace reference productions by this index.
pub type RuleId = usize;

/// A grammar production `lhs -> rhs`.
///
/// An empty `rhs` is an epsilon production. Productions are immutable once
/// registered and their ids are stable for the lifetime of the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub id: RuleId,
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
}

impl Production {
    #[inline(always)]
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}
