use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense symbol code. Stable for the lifetime of one compiled system.
pub type Symbol = u32;

/// Location of a fragment inside the source text it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub offset: usize,
    pub length: usize,
}

impl SourceSpan {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(&self, other: &SourceSpan) -> SourceSpan {
        let start = self.offset.min(other.offset);
        let end = self.end().max(other.end());
        SourceSpan::new(start, end - start)
    }

    pub fn shifted(&self, by: usize) -> SourceSpan {
        SourceSpan::new(self.offset + by, self.length)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.offset, self.end())
    }
}

/// Offset and length of one symbol's parameters inside the flat parameter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JaggedIndex {
    pub offset: usize,
    pub length: usize,
}

impl JaggedIndex {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// The two symbols delimiting a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSymbols {
    pub open: Symbol,
    pub close: Symbol,
}

impl BranchSymbols {
    pub fn new(open: Symbol, close: Symbol) -> Self {
        Self { open, close }
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        symbol == self.open || symbol == self.close
    }
}

/// Dense membership set over symbol codes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolSet {
    bits: Vec<bool>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        let index = symbol as usize;
        if index >= self.bits.len() {
            self.bits.resize(index + 1, false);
        }
        self.bits[index] = true;
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.bits.get(symbol as usize).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut set = SymbolSet::new();
        for symbol in iter {
            set.insert(symbol);
        }
        set
    }
}
