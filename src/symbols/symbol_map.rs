use crate::error::{LSystemError, Result};
use crate::types::{BranchSymbols, SourceSpan, Symbol};
use std::collections::HashMap;

/// Characters with a syntactic role in rule text; they can never name a symbol.
pub const RESERVED_CHARACTERS: &[char] = &['(', ')', ',', '<', '>', ':', '|'];

/// Maps source characters to symbol codes.
pub trait SymbolRemapper {
    fn symbol_for(&mut self, character: char) -> Symbol;
}

/// Dense, insertion-ordered character table.
#[derive(Debug, Clone, Default)]
pub struct CharSymbolMap {
    by_char: HashMap<char, Symbol>,
    chars: Vec<char>,
}

impl CharSymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the branch delimiters registered first, so they always get codes 0 and 1.
    pub fn with_branches(open: char, close: char) -> Self {
        let mut map = Self::new();
        map.intern(open);
        map.intern(close);
        map
    }

    pub fn intern(&mut self, character: char) -> Symbol {
        if let Some(symbol) = self.by_char.get(&character) {
            return *symbol;
        }
        let symbol = self.chars.len() as Symbol;
        self.chars.push(character);
        self.by_char.insert(character, symbol);
        symbol
    }

    pub fn symbol(&self, character: char) -> Option<Symbol> {
        self.by_char.get(&character).copied()
    }

    pub fn character(&self, symbol: Symbol) -> Option<char> {
        self.chars.get(symbol as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Symbol to character lookup, as consumed by `SymbolString::to_display_string`.
    pub fn reverse_map(&self) -> HashMap<Symbol, char> {
        self.chars
            .iter()
            .enumerate()
            .map(|(i, c)| (i as Symbol, *c))
            .collect()
    }

    pub fn branch_symbols(&mut self, open: char, close: char) -> Result<BranchSymbols> {
        for c in [open, close] {
            if RESERVED_CHARACTERS.contains(&c) || c.is_whitespace() {
                return Err(LSystemError::Configuration(format!(
                    "'{}' cannot be used as a branch symbol",
                    c
                )));
            }
        }
        if open == close {
            return Err(LSystemError::Configuration(
                "Branch open and close symbols must differ".to_string(),
            ));
        }
        Ok(BranchSymbols::new(self.intern(open), self.intern(close)))
    }

    /// Interns every non-whitespace character of `text`.
    pub fn symbols_of(&mut self, text: &str) -> Result<Vec<Symbol>> {
        let mut symbols = Vec::new();
        for (offset, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            if RESERVED_CHARACTERS.contains(&c) {
                return Err(LSystemError::syntax(
                    format!("'{}' cannot be used as a symbol", c),
                    SourceSpan::new(offset, 1),
                ));
            }
            symbols.push(self.intern(c));
        }
        Ok(symbols)
    }
}

impl SymbolRemapper for CharSymbolMap {
    fn symbol_for(&mut self, character: char) -> Symbol {
        self.intern(character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable_and_dense() {
        let mut map = CharSymbolMap::with_branches('[', ']');
        let a = map.intern('A');
        let b = map.intern('B');
        assert_eq!(map.intern('A'), a);
        assert_eq!((a, b), (2, 3));
        assert_eq!(map.character(b), Some('B'));
        assert_eq!(map.reverse_map().get(&0), Some(&'['));
    }

    #[test]
    fn test_symbols_of_rejects_reserved_character() {
        let mut map = CharSymbolMap::new();
        assert!(map.symbols_of("AB").is_ok());
        assert!(matches!(map.symbols_of("A<B"), Err(LSystemError::Syntax { .. })));
    }

    #[test]
    fn test_branch_symbols_must_differ() {
        let mut map = CharSymbolMap::new();
        assert!(map.branch_symbols('[', '[').is_err());
        let branches = map.branch_symbols('[', ']').unwrap();
        assert!(branches.contains(map.intern(']')));
    }
}
