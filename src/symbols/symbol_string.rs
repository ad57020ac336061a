use crate::error::{LSystemError, Result};
use crate::types::{JaggedIndex, Symbol};
use std::collections::HashMap;
use std::fmt::Write;

/// A generation: symbol codes with a variable-length parameter vector per symbol.
///
/// Stored as three parallel arrays. `indexing[i]` locates the parameters of `symbols[i]`
/// inside `parameters`; offsets are increasing and never overlap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolString {
    symbols: Vec<Symbol>,
    indexing: Vec<JaggedIndex>,
    parameters: Vec<f64>,
}

impl SymbolString {
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        Self {
            symbols: symbols.to_vec(),
            indexing: vec![JaggedIndex::default(); symbols.len()],
            parameters: Vec::new(),
        }
    }

    pub fn from_jagged(symbols: &[Symbol], parameters: &[Vec<f64>]) -> Result<Self> {
        if symbols.len() != parameters.len() {
            return Err(LSystemError::MalformedString(format!(
                "{} symbols but {} parameter vectors",
                symbols.len(),
                parameters.len()
            )));
        }
        let mut builder = SymbolStringBuilder::with_capacity(
            symbols.len(),
            parameters.iter().map(Vec::len).sum(),
        );
        for (symbol, params) in symbols.iter().zip(parameters) {
            builder.push(*symbol, params);
        }
        Ok(builder.finish())
    }

    /// Assembles a string from arrays that were written in place.
    pub(crate) fn from_parts(
        symbols: Vec<Symbol>,
        indexing: Vec<JaggedIndex>,
        parameters: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(symbols.len(), indexing.len());
        Self {
            symbols,
            indexing,
            parameters,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbol_at(&self, index: usize) -> Symbol {
        self.symbols[index]
    }

    pub fn params_at(&self, index: usize) -> &[f64] {
        &self.parameters[self.indexing[index].range()]
    }

    pub fn param_count_at(&self, index: usize) -> usize {
        self.indexing[index].length
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn indexing(&self) -> &[JaggedIndex] {
        &self.indexing
    }

    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    pub fn total_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &[f64])> + '_ {
        (0..self.len()).map(move |i| (self.symbols[i], self.params_at(i)))
    }

    /// Renders the string as text, e.g. `A(1, 2)B[C]`. Symbols absent from the map print as `?`.
    pub fn to_display_string(&self, symbol_to_char: &HashMap<Symbol, char>) -> String {
        let mut out = String::with_capacity(self.len());
        for (symbol, params) in self.iter() {
            out.push(symbol_to_char.get(&symbol).copied().unwrap_or('?'));
            if params.is_empty() {
                continue;
            }
            out.push('(');
            for (i, value) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}", value);
            }
            out.push(')');
        }
        out
    }
}

/// Appends symbols with their parameters contiguously.
#[derive(Debug, Default)]
pub struct SymbolStringBuilder {
    symbols: Vec<Symbol>,
    indexing: Vec<JaggedIndex>,
    parameters: Vec<f64>,
}

impl SymbolStringBuilder {
    pub fn with_capacity(symbols: usize, parameters: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(symbols),
            indexing: Vec::with_capacity(symbols),
            parameters: Vec::with_capacity(parameters),
        }
    }

    pub fn push(&mut self, symbol: Symbol, params: &[f64]) -> &mut Self {
        self.indexing
            .push(JaggedIndex::new(self.parameters.len(), params.len()));
        self.symbols.push(symbol);
        self.parameters.extend_from_slice(params);
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn finish(self) -> SymbolString {
        SymbolString::from_parts(self.symbols, self.indexing, self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jagged_parameters_are_contiguous() {
        let string = SymbolString::from_jagged(&[1, 2, 3], &[vec![1.0, 2.0], vec![], vec![3.0]])
            .unwrap();
        assert_eq!(string.len(), 3);
        assert_eq!(string.params_at(0), &[1.0, 2.0]);
        assert!(string.params_at(1).is_empty());
        assert_eq!(string.params_at(2), &[3.0]);
        assert_eq!(string.indexing()[2], JaggedIndex::new(2, 1));
        assert_eq!(string.total_parameters(), 3);
    }

    #[test]
    fn test_from_jagged_rejects_length_mismatch() {
        let result = SymbolString::from_jagged(&[1, 2], &[vec![]]);
        assert!(matches!(result, Err(LSystemError::MalformedString(_))));
    }

    #[test]
    fn test_display_string_formats_parameters() {
        let mut map = HashMap::new();
        map.insert(0, 'A');
        map.insert(1, 'B');
        let string = SymbolString::from_jagged(&[0, 1, 7], &[vec![1.0, 2.5], vec![], vec![]])
            .unwrap();
        assert_eq!(string.to_display_string(&map), "A(1, 2.5)B?");
    }

    #[test]
    fn test_equality_compares_parameters() {
        let a = SymbolString::from_jagged(&[1], &[vec![1.0]]).unwrap();
        let b = SymbolString::from_jagged(&[1], &[vec![2.0]]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
