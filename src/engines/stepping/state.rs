use crate::symbols::SymbolString;
use std::sync::Arc;

/// One published generation. Stepping produces a new state and never mutates this one.
#[derive(Debug, Clone)]
pub struct GenerationState {
    symbols: Arc<SymbolString>,
    seed: u64,
    step: u64,
}

impl GenerationState {
    pub(crate) fn new(symbols: SymbolString, seed: u64, step: u64) -> Self {
        Self {
            symbols: Arc::new(symbols),
            seed,
            step,
        }
    }

    pub fn symbols(&self) -> &SymbolString {
        &self.symbols
    }

    pub fn shared_symbols(&self) -> Arc<SymbolString> {
        Arc::clone(&self.symbols)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
