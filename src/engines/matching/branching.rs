use crate::error::{LSystemError, Result};
use crate::types::{BranchSymbols, Symbol};

/// Matching-bracket table for one generation, built in a single pass.
///
/// `matching(i)` of an open symbol is the index of its close and vice versa. Brackets that
/// never pair up get no entry, and matching treats them as walls.
#[derive(Debug, Clone)]
pub struct BranchingCache {
    branches: BranchSymbols,
    jumps: Vec<Option<usize>>,
    unmatched_open: usize,
    unmatched_close: usize,
}

impl BranchingCache {
    pub fn build(symbols: &[Symbol], branches: BranchSymbols) -> Self {
        let mut jumps = vec![None; symbols.len()];
        let mut stack = Vec::new();
        let mut unmatched_close = 0;
        for (i, symbol) in symbols.iter().enumerate() {
            if *symbol == branches.open {
                stack.push(i);
            } else if *symbol == branches.close {
                match stack.pop() {
                    Some(open) => {
                        jumps[open] = Some(i);
                        jumps[i] = Some(open);
                    }
                    None => unmatched_close += 1,
                }
            }
        }
        Self {
            branches,
            jumps,
            unmatched_open: stack.len(),
            unmatched_close,
        }
    }

    pub fn branches(&self) -> BranchSymbols {
        self.branches
    }

    pub fn matching(&self, index: usize) -> Option<usize> {
        self.jumps.get(index).copied().flatten()
    }

    pub fn is_balanced(&self) -> bool {
        self.unmatched_open == 0 && self.unmatched_close == 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.unmatched_close > 0 {
            return Err(LSystemError::MalformedString(format!(
                "Too many closing branch symbols ({} unmatched)",
                self.unmatched_close
            )));
        }
        if self.unmatched_open > 0 {
            return Err(LSystemError::MalformedString(format!(
                "Too many opening branch symbols ({} unmatched)",
                self.unmatched_open
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: Symbol = 0;
    const CLOSE: Symbol = 1;
    const A: Symbol = 2;

    fn encode(text: &str) -> Vec<Symbol> {
        text.chars()
            .map(|c| match c {
                '[' => OPEN,
                ']' => CLOSE,
                _ => A,
            })
            .collect()
    }

    #[test]
    fn test_nested_branches_pair_up() {
        let symbols = encode("A[AA]AAA[A[AAA[A]]]A");
        let cache = BranchingCache::build(&symbols, BranchSymbols::new(OPEN, CLOSE));
        assert!(cache.is_balanced());
        assert_eq!(cache.matching(18), Some(8));
        assert_eq!(cache.matching(17), Some(10));
        assert_eq!(cache.matching(4), Some(1));
        assert_eq!(cache.matching(1), Some(4));
        assert_eq!(cache.matching(0), None);
    }

    #[test]
    fn test_unbalanced_strings_are_reported() {
        let branches = BranchSymbols::new(OPEN, CLOSE);
        let closing = BranchingCache::build(&encode("A]A"), branches);
        assert!(closing.validate().is_err());
        let opening = BranchingCache::build(&encode("A[A[A]"), branches);
        assert!(!opening.is_balanced());
        assert_eq!(opening.matching(1), None);
        assert_eq!(opening.matching(3), Some(5));
    }
}
