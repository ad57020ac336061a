use super::matcher::MatchContext;
use crate::engines::rules::InputSymbol;
use crate::types::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternSymbol {
    pub symbol: Symbol,
    pub arity: usize,
}

impl From<&InputSymbol> for PatternSymbol {
    fn from(input: &InputSymbol) -> Self {
        Self {
            symbol: input.symbol,
            arity: input.arity(),
        }
    }
}

/// Left context: a linear chain of ancestors, nearest last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PrefixPattern {
    symbols: Vec<PatternSymbol>,
}

impl PrefixPattern {
    pub fn new(inputs: &[InputSymbol]) -> Self {
        Self {
            symbols: inputs.iter().map(PatternSymbol::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Walks backward from `index`. On success `matched` holds the string index of each
    /// pattern symbol, in pattern order.
    pub fn match_backward(
        &self,
        ctx: &MatchContext<'_>,
        index: usize,
        matched: &mut Vec<usize>,
    ) -> bool {
        matched.clear();
        let branches = ctx.cache.branches();
        let mut cursor = index;
        for pattern in self.symbols.iter().rev() {
            loop {
                if cursor == 0 {
                    return false;
                }
                cursor -= 1;
                let symbol = ctx.string.symbol_at(cursor);
                if symbol == branches.open || ctx.ignored.contains(symbol) {
                    continue;
                }
                if symbol == branches.close {
                    // sibling branch, resume before its opening
                    match ctx.cache.matching(cursor) {
                        Some(open) => {
                            cursor = open;
                            continue;
                        }
                        None => return false,
                    }
                }
                if symbol == pattern.symbol && ctx.string.param_count_at(cursor) == pattern.arity {
                    matched.push(cursor);
                    break;
                }
                return false;
            }
        }
        matched.reverse();
        true
    }
}
