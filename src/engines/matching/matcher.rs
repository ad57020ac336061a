use super::branching::BranchingCache;
use crate::engines::rules::{Rule, RuleTable};
use crate::symbols::SymbolString;
use crate::types::SymbolSet;

/// Read-only view of one generation shared by every match attempt in a step.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub string: &'a SymbolString,
    pub cache: &'a BranchingCache,
    pub ignored: &'a SymbolSet,
    pub globals: &'a [f64],
}

impl<'a> MatchContext<'a> {
    /// Next symbol at the same branch level, stepping over whole bracketed spans.
    pub fn successor(&self, index: usize) -> Option<usize> {
        let branches = self.cache.branches();
        let mut j = index + 1;
        while j < self.string.len() {
            let symbol = self.string.symbol_at(j);
            if self.ignored.contains(symbol) {
                j += 1;
            } else if symbol == branches.open {
                j = self.cache.matching(j)? + 1;
            } else if symbol == branches.close {
                return None;
            } else {
                return Some(j);
            }
        }
        None
    }

    /// First symbols of the branches that directly follow `index`.
    pub fn branch_children(&self, index: usize, out: &mut Vec<usize>) {
        let open = self.cache.branches().open;
        let mut j = index + 1;
        while j < self.string.len() {
            let symbol = self.string.symbol_at(j);
            if self.ignored.contains(symbol) {
                j += 1;
            } else if symbol == open {
                self.first_in_branch(j + 1, out);
                match self.cache.matching(j) {
                    Some(close) => j = close + 1,
                    None => return,
                }
            } else {
                return;
            }
        }
    }

    fn first_in_branch(&self, start: usize, out: &mut Vec<usize>) {
        let branches = self.cache.branches();
        let mut k = start;
        while k < self.string.len() {
            let symbol = self.string.symbol_at(k);
            if self.ignored.contains(symbol) {
                k += 1;
            } else if symbol == branches.open {
                // a branch opening a branch: its children belong to the same parent
                self.first_in_branch(k + 1, out);
                match self.cache.matching(k) {
                    Some(close) => k = close + 1,
                    None => return,
                }
            } else if symbol == branches.close {
                return;
            } else {
                out.push(k);
                return;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    TryTarget,
    TryPrefix,
    TrySuffix,
    Capture,
    CheckCondition,
    Matched,
    NoMatch,
}

/// Per-worker buffers reused across match attempts.
#[derive(Debug, Default)]
pub struct MatchScratch {
    prefix: Vec<usize>,
    suffix: Vec<usize>,
    pub captured: Vec<f64>,
}

impl MatchScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Runs one rule against position `index`. On success `scratch.captured` holds the
/// captured parameters in declaration order.
pub fn try_match(
    rule: &Rule,
    ctx: &MatchContext<'_>,
    index: usize,
    scratch: &mut MatchScratch,
) -> bool {
    let mut state = MatchState::TryTarget;
    loop {
        state = match state {
            MatchState::TryTarget => {
                if ctx.string.symbol_at(index) == rule.target
                    && ctx.string.param_count_at(index) == rule.target_arity
                {
                    MatchState::TryPrefix
                } else {
                    MatchState::NoMatch
                }
            }
            MatchState::TryPrefix => {
                if rule.prefix.match_backward(ctx, index, &mut scratch.prefix) {
                    MatchState::TrySuffix
                } else {
                    MatchState::NoMatch
                }
            }
            MatchState::TrySuffix => {
                if rule.suffix.match_forward(ctx, index, &mut scratch.suffix) {
                    MatchState::Capture
                } else {
                    MatchState::NoMatch
                }
            }
            MatchState::Capture => {
                let captured = &mut scratch.captured;
                captured.clear();
                for &i in &scratch.prefix {
                    captured.extend_from_slice(ctx.string.params_at(i));
                }
                captured.extend_from_slice(ctx.string.params_at(index));
                for &i in &scratch.suffix {
                    captured.extend_from_slice(ctx.string.params_at(i));
                }
                MatchState::CheckCondition
            }
            MatchState::CheckCondition => match &rule.condition {
                Some(condition) if !(condition.evaluate(&scratch.captured, ctx.globals) > 0.0) => {
                    MatchState::NoMatch
                }
                _ => MatchState::Matched,
            },
            MatchState::Matched => return true,
            MatchState::NoMatch => return false,
        };
    }
}

/// First rule for the symbol at `index` that matches, in priority order.
pub fn find_match<'t>(
    table: &'t RuleTable,
    ctx: &MatchContext<'_>,
    index: usize,
    scratch: &mut MatchScratch,
) -> Option<&'t Rule> {
    table
        .candidates(ctx.string.symbol_at(index))
        .find(|rule| try_match(rule, ctx, index, scratch))
}
