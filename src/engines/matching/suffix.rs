use super::matcher::MatchContext;
use super::prefix::PatternSymbol;
use crate::engines::rules::InputSymbol;
use crate::types::BranchSymbols;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SuffixNode {
    pattern: PatternSymbol,
    successor: Option<usize>,
    branches: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    parent: Option<usize>,
    branch_start: bool,
}

/// Right context compiled into a tree rooted at the target.
///
/// A symbol written sequentially is the successor of the one before it. A symbol that opens
/// a bracket is a branch child of the symbol preceding the bracket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SuffixPattern {
    nodes: Vec<SuffixNode>,
    root_successor: Option<usize>,
    root_branches: Vec<usize>,
}

impl SuffixPattern {
    pub fn new(inputs: &[InputSymbol], branches: BranchSymbols) -> Self {
        let mut pattern = SuffixPattern::default();
        let mut stack: Vec<Cursor> = Vec::new();
        let mut cursor = Cursor {
            parent: None,
            branch_start: false,
        };
        for input in inputs {
            if input.symbol == branches.open {
                stack.push(cursor);
                cursor.branch_start = true;
            } else if input.symbol == branches.close {
                if let Some(saved) = stack.pop() {
                    cursor = saved;
                }
            } else {
                let id = pattern.nodes.len();
                pattern.nodes.push(SuffixNode {
                    pattern: PatternSymbol::from(input),
                    successor: None,
                    branches: Vec::new(),
                });
                match (cursor.parent, cursor.branch_start) {
                    (None, false) => pattern.root_successor = Some(id),
                    (None, true) => pattern.root_branches.push(id),
                    (Some(parent), false) => pattern.nodes[parent].successor = Some(id),
                    (Some(parent), true) => pattern.nodes[parent].branches.push(id),
                }
                cursor = Cursor {
                    parent: Some(id),
                    branch_start: false,
                };
            }
        }
        pattern
    }

    /// Number of symbols the pattern captures from.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// On success `matched[n]` is the string index matched by the n-th pattern symbol.
    pub fn match_forward(
        &self,
        ctx: &MatchContext<'_>,
        index: usize,
        matched: &mut Vec<usize>,
    ) -> bool {
        matched.clear();
        matched.resize(self.nodes.len(), usize::MAX);
        self.match_children(ctx, self.root_successor, &self.root_branches, index, matched)
    }

    fn accepts(&self, ctx: &MatchContext<'_>, node: usize, index: usize) -> bool {
        let pattern = self.nodes[node].pattern;
        ctx.string.symbol_at(index) == pattern.symbol
            && ctx.string.param_count_at(index) == pattern.arity
    }

    fn match_node(
        &self,
        ctx: &MatchContext<'_>,
        node: usize,
        index: usize,
        matched: &mut Vec<usize>,
    ) -> bool {
        let node = &self.nodes[node];
        self.match_children(ctx, node.successor, &node.branches, index, matched)
    }

    fn match_children(
        &self,
        ctx: &MatchContext<'_>,
        successor: Option<usize>,
        branches: &[usize],
        index: usize,
        matched: &mut Vec<usize>,
    ) -> bool {
        if let Some(node) = successor {
            let next = match ctx.successor(index) {
                Some(next) => next,
                None => return false,
            };
            if !self.accepts(ctx, node, next) {
                return false;
            }
            matched[node] = next;
            if !self.match_node(ctx, node, next, matched) {
                return false;
            }
        }
        if branches.is_empty() {
            return true;
        }
        let mut candidates = Vec::new();
        ctx.branch_children(index, &mut candidates);
        let mut used = vec![false; candidates.len()];
        self.assign_branches(ctx, branches, &candidates, &mut used, matched)
    }

    /// Maps each pattern branch to a distinct branch of the string, in any order.
    fn assign_branches(
        &self,
        ctx: &MatchContext<'_>,
        branches: &[usize],
        candidates: &[usize],
        used: &mut [bool],
        matched: &mut Vec<usize>,
    ) -> bool {
        let (first, rest) = match branches.split_first() {
            Some(split) => split,
            None => return true,
        };
        for (slot, candidate) in candidates.iter().enumerate() {
            if used[slot] || !self.accepts(ctx, *first, *candidate) {
                continue;
            }
            used[slot] = true;
            matched[*first] = *candidate;
            if self.match_node(ctx, *first, *candidate, matched)
                && self.assign_branches(ctx, rest, candidates, used, matched)
            {
                return true;
            }
            used[slot] = false;
        }
        false
    }
}
