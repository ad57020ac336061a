use super::progress::{CancellationToken, StepObserver};
use super::random::stochastic_sample;
use super::state::GenerationState;
use crate::config::{ConfigSection, SteppingConfig};
use crate::engines::matching::{find_match, BranchingCache, MatchContext, MatchScratch};
use crate::engines::rules::RuleTable;
use crate::error::{LSystemError, Result};
use crate::symbols::SymbolString;
use crate::types::{JaggedIndex, Symbol};
use rayon::prelude::*;
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Action {
    Identity,
    Rewrite {
        rule: usize,
        outcome: usize,
        captured: Range<usize>,
    },
    Absorbed,
}

/// What one input position turns into.
#[derive(Debug, Clone)]
struct Decision {
    action: Action,
    consumed: usize,
    symbols: usize,
    parameters: usize,
}

/// Decisions for one contiguous range of the old generation.
#[derive(Debug)]
struct BatchPlan {
    range: Range<usize>,
    decisions: Vec<Decision>,
    captured: Vec<f64>,
    symbol_count: usize,
    parameter_count: usize,
    parameter_base: usize,
}

/// A compiled system that advances generations.
pub struct LSystem {
    table: Arc<RuleTable>,
    config: SteppingConfig,
    pool: Option<rayon::ThreadPool>,
}

impl LSystem {
    pub fn new(table: RuleTable, config: SteppingConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.worker_threads {
            Some(threads) if config.parallel => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| {
                        LSystemError::Configuration(format!("Failed to build worker pool: {}", e))
                    })?,
            ),
            _ => None,
        };
        Ok(Self {
            table: Arc::new(table),
            config,
            pool,
        })
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn config(&self) -> &SteppingConfig {
        &self.config
    }

    pub fn global_parameter_count(&self) -> usize {
        self.table.global_parameter_count()
    }

    pub fn reset_state(&self, axiom: SymbolString, seed: u64) -> Result<GenerationState> {
        BranchingCache::build(axiom.symbols(), self.table.branches()).validate()?;
        Ok(GenerationState::new(axiom, seed, 0))
    }

    pub fn step_system(&self, state: &GenerationState, globals: &[f64]) -> Result<GenerationState> {
        self.step_with(state, globals, &mut (), None)
    }

    /// Steps `steps` times, reporting to `observer`.
    pub fn run(
        &self,
        state: GenerationState,
        globals: &[f64],
        steps: usize,
        observer: &mut dyn StepObserver,
    ) -> Result<GenerationState> {
        let mut state = state;
        for _ in 0..steps {
            state = self.step_with(&state, globals, observer, None)?;
        }
        Ok(state)
    }

    pub fn step_with(
        &self,
        state: &GenerationState,
        globals: &[f64],
        observer: &mut dyn StepObserver,
        cancel: Option<&CancellationToken>,
    ) -> Result<GenerationState> {
        let expected = self.table.global_parameter_count();
        if globals.len() != expected {
            return Err(LSystemError::GlobalParameterMismatch {
                expected,
                actual: globals.len(),
            });
        }
        let step = state.step();
        let cancelled = || cancel.map_or(false, CancellationToken::is_cancelled);
        observer.on_step_start(step, state.len());

        let source = state.symbols();
        let cache = BranchingCache::build(source.symbols(), self.table.branches());
        let ctx = MatchContext {
            string: source,
            cache: &cache,
            ignored: self.table.ignored(),
            globals,
        };

        let mut plans = self.install(|| self.match_phase(&ctx, state.seed(), step));
        let rewritten = plans
            .iter()
            .flat_map(|p| &p.decisions)
            .filter(|d| matches!(d.action, Action::Rewrite { .. }))
            .count();
        observer.on_match_complete(step, rewritten);
        if cancelled() {
            return Err(LSystemError::Cancelled { step });
        }

        let (total_symbols, total_parameters) = offset_phase(&mut plans);
        if cancelled() {
            return Err(LSystemError::Cancelled { step });
        }

        let output = self.install(|| {
            self.write_phase(&ctx, &plans, total_symbols, total_parameters)
        });
        log::debug!(
            "step {}: {} -> {} symbols, {} rewritten",
            step,
            source.len(),
            output.len(),
            rewritten
        );
        observer.on_step_complete(step, output.len());
        Ok(GenerationState::new(output, state.seed(), step + 1))
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn batch_ranges(&self, len: usize) -> Vec<Range<usize>> {
        let size = self.config.batch_size.max(1);
        (0..len)
            .step_by(size)
            .map(|start| start..(start + size).min(len))
            .collect()
    }

    fn match_phase(&self, ctx: &MatchContext<'_>, seed: u64, step: u64) -> Vec<BatchPlan> {
        let ranges = self.batch_ranges(ctx.string.len());
        log::trace!("step {}: matching {} batches", step, ranges.len());
        if self.config.parallel {
            ranges
                .into_par_iter()
                .map(|range| self.match_batch(ctx, seed, step, range))
                .collect()
        } else {
            ranges
                .into_iter()
                .map(|range| self.match_batch(ctx, seed, step, range))
                .collect()
        }
    }

    fn match_batch(
        &self,
        ctx: &MatchContext<'_>,
        seed: u64,
        step: u64,
        range: Range<usize>,
    ) -> BatchPlan {
        let mut scratch = MatchScratch::new();
        let mut decisions = Vec::with_capacity(range.len());
        let mut captured = Vec::new();
        for index in range.clone() {
            let decision = match find_match(&self.table, ctx, index, &mut scratch) {
                Some(rule) => {
                    let outcome = if rule.is_stochastic() {
                        rule.select_outcome(stochastic_sample(seed, step, index as u64))
                    } else {
                        0
                    };
                    let start = captured.len();
                    captured.extend_from_slice(&scratch.captured);
                    let chosen = &rule.outcomes[outcome];
                    Decision {
                        action: Action::Rewrite {
                            rule: rule.id,
                            outcome,
                            captured: start..captured.len(),
                        },
                        consumed: rule.consumed(),
                        symbols: chosen.replacement.len(),
                        parameters: chosen.parameter_count,
                    }
                }
                None => Decision {
                    action: Action::Identity,
                    consumed: 1,
                    symbols: 1,
                    parameters: ctx.string.param_count_at(index),
                },
            };
            decisions.push(decision);
        }
        BatchPlan {
            range,
            decisions,
            captured,
            symbol_count: 0,
            parameter_count: 0,
            parameter_base: 0,
        }
    }

    fn write_phase(
        &self,
        ctx: &MatchContext<'_>,
        plans: &[BatchPlan],
        total_symbols: usize,
        total_parameters: usize,
    ) -> SymbolString {
        let mut symbols: Vec<Symbol> = vec![0; total_symbols];
        let mut indexing = vec![JaggedIndex::default(); total_symbols];
        let mut parameters = vec![0.0; total_parameters];

        {
            let mut regions = Vec::with_capacity(plans.len());
            let mut symbols_rest = symbols.as_mut_slice();
            let mut indexing_rest = indexing.as_mut_slice();
            let mut parameters_rest = parameters.as_mut_slice();
            for plan in plans {
                let (s, s_rest) = std::mem::take(&mut symbols_rest).split_at_mut(plan.symbol_count);
                let (i, i_rest) = std::mem::take(&mut indexing_rest).split_at_mut(plan.symbol_count);
                let (p, p_rest) = std::mem::take(&mut parameters_rest).split_at_mut(plan.parameter_count);
                symbols_rest = s_rest;
                indexing_rest = i_rest;
                parameters_rest = p_rest;
                regions.push((plan, s, i, p));
            }

            if self.config.parallel {
                regions
                    .into_par_iter()
                    .for_each(|(plan, s, i, p)| self.write_batch(ctx, plan, s, i, p));
            } else {
                for (plan, s, i, p) in regions {
                    self.write_batch(ctx, plan, s, i, p);
                }
            }
        }
        SymbolString::from_parts(symbols, indexing, parameters)
    }

    fn write_batch(
        &self,
        ctx: &MatchContext<'_>,
        plan: &BatchPlan,
        symbols: &mut [Symbol],
        indexing: &mut [JaggedIndex],
        parameters: &mut [f64],
    ) {
        let mut s = 0;
        let mut p = 0;
        for (offset, decision) in plan.decisions.iter().enumerate() {
            let index = plan.range.start + offset;
            match &decision.action {
                Action::Absorbed => {}
                Action::Identity => {
                    let source = ctx.string.params_at(index);
                    symbols[s] = ctx.string.symbol_at(index);
                    indexing[s] = JaggedIndex::new(plan.parameter_base + p, source.len());
                    parameters[p..p + source.len()].copy_from_slice(source);
                    s += 1;
                    p += source.len();
                }
                Action::Rewrite {
                    rule,
                    outcome,
                    captured,
                } => {
                    let captured = &plan.captured[captured.clone()];
                    let outcome = &self.table.rule(*rule).outcomes[*outcome];
                    for output in &outcome.replacement {
                        let count = output.parameters.len();
                        symbols[s] = output.symbol;
                        indexing[s] = JaggedIndex::new(plan.parameter_base + p, count);
                        for (slot, expression) in
                            parameters[p..p + count].iter_mut().zip(&output.parameters)
                        {
                            *slot = expression.evaluate(captured, ctx.globals);
                        }
                        s += 1;
                        p += count;
                    }
                }
            }
        }
    }
}

/// Marks positions swallowed by a multi-symbol match and assigns each batch its output
/// offsets. Returns the total output sizes.
fn offset_phase(plans: &mut [BatchPlan]) -> (usize, usize) {
    let mut pending_absorb = 0usize;
    let mut symbol_total = 0;
    let mut parameter_total = 0;
    for plan in plans.iter_mut() {
        plan.parameter_base = parameter_total;
        let mut symbol_count = 0;
        let mut parameter_count = 0;
        for decision in plan.decisions.iter_mut() {
            if pending_absorb > 0 {
                pending_absorb -= 1;
                decision.action = Action::Absorbed;
                decision.symbols = 0;
                decision.parameters = 0;
                continue;
            }
            pending_absorb = decision.consumed.saturating_sub(1);
            symbol_count += decision.symbols;
            parameter_count += decision.parameters;
        }
        plan.symbol_count = symbol_count;
        plan.parameter_count = parameter_count;
        symbol_total += symbol_count;
        parameter_total += parameter_count;
    }
    (symbol_total, parameter_total)
}
