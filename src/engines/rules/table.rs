use super::parser::RuleParser;
use super::rule::{ParsedRule, ReplacementSymbol};
use crate::engines::expression::CompiledExpression;
use crate::engines::matching::{PatternSymbol, PrefixPattern, SuffixPattern};
use crate::error::{LSystemError, Result};
use crate::symbols::SymbolRemapper;
use crate::types::{BranchSymbols, SourceSpan, Symbol, SymbolSet};
use std::collections::HashMap;

pub const DEFAULT_PROBABILITY_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone)]
pub struct TableSettings {
    pub branches: BranchSymbols,
    pub ignored: SymbolSet,
    pub probability_epsilon: f64,
}

impl TableSettings {
    pub fn new(branches: BranchSymbols) -> Self {
        Self {
            branches,
            ignored: SymbolSet::new(),
            probability_epsilon: DEFAULT_PROBABILITY_EPSILON,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub probability: f64,
    pub replacement: Vec<ReplacementSymbol>,
    pub parameter_count: usize,
    /// Index of the defining rule in the source list.
    pub source_index: usize,
}

/// All rules sharing one signature, compiled for matching.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: usize,
    pub target: Symbol,
    pub target_arity: usize,
    pub prefix: PrefixPattern,
    pub suffix: SuffixPattern,
    pub condition: Option<CompiledExpression>,
    pub captured_count: usize,
    pub outcomes: Vec<RuleOutcome>,
    pub description: String,
}

impl Rule {
    /// Number of context symbols a match has to verify.
    pub fn specificity(&self) -> usize {
        self.prefix.len() + self.suffix.len()
    }

    pub fn is_stochastic(&self) -> bool {
        self.outcomes.len() > 1
    }

    /// Symbols consumed from the input by one application.
    pub fn consumed(&self) -> usize {
        1
    }

    /// First outcome whose cumulative probability reaches `sample`.
    pub fn select_outcome(&self, sample: f64) -> usize {
        let mut cumulative = 0.0;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            cumulative += outcome.probability;
            if sample <= cumulative {
                return i;
            }
        }
        self.outcomes.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature {
    target: PatternSymbol,
    prefix: PrefixPattern,
    suffix: SuffixPattern,
    condition: Option<String>,
}

impl Signature {
    fn of(rule: &ParsedRule, branches: BranchSymbols) -> Self {
        Self {
            target: PatternSymbol::from(&rule.target),
            prefix: PrefixPattern::new(&rule.prefix),
            suffix: SuffixPattern::new(&rule.suffix, branches),
            condition: rule
                .condition
                .as_ref()
                .map(|c| c.expression().to_string()),
        }
    }
}

/// Immutable, target-indexed rule set.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    by_target: HashMap<Symbol, Vec<usize>>,
    global_names: Vec<String>,
    settings: TableSettings,
}

impl RuleTable {
    pub fn compile<S: AsRef<str>>(
        rule_texts: &[S],
        global_names: &[String],
        settings: TableSettings,
        remapper: &mut dyn SymbolRemapper,
    ) -> Result<Self> {
        let parser = RuleParser::new(global_names, settings.branches);
        let mut parsed = Vec::with_capacity(rule_texts.len());
        for (index, text) in rule_texts.iter().enumerate() {
            let rule = parser
                .parse(text.as_ref(), remapper)
                .map_err(|err| in_rule(err, index))?;
            parsed.push(rule);
        }
        Self::from_parsed(parsed, global_names, settings)
    }

    pub fn from_parsed(
        parsed: Vec<ParsedRule>,
        global_names: &[String],
        settings: TableSettings,
    ) -> Result<Self> {
        let mut groups: Vec<(Signature, Vec<(usize, ParsedRule)>)> = Vec::new();
        let mut lookup: HashMap<Signature, usize> = HashMap::new();
        for (index, rule) in parsed.into_iter().enumerate() {
            let signature = Signature::of(&rule, settings.branches);
            match lookup.get(&signature) {
                Some(&group) => groups[group].1.push((index, rule)),
                None => {
                    lookup.insert(signature.clone(), groups.len());
                    groups.push((signature, vec![(index, rule)]));
                }
            }
        }

        let mut rules = Vec::with_capacity(groups.len());
        for (id, (_, members)) in groups.into_iter().enumerate() {
            rules.push(build_rule(id, members, &settings)?);
        }

        let mut by_target: HashMap<Symbol, Vec<usize>> = HashMap::new();
        for rule in &rules {
            by_target.entry(rule.target).or_default().push(rule.id);
        }
        for ids in by_target.values_mut() {
            // stable: equal specificity keeps definition order
            ids.sort_by(|a, b| rules[*b].specificity().cmp(&rules[*a].specificity()));
        }

        log::info!(
            "Compiled {} rule groups for {} target symbols",
            rules.len(),
            by_target.len()
        );
        Ok(Self {
            rules,
            by_target,
            global_names: global_names.to_vec(),
            settings,
        })
    }

    /// Rules for `symbol`, most specific first.
    pub fn candidates(&self, symbol: Symbol) -> impl Iterator<Item = &Rule> + '_ {
        self.by_target
            .get(&symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |id| &self.rules[*id])
    }

    pub fn rule(&self, id: usize) -> &Rule {
        &self.rules[id]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn global_names(&self) -> &[String] {
        &self.global_names
    }

    pub fn global_parameter_count(&self) -> usize {
        self.global_names.len()
    }

    pub fn branches(&self) -> BranchSymbols {
        self.settings.branches
    }

    pub fn ignored(&self) -> &SymbolSet {
        &self.settings.ignored
    }
}

fn in_rule(err: LSystemError, index: usize) -> LSystemError {
    match err {
        LSystemError::Syntax { message, span } => LSystemError::Syntax {
            message: format!("rule {}: {}", index, message),
            span,
        },
        LSystemError::Internal { message, span } => LSystemError::Internal {
            message: format!("rule {}: {}", index, message),
            span,
        },
        other => other,
    }
}

fn build_rule(
    id: usize,
    members: Vec<(usize, ParsedRule)>,
    settings: &TableSettings,
) -> Result<Rule> {
    let indices: Vec<String> = members.iter().map(|(i, _)| i.to_string()).collect();
    let stochastic = members.iter().filter(|(_, r)| r.is_stochastic()).count();

    if stochastic == 0 && members.len() > 1 {
        return Err(LSystemError::Conflict {
            message: format!(
                "rules {} are deterministic and match the same symbols, context and condition",
                indices.join(", ")
            ),
            spans: members.iter().map(|(_, r)| r.span()).collect(),
        });
    }
    if stochastic > 0 && stochastic < members.len() {
        return Err(LSystemError::Probability {
            message: format!(
                "rules {} share a signature but only some carry a probability",
                indices.join(", ")
            ),
            spans: members.iter().map(|(_, r)| r.span()).collect(),
        });
    }

    let probability_spans: Vec<SourceSpan> = members
        .iter()
        .filter_map(|(_, r)| r.probability.map(|(_, span)| span))
        .collect();
    if stochastic > 0 {
        if let Some((index, _)) = members
            .iter()
            .find(|(_, r)| r.probability.map_or(false, |(p, _)| !(p >= 0.0)))
        {
            return Err(LSystemError::Probability {
                message: format!("rule {} has a negative probability", index),
                spans: probability_spans,
            });
        }
        let total: f64 = members
            .iter()
            .filter_map(|(_, r)| r.probability.map(|(p, _)| p))
            .sum();
        if (total - 1.0).abs() > settings.probability_epsilon {
            return Err(LSystemError::Probability {
                message: format!(
                    "probabilities of rules {} sum to {}, expected 1",
                    indices.join(", "),
                    total
                ),
                spans: probability_spans,
            });
        }
    }

    let (_, first) = &members[0];
    let target = PatternSymbol::from(&first.target);
    let prefix = PrefixPattern::new(&first.prefix);
    let suffix = SuffixPattern::new(&first.suffix, settings.branches);
    let condition = first.condition.clone();
    let captured_count = first.captured_names.len();
    let description = first.text.clone();

    let outcomes = members
        .into_iter()
        .map(|(source_index, rule)| RuleOutcome {
            probability: rule.probability.map_or(1.0, |(p, _)| p),
            parameter_count: rule.replacement.iter().map(|s| s.parameters.len()).sum(),
            replacement: rule.replacement,
            source_index,
        })
        .collect();

    Ok(Rule {
        id,
        target: target.symbol,
        target_arity: target.arity,
        prefix,
        suffix,
        condition,
        captured_count,
        outcomes,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::CharSymbolMap;

    fn compile(rules: &[&str]) -> Result<(RuleTable, CharSymbolMap)> {
        let mut map = CharSymbolMap::with_branches('[', ']');
        let branches = map.branch_symbols('[', ']').unwrap();
        let table = RuleTable::compile(rules, &[], TableSettings::new(branches), &mut map)?;
        Ok((table, map))
    }

    #[test]
    fn test_stochastic_rules_group_into_outcomes() {
        let (table, map) = compile(&["P(0.3) | A -> B", "P(0.7) | A -> C"]).unwrap();
        assert_eq!(table.len(), 1);
        let rule = table.candidates(map.symbol('A').unwrap()).next().unwrap();
        assert_eq!(rule.outcomes.len(), 2);
        assert_eq!(rule.select_outcome(0.2), 0);
        assert_eq!(rule.select_outcome(0.3), 0);
        assert_eq!(rule.select_outcome(0.31), 1);
        assert_eq!(rule.select_outcome(0.99999), 1);
    }

    #[test]
    fn test_incomplete_probability_is_rejected() {
        let err = compile(&["P(0.5) | A -> B"]).unwrap_err();
        assert!(matches!(err, LSystemError::Probability { .. }));
        let err = compile(&["P(0.5) | A -> B", "P(0.6) | A -> C"]).unwrap_err();
        assert!(matches!(err, LSystemError::Probability { .. }));
        assert!(compile(&["P(1) | A -> B"]).is_ok());
    }

    #[test]
    fn test_duplicate_deterministic_rules_conflict() {
        let err = compile(&["A -> B", "A -> C"]).unwrap_err();
        assert!(matches!(err, LSystemError::Conflict { .. }));
    }

    #[test]
    fn test_mixed_group_is_rejected() {
        let err = compile(&["P(1) | A -> B", "A -> C"]).unwrap_err();
        assert!(matches!(err, LSystemError::Probability { .. }));
    }

    #[test]
    fn test_candidates_are_ordered_by_specificity() {
        let (table, map) = compile(&["A -> B", "A > A -> C", "A > AB -> D", "B < A -> E"]).unwrap();
        let order: Vec<usize> = table
            .candidates(map.symbol('A').unwrap())
            .map(|r| r.outcomes[0].source_index)
            .collect();
        assert_eq!(order, vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_syntax_error_names_rule() {
        let err = compile(&["A -> B", "A -> (B"]).unwrap_err();
        assert!(err.to_string().contains("rule 1"));
    }
}
