use super::rule::{InputSymbol, ParsedRule};
use super::symbols::{check_balanced, closing_paren, parse_pattern, parse_replacement};
use crate::engines::expression::ExpressionCompiler;
use crate::error::{LSystemError, Result};
use crate::symbols::SymbolRemapper;
use crate::types::{BranchSymbols, SourceSpan};

/// Parses rules of the form
/// `[P(<expr>) |] [<prefix> <] <target> [> <suffix>] [: <condition>] -> <replacement>`.
pub struct RuleParser<'a> {
    global_names: &'a [String],
    branches: BranchSymbols,
}

impl<'a> RuleParser<'a> {
    pub fn new(global_names: &'a [String], branches: BranchSymbols) -> Self {
        Self {
            global_names,
            branches,
        }
    }

    pub fn parse(&self, text: &str, remapper: &mut dyn SymbolRemapper) -> Result<ParsedRule> {
        let chars: Vec<char> = text.chars().collect();
        let whole = SourceSpan::new(0, chars.len());

        let arrow = chars
            .windows(2)
            .position(|w| w[0] == '-' && w[1] == '>')
            .ok_or_else(|| LSystemError::syntax("Rule must contain '->'", whole))?;
        let matcher = &chars[..arrow];
        let replacement_start = arrow + 2;

        let (probability, context_start) = parse_probability(matcher)?;
        let matcher_rest = &matcher[context_start..];
        let (context, condition) = match matcher_rest.iter().position(|c| *c == ':') {
            Some(colon) => (
                &matcher_rest[..colon],
                Some((&matcher_rest[colon + 1..], context_start + colon + 1)),
            ),
            None => (matcher_rest, None),
        };

        let (prefix, target, suffix) = self.parse_context(context, context_start, remapper)?;

        let mut captured_names: Vec<String> = Vec::new();
        for input in prefix.iter().chain(std::iter::once(&target)).chain(&suffix) {
            for name in &input.parameter_names {
                if captured_names.contains(name) {
                    return Err(LSystemError::syntax(
                        format!("Attempted to declare the parameter \"{}\" twice", name),
                        input.span,
                    ));
                }
                if self.global_names.contains(name) {
                    return Err(LSystemError::syntax(
                        format!("Parameter \"{}\" shadows a global parameter", name),
                        input.span,
                    ));
                }
                captured_names.push(name.clone());
            }
        }
        let compiler = ExpressionCompiler::new(&captured_names, self.global_names)?;

        let condition = match condition {
            Some((chars, offset)) => {
                if chars.iter().all(|c| c.is_whitespace()) {
                    return Err(LSystemError::syntax(
                        "Condition after ':' is empty",
                        SourceSpan::new(offset, chars.len()),
                    ));
                }
                let text: String = chars.iter().collect();
                Some(compiler.compile(&text).map_err(|e| e.offset_by(offset))?)
            }
            None => None,
        };

        let replacement = parse_replacement(
            &chars[replacement_start..],
            replacement_start,
            &compiler,
            remapper,
        )?;
        check_balanced(
            replacement.iter().map(|s| (s.symbol, s.span)),
            self.branches,
            "replacement",
        )?;

        Ok(ParsedRule {
            text: text.to_string(),
            probability,
            prefix,
            target,
            suffix,
            condition,
            replacement,
            captured_names,
        })
    }

    fn parse_context(
        &self,
        context: &[char],
        base: usize,
        remapper: &mut dyn SymbolRemapper,
    ) -> Result<(Vec<InputSymbol>, InputSymbol, Vec<InputSymbol>)> {
        let find_all = |wanted: char| -> Vec<usize> {
            context
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == wanted)
                .map(|(i, _)| i)
                .collect()
        };
        let lesser = find_all('<');
        let greater = find_all('>');
        if lesser.len() > 1 {
            return Err(LSystemError::syntax(
                "Only one prefix context is allowed",
                SourceSpan::new(base + lesser[1], 1),
            ));
        }
        if greater.len() > 1 {
            return Err(LSystemError::syntax(
                "Only one suffix context is allowed",
                SourceSpan::new(base + greater[1], 1),
            ));
        }
        let prefix_end = lesser.first().copied();
        let suffix_start = greater.first().copied();
        if let (Some(p), Some(s)) = (prefix_end, suffix_start) {
            if s < p {
                return Err(LSystemError::syntax(
                    "Prefix context must come before the suffix context",
                    SourceSpan::new(base + s, p - s + 1),
                ));
            }
        }

        let target_start = prefix_end.map_or(0, |p| p + 1);
        let target_end = suffix_start.unwrap_or(context.len());

        let prefix = match prefix_end {
            Some(p) => parse_pattern(&context[..p], base, remapper)?,
            None => Vec::new(),
        };
        let targets = parse_pattern(
            &context[target_start..target_end],
            base + target_start,
            remapper,
        )?;
        let suffix = match suffix_start {
            Some(s) => parse_pattern(&context[s + 1..], base + s + 1, remapper)?,
            None => Vec::new(),
        };

        let target_span = SourceSpan::new(base + target_start, target_end - target_start);
        let target = match targets.as_slice() {
            [single] => single.clone(),
            [] => return Err(LSystemError::syntax("Rule has no target symbol", target_span)),
            _ => {
                return Err(LSystemError::syntax(
                    "Multi-symbol targets are not supported",
                    target_span,
                ))
            }
        };
        if self.branches.contains(target.symbol) {
            return Err(LSystemError::syntax(
                "Branch symbols cannot be rule targets",
                target.span,
            ));
        }
        if let Some(branch) = prefix.iter().find(|s| self.branches.contains(s.symbol)) {
            return Err(LSystemError::syntax(
                "Branch symbols are not allowed in a prefix context",
                branch.span,
            ));
        }
        for input in prefix.iter().chain(&suffix) {
            if self.branches.contains(input.symbol) && input.arity() > 0 {
                return Err(LSystemError::syntax(
                    "Branch symbols cannot capture parameters",
                    input.span,
                ));
            }
        }
        check_balanced(
            suffix.iter().map(|s| (s.symbol, s.span)),
            self.branches,
            "suffix context",
        )?;
        Ok((prefix, target, suffix))
    }
}

/// Reads a leading `P(<expr>) |`. Returns the weight and where the context begins.
fn parse_probability(matcher: &[char]) -> Result<(Option<(f64, SourceSpan)>, usize)> {
    let mut i = 0;
    while i < matcher.len() && matcher[i].is_whitespace() {
        i += 1;
    }
    if matcher.get(i) != Some(&'P') {
        return Ok((None, 0));
    }
    let mut open = i + 1;
    while open < matcher.len() && matcher[open].is_whitespace() {
        open += 1;
    }
    if matcher.get(open) != Some(&'(') {
        return Ok((None, 0));
    }
    let close = match closing_paren(matcher, open) {
        Some(close) => close,
        None => return Ok((None, 0)),
    };
    let mut bar = close + 1;
    while bar < matcher.len() && matcher[bar].is_whitespace() {
        bar += 1;
    }
    if matcher.get(bar) != Some(&'|') {
        return Ok((None, 0));
    }

    let text: String = matcher[open + 1..close].iter().collect();
    let span = SourceSpan::new(i, close + 1 - i);
    let value = ExpressionCompiler::evaluate_constant(&text).map_err(|err| {
        LSystemError::syntax(
            format!("Malformed probability annotation: {}", err),
            span,
        )
    })?;
    Ok((Some((value, span)), bar + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::CharSymbolMap;

    fn parse(text: &str, globals: &[&str]) -> Result<(ParsedRule, CharSymbolMap)> {
        let mut map = CharSymbolMap::with_branches('[', ']');
        let branches = map.branch_symbols('[', ']').unwrap();
        let globals: Vec<String> = globals.iter().map(|s| s.to_string()).collect();
        let rule = RuleParser::new(&globals, branches).parse(text, &mut map)?;
        Ok((rule, map))
    }

    #[test]
    fn test_parse_full_rule() {
        let (rule, map) = parse("P(0.5) | A(x) < B(y) > C(z) : y > 1 -> B(x + y + z + g)", &["g"]).unwrap();
        assert_eq!(rule.probability.map(|p| p.0), Some(0.5));
        assert_eq!(rule.prefix.len(), 1);
        assert_eq!(rule.target.symbol, map.symbol('B').unwrap());
        assert_eq!(rule.suffix.len(), 1);
        assert_eq!(rule.captured_names, vec!["x", "y", "z"]);
        let condition = rule.condition.as_ref().unwrap();
        assert_eq!(condition.evaluate(&[0.0, 2.0, 0.0], &[0.0]), 1.0);
        let output = &rule.replacement[0].parameters[0];
        assert_eq!(output.evaluate(&[1.0, 2.0, 3.0], &[10.0]), 16.0);
    }

    #[test]
    fn test_empty_replacement_is_legal() {
        let (rule, _) = parse("A > A ->", &[]).unwrap();
        assert!(rule.replacement.is_empty());
    }

    #[test]
    fn test_symbol_named_p_is_not_a_probability() {
        let (rule, map) = parse("P(x) -> P(x + 1)", &[]).unwrap();
        assert!(rule.probability.is_none());
        assert_eq!(rule.target.symbol, map.symbol('P').unwrap());
    }

    #[test]
    fn test_multi_symbol_target_is_rejected() {
        let err = parse("AB -> C", &[]).unwrap_err();
        assert!(matches!(err, LSystemError::Syntax { .. }));
    }

    #[test]
    fn test_missing_arrow_is_rejected() {
        assert!(parse("A B", &[]).is_err());
    }

    #[test]
    fn test_expression_error_points_into_rule_text() {
        let err = parse("A(x) -> B(x + q)", &[]).unwrap_err();
        assert_eq!(err.spans(), vec![SourceSpan::new(14, 1)]);
    }

    #[test]
    fn test_unknown_variable_in_condition() {
        let err = parse("A(x) : y < 2 -> B", &[]).unwrap_err();
        assert_eq!(err.spans(), vec![SourceSpan::new(7, 1)]);
    }

    #[test]
    fn test_prefix_may_not_branch() {
        assert!(parse("[A < B -> C", &[]).is_err());
        assert!(parse("B > [A -> C", &[]).is_err());
        assert!(parse("B > [A]C -> C", &[]).is_ok());
    }

    #[test]
    fn test_duplicate_parameter_name_is_rejected() {
        assert!(parse("A(x) > B(x) -> C", &[]).is_err());
        assert!(parse("A(g) -> C", &["g"]).is_err());
    }

    #[test]
    fn test_unbalanced_replacement_is_rejected() {
        assert!(parse("A -> [B", &[]).is_err());
    }
}
