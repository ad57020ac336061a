//! Scanning of symbol sequences shared by patterns, replacements, and axioms.

use super::rule::{InputSymbol, ReplacementSymbol};
use crate::engines::expression::ExpressionCompiler;
use crate::error::{LSystemError, Result};
use crate::symbols::{SymbolRemapper, SymbolString, SymbolStringBuilder, RESERVED_CHARACTERS};
use crate::types::{BranchSymbols, SourceSpan, Symbol};

/// Index of the `)` closing the `(` at `open`.
pub(crate) fn closing_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

fn check_symbol(c: char, offset: usize) -> Result<()> {
    if c == '(' || c == ')' {
        return Err(LSystemError::syntax(
            "Parentheses cannot be used as symbols",
            SourceSpan::new(offset, 1),
        ));
    }
    if RESERVED_CHARACTERS.contains(&c) {
        return Err(LSystemError::syntax(
            format!("Unexpected '{}'", c),
            SourceSpan::new(offset, 1),
        ));
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Parses a match pattern such as `A(x, y)B[C(z)]`. `base` is the offset of `chars` in the rule.
pub(crate) fn parse_pattern(
    chars: &[char],
    base: usize,
    remapper: &mut dyn SymbolRemapper,
) -> Result<Vec<InputSymbol>> {
    let mut symbols = Vec::new();
    let mut i = skip_whitespace(chars, 0);
    while i < chars.len() {
        let c = chars[i];
        check_symbol(c, base + i)?;
        let symbol_offset = i;
        let mut names = Vec::new();
        i = skip_whitespace(chars, i + 1);
        if i < chars.len() && chars[i] == '(' {
            let close = closing_paren(chars, i).ok_or_else(|| {
                LSystemError::syntax(
                    "Unexpected end of input. Are you missing a parenthesis?",
                    SourceSpan::new(base + i, 1),
                )
            })?;
            let inner: String = chars[i + 1..close].iter().collect();
            if !inner.trim().is_empty() {
                let mut start = i + 1;
                for piece in inner.split(',') {
                    let length = piece.chars().count();
                    let name = piece.trim();
                    if !is_identifier(name) {
                        return Err(LSystemError::syntax(
                            format!("\"{}\" is not a valid parameter name", name),
                            SourceSpan::new(base + start, length),
                        ));
                    }
                    names.push(name.to_string());
                    start += length + 1;
                }
            }
            i = skip_whitespace(chars, close + 1);
        }
        symbols.push(InputSymbol {
            symbol: remapper.symbol_for(c),
            parameter_names: names,
            span: SourceSpan::new(base + symbol_offset, i - symbol_offset),
        });
    }
    Ok(symbols)
}

/// Parses a replacement such as `A(x + 1)[B(y, 2)]`, compiling each parameter with `compiler`.
pub(crate) fn parse_replacement(
    chars: &[char],
    base: usize,
    compiler: &ExpressionCompiler,
    remapper: &mut dyn SymbolRemapper,
) -> Result<Vec<ReplacementSymbol>> {
    let mut symbols = Vec::new();
    let mut i = skip_whitespace(chars, 0);
    while i < chars.len() {
        let c = chars[i];
        check_symbol(c, base + i)?;
        let symbol_offset = i;
        let mut parameters = Vec::new();
        i = skip_whitespace(chars, i + 1);
        if i < chars.len() && chars[i] == '(' {
            let close = closing_paren(chars, i).ok_or_else(|| {
                LSystemError::syntax(
                    "Unexpected end of input. Are you missing a parenthesis?",
                    SourceSpan::new(base + i, 1),
                )
            })?;
            let inner = &chars[i + 1..close];
            if inner.iter().any(|c| !c.is_whitespace()) {
                for (start, end) in split_arguments(inner) {
                    let text: String = inner[start..end].iter().collect();
                    let offset = base + i + 1 + start;
                    let expression = compiler
                        .compile(&text)
                        .map_err(|err| err.offset_by(offset))?;
                    parameters.push(expression);
                }
            }
            i = skip_whitespace(chars, close + 1);
        }
        symbols.push(ReplacementSymbol {
            symbol: remapper.symbol_for(c),
            parameters,
            span: SourceSpan::new(base + symbol_offset, i - symbol_offset),
        });
    }
    Ok(symbols)
}

/// Ranges of the comma-separated arguments at nesting depth zero.
fn split_arguments(chars: &[char]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                ranges.push((start, i));
                start = i + 1;
            }
            _ => {}
        }
    }
    ranges.push((start, chars.len()));
    ranges
}

/// Errors if the branch symbols in `symbols` do not pair up.
pub(crate) fn check_balanced(
    symbols: impl IntoIterator<Item = (Symbol, SourceSpan)>,
    branches: BranchSymbols,
    what: &str,
) -> Result<()> {
    let mut open = Vec::new();
    for (symbol, span) in symbols {
        if symbol == branches.open {
            open.push(span);
        } else if symbol == branches.close && open.pop().is_none() {
            return Err(LSystemError::syntax(
                format!("Too many closing branch symbols in {}", what),
                span,
            ));
        }
    }
    match open.pop() {
        Some(span) => Err(LSystemError::syntax(
            format!("Too many opening branch symbols in {}", what),
            span,
        )),
        None => Ok(()),
    }
}

/// Parses axiom text such as `A(1, 2)[B]C`. Parameters must be constant expressions.
pub fn parse_axiom(
    text: &str,
    branches: BranchSymbols,
    remapper: &mut dyn SymbolRemapper,
) -> Result<SymbolString> {
    let chars: Vec<char> = text.chars().collect();
    let symbols = parse_replacement(&chars, 0, &ExpressionCompiler::constants(), remapper)?;
    check_balanced(symbols.iter().map(|s| (s.symbol, s.span)), branches, "axiom")?;

    let mut builder = SymbolStringBuilder::with_capacity(symbols.len(), 0);
    let mut values = Vec::new();
    for symbol in &symbols {
        values.clear();
        values.extend(symbol.parameters.iter().map(|p| p.evaluate(&[], &[])));
        builder.push(symbol.symbol, &values);
    }
    Ok(builder.finish())
}
