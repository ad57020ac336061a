use crate::engines::expression::CompiledExpression;
use crate::types::{SourceSpan, Symbol};

/// A symbol in a match pattern together with the names its parameters are captured as.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSymbol {
    pub symbol: Symbol,
    pub parameter_names: Vec<String>,
    pub span: SourceSpan,
}

impl InputSymbol {
    pub fn arity(&self) -> usize {
        self.parameter_names.len()
    }
}

/// A symbol emitted by a rule, with one expression per output parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementSymbol {
    pub symbol: Symbol,
    pub parameters: Vec<CompiledExpression>,
    pub span: SourceSpan,
}

/// One rule as written, before grouping.
#[derive(Debug, Clone)]
pub struct ParsedRule {
    pub text: String,
    pub probability: Option<(f64, SourceSpan)>,
    pub prefix: Vec<InputSymbol>,
    pub target: InputSymbol,
    pub suffix: Vec<InputSymbol>,
    pub condition: Option<CompiledExpression>,
    pub replacement: Vec<ReplacementSymbol>,
    /// Prefix names, then target names, then suffix names.
    pub captured_names: Vec<String>,
}

impl ParsedRule {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::new(0, self.text.chars().count())
    }

    pub fn is_stochastic(&self) -> bool {
        self.probability.is_some()
    }
}
