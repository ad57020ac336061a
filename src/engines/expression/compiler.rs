use super::ast::{BinaryOperator, Expression, UnaryOperator};
use super::parser::parse_tokens;
use super::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::{LSystemError, Result};
use crate::types::SourceSpan;

#[derive(Debug, Clone, PartialEq)]
enum BoundNode {
    Constant(f64),
    Parameter(usize),
    Negate(Box<BoundNode>),
    Binary(BinaryOperator, Box<BoundNode>, Box<BoundNode>),
}

/// An expression with every variable bound to a slot of the
/// "captured parameters, then global parameters" namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    root: BoundNode,
    captured_count: usize,
    source: Expression,
}

impl CompiledExpression {
    pub fn evaluate(&self, captured: &[f64], globals: &[f64]) -> f64 {
        self.eval_node(&self.root, captured, globals)
    }

    fn eval_node(&self, node: &BoundNode, captured: &[f64], globals: &[f64]) -> f64 {
        match node {
            BoundNode::Constant(value) => *value,
            BoundNode::Parameter(index) if *index < self.captured_count => captured[*index],
            BoundNode::Parameter(index) => globals[*index - self.captured_count],
            BoundNode::Negate(operand) => -self.eval_node(operand, captured, globals),
            BoundNode::Binary(op, lhs, rhs) => op.apply(
                self.eval_node(lhs, captured, globals),
                self.eval_node(rhs, captured, globals),
            ),
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.source
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.root, BoundNode::Constant(_))
    }
}

/// Parses and binds expressions against a fixed parameter namespace.
#[derive(Debug, Clone, Default)]
pub struct ExpressionCompiler {
    names: Vec<String>,
    captured_count: usize,
}

impl ExpressionCompiler {
    pub fn new(captured: &[String], globals: &[String]) -> Result<Self> {
        let mut names: Vec<String> = Vec::with_capacity(captured.len() + globals.len());
        for name in captured.iter().chain(globals) {
            if names.contains(name) {
                return Err(LSystemError::syntax(
                    format!("Attempted to declare the parameter \"{}\" twice", name),
                    SourceSpan::default(),
                ));
            }
            names.push(name.clone());
        }
        Ok(Self {
            names,
            captured_count: captured.len(),
        })
    }

    /// Compiler for expressions that may not reference any parameter.
    pub fn constants() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn captured_count(&self) -> usize {
        self.captured_count
    }

    /// Parses `text` as a bare expression. The outer parentheses are implied.
    pub fn parse(&self, text: &str) -> Result<Expression> {
        let body = Tokenizer::tokenize(text, &self.names)?;
        let mut depth = 0usize;
        for token in &body {
            match token.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => {
                    return Err(LSystemError::syntax(
                        "Unmatched closing parenthesis",
                        token.span,
                    ))
                }
                TokenKind::RightParen => depth -= 1,
                _ => {}
            }
        }
        let end = text.chars().count();
        let mut tokens = Vec::with_capacity(body.len() + 2);
        tokens.push(Token {
            kind: TokenKind::LeftParen,
            span: SourceSpan::new(0, 0),
        });
        tokens.extend(body);
        tokens.push(Token {
            kind: TokenKind::RightParen,
            span: SourceSpan::new(end, 0),
        });
        parse_tokens(&tokens).map_err(|err| match err {
            LSystemError::Syntax { message, span } if span.length == 0 && span.offset == 0 => {
                LSystemError::syntax(message, SourceSpan::new(0, end))
            }
            other => other,
        })
    }

    pub fn compile(&self, text: &str) -> Result<CompiledExpression> {
        let expression = self.parse(text)?;
        self.bind(&expression)
    }

    pub fn bind(&self, expression: &Expression) -> Result<CompiledExpression> {
        let root = if expression.is_constant() {
            let node = self.bind_node(expression)?;
            BoundNode::Constant(evaluate_unbound(&node))
        } else {
            self.bind_node(expression)?
        };
        Ok(CompiledExpression {
            root,
            captured_count: self.captured_count,
            source: expression.clone(),
        })
    }

    fn bind_node(&self, expression: &Expression) -> Result<BoundNode> {
        Ok(match expression {
            Expression::Constant(value) => BoundNode::Constant(*value),
            Expression::Variable(name) => {
                let index = self.names.iter().position(|n| n == name).ok_or_else(|| {
                    LSystemError::syntax(
                        format!("Unresolved parameter \"{}\"", name),
                        SourceSpan::default(),
                    )
                })?;
                BoundNode::Parameter(index)
            }
            Expression::Unary {
                op: UnaryOperator::Negate,
                operand,
            } => BoundNode::Negate(Box::new(self.bind_node(operand)?)),
            Expression::Binary { op, lhs, rhs } => BoundNode::Binary(
                *op,
                Box::new(self.bind_node(lhs)?),
                Box::new(self.bind_node(rhs)?),
            ),
        })
    }

    /// Parses and evaluates an expression with no parameters.
    pub fn evaluate_constant(text: &str) -> Result<f64> {
        let compiled = Self::constants().compile(text)?;
        Ok(compiled.evaluate(&[], &[]))
    }
}

fn evaluate_unbound(node: &BoundNode) -> f64 {
    match node {
        BoundNode::Constant(value) => *value,
        BoundNode::Parameter(_) => f64::NAN,
        BoundNode::Negate(operand) => -evaluate_unbound(operand),
        BoundNode::Binary(op, lhs, rhs) => op.apply(evaluate_unbound(lhs), evaluate_unbound(rhs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiler(captured: &[&str], globals: &[&str]) -> ExpressionCompiler {
        let c: Vec<String> = captured.iter().map(|s| s.to_string()).collect();
        let g: Vec<String> = globals.iter().map(|s| s.to_string()).collect();
        ExpressionCompiler::new(&c, &g).unwrap()
    }

    #[test]
    fn test_namespace_orders_captured_before_globals() {
        let compiler = compiler(&["x", "y"], &["g"]);
        let expr = compiler.compile("x - y + g").unwrap();
        assert_eq!(expr.evaluate(&[10.0, 3.0], &[100.0]), 107.0);
    }

    #[test]
    fn test_constant_expressions_are_folded() {
        let expr = ExpressionCompiler::constants().compile("2 * (3 + 1)").unwrap();
        assert!(expr.is_constant());
        assert_eq!(expr.evaluate(&[], &[]), 8.0);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let c = vec!["x".to_string()];
        assert!(ExpressionCompiler::new(&c, &c).is_err());
    }
}
