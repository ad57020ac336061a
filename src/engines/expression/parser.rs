use super::ast::{BinaryOperator, Expression, UnaryOperator};
use super::tokenizer::{Token, TokenKind};
use crate::error::{LSystemError, Result};
use crate::types::SourceSpan;

#[derive(Debug, Clone)]
enum Node {
    Operand(Expression, SourceSpan),
    Operator(BinaryOperator, SourceSpan),
}

impl Node {
    fn span(&self) -> SourceSpan {
        match self {
            Node::Operand(_, span) | Node::Operator(_, span) => *span,
        }
    }
}

/// Builds an expression tree from a token stream that starts with `(`.
pub fn parse_tokens(tokens: &[Token]) -> Result<Expression> {
    let first = tokens.first().ok_or_else(|| {
        LSystemError::syntax("Empty expression is not allowed", SourceSpan::default())
    })?;
    if first.kind != TokenKind::LeftParen {
        return Err(LSystemError::syntax(
            "Expression must begin with '('",
            first.span,
        ));
    }

    let mut cursor = 1;
    let (expression, _) = parse_group(tokens, &mut cursor, first.span)?;
    if let Some(extra) = tokens.get(cursor) {
        let message = if extra.kind == TokenKind::RightParen {
            "Unmatched closing parenthesis"
        } else {
            "Unexpected token after closing parenthesis"
        };
        return Err(LSystemError::syntax(message, extra.span));
    }
    Ok(expression)
}

fn parse_group(
    tokens: &[Token],
    cursor: &mut usize,
    open: SourceSpan,
) -> Result<(Expression, SourceSpan)> {
    let mut nodes = Vec::new();
    loop {
        let token = tokens.get(*cursor).ok_or_else(|| {
            LSystemError::syntax(
                "Unexpected end of input, missing closing parenthesis",
                open,
            )
        })?;
        *cursor += 1;
        match &token.kind {
            TokenKind::LeftParen => {
                let (expression, span) = parse_group(tokens, cursor, token.span)?;
                nodes.push(Node::Operand(expression, span));
            }
            TokenKind::RightParen => {
                let span = open.join(&token.span);
                if nodes.is_empty() {
                    return Err(LSystemError::syntax("Empty expression is not allowed", span));
                }
                return Ok((reduce(nodes, span)?, span));
            }
            TokenKind::Constant(value) => {
                nodes.push(Node::Operand(Expression::Constant(*value), token.span))
            }
            TokenKind::Variable(name) => {
                nodes.push(Node::Operand(Expression::Variable(name.clone()), token.span))
            }
            TokenKind::Operator(op) => nodes.push(Node::Operator(*op, token.span)),
        }
    }
}

fn reduce(mut nodes: Vec<Node>, group: SourceSpan) -> Result<Expression> {
    resolve_unary(&mut nodes)?;

    for level in 0..=BinaryOperator::LOWEST_PRECEDENCE {
        let mut i = 0;
        while i < nodes.len() {
            let (op, op_span) = match &nodes[i] {
                Node::Operator(op, span) if op.precedence() == level => (*op, *span),
                _ => {
                    i += 1;
                    continue;
                }
            };
            if i == 0 || i + 1 >= nodes.len() {
                return Err(LSystemError::syntax("Operator is missing an operand", op_span));
            }
            let rhs = nodes.remove(i + 1);
            let lhs = nodes.remove(i - 1);
            let (lhs, rhs, span) = match (lhs, rhs) {
                (Node::Operand(lhs, ls), Node::Operand(rhs, rs)) => (lhs, rhs, ls.join(&rs)),
                _ => {
                    return Err(LSystemError::syntax(
                        "Operator is missing an operand",
                        op_span,
                    ))
                }
            };
            nodes[i - 1] = Node::Operand(
                Expression::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
            // the next candidate now sits at index i
        }
    }

    if nodes.len() != 1 {
        let span = nodes
            .iter()
            .map(Node::span)
            .reduce(|a, b| a.join(&b))
            .unwrap_or(group);
        return Err(LSystemError::Internal {
            message: "token string could not compile to one expression".to_string(),
            span,
        });
    }
    match nodes.pop() {
        Some(Node::Operand(expression, _)) => Ok(expression),
        Some(Node::Operator(_, span)) => Err(LSystemError::syntax("Stranded operator", span)),
        None => Err(LSystemError::syntax("Empty expression is not allowed", group)),
    }
}

/// An operator that starts a group or follows another operator is unary.
fn resolve_unary(nodes: &mut Vec<Node>) -> Result<()> {
    let mut preceding = 1;
    let mut unary = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        match node {
            Node::Operator(_, span) => {
                preceding += 1;
                if preceding == 2 {
                    unary.push(i);
                } else if preceding > 2 {
                    return Err(LSystemError::syntax(
                        format!("{} consecutive operators detected", preceding),
                        *span,
                    ));
                }
            }
            Node::Operand(..) => preceding = 0,
        }
    }

    for &i in unary.iter().rev() {
        let (op, span) = match &nodes[i] {
            Node::Operator(op, span) => (*op, *span),
            Node::Operand(..) => continue,
        };
        if op != BinaryOperator::Subtract {
            return Err(LSystemError::syntax(
                format!("Unsupported unary operator '{}'", op.symbol()),
                span,
            ));
        }
        if i + 1 >= nodes.len() {
            return Err(LSystemError::syntax("Stranded operator", span));
        }
        match nodes.remove(i + 1) {
            Node::Operand(operand, operand_span) => {
                nodes[i] = Node::Operand(
                    Expression::Unary {
                        op: UnaryOperator::Negate,
                        operand: Box::new(operand),
                    },
                    span.join(&operand_span),
                );
            }
            Node::Operator(_, _) => return Err(LSystemError::syntax("Stranded operator", span)),
        }
    }
    Ok(())
}
