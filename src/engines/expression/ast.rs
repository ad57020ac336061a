use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Exponent,
    Multiply,
    Divide,
    Remainder,
    Add,
    Subtract,
    GreaterThan,
    LessThan,
    GreaterThanOrEq,
    LessThanOrEq,
    Equal,
    NotEqual,
    BooleanAnd,
    BooleanOr,
}

impl BinaryOperator {
    /// Binding strength. Levels are reduced from 0 upward.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Exponent => 0,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Remainder => 1,
            BinaryOperator::Add | BinaryOperator::Subtract => 2,
            BinaryOperator::GreaterThan
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterThanOrEq
            | BinaryOperator::LessThanOrEq => 3,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 4,
            BinaryOperator::BooleanAnd => 5,
            BinaryOperator::BooleanOr => 6,
        }
    }

    pub const LOWEST_PRECEDENCE: u8 = 6;

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Exponent => "^",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThanOrEq => ">=",
            BinaryOperator::LessThanOrEq => "<=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::BooleanAnd => "&&",
            BinaryOperator::BooleanOr => "||",
        }
    }

    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOperator::Exponent => lhs.powf(rhs),
            BinaryOperator::Multiply => lhs * rhs,
            BinaryOperator::Divide => lhs / rhs,
            BinaryOperator::Remainder => lhs % rhs,
            BinaryOperator::Add => lhs + rhs,
            BinaryOperator::Subtract => lhs - rhs,
            BinaryOperator::GreaterThan => truth(lhs > rhs),
            BinaryOperator::LessThan => truth(lhs < rhs),
            BinaryOperator::GreaterThanOrEq => truth(lhs >= rhs),
            BinaryOperator::LessThanOrEq => truth(lhs <= rhs),
            BinaryOperator::Equal => truth(lhs == rhs),
            BinaryOperator::NotEqual => truth(lhs != rhs),
            BinaryOperator::BooleanAnd => truth(lhs > 0.0 && rhs > 0.0),
            BinaryOperator::BooleanOr => truth(lhs > 0.0 || rhs > 0.0),
        }
    }
}

fn truth(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Parsed expression tree. Variables are still named; binding happens in the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Constant(f64),
    Variable(String),
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

impl Expression {
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Constant(_) => true,
            Expression::Variable(_) => false,
            Expression::Unary { operand, .. } => operand.is_constant(),
            Expression::Binary { lhs, rhs, .. } => lhs.is_constant() && rhs.is_constant(),
        }
    }

    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Variable(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expression::Unary { operand, .. } => operand.collect_variables(names),
            Expression::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Unary { operand, .. } => write!(f, "-{}", operand),
            Expression::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparisons_yield_unit_values() {
        assert_eq!(BinaryOperator::GreaterThan.apply(3.0, 2.0), 1.0);
        assert_eq!(BinaryOperator::LessThanOrEq.apply(3.0, 2.0), 0.0);
        assert_eq!(BinaryOperator::BooleanOr.apply(0.0, 2.0), 1.0);
        assert_eq!(BinaryOperator::BooleanAnd.apply(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_display_is_fully_parenthesised() {
        let expr = Expression::Binary {
            op: BinaryOperator::Add,
            lhs: Box::new(Expression::Variable("x".to_string())),
            rhs: Box::new(Expression::Unary {
                op: UnaryOperator::Negate,
                operand: Box::new(Expression::Constant(3.0)),
            }),
        };
        assert_eq!(expr.to_string(), "(x + -3)");
        assert!(!expr.is_constant());
        assert_eq!(expr.variables(), vec!["x"]);
    }
}
