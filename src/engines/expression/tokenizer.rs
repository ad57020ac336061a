use super::ast::BinaryOperator;
use crate::error::{LSystemError, Result};
use crate::types::SourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Operator(BinaryOperator),
    LeftParen,
    RightParen,
    Constant(f64),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
}

impl Token {
    fn new(kind: TokenKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            span: SourceSpan::new(offset, length),
        }
    }
}

/// Splits expression text into tokens. Identifiers must be one of `variables`.
pub struct Tokenizer<'a> {
    chars: Vec<char>,
    position: usize,
    variables: &'a [String],
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &str, variables: &'a [String]) -> Self {
        Self {
            chars: text.chars().collect(),
            position: 0,
            variables,
        }
    }

    pub fn tokenize(text: &str, variables: &'a [String]) -> Result<Vec<Token>> {
        Tokenizer::new(text, variables).collect()
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.position + ahead).copied()
    }

    fn operator(&mut self, c: char) -> Result<Token> {
        let start = self.position;
        let next = self.peek(1);
        let (kind, length) = match (c, next) {
            ('>', Some('=')) => (TokenKind::Operator(BinaryOperator::GreaterThanOrEq), 2),
            ('<', Some('=')) => (TokenKind::Operator(BinaryOperator::LessThanOrEq), 2),
            ('=', Some('=')) => (TokenKind::Operator(BinaryOperator::Equal), 2),
            ('!', Some('=')) => (TokenKind::Operator(BinaryOperator::NotEqual), 2),
            ('&', Some('&')) => (TokenKind::Operator(BinaryOperator::BooleanAnd), 2),
            ('|', Some('|')) => (TokenKind::Operator(BinaryOperator::BooleanOr), 2),
            ('>', _) => (TokenKind::Operator(BinaryOperator::GreaterThan), 1),
            ('<', _) => (TokenKind::Operator(BinaryOperator::LessThan), 1),
            ('+', _) => (TokenKind::Operator(BinaryOperator::Add), 1),
            ('-', _) => (TokenKind::Operator(BinaryOperator::Subtract), 1),
            ('*', _) => (TokenKind::Operator(BinaryOperator::Multiply), 1),
            ('/', _) => (TokenKind::Operator(BinaryOperator::Divide), 1),
            ('%', _) => (TokenKind::Operator(BinaryOperator::Remainder), 1),
            ('^', _) => (TokenKind::Operator(BinaryOperator::Exponent), 1),
            ('(', _) => (TokenKind::LeftParen, 1),
            (')', _) => (TokenKind::RightParen, 1),
            _ => {
                return Err(LSystemError::syntax(
                    format!("Unrecognized operator '{}'", c),
                    SourceSpan::new(start, 1),
                ))
            }
        };
        self.position += length;
        Ok(Token::new(kind, start, length))
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.position;
        while matches!(self.peek(0), Some(c) if c.is_ascii_digit() || c == '.') {
            self.position += 1;
        }
        let text: String = self.chars[start..self.position].iter().collect();
        let value = text.parse::<f64>().map_err(|_| {
            LSystemError::syntax(
                format!("Malformed number \"{}\"", text),
                SourceSpan::new(start, self.position - start),
            )
        })?;
        Ok(Token::new(TokenKind::Constant(value), start, self.position - start))
    }

    fn identifier(&mut self) -> Result<Token> {
        let start = self.position;
        while matches!(self.peek(0), Some(c) if c.is_alphanumeric() || c == '_') {
            self.position += 1;
        }
        let name: String = self.chars[start..self.position].iter().collect();
        let span = SourceSpan::new(start, self.position - start);
        if !self.variables.iter().any(|v| *v == name) {
            return Err(LSystemError::syntax(
                format!(
                    "Token \"{}\" is neither a numeric value, a variable, nor a syntactical token",
                    name
                ),
                span,
            ));
        }
        Ok(Token {
            kind: TokenKind::Variable(name),
            span,
        })
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while matches!(self.peek(0), Some(c) if c.is_whitespace()) {
            self.position += 1;
        }
        let c = self.peek(0)?;
        let token = if c.is_ascii_digit() || c == '.' {
            self.number()
        } else if c.is_alphabetic() || c == '_' {
            self.identifier()
        } else {
            self.operator(c)
        };
        if token.is_err() {
            // stop after the first error
            self.position = self.chars.len();
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_records_offsets() {
        let vars = names(&["x"]);
        let tokens = Tokenizer::tokenize("(x >= 12.5)", &vars).unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1].kind, TokenKind::Variable("x".to_string()));
        assert_eq!(tokens[2].kind, TokenKind::Operator(BinaryOperator::GreaterThanOrEq));
        assert_eq!(tokens[2].span, SourceSpan::new(3, 2));
        assert_eq!(tokens[3].kind, TokenKind::Constant(12.5));
        assert_eq!(tokens[3].span, SourceSpan::new(6, 4));
    }

    #[test]
    fn test_unknown_identifier_is_rejected() {
        let vars = names(&["x"]);
        let err = Tokenizer::tokenize("(x + y)", &vars).unwrap_err();
        match err {
            LSystemError::Syntax { span, .. } => assert_eq!(span, SourceSpan::new(5, 1)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_lone_equals_is_rejected() {
        let vars = names(&[]);
        assert!(Tokenizer::tokenize("(1 = 2)", &vars).is_err());
        assert!(Tokenizer::tokenize("(1.2.3)", &vars).is_err());
    }
}
