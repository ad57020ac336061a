pub mod ast;
pub mod compiler;
pub mod parser;
pub mod tokenizer;

pub use ast::{BinaryOperator, Expression, UnaryOperator};
pub use compiler::{CompiledExpression, ExpressionCompiler};
pub use parser::parse_tokens;
pub use tokenizer::{Token, TokenKind, Tokenizer};
