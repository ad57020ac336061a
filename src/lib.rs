pub mod config;
pub mod engines;
pub mod error;
pub mod symbols;
pub mod types;

pub use engines::expression::{CompiledExpression, Expression, ExpressionCompiler};
pub use engines::rules::{parse_axiom, RuleTable, TableSettings};
pub use engines::stepping::{CompiledSystem, GenerationState, LSystem, SystemBuilder};
pub use error::{LSystemError, Result};
pub use symbols::{CharSymbolMap, SymbolRemapper, SymbolString};
pub use types::{BranchSymbols, SourceSpan, Symbol};
