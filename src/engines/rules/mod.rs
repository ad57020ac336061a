pub mod parser;
pub mod rule;
pub mod symbols;
pub mod table;

pub use parser::RuleParser;
pub use rule::{InputSymbol, ParsedRule, ReplacementSymbol};
pub use symbols::parse_axiom;
pub use table::{Rule, RuleOutcome, RuleTable, TableSettings, DEFAULT_PROBABILITY_EPSILON};
