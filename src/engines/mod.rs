pub mod expression;
pub mod matching;
pub mod rules;
pub mod stepping;
