pub mod branching;
pub mod matcher;
pub mod prefix;
pub mod suffix;

pub use branching::BranchingCache;
pub use matcher::{find_match, try_match, MatchContext, MatchScratch, MatchState};
pub use prefix::{PatternSymbol, PrefixPattern};
pub use suffix::SuffixPattern;
