pub mod symbol_map;
pub mod symbol_string;

pub use symbol_map::{CharSymbolMap, SymbolRemapper, RESERVED_CHARACTERS};
pub use symbol_string::{SymbolString, SymbolStringBuilder};
