use super::state::GenerationState;
use super::stepper::LSystem;
use crate::config::{AppConfig, CompilerConfig, ConfigSection, SteppingConfig};
use crate::engines::rules::{parse_axiom, RuleTable, TableSettings};
use crate::error::Result;
use crate::symbols::{CharSymbolMap, SymbolString};
use crate::types::SymbolSet;

/// Assembles a system from rule text and compiler settings.
#[derive(Debug, Clone, Default)]
pub struct SystemBuilder {
    rules: Vec<String>,
    globals: Vec<String>,
    compiler: CompilerConfig,
    stepping: SteppingConfig,
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            rules: config.system.rules.clone(),
            globals: config.system.global_names(),
            compiler: config.compiler.clone(),
            stepping: config.stepping.clone(),
        }
    }

    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.rules.push(rule.into());
        self
    }

    pub fn rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.extend(rules.into_iter().map(Into::into));
        self
    }

    pub fn global(mut self, name: impl Into<String>) -> Self {
        self.globals.push(name.into());
        self
    }

    pub fn ignore(mut self, symbols: &str) -> Self {
        self.compiler.ignored_symbols.push_str(symbols);
        self
    }

    pub fn branch_symbols(mut self, open: char, close: char) -> Self {
        self.compiler.branch_open = open;
        self.compiler.branch_close = close;
        self
    }

    pub fn probability_epsilon(mut self, epsilon: f64) -> Self {
        self.compiler.probability_epsilon = epsilon;
        self
    }

    pub fn stepping(mut self, stepping: SteppingConfig) -> Self {
        self.stepping = stepping;
        self
    }

    pub fn build(self) -> Result<CompiledSystem> {
        self.compiler.validate()?;
        let mut symbols =
            CharSymbolMap::with_branches(self.compiler.branch_open, self.compiler.branch_close);
        let branches =
            symbols.branch_symbols(self.compiler.branch_open, self.compiler.branch_close)?;
        let ignored: SymbolSet = symbols
            .symbols_of(&self.compiler.ignored_symbols)?
            .into_iter()
            .collect();
        let settings = TableSettings {
            branches,
            ignored,
            probability_epsilon: self.compiler.probability_epsilon,
        };
        let table = RuleTable::compile(self.rules.as_slice(), &self.globals, settings, &mut symbols)?;
        let system = LSystem::new(table, self.stepping)?;
        Ok(CompiledSystem { system, symbols })
    }
}

/// A system together with the character table its rules were compiled with.
pub struct CompiledSystem {
    pub system: LSystem,
    pub symbols: CharSymbolMap,
}

impl CompiledSystem {
    pub fn parse_axiom(&mut self, text: &str) -> Result<SymbolString> {
        parse_axiom(text, self.system.table().branches(), &mut self.symbols)
    }

    pub fn reset(&mut self, axiom: &str, seed: u64) -> Result<GenerationState> {
        let axiom = self.parse_axiom(axiom)?;
        self.system.reset_state(axiom, seed)
    }

    pub fn step(&self, state: &GenerationState, globals: &[f64]) -> Result<GenerationState> {
        self.system.step_system(state, globals)
    }

    pub fn display(&self, string: &SymbolString) -> String {
        string.to_display_string(&self.symbols.reverse_map())
    }
}
