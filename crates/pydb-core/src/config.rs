//! # Agent Configuration
//!
//! Names and bounds an [`Agent`](crate::Agent) uses when looking into a
//! target. The defaults match a stock 3.5 build; embedders that link the
//! runtime statically or rename the shared library override them.
//!
//! ## Environment Variables
//!
//! [`AgentConfig::from_env`] reads:
//!
//! - `PYDB_RUNTIME_LIBRARY`: shared library holding the runtime symbols
//! - `PYDB_EVAL_SYMBOL`: frame evaluator entry point
//! - `PYDB_INTERP_HEAD_SYMBOL`: global holding the interpreter list head

use std::env;

/// Default shared library name of the runtime.
pub const DEFAULT_RUNTIME_LIBRARY: &str = "libpython3.5m.so";
/// Default frame evaluator symbol.
pub const DEFAULT_EVAL_SYMBOL: &str = "PyEval_EvalFrameEx";
/// Default interpreter list head symbol.
pub const DEFAULT_INTERP_HEAD_SYMBOL: &str = "interp_head";
/// Default buffer size for function and file names.
pub const DEFAULT_STRING_BUFFER: usize = 1024;
/// Default cap on line-number table bytes read per frame.
pub const DEFAULT_MAX_LINE_TABLE: usize = 4096;

/// Names and bounds for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig
{
    /// Load object searched first for runtime symbols.
    pub runtime_library: String,
    /// Frame evaluator used to validate program counters.
    pub eval_symbol: String,
    /// Global pointer to the first interpreter state.
    pub interp_head_symbol: String,
    /// Buffer size (terminator included) for decoded names.
    pub string_buffer_size: usize,
    /// Maximum line-number table size read per frame.
    pub max_line_table: usize,
}

impl Default for AgentConfig
{
    fn default() -> Self
    {
        Self {
            runtime_library: DEFAULT_RUNTIME_LIBRARY.to_string(),
            eval_symbol: DEFAULT_EVAL_SYMBOL.to_string(),
            interp_head_symbol: DEFAULT_INTERP_HEAD_SYMBOL.to_string(),
            string_buffer_size: DEFAULT_STRING_BUFFER,
            max_line_table: DEFAULT_MAX_LINE_TABLE,
        }
    }
}

impl AgentConfig
{
    /// Defaults overridden by any `PYDB_*` variables that are set and non-empty.
    pub fn from_env() -> Self
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let mut config = Self::default();
        if let Some(library) = get("PYDB_RUNTIME_LIBRARY") {
            config.runtime_library = library;
        }
        if let Some(symbol) = get("PYDB_EVAL_SYMBOL") {
            config.eval_symbol = symbol;
        }
        if let Some(symbol) = get("PYDB_INTERP_HEAD_SYMBOL") {
            config.interp_head_symbol = symbol;
        }
        config
    }

    pub fn with_runtime_library(mut self, library: impl Into<String>) -> Self
    {
        self.runtime_library = library.into();
        self
    }

    pub fn with_eval_symbol(mut self, symbol: impl Into<String>) -> Self
    {
        self.eval_symbol = symbol.into();
        self
    }

    pub fn with_interp_head_symbol(mut self, symbol: impl Into<String>) -> Self
    {
        self.interp_head_symbol = symbol.into();
        self
    }

    /// Values below 2 are raised to 2 so at least one character fits.
    pub fn with_string_buffer_size(mut self, size: usize) -> Self
    {
        self.string_buffer_size = size.max(2);
        self
    }

    /// Values below 2 are raised to 2 so at least one pair fits.
    pub fn with_max_line_table(mut self, size: usize) -> Self
    {
        self.max_line_table = size.max(2);
        self
    }
}
