//! Explicit Symbol Paths
//!
//! Fully qualified symbol -> exact unit path. Entries bypass every search
//! strategy; the last registration for a symbol wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::symbol::trim_symbol;

/// Explicit symbol-to-path table.
#[derive(Clone, Debug, Default)]
pub struct ExplicitSymbols {
    paths: HashMap<String, PathBuf>,
}

impl ExplicitSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the unit path for a symbol, replacing any previous one.
    pub fn register(&mut self, symbol: &str, path: impl Into<PathBuf>) {
        self.paths.insert(trim_symbol(symbol).to_string(), path.into());
    }

    /// Register several symbols at once.
    pub fn register_many<I, S, P>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (S, P)>,
        S: AsRef<str>,
        P: Into<PathBuf>,
    {
        for (symbol, path) in entries {
            self.register(symbol.as_ref(), path);
        }
    }

    /// Get the unit path for a symbol (exact match).
    pub fn lookup(&self, symbol: &str) -> Option<&Path> {
        self.paths.get(trim_symbol(symbol)).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
