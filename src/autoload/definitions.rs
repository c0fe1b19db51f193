//! Loaded Definitions
//!
//! A `Definition` is what a loaded unit contributes to the running process:
//! a named implementation plus an optional zero-argument initializer.
//! `Definitions` is the process-wide table of them, with aliases stored as
//! alias-name -> canonical-name and resolved by one extra indirection.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{trace, warn};

use super::error::{ResolveError, ResolveResult};
use super::resolver::Autoloader;
use super::symbol::trim_symbol;

/// Zero-argument initializer run once after a symbol is first resolved.
///
/// Receives the autoloader so that initialization may resolve further symbols.
pub type InitHook = Arc<dyn Fn(&mut Autoloader) -> ResolveResult<()> + Send + Sync>;

/// A defined symbol.
#[derive(Clone)]
pub struct Definition {
    /// Fully qualified name (e.g., "Core\Str").
    name: String,

    /// Implementation payload, opaque to the resolver.
    payload: Option<Arc<dyn Any + Send + Sync>>,

    /// Optional initializer capability.
    init: Option<InitHook>,
}

impl Definition {
    /// Create a definition with no payload and no initializer.
    pub fn new(name: &str) -> Self {
        Self {
            name: trim_symbol(name).to_string(),
            payload: None,
            init: None,
        }
    }

    /// Attach an implementation payload.
    pub fn with_payload<T: Any + Send + Sync>(mut self, payload: T) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Attach an initializer.
    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut Autoloader) -> ResolveResult<()> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Downcast the payload to a concrete type.
    pub fn payload<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    /// Get the initializer, if this definition has one.
    pub fn initializer(&self) -> Option<InitHook> {
        self.init.clone()
    }
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("has_payload", &self.payload.is_some())
            .field("has_init", &self.init.is_some())
            .finish()
    }
}

/// Table of everything defined in the running process.
#[derive(Clone, Debug, Default)]
pub struct Definitions {
    /// Canonical name -> definition.
    defs: HashMap<String, Arc<Definition>>,

    /// Alias name -> canonical name.
    aliases: HashMap<String, String>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a symbol.
    ///
    /// Returns `false` (and leaves the table untouched) when the name is
    /// already defined, directly or as an alias.
    pub fn define(&mut self, definition: Definition) -> bool {
        if self.is_defined(definition.name()) {
            warn!(symbol = definition.name(), "ignoring redefinition");
            return false;
        }
        trace!(symbol = definition.name(), "defined");
        self.defs
            .insert(definition.name().to_string(), Arc::new(definition));
        true
    }

    /// Map a name to its canonical name, following at most one alias.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        let name = trim_symbol(name);
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Look up a definition by canonical name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<Definition>> {
        self.defs.get(self.canonical_name(name)).cloned()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defs.contains_key(self.canonical_name(name))
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(trim_symbol(name))
    }

    /// Bind `alias` to the definition of `target`.
    ///
    /// Fails if `alias` is already defined or `target` is not.
    pub fn alias(&mut self, target: &str, alias: &str) -> ResolveResult<()> {
        let alias = trim_symbol(alias);
        if self.is_defined(alias) {
            return Err(ResolveError::AliasCollision {
                alias: alias.to_string(),
                target: trim_symbol(target).to_string(),
            });
        }
        if !self.is_defined(target) {
            return Err(ResolveError::UnknownAlias(trim_symbol(target).to_string()));
        }
        let canonical = self.canonical_name(target).to_string();
        trace!(alias = alias, canonical = canonical.as_str(), "aliased");
        self.aliases.insert(alias.to_string(), canonical);
        Ok(())
    }

    /// Number of definitions, not counting aliases.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
