//! Core Namespaces
//!
//! Namespaces whose symbols may be referenced unprefixed. When such a symbol
//! is resolved it is aliased into the global namespace.

use std::collections::VecDeque;

use super::symbol::NS_SEPARATOR;

/// Ordered list of core namespaces; the front is checked first.
#[derive(Clone, Debug, Default)]
pub struct CoreNamespaces {
    namespaces: VecDeque<String>,
}

impl CoreNamespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a core namespace.
    ///
    /// With `prefix` the namespace is checked before all others, so its
    /// symbols win over ones from namespaces added earlier. Otherwise it is
    /// checked last.
    pub fn add(&mut self, namespace: &str, prefix: bool) {
        let namespace = namespace.trim_matches(NS_SEPARATOR).to_string();
        if prefix {
            self.namespaces.push_front(namespace);
        } else {
            self.namespaces.push_back(namespace);
        }
    }

    /// Iterate in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
