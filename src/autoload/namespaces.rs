//! Namespace Search Paths
//!
//! Ordered mapping from namespace to base directory. Order is the lookup
//! precedence for namespaced symbols: the resolver walks entries front to
//! back and takes the first one whose namespace prefixes the symbol's.

/// A registered namespace and its base search path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceEntry {
    /// Namespace name (e.g., "App"). A leading separator is allowed.
    pub namespace: String,

    /// Base directory for symbols in this namespace.
    pub base_path: String,
}

impl NamespaceEntry {
    pub fn new(namespace: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            base_path: base_path.into(),
        }
    }
}

/// Ordered namespace registry.
#[derive(Clone, Debug, Default)]
pub struct NamespaceRegistry {
    /// Entries in precedence order.
    entries: Vec<NamespaceEntry>,
}

impl NamespaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, namespace: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.namespace == namespace)
    }

    /// Register a namespace search path.
    ///
    /// An existing namespace keeps its position and gets the new path.
    /// A new namespace is appended.
    pub fn register(&mut self, namespace: impl Into<String>, base_path: impl Into<String>) {
        let entry = NamespaceEntry::new(namespace, base_path);
        match self.position(&entry.namespace) {
            Some(idx) => self.entries[idx].base_path = entry.base_path,
            None => self.entries.push(entry),
        }
    }

    /// Register several namespaces at once.
    ///
    /// With `prepend` the new entries, in their given order, take precedence
    /// over everything already registered. Without it they behave like
    /// repeated [`register`](Self::register) calls.
    pub fn register_many<I>(&mut self, entries: I, prepend: bool)
    where
        I: IntoIterator<Item = NamespaceEntry>,
    {
        if !prepend {
            for entry in entries {
                self.register(entry.namespace, entry.base_path);
            }
            return;
        }

        let mut front: Vec<NamespaceEntry> = Vec::new();
        for entry in entries {
            // First occurrence wins inside the prepended batch
            if !front.iter().any(|e| e.namespace == entry.namespace) {
                front.push(entry);
            }
        }
        self.entries
            .retain(|existing| !front.iter().any(|e| e.namespace == existing.namespace));
        front.append(&mut self.entries);
        self.entries = front;
    }

    /// Get the base path registered for `namespace` (exact match).
    pub fn lookup(&self, namespace: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.namespace == namespace)
            .map(|e| e.base_path.as_str())
    }

    /// Iterate over entries in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &NamespaceEntry> {
        self.entries.iter()
    }

    /// Number of registered namespaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
