//! Symbol Resolver
//!
//! Resolves an undefined symbol to a unit, loads it, aliases it where needed
//! and runs its initializer once.
//!
//! # Lookup Precedence
//!
//! The first strategy that matches wins; later ones are not consulted.
//!
//! 1. **Explicit** - The symbol has an explicit path
//! 2. **Core** - Unprefixed symbol, `<core ns>\<symbol>` has an explicit path;
//!    loaded if needed, then aliased into the global namespace
//! 3. **Conventional** - Unprefixed symbol, `<class_dir>/<symbol as path>.<ext>`
//!    exists; the `<fallback ns>\<symbol>` counterpart is aliased if the unit
//!    defined only that
//! 4. **Namespaced** - Qualified symbol; the first registered namespace that
//!    prefixes the symbol's top-level namespace and whose computed path exists
//!
//! Prefix matching follows registration order, not prefix length.
//!
//! # Re-entrancy
//!
//! Loading a unit may resolve further symbols through the same autoloader.
//! The [`InitDispatcher`] makes sure only the symbol that armed the marker
//! gets its initializer run, and that the marker is released on every exit
//! path, including errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use super::core_namespaces::CoreNamespaces;
use super::definitions::{Definition, Definitions};
use super::error::{ResolveError, ResolveResult};
use super::explicit::ExplicitSymbols;
use super::init::InitDispatcher;
use super::namespaces::{NamespaceEntry, NamespaceRegistry};
use super::symbol::{
    conventional_path, namespaced_path, normalize_namespace, qualify, short_name, split_symbol,
    trim_symbol, NS_SEPARATOR,
};
use super::unit::UnitLoader;

/// Autoloader configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoloadOptions {
    /// Root for conventional lookups of unprefixed symbols.
    pub class_dir: PathBuf,

    /// Unit file extension, without the dot.
    /// Default: "src"
    pub extension: String,

    /// Namespace checked for an aliasable counterpart after a conventional load.
    /// Default: "Core"
    pub fallback_namespace: String,

    /// Maximum number of nested resolutions.
    /// Default: 64
    pub max_depth: usize,
}

impl Default for AutoloadOptions {
    fn default() -> Self {
        Self::new("classes")
    }
}

impl AutoloadOptions {
    /// Create options rooted at `class_dir`, other fields at their defaults.
    pub fn new(class_dir: impl Into<PathBuf>) -> Self {
        Self {
            class_dir: class_dir.into(),
            extension: "src".to_string(),
            fallback_namespace: "Core".to_string(),
            max_depth: 64,
        }
    }
}

/// Where a symbol would be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// Explicit path for the symbol itself.
    Explicit(PathBuf),
    /// Explicit path of a core-namespace counterpart.
    Core { qualified: String, path: PathBuf },
    /// Conventional path under the class directory.
    Conventional(PathBuf),
    /// Path under a registered namespace.
    Namespaced { namespace: String, path: PathBuf },
}

impl Located {
    pub fn path(&self) -> &Path {
        match self {
            Located::Explicit(path) | Located::Conventional(path) => path,
            Located::Core { path, .. } | Located::Namespaced { path, .. } => path,
        }
    }

    /// Short name of the lookup strategy.
    pub fn strategy(&self) -> &'static str {
        match self {
            Located::Explicit(_) => "explicit",
            Located::Core { .. } => "core",
            Located::Conventional(_) => "conventional",
            Located::Namespaced { .. } => "namespaced",
        }
    }
}

impl std::fmt::Display for Located {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Located::Core { qualified, path } => {
                write!(f, "core {} -> {}", qualified, path.display())
            }
            Located::Namespaced { namespace, path } => {
                write!(f, "namespaced {} -> {}", namespace, path.display())
            }
            other => write!(f, "{} -> {}", other.strategy(), other.path().display()),
        }
    }
}

/// Application-supplied resolver, consulted before the built-in lookup.
///
/// Returns `Ok(true)` when it handled the symbol.
pub trait SymbolResolver: Send + Sync {
    fn resolve(&self, symbol: &str, autoloader: &mut Autoloader) -> ResolveResult<bool>;
}

impl<F> SymbolResolver for F
where
    F: Fn(&str, &mut Autoloader) -> ResolveResult<bool> + Send + Sync,
{
    fn resolve(&self, symbol: &str, autoloader: &mut Autoloader) -> ResolveResult<bool> {
        self(symbol, autoloader)
    }
}

/// Registries, definitions and resolution state for one process.
pub struct Autoloader {
    options: AutoloadOptions,
    namespaces: NamespaceRegistry,
    explicit: ExplicitSymbols,
    core: CoreNamespaces,
    definitions: Definitions,
    init: InitDispatcher,
    loader: Arc<dyn UnitLoader>,
    resolvers: Vec<Arc<dyn SymbolResolver>>,
}

impl Autoloader {
    /// Create an autoloader with empty registries.
    pub fn new(options: AutoloadOptions, loader: Arc<dyn UnitLoader>) -> Self {
        Self {
            options,
            namespaces: NamespaceRegistry::new(),
            explicit: ExplicitSymbols::new(),
            core: CoreNamespaces::new(),
            definitions: Definitions::new(),
            init: InitDispatcher::new(),
            loader,
            resolvers: Vec::new(),
        }
    }

    pub fn options(&self) -> &AutoloadOptions {
        &self.options
    }

    // ============================================================
    // Configuration
    // ============================================================

    /// Add a namespace search path.
    pub fn add_namespace(&mut self, namespace: &str, path: &str) {
        self.namespaces.register(namespace, path);
    }

    /// Add several namespace search paths, optionally ahead of existing ones.
    pub fn add_namespaces<I>(&mut self, entries: I, prepend: bool)
    where
        I: IntoIterator<Item = NamespaceEntry>,
    {
        self.namespaces.register_many(entries, prepend);
    }

    /// Base path registered for `namespace`.
    pub fn namespace_path(&self, namespace: &str) -> Option<&str> {
        self.namespaces.lookup(namespace)
    }

    /// Add an explicit unit path for a symbol.
    pub fn add_symbol(&mut self, symbol: &str, path: impl Into<PathBuf>) {
        self.explicit.register(symbol, path);
    }

    /// Add explicit unit paths for several symbols.
    pub fn add_symbols<I, S, P>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (S, P)>,
        S: AsRef<str>,
        P: Into<PathBuf>,
    {
        self.explicit.register_many(entries);
    }

    /// Add a namespace whose symbols may be used unprefixed.
    pub fn add_core_namespace(&mut self, namespace: &str, prefix: bool) {
        self.core.add(namespace, prefix);
    }

    /// Install an application resolver; it runs before the built-in lookup.
    pub fn install<R: SymbolResolver + 'static>(&mut self, resolver: R) {
        self.resolvers.push(Arc::new(resolver));
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    pub fn explicit_symbols(&self) -> &ExplicitSymbols {
        &self.explicit
    }

    pub fn core_namespaces(&self) -> &CoreNamespaces {
        &self.core
    }

    // ============================================================
    // Definitions
    // ============================================================

    /// Define a symbol. Returns `false` if it was already defined.
    pub fn define(&mut self, definition: Definition) -> bool {
        self.definitions.define(definition)
    }

    pub fn is_defined(&self, symbol: &str) -> bool {
        self.definitions.is_defined(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<Arc<Definition>> {
        self.definitions.get(symbol)
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Alias `symbol` under `namespace` using its short name.
    ///
    /// An empty namespace aliases into the global namespace:
    /// `alias_to_namespace("Core\Str", "")` binds `Str`.
    pub fn alias_to_namespace(&mut self, symbol: &str, namespace: &str) -> ResolveResult<()> {
        let alias = qualify(namespace, short_name(trim_symbol(symbol)));
        debug!(symbol, alias = alias.as_str(), "alias");
        self.definitions.alias(symbol, &alias)
    }

    /// Initialization state, for inspection.
    pub fn init_state(&self) -> &InitDispatcher {
        &self.init
    }

    // ============================================================
    // Resolution
    // ============================================================

    /// Get a symbol's definition, resolving it first if it is undefined.
    ///
    /// Installed resolvers are tried in installation order before the
    /// built-in lookup.
    pub fn require(&mut self, symbol: &str) -> ResolveResult<Arc<Definition>> {
        if let Some(definition) = self.get(symbol) {
            return Ok(definition);
        }

        let mut handled = false;
        for resolver in self.resolvers.clone() {
            if resolver.resolve(symbol, self)? {
                handled = true;
                break;
            }
        }
        if !handled {
            self.resolve(symbol)?;
        }

        self.get(symbol)
            .ok_or_else(|| ResolveError::Undefined(trim_symbol(symbol).to_string()))
    }

    /// Find where `symbol` would be loaded from, without loading anything.
    pub fn locate(&self, symbol: &str) -> Option<Located> {
        let symbol = trim_symbol(symbol);

        if let Some(path) = self.explicit.lookup(symbol) {
            return Some(Located::Explicit(path.to_path_buf()));
        }

        match split_symbol(symbol) {
            None => self
                .locate_core(symbol)
                .or_else(|| self.locate_conventional(symbol)),
            Some((top, local)) => self.locate_namespaced(top, local),
        }
    }

    fn locate_core(&self, symbol: &str) -> Option<Located> {
        self.core.iter().find_map(|namespace| {
            let qualified = qualify(namespace, symbol);
            self.explicit.lookup(&qualified).map(|path| Located::Core {
                path: path.to_path_buf(),
                qualified,
            })
        })
    }

    fn locate_conventional(&self, symbol: &str) -> Option<Located> {
        let path = conventional_path(&self.options.class_dir, symbol, &self.options.extension);
        trace!(symbol, path = %path.display(), "probe conventional");
        self.loader
            .exists(&path)
            .then_some(Located::Conventional(path))
    }

    fn locate_namespaced(&self, top: &str, local: &str) -> Option<Located> {
        let normalized = normalize_namespace(top);
        let derived = normalized.trim_start_matches(NS_SEPARATOR);

        for entry in self.namespaces.iter() {
            let registered = entry.namespace.trim_start_matches(NS_SEPARATOR);
            let Some(remainder) = derived.strip_prefix(registered) else {
                continue;
            };

            let path = namespaced_path(&entry.base_path, remainder, local, &self.options.extension);
            trace!(
                namespace = entry.namespace.as_str(),
                path = %path.display(),
                "probe namespaced"
            );
            if self.loader.exists(&path) {
                return Some(Located::Namespaced {
                    namespace: entry.namespace.clone(),
                    path,
                });
            }
        }
        None
    }

    /// Resolve an undefined symbol.
    ///
    /// Returns `Ok(false)` when no strategy finds a unit. Errors from the
    /// loader, aliasing or initializers are propagated unchanged.
    pub fn resolve(&mut self, symbol: &str) -> ResolveResult<bool> {
        let symbol = trim_symbol(symbol).to_string();

        if self.init.depth() >= self.options.max_depth {
            return Err(ResolveError::DepthExceeded {
                symbol,
                depth: self.options.max_depth,
            });
        }

        let armed = self.init.enter(&symbol);
        let result = self.resolve_inner(&symbol);
        self.init.exit(&symbol);

        match &result {
            Ok(true) => debug!(symbol = symbol.as_str(), armed, "resolved"),
            Ok(false) => debug!(symbol = symbol.as_str(), armed, "not found"),
            Err(e) => warn!(symbol = symbol.as_str(), error = %e, "resolution failed"),
        }
        result
    }

    fn resolve_inner(&mut self, symbol: &str) -> ResolveResult<bool> {
        let Some(located) = self.locate(symbol) else {
            return Ok(false);
        };
        debug!(symbol, strategy = located.strategy(), path = %located.path().display(), "located");

        match located {
            Located::Explicit(path) | Located::Namespaced { path, .. } => {
                self.load(&path)?;
            }
            Located::Core { qualified, path } => {
                if !self.is_defined(&qualified) {
                    self.load(&path)?;
                }
                self.alias_to_namespace(&qualified, "")?;
            }
            Located::Conventional(path) => {
                self.load(&path)?;
                if !self.is_defined(symbol) {
                    let counterpart = qualify(&self.options.fallback_namespace, symbol);
                    if self.is_defined(&counterpart) {
                        self.alias_to_namespace(&counterpart, "")?;
                    }
                }
            }
        }

        self.initialize(symbol)?;
        Ok(true)
    }

    fn load(&mut self, path: &Path) -> ResolveResult<()> {
        let loader = Arc::clone(&self.loader);
        debug!(path = %path.display(), depth = self.init.depth(), "load unit");
        loader.load_unit(path, self)
    }

    /// Run the initializer for `symbol` if it holds the pending marker.
    fn initialize(&mut self, symbol: &str) -> ResolveResult<()> {
        if !self.init.claim(symbol) {
            trace!(symbol, "nested load, initializer deferred to outer symbol");
            return Ok(());
        }

        let hook = self.get(symbol).and_then(|d| d.initializer());
        if let Some(hook) = hook {
            debug!(symbol, "initialize");
            hook(self)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Autoloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autoloader")
            .field("options", &self.options)
            .field("namespace_count", &self.namespaces.len())
            .field("explicit_count", &self.explicit.len())
            .field("core_count", &self.core.len())
            .field("definition_count", &self.definitions.len())
            .field("resolver_count", &self.resolvers.len())
            .field("pending", &self.init.pending())
            .finish()
    }
}

/// Thread-safe wrapper for Autoloader.
///
/// Resolution needs the write lock, so a single call chain owns the pending
/// marker at a time.
pub type SharedAutoloader = Arc<RwLock<Autoloader>>;

/// Create a new shared autoloader.
pub fn new_shared_autoloader(
    options: AutoloadOptions,
    loader: Arc<dyn UnitLoader>,
) -> SharedAutoloader {
    Arc::new(RwLock::new(Autoloader::new(options, loader)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoload::unit::MemoryLoader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn autoloader(loader: &Arc<MemoryLoader>) -> Autoloader {
        Autoloader::new(AutoloadOptions::new("/app/classes"), loader.clone())
    }

    fn counting(name: &str, counter: &Arc<AtomicUsize>) -> Definition {
        let counter = Arc::clone(counter);
        Definition::new(name).with_init(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_locate_explicit_first() {
        let loader = Arc::new(MemoryLoader::new());
        let mut al = autoloader(&loader);
        al.add_namespace("App", "/paths/app");
        al.add_symbol("App\\Models\\User", "/custom/user.src");

        assert_eq!(
            al.locate("App\\Models\\User"),
            Some(Located::Explicit(PathBuf::from("/custom/user.src")))
        );
    }

    #[test]
    fn test_locate_core_before_conventional() {
        let loader = Arc::new(MemoryLoader::new().with_unit("/app/classes/str.src", |_| Ok(())));
        let mut al = autoloader(&loader);
        al.add_core_namespace("Core", true);
        al.add_symbol("Core\\Str", "/core/str.src");

        let located = al.locate("Str").unwrap();
        assert_eq!(located.strategy(), "core");
        assert_eq!(located.path(), Path::new("/core/str.src"));
    }

    #[test]
    fn test_locate_core_order() {
        let loader = Arc::new(MemoryLoader::new());
        let mut al = autoloader(&loader);
        al.add_core_namespace("Core", true);
        al.add_core_namespace("Extras", false);
        al.add_symbol("Core\\Str", "/core/str.src");
        al.add_symbol("Extras\\Str", "/extras/str.src");

        assert_eq!(al.locate("Str").unwrap().path(), Path::new("/core/str.src"));

        al.add_core_namespace("Override", true);
        al.add_symbol("Override\\Str", "/override/str.src");
        assert_eq!(al.locate("Str").unwrap().path(), Path::new("/override/str.src"));
    }

    #[test]
    fn test_locate_conventional() {
        let loader = Arc::new(
            MemoryLoader::new().with_unit("/app/classes/session/driver.src", |_| Ok(())),
        );
        let al = autoloader(&loader);

        assert_eq!(
            al.locate("Session_Driver"),
            Some(Located::Conventional(PathBuf::from(
                "/app/classes/session/driver.src"
            )))
        );
        assert_eq!(al.locate("Missing"), None);
    }

    #[test]
    fn test_locate_namespaced_insertion_order() {
        let loader = Arc::new(
            MemoryLoader::new()
                .with_unit("/first/user.src", |_| Ok(()))
                .with_unit("/second/pp/user.src", |_| Ok(())),
        );
        let mut al = autoloader(&loader);
        al.add_namespace("App", "/first");
        al.add_namespace("A", "/second");

        let located = al.locate("App\\User").unwrap();
        assert_eq!(located.path(), Path::new("/first/user.src"));

        // A shorter prefix moved ahead wins; precedence is not longest-match
        al.add_namespaces(vec![NamespaceEntry::new("A", "/second")], true);
        let located = al.locate("App\\User").unwrap();
        assert_eq!(located.path(), Path::new("/second/pp/user.src"));
    }

    #[test]
    fn test_locate_namespaced_skips_missing_files() {
        let loader = Arc::new(MemoryLoader::new().with_unit("/vendor/app/user.src", |_| Ok(())));
        let mut al = autoloader(&loader);
        al.add_namespace("App", "/paths/app");
        al.add_namespace("\\App", "/vendor/app");

        assert_eq!(
            al.locate("\\App\\User"),
            Some(Located::Namespaced {
                namespace: "\\App".to_string(),
                path: PathBuf::from("/vendor/app/user.src"),
            })
        );
    }

    #[test]
    fn test_resolve_normalizes_namespace_case() {
        let user = Definition::new("App\\Models\\User");
        let loader = Arc::new(
            MemoryLoader::new().with_definitions("/paths/app/models/user.src", vec![user]),
        );
        let mut al = autoloader(&loader);
        al.add_namespace("App", "/paths/app");

        assert!(al.resolve("APP\\MODELS\\USER").unwrap());
        assert_eq!(loader.loads(), vec![PathBuf::from("/paths/app/models/user.src")]);
        assert_eq!(al.init_state().pending(), None);
    }

    #[test]
    fn test_resolve_not_found_leaves_marker_empty() {
        let loader = Arc::new(MemoryLoader::new());
        let mut al = autoloader(&loader);

        assert!(!al.resolve("Nothing").unwrap());
        assert!(!al.resolve("Pkg\\Nothing").unwrap());
        assert_eq!(al.init_state().pending(), None);
        assert_eq!(al.init_state().depth(), 0);
        assert!(loader.loads().is_empty());
    }

    #[test]
    fn test_resolve_runs_initializer_once() {
        let inits = Arc::new(AtomicUsize::new(0));
        let loader = Arc::new(
            MemoryLoader::new().with_definitions("/units/str.src", vec![counting("Str", &inits)]),
        );
        let mut al = autoloader(&loader);
        al.add_symbol("Str", "/units/str.src");

        assert!(al.resolve("Str").unwrap());
        assert_eq!(inits.load(Ordering::SeqCst), 1);

        // Already defined: require does not resolve again
        al.require("Str").unwrap();
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(loader.load_count(Path::new("/units/str.src")), 1);
    }

    #[test]
    fn test_conventional_aliases_fallback_counterpart() {
        let loader = Arc::new(
            MemoryLoader::new()
                .with_definitions("/app/classes/arr.src", vec![Definition::new("Core\\Arr")]),
        );
        let mut al = autoloader(&loader);

        assert!(al.resolve("Arr").unwrap());
        assert!(al.definitions().is_alias("Arr"));
        assert!(Arc::ptr_eq(
            &al.get("Arr").unwrap(),
            &al.get("Core\\Arr").unwrap()
        ));
    }

    #[test]
    fn test_conventional_without_definition_still_succeeds() {
        let loader = Arc::new(MemoryLoader::new().with_unit("/app/classes/empty.src", |_| Ok(())));
        let mut al = autoloader(&loader);

        assert!(al.resolve("Empty").unwrap());
        assert!(!al.is_defined("Empty"));
    }

    #[test]
    fn test_core_skips_load_when_qualified_is_defined() {
        let loader = Arc::new(MemoryLoader::new());
        let mut al = autoloader(&loader);
        al.add_core_namespace("Core", true);
        al.add_symbol("Core\\Str", "/core/str.src");
        al.define(Definition::new("Core\\Str"));

        assert!(al.resolve("Str").unwrap());
        assert!(loader.loads().is_empty());
        assert!(al.is_defined("Str"));
    }

    #[test]
    fn test_alias_collision_is_an_error() {
        let loader = Arc::new(
            MemoryLoader::new()
                .with_definitions("/core/str.src", vec![Definition::new("Core\\Str")]),
        );
        let mut al = autoloader(&loader);
        al.add_core_namespace("Core", true);
        al.add_symbol("Core\\Str", "/core/str.src");
        al.define(Definition::new("Str"));

        let err = al.resolve("Str").unwrap_err();
        assert!(matches!(err, ResolveError::AliasCollision { .. }));
        assert_eq!(al.init_state().pending(), None);
    }

    #[test]
    fn test_load_error_releases_marker() {
        let loader = Arc::new(MemoryLoader::new().with_unit("/units/bad.src", |_| {
            Err(ResolveError::load("/units/bad.src", "syntax error"))
        }));
        let mut al = autoloader(&loader);
        al.add_symbol("Bad", "/units/bad.src");

        let err = al.resolve("Bad").unwrap_err();
        assert!(err.to_string().contains("syntax error"));
        assert_eq!(al.init_state().pending(), None);
        assert!(!al.init_state().in_progress());
    }

    #[test]
    fn test_alias_to_namespace_target() {
        let loader = Arc::new(MemoryLoader::new());
        let mut al = autoloader(&loader);
        al.define(Definition::new("Foo\\Bar"));

        al.alias_to_namespace("Foo\\Bar", "\\Baz").unwrap();
        assert!(al.is_defined("Baz\\Bar"));
        assert!(!al.is_defined("Bar"));
    }

    #[test]
    fn test_shared_autoloader() {
        let loader = Arc::new(
            MemoryLoader::new().with_definitions("/units/str.src", vec![Definition::new("Str")]),
        );
        let shared = new_shared_autoloader(AutoloadOptions::default(), loader);

        shared.write().add_symbol("Str", "/units/str.src");
        assert!(shared.write().resolve("Str").unwrap());
        assert!(shared.read().is_defined("Str"));
    }
}
