//! symload - Lazy Symbol Resolution
//!
//! This library resolves symbols that are referenced but not yet defined: it
//! finds the unit implementing the symbol, loads it, aliases it into the
//! global namespace when it comes from a core namespace, and runs its
//! initializer exactly once.
//!
//! # Architecture
//!
//! 1. **Registries** (`autoload` module)
//!    - Namespace search paths, in precedence order (append or prepend)
//!    - Explicit symbol -> unit path overrides
//!    - Core namespaces usable without a prefix
//!
//! 2. **Resolver** (`Autoloader`)
//!    - Explicit -> core -> conventional -> namespaced lookup
//!    - Re-entrant: units may resolve their own dependencies while loading
//!    - Initializer fires only for the symbol that started the chain
//!
//! The load primitive is supplied by the host through `UnitLoader`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use symload::{AutoloadOptions, Autoloader, Definition, MemoryLoader};
//!
//! let loader = Arc::new(
//!     MemoryLoader::new().with_definitions("/core/str.src", vec![Definition::new("Core\\Str")]),
//! );
//! let mut autoloader = Autoloader::new(AutoloadOptions::new("/app/classes"), loader.clone());
//! autoloader.add_core_namespace("Core", true);
//! autoloader.add_symbol("Core\\Str", "/core/str.src");
//!
//! // `Str` is unprefixed: loaded from the core namespace and aliased globally
//! let str_def = autoloader.require("Str").unwrap();
//! assert_eq!(str_def.name(), "Core\\Str");
//! assert!(autoloader.definitions().is_alias("Str"));
//! ```

pub mod autoload;

pub use autoload::{
    new_shared_autoloader, AutoloadOptions, Autoloader, Definition, Definitions, FsLoader,
    Located, Manifest, ManifestError, MemoryLoader, NamespaceEntry, ResolveError, ResolveResult,
    SharedAutoloader, SymbolResolver, UnitLoader,
};
