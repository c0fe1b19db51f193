//! Autoload Infrastructure
//!
//! This module provides the registries and resolver behind lazy symbol loading:
//! - `NamespaceRegistry` - Ordered namespace -> base path search list
//! - `ExplicitSymbols` - Exact symbol -> unit path overrides
//! - `CoreNamespaces` - Namespaces usable unprefixed, aliased into the global namespace
//! - `Definitions` - Symbols defined in the running process, with aliases
//! - `InitDispatcher` - Pending-initialization marker and resolution stack
//! - `UnitLoader` - Load primitive (`FsLoader`, `MemoryLoader`)
//! - `Autoloader` - The resolver tying it all together
//! - `Manifest` - `symload.toml` bootstrap configuration

mod core_namespaces;
mod definitions;
mod error;
mod explicit;
mod init;
mod manifest;
mod namespaces;
mod resolver;
mod symbol;
mod unit;

pub use core_namespaces::CoreNamespaces;
pub use definitions::{Definition, Definitions, InitHook};
pub use error::{ResolveError, ResolveResult};
pub use explicit::ExplicitSymbols;
pub use init::InitDispatcher;
pub use manifest::{
    AutoloadSection, CoreNamespaceSpec, Manifest, ManifestError, NamespaceSpec, MANIFEST_FILE,
};
pub use namespaces::{NamespaceEntry, NamespaceRegistry};
pub use resolver::{
    new_shared_autoloader, AutoloadOptions, Autoloader, Located, SharedAutoloader, SymbolResolver,
};
pub use symbol::{
    conventional_path, namespaced_path, normalize_namespace, qualify, short_name,
    split_symbol, trim_symbol, NS_SEPARATOR, WORD_BREAK,
};
pub use unit::{FsLoader, MemoryLoader, UnitBody, UnitEvaluator, UnitLoader};
