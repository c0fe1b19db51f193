//! Unit Loading Primitives
//!
//! The resolver never reads or executes units itself. It asks a `UnitLoader`
//! whether a path exists and to load it. Loading runs the unit against the
//! autoloader, which is how a unit defines symbols and how it can trigger
//! nested resolution of the symbols it depends on.
//!
//! - `FsLoader` - Files on disk, contents handed to a host evaluator
//! - `MemoryLoader` - In-memory units, with a log of every load

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::definitions::Definition;
use super::error::{ResolveError, ResolveResult};
use super::resolver::Autoloader;

/// Physical load primitive.
pub trait UnitLoader: Send + Sync {
    /// Check if a unit exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Load the unit at `path` into the running process.
    fn load_unit(&self, path: &Path, autoloader: &mut Autoloader) -> ResolveResult<()>;
}

/// Host evaluator for unit source text.
pub type UnitEvaluator =
    Arc<dyn Fn(&Path, &str, &mut Autoloader) -> ResolveResult<()> + Send + Sync>;

/// Loads units from the file system.
#[derive(Clone)]
pub struct FsLoader {
    evaluator: UnitEvaluator,
}

impl FsLoader {
    /// Create a loader that hands each unit's contents to `evaluator`.
    pub fn new<F>(evaluator: F) -> Self
    where
        F: Fn(&Path, &str, &mut Autoloader) -> ResolveResult<()> + Send + Sync + 'static,
    {
        Self {
            evaluator: Arc::new(evaluator),
        }
    }

    /// A loader that only reads units, for probing layouts.
    pub fn read_only() -> Self {
        Self::new(|_, _, _| Ok(()))
    }
}

impl UnitLoader for FsLoader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load_unit(&self, path: &Path, autoloader: &mut Autoloader) -> ResolveResult<()> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ResolveError::load(path, e.to_string()))?;
        debug!(path = %path.display(), bytes = contents.len(), "read unit");
        (self.evaluator)(path, &contents, autoloader)
    }
}

impl std::fmt::Debug for FsLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsLoader").finish_non_exhaustive()
    }
}

/// Body of an in-memory unit: runs when the unit is loaded.
pub type UnitBody = Arc<dyn Fn(&mut Autoloader) -> ResolveResult<()> + Send + Sync>;

/// In-memory units keyed by path.
///
/// Every successful or failed load attempt is recorded in order, so callers
/// can check exactly which units were loaded.
#[derive(Default)]
pub struct MemoryLoader {
    units: RwLock<HashMap<PathBuf, UnitBody>>,
    log: Mutex<Vec<PathBuf>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit whose body runs on load.
    pub fn add_unit<F>(&self, path: impl Into<PathBuf>, body: F)
    where
        F: Fn(&mut Autoloader) -> ResolveResult<()> + Send + Sync + 'static,
    {
        self.units.write().insert(path.into(), Arc::new(body));
    }

    /// Add a unit that defines the given symbols.
    pub fn add_definitions(&self, path: impl Into<PathBuf>, definitions: Vec<Definition>) {
        self.add_unit(path, move |autoloader| {
            for definition in &definitions {
                autoloader.define(definition.clone());
            }
            Ok(())
        });
    }

    /// Builder form of [`add_unit`](Self::add_unit).
    pub fn with_unit<F>(self, path: impl Into<PathBuf>, body: F) -> Self
    where
        F: Fn(&mut Autoloader) -> ResolveResult<()> + Send + Sync + 'static,
    {
        self.add_unit(path, body);
        self
    }

    /// Builder form of [`add_definitions`](Self::add_definitions).
    pub fn with_definitions(self, path: impl Into<PathBuf>, definitions: Vec<Definition>) -> Self {
        self.add_definitions(path, definitions);
        self
    }

    /// Paths loaded so far, in order.
    pub fn loads(&self) -> Vec<PathBuf> {
        self.log.lock().clone()
    }

    /// How many times `path` was loaded.
    pub fn load_count(&self, path: &Path) -> usize {
        self.log.lock().iter().filter(|p| p.as_path() == path).count()
    }
}

impl UnitLoader for MemoryLoader {
    fn exists(&self, path: &Path) -> bool {
        self.units.read().contains_key(path)
    }

    fn load_unit(&self, path: &Path, autoloader: &mut Autoloader) -> ResolveResult<()> {
        self.log.lock().push(path.to_path_buf());
        // Clone the body out so the lock is not held while the unit runs
        let body = self.units.read().get(path).cloned();
        match body {
            Some(body) => body(autoloader),
            None => Err(ResolveError::load(path, "no such unit")),
        }
    }
}

impl std::fmt::Debug for MemoryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLoader")
            .field("unit_count", &self.units.read().len())
            .field("load_count", &self.log.lock().len())
            .finish()
    }
}
