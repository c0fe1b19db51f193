//! Autoload Manifest
//!
//! Bootstrap configuration for an [`Autoloader`], read from `symload.toml`.
//!
//! ## Format
//!
//! ```toml
//! # Lookup order. Entries are appended unless `prefix = true` is set,
//! # which differs from `Autoloader::add_core_namespace`'s usual `true`.
//! core_namespaces = ["Core", { name = "App\\Overrides", prefix = true }]
//!
//! [autoload]
//! class_dir = "app/classes"
//! extension = "src"
//! fallback_namespace = "Core"
//! max_depth = 64
//!
//! [[namespace]]
//! name = "App"
//! path = "app"
//!
//! [[namespace]]
//! name = "Vendor"
//! path = "vendor"
//! prepend = true
//!
//! [symbols]
//! 'Core\Str' = "core/str.src"
//! ```
//!
//! Prepended namespaces keep their file order, ahead of the appended ones.
//!
//! Relative paths are resolved against the manifest's directory. Namespaced
//! lookups lowercase the whole computed path, including the manifest's own
//! directory once joined, so on case-sensitive file systems every component
//! of a namespace base path must be lowercase.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::namespaces::NamespaceEntry;
use super::resolver::{AutoloadOptions, Autoloader};
use super::unit::UnitLoader;

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "symload.toml";

/// Errors reading a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// File could not be read.
    Io(PathBuf, String),
    /// File is not a valid manifest.
    Parse(String),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Io(path, err) => {
                write!(f, "Failed to read '{}': {}", path.display(), err)
            }
            ManifestError::Parse(err) => write!(f, "Invalid manifest: {}", err),
        }
    }
}

impl std::error::Error for ManifestError {}

impl From<toml::de::Error> for ManifestError {
    fn from(err: toml::de::Error) -> Self {
        ManifestError::Parse(err.to_string())
    }
}

/// The `[autoload]` section. Unset fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutoloadSection {
    #[serde(default)]
    pub class_dir: Option<String>,

    #[serde(default)]
    pub extension: Option<String>,

    #[serde(default)]
    pub fallback_namespace: Option<String>,

    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// A `[[namespace]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceSpec {
    pub name: String,
    pub path: String,

    /// Place ahead of everything registered before it.
    #[serde(default)]
    pub prepend: bool,
}

/// A core namespace, either a bare name or `{ name, prefix }`.
///
/// `prefix` defaults to `false` so the list reads in lookup order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoreNamespaceSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        prefix: bool,
    },
}

impl CoreNamespaceSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { name, .. } => name,
        }
    }

    pub fn prefix(&self) -> bool {
        match self {
            Self::Name(_) => false,
            Self::Detailed { prefix, .. } => *prefix,
        }
    }
}

/// Parsed autoload manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub autoload: AutoloadSection,

    #[serde(default)]
    pub core_namespaces: Vec<CoreNamespaceSpec>,

    #[serde(default, rename = "namespace")]
    pub namespaces: Vec<NamespaceSpec>,

    #[serde(default)]
    pub symbols: HashMap<String, String>,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Manifest {
    /// Parse a manifest from TOML content. Relative paths stay relative.
    pub fn parse_toml(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a manifest file; relative paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::Io(path.to_path_buf(), e.to_string()))?;
        let mut manifest = Self::parse_toml(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!(path = %path.display(), "loaded manifest");
        Ok(manifest)
    }

    /// Load `symload.toml` from a directory, if present.
    pub fn load_dir(dir: &Path) -> Result<Option<Self>, ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Override the directory relative paths are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Options described by the `[autoload]` section.
    pub fn options(&self) -> AutoloadOptions {
        let section = &self.autoload;
        let mut options = AutoloadOptions::new(
            self.resolve_path(section.class_dir.as_deref().unwrap_or("classes")),
        );
        if let Some(extension) = &section.extension {
            options.extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(namespace) = &section.fallback_namespace {
            options.fallback_namespace = namespace.clone();
        }
        if let Some(depth) = section.max_depth {
            options.max_depth = depth;
        }
        options
    }

    /// Register everything in the manifest with `autoloader`.
    ///
    /// Options are left untouched; see [`Manifest::options`].
    pub fn apply(&self, autoloader: &mut Autoloader) {
        let mut prepended = Vec::new();
        for spec in &self.namespaces {
            let path = self.resolve_path(&spec.path).to_string_lossy().into_owned();
            if spec.prepend {
                prepended.push(NamespaceEntry::new(&spec.name, path));
            } else {
                autoloader.add_namespace(&spec.name, &path);
            }
        }
        if !prepended.is_empty() {
            autoloader.add_namespaces(prepended, true);
        }

        for spec in &self.core_namespaces {
            autoloader.add_core_namespace(spec.name(), spec.prefix());
        }

        autoloader.add_symbols(
            self.symbols
                .iter()
                .map(|(symbol, path)| (symbol.as_str(), self.resolve_path(path))),
        );

        debug!(
            namespaces = self.namespaces.len(),
            core_namespaces = self.core_namespaces.len(),
            symbols = self.symbols.len(),
            "applied manifest"
        );
    }

    /// Build an autoloader configured by this manifest.
    pub fn build(&self, loader: Arc<dyn UnitLoader>) -> Autoloader {
        let mut autoloader = Autoloader::new(self.options(), loader);
        self.apply(&mut autoloader);
        autoloader
    }
}
