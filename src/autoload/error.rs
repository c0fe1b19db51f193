//! Resolution Errors
//!
//! A lookup miss is never an error: the resolver reports it as `Ok(false)`.
//! Errors are reserved for faults the caller must see:
//! - a unit failed to load
//! - an alias would overwrite an existing definition
//! - an initialization hook failed
//! - the resolution chain grew past the configured depth

use std::path::PathBuf;

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that can occur while resolving a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The load primitive failed for a unit.
    Load { path: PathBuf, message: String },
    /// Alias target name is already defined.
    AliasCollision { alias: String, target: String },
    /// Aliasing a symbol that has no definition.
    UnknownAlias(String),
    /// A symbol's initialization hook failed.
    Init { symbol: String, message: String },
    /// A required symbol is still undefined after resolution.
    Undefined(String),
    /// Nested resolution went deeper than the configured limit.
    DepthExceeded { symbol: String, depth: usize },
}

impl ResolveError {
    /// Build a load error for `path`.
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ResolveError::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Build an initialization error for `symbol`.
    pub fn init(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        ResolveError::Init {
            symbol: symbol.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Load { path, message } => {
                write!(f, "Failed to load '{}': {}", path.display(), message)
            }
            ResolveError::AliasCollision { alias, target } => {
                write!(
                    f,
                    "Cannot alias '{}' as '{}': name is already defined",
                    target, alias
                )
            }
            ResolveError::UnknownAlias(symbol) => {
                write!(f, "Cannot alias '{}': symbol is not defined", symbol)
            }
            ResolveError::Init { symbol, message } => {
                write!(f, "Initialization of '{}' failed: {}", symbol, message)
            }
            ResolveError::Undefined(symbol) => write!(f, "Undefined symbol '{}'", symbol),
            ResolveError::DepthExceeded { symbol, depth } => {
                write!(
                    f,
                    "Resolution of '{}' exceeded maximum depth {}",
                    symbol, depth
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}
