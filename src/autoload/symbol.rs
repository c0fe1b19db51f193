//! Symbol Name Handling
//!
//! Symbols use `\` as the namespace separator:
//! - `Str` - Unprefixed (global) symbol
//! - `App\Models\User` - Qualified symbol, top-level namespace `App`
//! - `\App\Models\User` - Same as above (leading separator is stripped)
//!
//! Within a local name `_` is a word break and maps to a path separator,
//! so `Session_Driver` lives in `session/driver.<ext>`.

use std::path::{Path, PathBuf};

/// Namespace separator inside symbol names.
pub const NS_SEPARATOR: char = '\\';

/// Word break inside a symbol name; mapped to a directory level.
pub const WORD_BREAK: char = '_';

/// Strip any leading namespace separators.
pub fn trim_symbol(symbol: &str) -> &str {
    symbol.trim_start_matches(NS_SEPARATOR)
}

/// Split a qualified symbol at its first separator.
///
/// # Examples
/// - `"App\Models\User"` -> `Some(("App", "Models\User"))`
/// - `"Str"` -> `None`
pub fn split_symbol(symbol: &str) -> Option<(&str, &str)> {
    trim_symbol(symbol).split_once(NS_SEPARATOR)
}

/// Last component of a symbol (its short name).
///
/// # Examples
/// - `"Core\Str"` -> `"Str"`
/// - `"Str"` -> `"Str"`
pub fn short_name(symbol: &str) -> &str {
    symbol.rsplit(NS_SEPARATOR).next().unwrap_or(symbol)
}

/// Join a namespace and a name with the separator.
///
/// An empty namespace yields the bare name (the global namespace).
pub fn qualify(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_matches(NS_SEPARATOR);
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", namespace, NS_SEPARATOR, name)
    }
}

/// Normalize a top-level namespace segment for registry matching.
///
/// The segment is lowercased with its first character uppercased, and the
/// leading separator is re-attached: `"APP"` -> `"\App"`.
pub fn normalize_namespace(segment: &str) -> String {
    let lower = segment.to_lowercase();
    let mut chars = lower.chars();
    let mut normalized = String::with_capacity(segment.len() + 1);
    normalized.push(NS_SEPARATOR);
    if let Some(first) = chars.next() {
        normalized.extend(first.to_uppercase());
        normalized.push_str(chars.as_str());
    }
    normalized
}

/// Replace namespace separators and word breaks with `/`.
fn to_relative_path(name: &str) -> String {
    name.chars()
        .map(|c| if c == NS_SEPARATOR || c == WORD_BREAK { '/' } else { c })
        .collect()
}

/// Conventional location of an unprefixed symbol under the class directory.
///
/// `Session_Driver` -> `<class_dir>/session/driver.<ext>`
pub fn conventional_path(class_dir: &Path, symbol: &str, extension: &str) -> PathBuf {
    let relative = to_relative_path(symbol).to_lowercase();
    class_dir.join(format!("{}.{}", relative, extension))
}

/// Location of a namespaced symbol under a registered base path.
///
/// `remainder` is what is left of the normalized namespace after stripping the
/// registered prefix (usually empty). The whole computed path is lowercased.
///
/// # Examples
/// - base `/paths/app`, remainder `""`, local `Models\User`, ext `src`
///   -> `/paths/app/models/user.src`
pub fn namespaced_path(
    base_path: &str,
    remainder: &str,
    local_name: &str,
    extension: &str,
) -> PathBuf {
    let mut joined = base_path.trim_end_matches(['/', NS_SEPARATOR]).to_string();
    let remainder = to_relative_path(remainder);
    let remainder = remainder.trim_matches('/');
    if !remainder.is_empty() {
        joined.push('/');
        joined.push_str(remainder);
    }
    joined.push('/');
    joined.push_str(&to_relative_path(local_name));
    joined.push('.');
    joined.push_str(extension);
    PathBuf::from(joined.to_lowercase())
}
