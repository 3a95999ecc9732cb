//! Shared names and `::`-separated element paths.
//!
//! Element paths look like `meta::pure::functions::string::plus`. The last
//! segment is the element's simple name, everything before it is the package.

use std::sync::Arc;

/// A shared, immutable name (type paths, parameter names, column names).
///
/// Cloning is a reference-count bump, so names can be stored freely in
/// generic types and substitutions.
pub type Name = Arc<str>;

/// Path separator between package segments.
pub const PATH_SEPARATOR: &str = "::";

/// Last segment of a path: `meta::pure::Person` -> `Person`.
pub fn simple_name(path: &str) -> &str {
    match path.rfind(PATH_SEPARATOR) {
        Some(index) => &path[index + PATH_SEPARATOR.len()..],
        None => path,
    }
}

/// Package part of a path, or `None` for root-level elements.
pub fn package_of(path: &str) -> Option<&str> {
    path.rfind(PATH_SEPARATOR).map(|index| &path[..index])
}

/// Join a package and a simple name into a full path.
pub fn join_path(package: Option<&str>, name: &str) -> String {
    match package {
        Some(package) if !package.is_empty() => format!("{package}{PATH_SEPARATOR}{name}"),
        _ => name.to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/name_tests.rs"]
mod tests;
