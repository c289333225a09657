//! Entity name normalisation.

/// Turn a bridge-side display name into the key used in topics and the
/// entity registry: lowercase, with every space replaced by `_`.
///
/// Only the ASCII space is replaced; other whitespace is kept as-is.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}
