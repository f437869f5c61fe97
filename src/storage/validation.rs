//! Path validation
//!
//! Keeps namespaces and entry names from escaping the storage root.

use std::path::{Component, Path};

/// A namespace is usable when it names at least one plain folder and never
/// climbs out of the storage root.
pub fn is_relative_namespace(namespace: &str) -> bool {
    let path = Path::new(namespace);
    !namespace.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}

/// Entry names must be a single plain path component
pub fn is_safe_entry_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces() {
        assert!(is_relative_namespace("Music/AppName"));
        assert!(is_relative_namespace("./Music"));
        assert!(!is_relative_namespace(""));
        assert!(!is_relative_namespace("."));
        assert!(!is_relative_namespace("Music/../.."));
        assert!(!is_relative_namespace("/Music"));
    }

    #[test]
    fn entry_names() {
        assert!(is_safe_entry_name("0b8e8f3e-3c53-4c1e-9f59-9f3f3d0f2d1a"));
        assert!(!is_safe_entry_name(".."));
        assert!(!is_safe_entry_name(".meta"));
        assert!(!is_safe_entry_name("a/b"));
        assert!(!is_safe_entry_name(""));
    }
}
