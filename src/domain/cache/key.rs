//! Cache key helpers

use std::fmt::Display;

/// Builds a namespaced cache key from a group name and an entry id.
///
/// Row entries are addressed as `<namespace>:<id>`, mirroring the
/// (id, group) addressing of the backing cache collaborator.
pub fn namespaced_key(namespace: &str, id: impl Display) -> String {
    format!("{}:{}", namespace, id)
}
