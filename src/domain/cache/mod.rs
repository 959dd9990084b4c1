//! Cache port - key-value collaborator for row and id-list memoization

mod key;
mod repository;

pub use key::namespaced_key;
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
