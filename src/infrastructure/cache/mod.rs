//! Cache adapters

mod in_memory;
mod redis;

pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use self::redis::{RedisCache, RedisCacheConfig};
