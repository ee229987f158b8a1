//! Process-level services wired into the API.

pub mod redis_store;

pub use redis_store::RedisRecommendationStore;
