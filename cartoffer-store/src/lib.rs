pub mod app_config;
pub mod memory_repo;
pub mod redis_repo;
pub mod resiliency;
pub mod segment_client;
pub mod segment_directory;

pub use memory_repo::InMemoryOfferRepository;
pub use redis_repo::RedisOfferRepository;
pub use resiliency::{CircuitBreaker, CircuitState};
pub use segment_client::HttpSegmentResolver;
pub use segment_directory::InMemorySegmentDirectory;
