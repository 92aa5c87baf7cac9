pub mod broadcast_publisher;
pub mod redis_publisher;

pub use broadcast_publisher::BroadcastEventPublisher;
pub use redis_publisher::RedisEventPublisher;
