pub mod pacer;
pub mod retry;

pub use pacer::Pacer;
pub use retry::RetryStrategy;
