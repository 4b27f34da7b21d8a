pub mod health;
pub mod metrics;
pub mod notify;

pub use health::health_check;
pub use metrics::metrics_endpoint;
pub use notify::notify;
