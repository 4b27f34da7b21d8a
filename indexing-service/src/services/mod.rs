pub mod credentials;
pub mod indexing;
pub mod metrics;
pub mod notifier;

pub use credentials::{AccessTokenProvider, AssertionSigner, ServiceAccountKey};
pub use indexing::{GoogleIndexingClient, IndexingApi, IndexingError, MockIndexingClient};
pub use metrics::{get_metrics, init_metrics, record_api_call, record_notification};
pub use notifier::{notify_new_article, NotifyOutcome, REJECTION_MESSAGE};
