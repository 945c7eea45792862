//! Remote call path for the store's GraphQL Admin API
//!
//! # Components
//!
//! - [`transport`]: single HTTP call, classified into a [`CallOutcome`]
//! - [`throttle`]: cost/credit envelope parsing and pacing arithmetic
//! - [`retry`]: per-call retry state with exponential backoff
//! - [`executor`]: [`RateLimitedExecutor`] combining the above
//!
//! # Example
//!
//! ```ignore
//! use catalog_sync::api::{GraphqlRequest, HttpTransport, RateLimitedExecutor};
//! use catalog_sync::config::{RetryConfig, ThrottleConfig};
//!
//! let transport = HttpTransport::new(&settings)?;
//! let executor = RateLimitedExecutor::new(transport, RetryConfig::default(), ThrottleConfig::default());
//!
//! let response = executor
//!     .execute(&GraphqlRequest::new("query { shop { name } }", serde_json::json!({})))
//!     .await?;
//! ```

pub mod executor;
pub mod retry;
pub mod throttle;
pub mod transport;

pub use executor::RateLimitedExecutor;
pub use retry::RetryState;
pub use throttle::ThrottleStatus;
pub use transport::{
    CallOutcome, GraphqlError, GraphqlRequest, GraphqlResponse, HttpTransport, Transport,
};
