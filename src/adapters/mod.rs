// Adapters layer: concrete implementations of the domain ports (intranet HTTP client, rate limiting).

pub mod http;
pub mod rate_limit;

pub use http::IntraClient;
pub use rate_limit::{FixedDelay, NoDelay};
