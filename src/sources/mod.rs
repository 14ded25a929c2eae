//! Sources module
//!
//! Upstream account API: the GraphQL documents, response shapes and the
//! client that turns them into typed domain values.

pub mod fetch;
pub mod pixai;
pub mod queries;
pub mod types;

pub use fetch::AccountSource;
pub use pixai::PixaiClient;
pub use types::{AccessToken, AccessTokenPage};
