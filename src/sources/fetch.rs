//! Seam between the poll loop and the upstream account API.

use crate::error::UpstreamError;
use crate::sources::types::AccessTokenPage;

pub trait AccountSource {
    /// Caller's available quota amount.
    fn fetch_quota(&self) -> impl std::future::Future<Output = Result<i64, UpstreamError>> + Send;

    /// First page of the caller's access tokens.
    fn fetch_access_tokens(
        &self,
    ) -> impl std::future::Future<Output = Result<AccessTokenPage, UpstreamError>> + Send;
}
