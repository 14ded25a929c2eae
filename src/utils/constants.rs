//! Shared constants and invariants

pub const DEFAULT_API_URL: &str = "https://api.pixai.art/graphql";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 25;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 9865;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const HEALTH_PATH: &str = "/health";

/// page size of the access-token query; later pages are not requested
pub const ACCESS_TOKENS_PAGE_SIZE: u32 = 10;

// Query labels used by the self-observability metrics
pub const QUERY_QUOTA: &str = "quota";
pub const QUERY_ACCESS_TOKENS: &str = "access_tokens";
