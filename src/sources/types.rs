use chrono::{DateTime, Utc};
use serde::Deserialize;

/// ================================
/// GraphQL envelope
/// ================================
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// ================================
/// getMyQuota
/// ================================
#[derive(Debug, Deserialize)]
pub struct QuotaData {
    pub me: Option<QuotaMe>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaMe {
    pub quota_amount: Option<i64>,
}

/// ================================
/// listMyAccessTokens
/// ================================
#[derive(Debug, Deserialize)]
pub struct AccessTokensData {
    pub me: Option<AccessTokensMe>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokensMe {
    pub access_tokens: Option<AccessTokenConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenConnection {
    pub edges: Option<Vec<AccessTokenEdge>>,
    pub page_info: Option<PageInfo>,
    pub total_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AccessTokenEdge {
    pub node: Option<AccessTokenNode>,
}

/// Only `name` and `expireTime` are consumed; the remaining fragment fields
/// are requested but ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenNode {
    pub name: Option<String>,
    pub expire_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
}

/// ================================
/// Domain values
/// ================================

/// Read-only view of one upstream credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub name: String,
    pub expire_time: DateTime<Utc>,
}

/// First page of the caller's access tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessTokenPage {
    pub tokens: Vec<AccessToken>,
    pub has_next_page: bool,
    pub total_count: Option<i64>,
}
