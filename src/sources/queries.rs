//! Fixed GraphQL documents sent to the account API.

use serde::Serialize;
use serde_json::{json, Value};

use crate::utils::constants::ACCESS_TOKENS_PAGE_SIZE;

pub const GET_MY_QUOTA: &str = r#"
    query getMyQuota {
  me {
    quotaAmount
  }
}
    "#;

pub const LIST_MY_ACCESS_TOKENS: &str = r#"
    query listMyAccessTokens($before: String, $after: String, $first: Int, $last: Int) {
  me {
    accessTokens(before: $before, after: $after, first: $first, last: $last) {
      edges {
        node {
          ...AccessTokenBase
        }
        cursor
      }
      pageInfo {
        hasNextPage
        hasPreviousPage
        endCursor
        startCursor
      }
      totalCount
    }
  }
}

    fragment AccessTokenBase on AccessToken {
  id
  userId
  name
  secret
  expireTime
  lastUsedAt
  createdAt
}
    "#;

/// JSON body of a GraphQL POST.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: Value,
}

pub fn quota_request() -> GraphQlRequest {
    GraphQlRequest {
        query: GET_MY_QUOTA,
        variables: json!({}),
    }
}

pub fn access_tokens_request() -> GraphQlRequest {
    GraphQlRequest {
        query: LIST_MY_ACCESS_TOKENS,
        variables: json!({ "first": ACCESS_TOKENS_PAGE_SIZE }),
    }
}
